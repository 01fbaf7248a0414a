use crate::core::circuit::{Operation, UnitaryBlock};
use crate::core::errors::{GateError, StateError};
use crate::core::utils::{deposit_bits, extract_bits, find_duplicate, mask_of};
use crate::core::Gate;
use ndarray::Array1;
use num_complex::Complex64;

/// Tolerance used when validating normalization.
pub const NORM_TOLERANCE: f64 = 1e-9;

/// A pure state of `num_qubits` qubits.
///
/// Amplitude `i` belongs to the basis state whose bit `k` is qubit `k`.
#[derive(Clone, Debug)]
pub struct StateVector {
    pub amplitudes: Array1<Complex64>,
    pub num_qubits: usize,
}

impl StateVector {
    /// Creates a new quantum state initialized to |0...0>.
    pub fn new(num_qubits: usize) -> Self {
        let dim = 1 << num_qubits;
        let mut amplitudes = Array1::<Complex64>::zeros(dim);
        amplitudes[0] = Complex64::new(1.0, 0.0);

        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Computational basis state |index>.
    pub fn basis_state(num_qubits: usize, index: usize) -> Result<Self, StateError> {
        if index >= 1 << num_qubits {
            return Err(StateError::BasisStateOutOfRange {
                value: index,
                width: num_qubits,
            });
        }
        let mut amplitudes = Array1::<Complex64>::zeros(1 << num_qubits);
        amplitudes[index] = Complex64::new(1.0, 0.0);

        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Validates that the input vector is a valid quantum state.
    fn check_vector_state(vector: &Array1<Complex64>) -> Result<(), StateError> {
        let dim = vector.len();

        if !dim.is_power_of_two() {
            return Err(StateError::InvalidDimensions);
        }

        let norm_sqr: f64 = vector.iter().map(|c| c.norm_sqr()).sum();

        if (norm_sqr - 1.0).abs() > NORM_TOLERANCE {
            return Err(StateError::NotNormalized(norm_sqr));
        }

        Ok(())
    }

    /// Creates a StateVector from a generic vector state.
    pub fn from_state_vector(vector: Array1<Complex64>) -> Result<Self, StateError> {
        Self::check_vector_state(&vector)?;
        // log_2 as len is power of two
        let num_qubits = vector.len().trailing_zeros() as usize;

        Ok(Self {
            amplitudes: vector,
            num_qubits,
        })
    }

    /// Checks if a StateVector is still normalized.
    pub fn is_valid(&self) -> Result<(), StateError> {
        Self::check_vector_state(&self.amplitudes)
    }

    /// Checks if a given index is within the system's range
    fn validate_qubit_index(&self, index: usize) -> Result<(), StateError> {
        if index >= self.num_qubits {
            return Err(StateError::IndexOutOfBounds {
                index,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    fn validate_targets(&self, targets: &[usize]) -> Result<(), StateError> {
        for &q in targets {
            self.validate_qubit_index(q)?;
        }
        if let Some(dup) = find_duplicate(targets) {
            return Err(GateError::DuplicateQubit(dup).into());
        }
        Ok(())
    }

    /// Applies a local gate to `targets`, in place.
    ///
    /// Works one block of `2^k` amplitudes at a time, so the full-system
    /// operator is never built.
    pub fn apply(&mut self, gate: &Gate, targets: &[usize]) -> Result<(), StateError> {
        if gate.num_qubits != targets.len() {
            return Err(StateError::DimensionMismatch {
                expected: gate.num_qubits,
                got: targets.len(),
            });
        }
        self.validate_targets(targets)?;

        let local_dim = 1 << targets.len();
        let target_mask = mask_of(targets);
        let offsets: Vec<usize> = (0..local_dim).map(|k| deposit_bits(k, targets)).collect();
        let mut block = vec![Complex64::new(0.0, 0.0); local_dim];

        for base in 0..self.amplitudes.len() {
            // Visit each block once, from its all-zero target corner
            if base & target_mask != 0 {
                continue;
            }
            for (k, &off) in offsets.iter().enumerate() {
                block[k] = self.amplitudes[base | off];
            }
            for (row, &off) in offsets.iter().enumerate() {
                let mut acc = Complex64::new(0.0, 0.0);
                for (col, amp) in block.iter().enumerate() {
                    acc += gate.matrix[[row, col]] * amp;
                }
                self.amplitudes[base | off] = acc;
            }
        }
        Ok(())
    }

    /// Applies a permutation block by moving amplitudes, never materializing
    /// the matrix.
    pub fn apply_permutation(&mut self, block: &UnitaryBlock) -> Result<(), StateError> {
        let targets = &block.qubits;
        if block.permutation.num_qubits() != targets.len() {
            return Err(StateError::DimensionMismatch {
                expected: block.permutation.num_qubits(),
                got: targets.len(),
            });
        }
        self.validate_targets(targets)?;

        let passive_mask = !mask_of(targets);
        let mut next = Array1::<Complex64>::zeros(self.amplitudes.len());

        for (idx, &amp) in self.amplitudes.iter().enumerate() {
            let local = extract_bits(idx, targets);
            let mapped = block.permutation.apply_index(local);
            let other = (idx & passive_mask) | deposit_bits(mapped, targets);
            if block.adjoint {
                // U† gathers: (U†ψ)[i] = ψ[π(i)]
                next[idx] = self.amplitudes[other];
            } else {
                next[other] = amp;
            }
        }

        self.amplitudes = next;
        Ok(())
    }

    /// Applies one circuit operation.
    pub fn apply_operation(&mut self, op: &Operation) -> Result<(), StateError> {
        match op {
            Operation::Unitary(block) => self.apply_permutation(block),
            other => self.apply(&other.to_gate()?, &other.qubits()),
        }
    }

    /// Born-rule distribution over the joint values of `measured`.
    ///
    /// Entry `v` is the probability that measured qubit `k` reads bit `k` of `v`;
    /// unmeasured qubits are summed out. Renormalized against float drift.
    pub fn probabilities(&self, measured: &[usize]) -> Result<Vec<f64>, StateError> {
        self.validate_targets(measured)?;

        let mut probs = vec![0.0; 1 << measured.len()];
        for (idx, amp) in self.amplitudes.iter().enumerate() {
            probs[extract_bits(idx, measured)] += amp.norm_sqr();
        }

        let total: f64 = probs.iter().sum();
        if total <= 0.0 {
            return Err(StateError::NotNormalized(total));
        }
        for p in &mut probs {
            *p /= total;
        }
        Ok(probs)
    }
}
