use crate::core::errors::GateError;
use crate::core::utils;
use ndarray::{Array2, arr2};
use num_complex::Complex64;

/// Represents a quantum gate.
///
/// A gate is defined by its unitary matrix and the number of qubits it acts on.
/// Local basis index bit `k` corresponds to the `k`-th qubit the gate is bound to.
#[derive(Clone, Debug, PartialEq)]
pub struct Gate {
    /// The unitary matrix of the gate.
    pub matrix: Array2<Complex64>,
    /// The number of qubits the gate acts on.
    pub num_qubits: usize,
}

impl Gate {
    /// Creates a new `Gate` from a unitary matrix.
    ///
    /// # Errors
    ///
    /// Returns a `GateError` if:
    /// - The matrix is not square.
    /// - The matrix dimensions are not a power of 2.
    /// - The matrix is not unitary.
    pub fn new(matrix: Array2<Complex64>) -> Result<Self, GateError> {
        let (rows, cols) = matrix.dim();

        if rows != cols {
            return Err(GateError::NotSquareMatrix);
        }

        if !rows.is_power_of_two() {
            return Err(GateError::InvalidDimensions);
        }

        if !Self::check_unitary(&matrix) {
            return Err(GateError::NonUnitary);
        }

        let num_qubits = rows.trailing_zeros() as usize;

        Ok(Self { matrix, num_qubits })
    }

    /// Builds the gate of a basis-state permutation: column `i` has its unit
    /// entry in row `table[i]`.
    pub fn from_permutation(table: &[usize]) -> Result<Self, GateError> {
        let dim = table.len();
        if !dim.is_power_of_two() {
            return Err(GateError::InvalidDimensions);
        }

        let mut matrix = Array2::<Complex64>::zeros((dim, dim));
        for (col, &row) in table.iter().enumerate() {
            if row >= dim || matrix.row(row).iter().any(|c| c.norm_sqr() > 0.0) {
                return Err(GateError::NotAPermutation(col));
            }
            matrix[[row, col]] = Complex64::new(1.0, 0.0);
        }

        Ok(Self {
            matrix,
            num_qubits: dim.trailing_zeros() as usize,
        })
    }

    /// Checks if a given matrix is unitary
    fn check_unitary(matrix: &Array2<Complex64>) -> bool {
        let product = matrix.dot(&utils::adjoint(matrix));
        utils::is_identity(&product, 1e-6)
    }

    /// The conjugate transpose of this gate.
    pub fn adjoint(&self) -> Gate {
        Gate {
            matrix: utils::adjoint(&self.matrix),
            num_qubits: self.num_qubits,
        }
    }

    /// Expands a gate to act on a larger system of qubits.
    ///
    /// This function creates a new gate that acts on `num_total_qubits` by applying the original `gate`
    /// to the specified `targets` and `controls` (if any), and Identity on the rest.
    ///
    /// # Errors
    ///
    /// Returns `GateError` if:
    /// - Duplicate indices are found in `targets` or `controls`.
    /// - A qubit is used as both control and target.
    pub fn expand_gate(
        num_total_qubits: usize,
        gate: &Gate,
        targets: &[usize],
        controls: &[usize],
    ) -> Result<Gate, GateError> {
        if targets.len() != gate.num_qubits {
            return Err(GateError::InvalidDimensions);
        }

        if let Some(dup) = utils::find_duplicate(targets) {
            return Err(GateError::DuplicateQubit(dup));
        }

        if let Some(dup) = utils::find_duplicate(controls) {
            return Err(GateError::DuplicateQubit(dup));
        }

        for &c in controls {
            if targets.contains(&c) {
                return Err(GateError::ControlTargetOverlap(c));
            }
        }

        Ok(Gate {
            matrix: utils::expand_operator(num_total_qubits, &gate.matrix, targets, controls),
            num_qubits: num_total_qubits,
        })
    }

    // --- Standard Gates ---

    /// Creates a Pauli-X gate (NOT gate).
    pub fn x() -> Gate {
        Gate::new(arr2(&[
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        ]))
        .unwrap()
    }

    /// Creates a Hadamard gate.
    pub fn h() -> Gate {
        let factor = 1.0 / 2.0_f64.sqrt();
        Gate::new(arr2(&[
            [Complex64::new(factor, 0.0), Complex64::new(factor, 0.0)],
            [Complex64::new(factor, 0.0), Complex64::new(-factor, 0.0)],
        ]))
        .unwrap()
    }

    /// Creates a phase gate `P(θ) = diag(1, e^{iθ})`.
    pub fn phase(theta: f64) -> Gate {
        Gate::new(arr2(&[
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::from_polar(1.0, theta)],
        ]))
        .unwrap()
    }

    /// Creates a controlled phase gate `diag(1, 1, 1, e^{iθ})`.
    ///
    /// The gate is symmetric in its two qubits.
    pub fn cphase(theta: f64) -> Gate {
        Gate::expand_gate(2, &Gate::phase(theta), &[1], &[0]).unwrap()
    }

    /// Creates a CNOT (Controlled-NOT) gate, control on local qubit 0.
    pub fn cnot() -> Gate {
        Gate::expand_gate(2, &Gate::x(), &[1], &[0]).unwrap()
    }

    /// Creates a SWAP gate.
    pub fn swap() -> Gate {
        Gate::from_permutation(&[0, 2, 1, 3]).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gates_are_unitary() {
        for gate in [
            Gate::x(),
            Gate::h(),
            Gate::phase(PI / 4.0),
            Gate::cphase(0.3),
            Gate::cnot(),
            Gate::swap(),
        ] {
            assert!(Gate::new(gate.matrix.clone()).is_ok());
        }
    }

    #[test]
    fn test_non_unitary_rejected() {
        let m = arr2(&[
            [Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        ]);
        assert_eq!(Gate::new(m), Err(GateError::NonUnitary));
    }

    #[test]
    fn test_from_permutation_rejects_collisions() {
        assert_eq!(
            Gate::from_permutation(&[0, 0, 1, 3]),
            Err(GateError::NotAPermutation(1))
        );
        assert_eq!(
            Gate::from_permutation(&[0, 1, 2]),
            Err(GateError::InvalidDimensions)
        );
    }

    #[test]
    fn test_phase_adjoint_negates_angle() {
        let theta = 0.7;
        let adj = Gate::cphase(theta).adjoint();
        let expected = Gate::cphase(-theta);
        for (a, b) in adj.matrix.iter().zip(expected.matrix.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_cnot_flips_target_when_control_set() {
        let cx = Gate::cnot();
        // |control=1, target=0> is index 1, maps to index 3
        assert_eq!(cx.matrix[[3, 1]], Complex64::new(1.0, 0.0));
        assert_eq!(cx.matrix[[0, 0]], Complex64::new(1.0, 0.0));
    }
}
