use crate::core::Gate;
use crate::core::errors::{CircuitError, GateError};
use crate::core::utils;
use ndarray::Array2;
use num_complex::Complex64;
use std::fmt;
use std::sync::Arc;

/// Largest circuit `Circuit::to_matrix` will materialize.
pub const MAX_MATRIX_QUBITS: usize = 12;

/// A unitary that maps computational basis states onto basis states.
///
/// Implementors describe the map as a function so it can be applied to a
/// state vector without ever building the `2^n × 2^n` matrix.
pub trait BasisPermutation: Send + Sync {
    /// Number of qubits the permutation acts on.
    fn num_qubits(&self) -> usize;

    /// Image of basis state `index` (local index on the block's qubits).
    fn apply_index(&self, index: usize) -> usize;

    /// Human readable label.
    fn name(&self) -> String;

    /// Full permutation table, `table[i] = apply_index(i)`.
    fn permutation(&self) -> Vec<usize> {
        (0..1usize << self.num_qubits())
            .map(|i| self.apply_index(i))
            .collect()
    }
}

/// Gate families understood by executors and transpilers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GateKind {
    H,
    X,
    Phase,
    CPhase,
    CX,
    Swap,
    /// Custom multi-qubit unitary block.
    Unitary,
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Phase => "p",
            GateKind::CPhase => "cp",
            GateKind::CX => "cx",
            GateKind::Swap => "swap",
            GateKind::Unitary => "unitary",
        };
        f.write_str(name)
    }
}

/// A custom permutation block bound to concrete qubits.
#[derive(Clone)]
pub struct UnitaryBlock {
    pub permutation: Arc<dyn BasisPermutation>,
    /// Qubit `k` of the block is placed on circuit qubit `qubits[k]`.
    pub qubits: Vec<usize>,
    /// Apply the inverse map instead of the forward one.
    pub adjoint: bool,
}

impl fmt::Debug for UnitaryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitaryBlock")
            .field("name", &self.permutation.name())
            .field("qubits", &self.qubits)
            .field("adjoint", &self.adjoint)
            .finish()
    }
}

impl UnitaryBlock {
    /// Dense matrix of the block on its own qubits.
    pub fn to_gate(&self) -> Result<Gate, GateError> {
        let gate = Gate::from_permutation(&self.permutation.permutation())?;
        Ok(if self.adjoint { gate.adjoint() } else { gate })
    }
}

/// One gate application inside a circuit.
#[derive(Clone, Debug)]
pub enum Operation {
    H(usize),
    X(usize),
    Phase { qubit: usize, theta: f64 },
    CPhase { control: usize, target: usize, theta: f64 },
    CX { control: usize, target: usize },
    Swap(usize, usize),
    Unitary(UnitaryBlock),
}

impl Operation {
    pub fn kind(&self) -> GateKind {
        match self {
            Operation::H(_) => GateKind::H,
            Operation::X(_) => GateKind::X,
            Operation::Phase { .. } => GateKind::Phase,
            Operation::CPhase { .. } => GateKind::CPhase,
            Operation::CX { .. } => GateKind::CX,
            Operation::Swap(..) => GateKind::Swap,
            Operation::Unitary(_) => GateKind::Unitary,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Operation::Unitary(block) if block.adjoint => {
                format!("{}_dg", block.permutation.name())
            }
            Operation::Unitary(block) => block.permutation.name(),
            other => other.kind().to_string(),
        }
    }

    /// Qubits in the order the local gate matrix indexes them.
    pub fn qubits(&self) -> Vec<usize> {
        match self {
            Operation::H(q) | Operation::X(q) | Operation::Phase { qubit: q, .. } => vec![*q],
            Operation::CPhase {
                control, target, ..
            }
            | Operation::CX { control, target } => vec![*control, *target],
            Operation::Swap(a, b) => vec![*a, *b],
            Operation::Unitary(block) => block.qubits.clone(),
        }
    }

    /// The inverse operation.
    pub fn adjoint(&self) -> Operation {
        match self {
            Operation::Phase { qubit, theta } => Operation::Phase {
                qubit: *qubit,
                theta: -theta,
            },
            Operation::CPhase {
                control,
                target,
                theta,
            } => Operation::CPhase {
                control: *control,
                target: *target,
                theta: -theta,
            },
            Operation::Unitary(block) => Operation::Unitary(UnitaryBlock {
                adjoint: !block.adjoint,
                ..block.clone()
            }),
            // Self-inverse gates
            other => other.clone(),
        }
    }

    /// Rewrites every qubit index through `map`.
    pub fn relabel(&self, map: impl Fn(usize) -> usize) -> Operation {
        match self {
            Operation::H(q) => Operation::H(map(*q)),
            Operation::X(q) => Operation::X(map(*q)),
            Operation::Phase { qubit, theta } => Operation::Phase {
                qubit: map(*qubit),
                theta: *theta,
            },
            Operation::CPhase {
                control,
                target,
                theta,
            } => Operation::CPhase {
                control: map(*control),
                target: map(*target),
                theta: *theta,
            },
            Operation::CX { control, target } => Operation::CX {
                control: map(*control),
                target: map(*target),
            },
            Operation::Swap(a, b) => Operation::Swap(map(*a), map(*b)),
            Operation::Unitary(block) => Operation::Unitary(UnitaryBlock {
                qubits: block.qubits.iter().map(|&q| map(q)).collect(),
                ..block.clone()
            }),
        }
    }

    /// Local matrix of the operation on `self.qubits()`.
    pub fn to_gate(&self) -> Result<Gate, GateError> {
        Ok(match self {
            Operation::H(_) => Gate::h(),
            Operation::X(_) => Gate::x(),
            Operation::Phase { theta, .. } => Gate::phase(*theta),
            Operation::CPhase { theta, .. } => Gate::cphase(*theta),
            Operation::CX { .. } => Gate::cnot(),
            Operation::Swap(..) => Gate::swap(),
            Operation::Unitary(block) => block.to_gate()?,
        })
    }

    fn arity(&self) -> Option<usize> {
        match self {
            Operation::Unitary(block) => Some(block.permutation.num_qubits()),
            _ => None,
        }
    }
}

/// An ordered list of operations on a fixed number of qubits, plus the qubits
/// read out at the end.
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    num_qubits: usize,
    name: String,
    operations: Vec<Operation>,
    measured: Vec<usize>,
}

impl Circuit {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            name: String::from("circuit"),
            operations: Vec::new(),
            measured: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn measured(&self) -> &[usize] {
        &self.measured
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn validate(&self, op: &Operation) -> Result<(), CircuitError> {
        let qubits = op.qubits();
        for &q in &qubits {
            if q >= self.num_qubits {
                return Err(CircuitError::IndexOutOfBounds {
                    index: q,
                    num_qubits: self.num_qubits,
                });
            }
        }
        if let Some(dup) = utils::find_duplicate(&qubits) {
            return Err(GateError::DuplicateQubit(dup).into());
        }
        if let Some(expected) = op.arity() {
            if expected != qubits.len() {
                return Err(CircuitError::ArityMismatch {
                    name: op.name(),
                    expected,
                    got: qubits.len(),
                });
            }
        }
        Ok(())
    }

    /// Appends an operation after checking its qubit indices.
    pub fn push(&mut self, op: Operation) -> Result<&mut Self, CircuitError> {
        self.validate(&op)?;
        self.operations.push(op);
        Ok(self)
    }

    pub fn h(&mut self, qubit: usize) -> Result<&mut Self, CircuitError> {
        self.push(Operation::H(qubit))
    }

    pub fn x(&mut self, qubit: usize) -> Result<&mut Self, CircuitError> {
        self.push(Operation::X(qubit))
    }

    pub fn phase(&mut self, qubit: usize, theta: f64) -> Result<&mut Self, CircuitError> {
        self.push(Operation::Phase { qubit, theta })
    }

    pub fn cphase(
        &mut self,
        control: usize,
        target: usize,
        theta: f64,
    ) -> Result<&mut Self, CircuitError> {
        self.push(Operation::CPhase {
            control,
            target,
            theta,
        })
    }

    pub fn cx(&mut self, control: usize, target: usize) -> Result<&mut Self, CircuitError> {
        self.push(Operation::CX { control, target })
    }

    pub fn swap(&mut self, a: usize, b: usize) -> Result<&mut Self, CircuitError> {
        self.push(Operation::Swap(a, b))
    }

    /// Appends a permutation block on `qubits`.
    pub fn unitary(
        &mut self,
        permutation: Arc<dyn BasisPermutation>,
        qubits: &[usize],
    ) -> Result<&mut Self, CircuitError> {
        self.push(Operation::Unitary(UnitaryBlock {
            permutation,
            qubits: qubits.to_vec(),
            adjoint: false,
        }))
    }

    /// Appends every operation of `other`, shifting its qubit `k` to `offset + k`.
    pub fn append_on(&mut self, other: &Circuit, offset: usize) -> Result<&mut Self, CircuitError> {
        if offset + other.num_qubits > self.num_qubits {
            return Err(CircuitError::PlacementOutOfRange {
                inner: other.num_qubits,
                offset,
                outer: self.num_qubits,
            });
        }
        for op in &other.operations {
            self.push(op.relabel(|q| q + offset))?;
        }
        Ok(self)
    }

    /// Marks qubits for readout; bit `k` of an outcome is `qubits[k]`.
    pub fn measure(&mut self, qubits: &[usize]) -> Result<&mut Self, CircuitError> {
        for &q in qubits {
            if q >= self.num_qubits {
                return Err(CircuitError::IndexOutOfBounds {
                    index: q,
                    num_qubits: self.num_qubits,
                });
            }
        }
        if let Some(dup) = utils::find_duplicate(qubits) {
            return Err(GateError::DuplicateQubit(dup).into());
        }
        self.measured = qubits.to_vec();
        Ok(self)
    }

    /// Exact inverse: adjoint of every operation, in reverse order.
    ///
    /// Measurements are dropped.
    pub fn inverse(&self) -> Circuit {
        Circuit {
            num_qubits: self.num_qubits,
            name: format!("{}_dg", self.name),
            operations: self.operations.iter().rev().map(Operation::adjoint).collect(),
            measured: Vec::new(),
        }
    }

    /// Same register and readout with a replacement operation list.
    pub(crate) fn with_operations(&self, operations: Vec<Operation>) -> Circuit {
        Circuit {
            num_qubits: self.num_qubits,
            name: self.name.clone(),
            operations,
            measured: self.measured.clone(),
        }
    }

    /// Product of all step unitaries, later operations on the left.
    pub fn to_matrix(&self) -> Result<Array2<Complex64>, CircuitError> {
        if self.num_qubits > MAX_MATRIX_QUBITS {
            return Err(CircuitError::TooLargeToMaterialize(self.num_qubits));
        }
        let dim = 1 << self.num_qubits;
        let mut total = Array2::<Complex64>::eye(dim);
        for op in &self.operations {
            let local = op.to_gate()?;
            let full = Gate::expand_gate(self.num_qubits, &local, &op.qubits(), &[])?;
            total = full.matrix.dot(&total);
        }
        Ok(total)
    }
}
