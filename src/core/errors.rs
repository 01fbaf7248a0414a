use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("Matrix is not Unitary (U†U != I)")]
    NonUnitary,

    #[error("Matrix must be square")]
    NotSquareMatrix,

    #[error("Invalid Dimensions")]
    InvalidDimensions,

    #[error("Qubit {0} cannot be both control and target")]
    ControlTargetOverlap(usize),

    #[error("Duplicate qubit index found: {0}")]
    DuplicateQubit(usize),

    #[error("Permutation table is not a bijection (index {0})")]
    NotAPermutation(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Vector is not normalized. Norm squared: {0}")]
    NotNormalized(f64),

    #[error("Invalid dimensions")]
    InvalidDimensions,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Qubit index {index} out of bounds for {num_qubits} qubits")]
    IndexOutOfBounds { index: usize, num_qubits: usize },

    #[error("Basis state {value} does not fit in {width} qubits")]
    BasisStateOutOfRange { value: usize, width: usize },

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CircuitError {
    #[error("Qubit {index} out of bounds for a {num_qubits}-qubit circuit")]
    IndexOutOfBounds { index: usize, num_qubits: usize },

    #[error("Operation '{name}' acts on {expected} qubits but {got} were given")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Sub-circuit of {inner} qubits does not fit at offset {offset} of {outer}")]
    PlacementOutOfRange {
        inner: usize,
        offset: usize,
        outer: usize,
    },

    #[error("Circuit has {0} qubits, too many to materialize as a matrix")]
    TooLargeToMaterialize(usize),

    #[error("Gate error: {0}")]
    GateError(#[from] GateError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Shot count must be positive")]
    NoShots,

    #[error("Circuit has no measured qubits")]
    NothingMeasured,

    #[error("Circuit needs {required} qubits, executor limit is {limit}")]
    TooManyQubits { required: usize, limit: usize },

    #[error("Operation '{0}' is not in the gate basis and cannot be decomposed")]
    UnsupportedOperation(String),

    #[error("Circuit error: {0}")]
    CircuitError(#[from] CircuitError),

    #[error("State error: {0}")]
    StateError(#[from] StateError),
}

/// Hard failures of a factoring attempt: bad inputs or a broken backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShorError {
    #[error("Modulus {0} is too small to factor")]
    InvalidModulus(u64),

    #[error("Base {base} is not coprime to {modulus}")]
    InvalidBase { base: u64, modulus: u64 },

    #[error("Modulus {modulus} does not fit in a {width}-qubit target register")]
    RegisterTooNarrow { modulus: u64, width: usize },

    #[error("Execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("Circuit error: {0}")]
    CircuitError(#[from] CircuitError),
}

/// Expected probabilistic outcomes of the classical reduction.
///
/// These are returned inside a completed run together with the histogram,
/// never as an `Err`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    #[error("No measured value produced a valid period")]
    NoPeriodFound,

    #[error("Period {period} is odd or does not satisfy a^r = 1 mod N")]
    InvalidPeriod { period: u64 },

    #[error("Factors {0} and {1} are trivial")]
    TrivialFactors(u64, u64),
}
