//! Run configuration for the factoring pipeline.

/// Shot count used by the reference pipeline.
pub const DEFAULT_SHOTS: usize = 128;

/// Dense state vectors above this size are refused (2^20 amplitudes = 16 MiB).
pub const DEFAULT_MAX_QUBITS: usize = 20;

pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Settings of one `Shor` instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShorConfig {
    /// Shots per attempt.
    pub shots: usize,
    /// Largest circuit the executor will simulate.
    pub max_qubits: usize,
    /// Sample shots on the rayon pool.
    pub parallel: bool,
    /// Attempt budget for `Shor::factor_until`.
    pub max_attempts: usize,
}

impl Default for ShorConfig {
    fn default() -> Self {
        Self {
            shots: DEFAULT_SHOTS,
            max_qubits: DEFAULT_MAX_QUBITS,
            parallel: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ShorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = shots;
        self
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Executor settings implied by this configuration.
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_qubits: self.max_qubits,
            parallel: self.parallel,
        }
    }
}

/// Settings of the built-in statevector executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub max_qubits: usize,
    pub parallel: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ShorConfig::default().executor_config()
    }
}
