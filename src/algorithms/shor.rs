//! End-to-end factoring attempt.
//!
//! One call builds the period-finding circuit for a random base, executes it
//! once, and runs the classical reduction. Failures of the reduction are
//! ordinary results; the caller decides whether to try again.

use crate::algorithms::factors::{FactorPair, extract_factors};
use crate::algorithms::modexp::ModExpGate;
use crate::algorithms::period::extract_period;
use crate::algorithms::qft::inverse_qft;
use crate::config::ShorConfig;
use crate::core::Circuit;
use crate::core::errors::{AttemptFailure, ExecutionError, ShorError};
use crate::core::utils::{ceil_log2, gcd};
use crate::executor::{CircuitExecutor, StatevectorExecutor};
use crate::sampler::Histogram;
use rand::{Rng, RngCore};
use std::sync::Arc;
use tracing::{info, warn};

/// Register widths of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Qubits `0..n_exponent` hold the exponent `x`.
    pub n_exponent: usize,
    /// Qubits `n_exponent..total()` hold `a^x mod N`.
    pub n_target: usize,
}

impl Registers {
    /// `n_target = ceil(log2 N)` and `n_exponent = 2·n_target`.
    pub fn for_modulus(modulus: u64) -> Self {
        let n_target = ceil_log2(modulus);
        Self {
            n_exponent: 2 * n_target,
            n_target,
        }
    }

    pub fn total(&self) -> usize {
        self.n_exponent + self.n_target
    }

    pub fn exponent_qubits(&self) -> Vec<usize> {
        (0..self.n_exponent).collect()
    }
}

/// Everything one attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ShorRun {
    pub modulus: u64,
    pub base: u64,
    pub registers: Registers,
    /// Raw outcome counts of the exponent register.
    pub histogram: Histogram,
    /// Distinct measured values, ascending.
    pub measured_values: Vec<u64>,
    pub period: Option<u64>,
    /// Factor pair, or why the classical reduction gave up. The pair is not
    /// checked for triviality.
    pub outcome: Result<FactorPair, AttemptFailure>,
}

impl ShorRun {
    pub fn factors(&self) -> Option<FactorPair> {
        self.outcome.ok()
    }

    /// The pair, only when it actually splits the modulus.
    pub fn nontrivial_factors(&self) -> Result<FactorPair, AttemptFailure> {
        self.outcome.and_then(|pair| pair.nontrivial(self.modulus))
    }
}

/// Factoring driver over a pluggable executor.
#[derive(Debug, Clone)]
pub struct Shor<E = StatevectorExecutor> {
    config: ShorConfig,
    executor: E,
}

impl Default for Shor<StatevectorExecutor> {
    fn default() -> Self {
        Self::new(ShorConfig::default())
    }
}

impl Shor<StatevectorExecutor> {
    pub fn new(config: ShorConfig) -> Self {
        let executor = StatevectorExecutor::new(config.executor_config());
        Self { config, executor }
    }
}

impl<E: CircuitExecutor> Shor<E> {
    pub fn with_executor(config: ShorConfig, executor: E) -> Self {
        Self { config, executor }
    }

    /// Uniform base in `[2, N)` coprime to `N`, by rejection.
    pub fn choose_base(modulus: u64, rng: &mut dyn RngCore) -> Result<u64, ShorError> {
        if modulus < 3 {
            return Err(ShorError::InvalidModulus(modulus));
        }
        // N - 1 is always coprime, so this terminates
        loop {
            let a = rng.random_range(2..modulus);
            if gcd(a, modulus) == 1 {
                return Ok(a);
            }
        }
    }

    /// Period-finding circuit for base `a`:
    /// target := |1⟩, H on the exponent register, modular exponentiation,
    /// inverse QFT on the exponent register, measure the exponent register.
    pub fn build_circuit(base: u64, modulus: u64) -> Result<Circuit, ShorError> {
        let registers = Registers::for_modulus(modulus);
        let gate = ModExpGate::new(base, modulus, registers.n_exponent, registers.n_target)?;
        let exponent = registers.exponent_qubits();
        let all: Vec<usize> = (0..registers.total()).collect();

        let mut circuit = Circuit::new(registers.total()).with_name(format!("shor_{modulus}"));
        // Target register starts at the integer 1: its lowest qubit set
        circuit.x(registers.n_exponent)?;
        for &q in &exponent {
            circuit.h(q)?;
        }
        circuit.unitary(Arc::new(gate), &all)?;
        circuit.append_on(&inverse_qft(registers.n_exponent)?, 0)?;
        circuit.measure(&exponent)?;
        Ok(circuit)
    }

    /// One attempt with a freshly drawn base.
    pub fn factor(&self, modulus: u64, rng: &mut dyn RngCore) -> Result<ShorRun, ShorError> {
        let base = Self::choose_base(modulus, rng)?;
        self.factor_with_base(modulus, base, rng)
    }

    /// One attempt with a caller-chosen base.
    pub fn factor_with_base(
        &self,
        modulus: u64,
        base: u64,
        rng: &mut dyn RngCore,
    ) -> Result<ShorRun, ShorError> {
        if modulus < 3 {
            return Err(ShorError::InvalidModulus(modulus));
        }
        if self.config.shots == 0 {
            return Err(ExecutionError::NoShots.into());
        }
        let registers = Registers::for_modulus(modulus);
        info!(
            modulus,
            base,
            n_exponent = registers.n_exponent,
            n_target = registers.n_target,
            "starting factoring attempt"
        );
        if registers.total() > self.config.max_qubits {
            return Err(ExecutionError::TooManyQubits {
                required: registers.total(),
                limit: self.config.max_qubits,
            }
            .into());
        }

        let circuit = Self::build_circuit(base, modulus)?;
        let histogram = self.executor.execute(
            &circuit,
            &self.executor.native_basis(),
            self.config.shots,
            rng,
        )?;
        let measured_values = histogram.outcomes();

        let period = extract_period(&measured_values, registers.n_exponent, base, modulus).ok();
        info!(?period, "estimated period");

        let outcome = extract_factors(period, base, modulus);
        match &outcome {
            Ok(pair) => info!(first = pair.first, second = pair.second, "found factor candidates"),
            Err(reason) => warn!(%reason, "attempt produced no factors"),
        }

        Ok(ShorRun {
            modulus,
            base,
            registers,
            histogram,
            measured_values,
            period,
            outcome,
        })
    }

    /// Repeats `factor` with fresh bases until a non-trivial pair appears or
    /// `max_attempts` runs out. Runs are returned in order; the last one
    /// carries the final verdict.
    pub fn factor_until(&self, modulus: u64, rng: &mut dyn RngCore) -> Result<Vec<ShorRun>, ShorError> {
        let mut runs = Vec::new();
        for attempt in 1..=self.config.max_attempts {
            let run = self.factor(modulus, rng)?;
            let done = run.nontrivial_factors().is_ok();
            if !done {
                warn!(attempt, base = run.base, "retrying with a new base");
            }
            runs.push(run);
            if done {
                break;
            }
        }
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_register_sizing() {
        assert_eq!(
            Registers::for_modulus(15),
            Registers {
                n_exponent: 8,
                n_target: 4
            }
        );
        assert_eq!(Registers::for_modulus(21).total(), 15);
    }

    #[test]
    fn test_choose_base_is_coprime_and_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let a = Shor::<StatevectorExecutor>::choose_base(21, &mut rng).unwrap();
            assert!((2..21).contains(&a));
            assert_eq!(gcd(a, 21), 1);
        }
        assert_eq!(
            Shor::<StatevectorExecutor>::choose_base(2, &mut rng),
            Err(ShorError::InvalidModulus(2))
        );
    }

    #[test]
    fn test_circuit_layout() {
        let circuit = Shor::<StatevectorExecutor>::build_circuit(7, 15).unwrap();
        assert_eq!(circuit.num_qubits(), 12);
        assert_eq!(circuit.measured(), (0..8).collect::<Vec<_>>().as_slice());
        // x + 8 h + modexp + inverse qft (8 h, 28 cp, 4 swaps)
        assert_eq!(circuit.len(), 1 + 8 + 1 + 8 + 28 + 4);
    }

    #[test]
    fn test_non_coprime_base_rejected() {
        let shor = Shor::new(ShorConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            shor.factor_with_base(15, 5, &mut rng),
            Err(ShorError::InvalidBase {
                base: 5,
                modulus: 15
            })
        );
    }

    #[test]
    fn test_base_seven_mod_15_outcomes_are_multiples_of_64() {
        let shor = Shor::new(ShorConfig::default().with_shots(256));
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let run = shor.factor_with_base(15, 7, &mut rng).unwrap();
        assert_eq!(run.histogram.total(), 256);
        assert!(run.measured_values.iter().all(|m| m % 64 == 0));
        assert_eq!(run.period, Some(4));
        assert_eq!(run.factors().map(|p| p.sorted()), Some((3, 5)));
    }

    #[test]
    fn test_wide_modulus_refused_before_building() {
        let shor = Shor::new(ShorConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // 41 target + 82 exponent qubits
        assert_eq!(
            shor.factor_with_base((1 << 40) + 1, 2, &mut rng),
            Err(ShorError::ExecutionError(ExecutionError::TooManyQubits {
                required: 123,
                limit: 20
            }))
        );
    }

    #[test]
    fn test_zero_shots_is_an_error() {
        let shor = Shor::new(ShorConfig::default().with_shots(0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            shor.factor_with_base(15, 2, &mut rng),
            Err(ShorError::ExecutionError(ExecutionError::NoShots))
        );
    }
}
