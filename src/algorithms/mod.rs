//! Shor's factoring pipeline.
//!
//! - **modexp**: the modular-exponentiation permutation.
//! - **qft**: quantum Fourier transform and its inverse.
//! - **period**: continued-fraction period recovery.
//! - **factors**: gcd reduction from a period to a factor pair.
//! - **shor**: the orchestrator tying them together.

pub mod factors;
pub mod modexp;
pub mod period;
pub mod qft;
pub mod shor;

pub use factors::{FactorPair, extract_factors};
pub use modexp::ModExpGate;
pub use period::{PeriodCandidate, Ratio, extract_period};
pub use qft::{inverse_qft, qft};
pub use shor::{Registers, Shor, ShorRun};
