//! Statevector simulation of Shor's period-finding algorithm.
//!
//! ```no_run
//! use qshor::{Shor, ShorConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let shor = Shor::new(ShorConfig::default().with_shots(128));
//! let mut rng = ChaCha8Rng::seed_from_u64(2024);
//! let run = shor.factor(15, &mut rng).unwrap();
//! match run.nontrivial_factors() {
//!     Ok(pair) => println!("15 = {pair}"),
//!     Err(reason) => println!("retry: {reason} (outcomes {:?})", run.measured_values),
//! }
//! ```

pub mod algorithms;
pub mod config;
mod core;
pub mod executor;
mod sampler;

pub use crate::algorithms::{FactorPair, ModExpGate, Registers, Shor, ShorRun};
pub use crate::config::{ExecutorConfig, ShorConfig};
pub use crate::core::{
    BasisPermutation, Circuit, Gate, GateKind, Operation, StateVector, UnitaryBlock, errors,
    utils,
};
pub use crate::executor::{BasisTranspiler, CircuitExecutor, GateBasis, StatevectorExecutor, Transpiler};
pub use crate::sampler::{Histogram, Sampler};
