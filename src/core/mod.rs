pub mod circuit;
pub mod errors;
mod gates;
mod state;
pub mod utils;

pub use circuit::{BasisPermutation, Circuit, GateKind, Operation, UnitaryBlock};
pub use gates::Gate;
pub use state::StateVector;
