//! Execution backends.
//!
//! A backend takes a circuit, the gate basis it must be lowered to and a shot
//! count, and returns the outcome histogram of the measured qubits. How the
//! circuit is simulated is the backend's business; the factoring pipeline only
//! relies on the Born-rule contract.

use crate::config::ExecutorConfig;
use crate::core::errors::ExecutionError;
use crate::core::{Circuit, GateKind, Operation, StateVector};
use crate::sampler::{Histogram, Sampler};
use rand::RngCore;
use std::collections::BTreeSet;
use std::f64::consts::PI;
use tracing::debug;

/// The set of gate families a backend accepts natively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateBasis(BTreeSet<GateKind>);

impl GateBasis {
    pub fn new(kinds: impl IntoIterator<Item = GateKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    /// Basis of the built-in statevector backend: single-qubit H and phase,
    /// CX, and custom unitary blocks applied directly.
    pub fn statevector() -> Self {
        Self::new([GateKind::H, GateKind::X, GateKind::Phase, GateKind::CX, GateKind::Unitary])
    }

    pub fn contains(&self, kind: GateKind) -> bool {
        self.0.contains(&kind)
    }
}

/// Lowers operations to a gate basis.
///
/// Implementations rewrite one operation at a time into an equivalent
/// sequence (up to global phase). They do not synthesize arbitrary unitaries.
pub trait Transpiler {
    /// One rewriting step for an operation outside the basis, or `None` if the
    /// transpiler knows no rule for it.
    fn decompose(&self, op: &Operation, basis: &GateBasis) -> Option<Vec<Operation>>;

    /// Lowers a whole circuit; every resulting operation is in `basis`.
    fn transpile(&self, circuit: &Circuit, basis: &GateBasis) -> Result<Circuit, ExecutionError> {
        let mut lowered = Vec::with_capacity(circuit.len());
        for op in circuit.operations() {
            self.lower(op, basis, &mut lowered)?;
        }
        debug!(
            circuit = circuit.name(),
            before = circuit.len(),
            after = lowered.len(),
            "transpiled circuit"
        );
        Ok(circuit.with_operations(lowered))
    }

    #[doc(hidden)]
    fn lower(
        &self,
        op: &Operation,
        basis: &GateBasis,
        out: &mut Vec<Operation>,
    ) -> Result<(), ExecutionError> {
        if basis.contains(op.kind()) {
            out.push(op.clone());
            return Ok(());
        }
        let steps = self
            .decompose(op, basis)
            .ok_or_else(|| ExecutionError::UnsupportedOperation(op.name()))?;
        for step in &steps {
            self.lower(step, basis, out)?;
        }
        Ok(())
    }
}

/// Textbook rewrite rules for the gates used by the factoring circuit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasisTranspiler;

impl Transpiler for BasisTranspiler {
    fn decompose(&self, op: &Operation, basis: &GateBasis) -> Option<Vec<Operation>> {
        match *op {
            Operation::Swap(a, b) => Some(vec![
                Operation::CX { control: a, target: b },
                Operation::CX { control: b, target: a },
                Operation::CX { control: a, target: b },
            ]),
            Operation::CPhase {
                control,
                target,
                theta,
            } => Some(vec![
                Operation::Phase {
                    qubit: control,
                    theta: theta / 2.0,
                },
                Operation::CX { control, target },
                Operation::Phase {
                    qubit: target,
                    theta: -theta / 2.0,
                },
                Operation::CX { control, target },
                Operation::Phase {
                    qubit: target,
                    theta: theta / 2.0,
                },
            ]),
            // X = H Z H with Z = P(π)
            Operation::X(q) if basis.contains(GateKind::H) => Some(vec![
                Operation::H(q),
                Operation::Phase { qubit: q, theta: PI },
                Operation::H(q),
            ]),
            _ => None,
        }
    }
}

/// A backend that turns a circuit into an outcome histogram.
pub trait CircuitExecutor {
    /// Lowers `circuit` to `basis`, runs it `shots` times and counts the
    /// values read from its measured qubits.
    fn execute(
        &self,
        circuit: &Circuit,
        basis: &GateBasis,
        shots: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Histogram, ExecutionError>;

    /// The basis this backend prefers to receive.
    fn native_basis(&self) -> GateBasis;
}

/// Dense statevector simulation followed by Born-rule sampling.
#[derive(Debug, Clone, Default)]
pub struct StatevectorExecutor {
    config: ExecutorConfig,
    transpiler: BasisTranspiler,
}

impl StatevectorExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            transpiler: BasisTranspiler,
        }
    }

    /// Final state of the circuit, after lowering to `basis`.
    pub fn simulate(&self, circuit: &Circuit, basis: &GateBasis) -> Result<StateVector, ExecutionError> {
        if circuit.num_qubits() > self.config.max_qubits {
            return Err(ExecutionError::TooManyQubits {
                required: circuit.num_qubits(),
                limit: self.config.max_qubits,
            });
        }
        let lowered = self.transpiler.transpile(circuit, basis)?;

        let mut state = StateVector::new(lowered.num_qubits());
        for op in lowered.operations() {
            state.apply_operation(op)?;
        }
        Ok(state)
    }
}

impl CircuitExecutor for StatevectorExecutor {
    fn execute(
        &self,
        circuit: &Circuit,
        basis: &GateBasis,
        shots: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Histogram, ExecutionError> {
        if shots == 0 {
            return Err(ExecutionError::NoShots);
        }
        if circuit.measured().is_empty() {
            return Err(ExecutionError::NothingMeasured);
        }

        let state = self.simulate(circuit, basis)?;
        let probs = state.probabilities(circuit.measured())?;
        let sampler = Sampler::new(&probs, circuit.measured().len());

        let histogram = if self.config.parallel {
            sampler.run_parallel(shots, rayon::current_num_threads(), rng)
        } else {
            sampler.run(shots, rng)
        };
        debug!(
            shots,
            distinct = histogram.outcomes().len(),
            parallel = self.config.parallel,
            "sampled measured register"
        );
        Ok(histogram)
    }

    fn native_basis(&self) -> GateBasis {
        GateBasis::statevector()
    }
}
