//! Quantum Fourier transform circuits.

use crate::core::Circuit;
use crate::core::errors::CircuitError;
use std::f64::consts::PI;

/// QFT on `n` qubits: `|x⟩ → 2^{-n/2} Σ_k e^{2πi·xk/2^n} |k⟩`.
///
/// Layers run from the highest qubit down: Hadamard on `i`, then controlled
/// phases `π / 2^(i−j)` from every lower qubit `j`. A final row of swaps
/// restores qubit order.
pub fn qft(n: usize) -> Result<Circuit, CircuitError> {
    let mut circuit = Circuit::new(n).with_name("qft");

    for i in (0..n).rev() {
        circuit.h(i)?;
        for j in (0..i).rev() {
            let theta = PI / 2f64.powi((i - j) as i32);
            circuit.cphase(j, i, theta)?;
        }
    }

    for i in 0..n / 2 {
        circuit.swap(i, n - 1 - i)?;
    }

    Ok(circuit)
}

/// Exact adjoint of [`qft`]: reversed order, negated angles.
pub fn inverse_qft(n: usize) -> Result<Circuit, CircuitError> {
    Ok(qft(n)?.inverse().with_name("iqft"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Operation, StateVector};
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;
    use num_complex::Complex64;
    use proptest::prelude::*;

    fn run(circuit: &Circuit, state: &mut StateVector) {
        for op in circuit.operations() {
            state.apply_operation(op).unwrap();
        }
    }

    fn normalized(raw: Vec<(f64, f64)>) -> StateVector {
        let v: Vec<Complex64> = raw.into_iter().map(|(re, im)| Complex64::new(re, im)).collect();
        let norm = v.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        StateVector::from_state_vector(Array1::from(v).mapv(|c| c / norm)).unwrap()
    }

    #[test]
    fn test_qft_of_basis_state_has_linear_phases() {
        let n = 3;
        let mut state = StateVector::basis_state(n, 1).unwrap();
        run(&qft(n).unwrap(), &mut state);

        let amp = 1.0 / (8.0_f64).sqrt();
        for k in 0..8 {
            let expected = Complex64::from_polar(amp, 2.0 * PI * k as f64 / 8.0);
            assert_abs_diff_eq!((state.amplitudes[k] - expected).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_periodic_input_concentrates_on_multiples() {
        // Amplitude 1/2 on 0, 4, 8, 12
        let mut raw = vec![(0.0, 0.0); 16];
        for idx in [0, 4, 8, 12] {
            raw[idx] = (0.5, 0.0);
        }
        let mut state = normalized(raw);
        run(&qft(4).unwrap(), &mut state);
        let probs = state.probabilities(&[0, 1, 2, 3]).unwrap();
        for k in [0, 4, 8, 12] {
            assert_abs_diff_eq!(probs[k], 0.25, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inverse_reverses_gate_order_and_angles() {
        let forward = qft(3).unwrap();
        let inverse = inverse_qft(3).unwrap();
        assert_eq!(forward.len(), inverse.len());
        assert!(matches!(inverse.operations()[0], Operation::Swap(0, 2)));
        match (&forward.operations()[1], &inverse.operations()[inverse.len() - 2]) {
            (
                Operation::CPhase { theta: a, .. },
                Operation::CPhase { theta: b, .. },
            ) => assert_abs_diff_eq!(*a, -*b, epsilon = 1e-15),
            other => panic!("unexpected operations {other:?}"),
        }
    }

    #[test]
    fn test_gate_counts() {
        for n in 1..=6 {
            let c = qft(n).unwrap();
            assert_eq!(c.len(), n + n * (n - 1) / 2 + n / 2);
        }
    }

    #[test]
    fn test_wide_register_angles_stay_positive() {
        // Distances past 63 qubits still halve the angle
        let circuit = qft(70).unwrap();
        let smallest = circuit
            .operations()
            .iter()
            .filter_map(|op| match op {
                Operation::CPhase { theta, .. } => Some(*theta),
                _ => None,
            })
            .fold(f64::INFINITY, f64::min);
        assert_abs_diff_eq!(smallest, PI / 2f64.powi(69), epsilon = 1e-30);
        assert!(smallest > 0.0);
    }

    proptest! {
        #[test]
        fn prop_qft_then_inverse_is_identity(
            n in 1usize..=6,
            raw in prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), 64),
        ) {
            let dim = 1 << n;
            prop_assume!(raw[..dim].iter().any(|(re, im)| re.abs() + im.abs() > 1e-3));
            let original = normalized(raw[..dim].to_vec());

            let mut state = original.clone();
            run(&qft(n).unwrap(), &mut state);
            run(&inverse_qft(n).unwrap(), &mut state);

            for (a, b) in state.amplitudes.iter().zip(original.amplitudes.iter()) {
                prop_assert!((a - b).norm() < 1e-9);
            }
        }
    }
}
