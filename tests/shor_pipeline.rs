use qshor::errors::{AttemptFailure, ShorError};
use qshor::{Shor, ShorConfig, StatevectorExecutor};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn test_factor_15_succeeds_more_often_than_not() {
    let shor = Shor::new(ShorConfig::default().with_shots(64));
    let mut rng = ChaCha8Rng::seed_from_u64(15);
    let attempts = 20;

    let successes = (0..attempts)
        .map(|_| shor.factor(15, &mut rng).unwrap())
        .filter(|run| run.nontrivial_factors().map(|p| p.sorted()) == Ok((3, 5)))
        .count();

    assert!(
        successes * 2 > attempts,
        "only {successes}/{attempts} attempts factored 15"
    );
}

#[test]
fn test_failed_attempt_keeps_histogram() {
    // 14 ≡ -1 (mod 15) has order 2 and always yields the trivial pair {1, 15}
    let shor = Shor::new(ShorConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let run = shor.factor_with_base(15, 14, &mut rng).unwrap();

    assert_eq!(run.histogram.total(), 128);
    assert!(!run.measured_values.is_empty());
    assert_eq!(
        run.nontrivial_factors(),
        Err(AttemptFailure::TrivialFactors(1, 15))
    );
}

#[test]
fn test_prime_modulus_fails_cleanly() {
    let shor = Shor::new(ShorConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    for _ in 0..8 {
        let run = shor.factor(13, &mut rng).unwrap();
        assert_eq!(run.histogram.total(), 128);
        // A prime has no non-trivial split, whatever the period turned out to be
        match run.outcome {
            Ok(pair) => assert!(pair.is_trivial(13)),
            Err(AttemptFailure::NoPeriodFound) | Err(AttemptFailure::InvalidPeriod { .. }) => {}
            Err(other) => panic!("unexpected failure {other:?}"),
        }
    }
}

#[test]
fn test_odd_order_is_reported_as_failure() {
    // 3 has order 3 mod 13
    let shor = Shor::new(ShorConfig::default().with_shots(256));
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let run = shor.factor_with_base(13, 3, &mut rng).unwrap();
    assert!(matches!(
        run.outcome,
        Err(AttemptFailure::NoPeriodFound) | Err(AttemptFailure::InvalidPeriod { period: 3 })
    ));
}

#[test]
fn test_parallel_sampling_is_deterministic_under_seed() {
    let shor = Shor::new(ShorConfig::default().with_parallel(true));
    let a = shor
        .factor_with_base(15, 7, &mut ChaCha8Rng::seed_from_u64(99))
        .unwrap();
    let b = shor
        .factor_with_base(15, 7, &mut ChaCha8Rng::seed_from_u64(99))
        .unwrap();
    assert_eq!(a.histogram, b.histogram);
    assert_eq!(a.histogram.total(), 128);
}

#[test]
fn test_factor_21_with_base_two() {
    // 2 has order 6 mod 21; outcomes concentrate near multiples of 2^10 / 6
    let shor = Shor::new(ShorConfig::default().with_shots(256));
    for seed in 0..5 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let run = shor.factor_with_base(21, 2, &mut rng).unwrap();
        assert_eq!(run.registers.total(), 15);
        assert_eq!(run.period, Some(6), "seed {seed}");
        assert_eq!(run.nontrivial_factors().map(|p| p.sorted()), Ok((3, 7)));
    }
}

#[test]
fn test_qubit_ceiling_is_enforced() {
    let shor = Shor::new(ShorConfig::default().with_max_qubits(10));
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert!(matches!(
        shor.factor(15, &mut rng),
        Err(ShorError::ExecutionError(_))
    ));
}

#[test]
fn test_retry_loop_stops_at_first_split() {
    let shor = Shor::new(ShorConfig::default().with_max_attempts(10));
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let runs = shor.factor_until(15, &mut rng).unwrap();
    assert!(!runs.is_empty() && runs.len() <= 10);
    let last = runs.last().unwrap();
    assert!(runs[..runs.len() - 1]
        .iter()
        .all(|run| run.nontrivial_factors().is_err()));
    if runs.len() < 10 {
        assert_eq!(last.nontrivial_factors().unwrap().sorted(), (3, 5));
    }
}

#[test]
fn test_custom_executor_plugs_in() {
    let shor = Shor::with_executor(ShorConfig::default(), StatevectorExecutor::default());
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    assert!(shor.factor_with_base(15, 2, &mut rng).is_ok());
}
