//! qshor CLI
//!
//! Runs simulated factoring attempts and prints the measured register, the
//! recovered period and the factor candidates.

use anyhow::{Context, Result, bail};
use clap::Parser;
use ndarray::Array1;
use num_complex::Complex64;
use qshor::algorithms::qft;
use qshor::{Shor, ShorConfig, ShorRun, StateVector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qshor")]
#[command(version)]
#[command(about = "Factor small integers with a simulated Shor circuit", long_about = None)]
struct Cli {
    /// Integer to factor
    #[arg(default_value_t = 21)]
    modulus: u64,

    /// Shots per attempt
    #[arg(short, long, default_value_t = qshor::config::DEFAULT_SHOTS)]
    shots: usize,

    /// RNG seed; a random one is drawn and logged when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Refuse circuits wider than this many qubits
    #[arg(long, default_value_t = qshor::config::DEFAULT_MAX_QUBITS)]
    max_qubits: usize,

    /// Sample shots on all cores
    #[arg(short, long)]
    parallel: bool,

    /// Retry with new bases up to this many attempts instead of running once
    #[arg(long)]
    retry: Option<usize>,

    /// Print the 4-qubit QFT demo (amplitude 1/2 on |0>, |4>, |8>, |12>) and exit
    #[arg(long)]
    qft_demo: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.qft_demo {
        return qft_demo();
    }

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, "rng seeded");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let config = ShorConfig::new()
        .with_shots(cli.shots)
        .with_max_qubits(cli.max_qubits)
        .with_parallel(cli.parallel)
        .with_max_attempts(cli.retry.unwrap_or(1));
    let shor = Shor::new(config);

    let runs = if cli.retry.is_some() {
        shor.factor_until(cli.modulus, &mut rng)
    } else {
        shor.factor(cli.modulus, &mut rng).map(|run| vec![run])
    }
    .with_context(|| format!("factoring {} failed", cli.modulus))?;

    for run in &runs {
        report(run);
    }

    match runs.last().map(ShorRun::nontrivial_factors) {
        Some(Ok(pair)) => println!("\n{} = {}", cli.modulus, pair),
        Some(Err(reason)) => println!("\nNo factors: {reason}. Run again for a new base."),
        None => bail!("no attempts were made"),
    }
    Ok(())
}

fn report(run: &ShorRun) {
    println!("\nbase a = {}", run.base);
    println!(
        "registers: {} exponent + {} target qubits",
        run.registers.n_exponent, run.registers.n_target
    );
    println!("counts:");
    for (outcome, count) in run.histogram.iter() {
        println!("  {} ({:>5}): {}", run.histogram.bitstring(outcome), outcome, count);
    }
    if let Some((outcome, count)) = run.histogram.most_frequent() {
        println!(
            "most frequent: {} ({}) x{}",
            run.histogram.bitstring(outcome),
            outcome,
            count
        );
    }
    println!("measured values: {:?}", run.measured_values);
    match run.period {
        Some(r) => println!("period estimate r = {r}"),
        None => println!("period estimate: none"),
    }
    match run.outcome {
        Ok(pair) => println!("factor candidates: {}, {}", pair.first, pair.second),
        Err(reason) => println!("failed: {reason}"),
    }
}

fn qft_demo() -> Result<()> {
    let n = 4;
    let mut amplitudes = Array1::<Complex64>::zeros(1 << n);
    for idx in [0, 4, 8, 12] {
        amplitudes[idx] = Complex64::new(0.5, 0.0);
    }
    let mut state = StateVector::from_state_vector(amplitudes)?;
    for op in qft::qft(n)?.operations() {
        state.apply_operation(op)?;
    }

    println!("QFT of (|0> + |4> + |8> + |12>) / 2:");
    for (idx, amp) in state.amplitudes.iter().enumerate() {
        println!(
            "  |{:0width$b}>: {:+.6} {:+.6}i  p = {:.4}",
            idx,
            amp.re,
            amp.im,
            amp.norm_sqr(),
            width = n
        );
    }
    Ok(())
}
