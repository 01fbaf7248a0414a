use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Outcome counts of a sampled register.
///
/// Keys are outcome values where bit `k` is measured qubit `k`; counts add up
/// to the number of shots taken.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Histogram {
    width: usize,
    counts: BTreeMap<u64, usize>,
}

impl Histogram {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            counts: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, outcome: u64, count: usize) {
        if count > 0 {
            *self.counts.entry(outcome).or_insert(0) += count;
        }
    }

    /// Adds another histogram's counts into this one.
    ///
    /// Addition commutes, so partial results may be merged in any order.
    pub fn merge(mut self, other: Histogram) -> Histogram {
        self.width = self.width.max(other.width);
        for (outcome, count) in other.counts {
            self.record(outcome, count);
        }
        self
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn get(&self, outcome: u64) -> usize {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.counts.iter().map(|(&k, &v)| (k, v))
    }

    /// Distinct outcomes in ascending order.
    pub fn outcomes(&self) -> Vec<u64> {
        self.counts.keys().copied().collect()
    }

    /// Outcome seen most often; ties go to the smallest value.
    pub fn most_frequent(&self) -> Option<(u64, usize)> {
        self.iter()
            .fold(None, |best: Option<(u64, usize)>, (k, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((k, v)),
            })
    }

    /// Bitstring of an outcome, most significant (highest) qubit first.
    pub fn bitstring(&self, outcome: u64) -> String {
        format!("{:0width$b}", outcome, width = self.width)
    }
}

/// Draws i.i.d. shots from a discrete distribution.
///
/// The cumulative distribution is built once and shared by every shot.
#[derive(Debug, Clone)]
pub struct Sampler {
    cdf: Vec<f64>,
    width: usize,
}

impl Sampler {
    /// `probs[v]` is the probability of outcome `v` on a `width`-bit register.
    pub fn new(probs: &[f64], width: usize) -> Self {
        let mut cdf = Vec::with_capacity(probs.len());
        let mut current_sum = 0.0;
        for &p in probs {
            current_sum += p;
            cdf.push(current_sum);
        }
        Self { cdf, width }
    }

    /// Draws one outcome.
    pub fn draw(&self, rng: &mut dyn RngCore) -> u64 {
        let last = self.cdf.last().copied().unwrap_or(1.0);
        let r: f64 = rng.random::<f64>() * last;
        let idx = self.cdf.partition_point(|&c| c <= r);
        if idx < self.cdf.len() {
            return idx as u64;
        }
        // Rounding pushed r past the end: take the last bucket with mass
        self.cdf.partition_point(|&c| c < last) as u64
    }

    /// Runs `num_shots` draws on the calling thread.
    pub fn run(&self, num_shots: usize, rng: &mut dyn RngCore) -> Histogram {
        let mut raw_counts = vec![0usize; self.cdf.len()];
        for _ in 0..num_shots {
            raw_counts[self.draw(rng) as usize] += 1;
        }

        let mut histogram = Histogram::new(self.width);
        for (idx, &count) in raw_counts.iter().enumerate() {
            histogram.record(idx as u64, count);
        }
        histogram
    }

    /// Splits shots into `chunks` independent streams and samples them on the
    /// rayon pool.
    ///
    /// Each stream gets its own `ChaCha8Rng` seeded from `rng`, so a seeded
    /// caller gets the same histogram regardless of thread scheduling.
    pub fn run_parallel(&self, num_shots: usize, chunks: usize, rng: &mut dyn RngCore) -> Histogram {
        let chunks = chunks.clamp(1, num_shots.max(1));
        let jobs: Vec<(usize, u64)> = (0..chunks)
            .map(|i| {
                let shots = num_shots / chunks + usize::from(i < num_shots % chunks);
                (shots, rng.next_u64())
            })
            .collect();

        jobs.into_par_iter()
            .map(|(shots, seed)| {
                let mut local = ChaCha8Rng::seed_from_u64(seed);
                self.run(shots, &mut local)
            })
            .reduce(|| Histogram::new(self.width), Histogram::merge)
    }
}
