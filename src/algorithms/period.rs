//! Classical period recovery from phase-estimation outcomes.

use crate::core::errors::AttemptFailure;
use crate::core::utils::{gcd, mod_pow};
use tracing::debug;

/// An exact fraction `numer / denom` in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub numer: u64,
    pub denom: u64,
}

impl Ratio {
    pub fn new(numer: u64, denom: u64) -> Self {
        let g = gcd(numer, denom).max(1);
        Self {
            numer: numer / g,
            denom: denom / g,
        }
    }

    /// Closest fraction to `self` whose denominator is at most `max_denom`.
    ///
    /// Walks the continued-fraction convergents until the next one would
    /// exceed the bound, then compares the last convergent with the best
    /// semiconvergent; the convergent wins ties.
    pub fn limit_denominator(self, max_denom: u64) -> Ratio {
        if max_denom == 0 || self.denom <= max_denom {
            return self;
        }

        let (mut p0, mut q0, mut p1, mut q1) = (0u64, 1u64, 1u64, 0u64);
        let (mut n, mut d) = (self.numer, self.denom);
        loop {
            let a = n / d;
            let q2 = q0 + a * q1;
            if q2 > max_denom {
                break;
            }
            (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
            (n, d) = (d, n - a * d);
        }

        let k = (max_denom - q0) / q1;
        let semi = Ratio::new(p0 + k * p1, q0 + k * q1);
        let convergent = Ratio::new(p1, q1);
        if self.distance_cmp(convergent, semi).is_le() {
            convergent
        } else {
            semi
        }
    }

    /// Orders `a` and `b` by their distance to `self`, exactly.
    fn distance_cmp(self, a: Ratio, b: Ratio) -> std::cmp::Ordering {
        // |a - s| = |a.n·s.d - s.n·a.d| / (a.d·s.d); s.d cancels
        let gap = |r: Ratio| {
            (r.numer as i128 * self.denom as i128 - self.numer as i128 * r.denom as i128).unsigned_abs()
        };
        (gap(a) * b.denom as u128).cmp(&(gap(b) * a.denom as u128))
    }
}

/// What one measured value says about the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodCandidate {
    pub measured: u64,
    pub phase: Ratio,
    pub approximation: Ratio,
    /// `a^r mod N == 1` for `r = approximation.denom`.
    pub valid: bool,
}

impl PeriodCandidate {
    pub fn period(&self) -> u64 {
        self.approximation.denom
    }
}

/// Turns one outcome `m` into a candidate period.
///
/// The phase `m / 2^n_exponent` is approximated by `p/q` with `q ≤ N`; the
/// candidate is `r = q`.
pub fn candidate_from(measured: u64, n_exponent: usize, base: u64, modulus: u64) -> PeriodCandidate {
    let phase = Ratio::new(measured, 1u64 << n_exponent);
    let approximation = phase.limit_denominator(modulus);
    let r = approximation.denom;
    let valid = r > 0 && mod_pow(base, r, modulus) == 1;

    debug!(
        m = measured,
        phase = measured as f64 / (1u64 << n_exponent) as f64,
        r,
        valid,
        "period candidate"
    );

    PeriodCandidate {
        measured,
        phase,
        approximation,
        valid,
    }
}

/// Smallest validated period among all measured values.
///
/// Every valid candidate is a multiple of the true order, so the minimum is
/// the best available estimate.
pub fn extract_period(
    measured: &[u64],
    n_exponent: usize,
    base: u64,
    modulus: u64,
) -> Result<u64, AttemptFailure> {
    let period = measured
        .iter()
        .map(|&m| candidate_from(m, n_exponent, base, modulus))
        .filter(|c| c.valid)
        .map(|c| c.period())
        .min();

    match period {
        Some(r) => {
            debug!(r, "smallest valid period");
            Ok(r)
        }
        None => {
            debug!("no measured value produced a valid period");
            Err(AttemptFailure::NoPeriodFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_denominator_known_values() {
        // 0.1015625 = 13/128 is closest to 1/10 among q <= 15 fractions
        assert_eq!(Ratio::new(13, 128).limit_denominator(15), Ratio::new(1, 10));
        assert_eq!(Ratio::new(85, 256).limit_denominator(21), Ratio::new(1, 3));
        assert_eq!(Ratio::new(3, 4).limit_denominator(10), Ratio::new(3, 4));
        // pi-ish: 314159/100000 -> 22/7 under q <= 10
        assert_eq!(Ratio::new(314_159, 100_000).limit_denominator(10), Ratio::new(22, 7));
    }

    #[test]
    fn test_limit_denominator_prefers_convergent_on_tie() {
        // 1/4 lies exactly between 0/1 and 1/2 when q <= 2; the convergent 0/1 wins
        assert_eq!(Ratio::new(1, 4).limit_denominator(2), Ratio::new(0, 1));
    }

    #[test]
    fn test_recovers_order_six_for_base_two_mod_21() {
        let n_exponent = 10;
        let q = 1u64 << n_exponent;
        // Nearest integers to j·2^10/6
        let measured: Vec<u64> = (0..6).map(|j| (j * q + 3) / 6).collect();
        assert_eq!(extract_period(&measured, n_exponent, 2, 21), Ok(6));
    }

    #[test]
    fn test_zero_phase_gives_rejected_unit_period() {
        for (base, modulus, width) in [(2, 21, 10), (7, 15, 8), (3, 7, 6), (2, 3, 4)] {
            let c = candidate_from(0, width, base, modulus);
            assert_eq!(c.period(), 1);
            assert!(!c.valid);
        }
        assert_eq!(extract_period(&[0], 8, 7, 15), Err(AttemptFailure::NoPeriodFound));
    }

    #[test]
    fn test_minimum_over_multiples() {
        // 7 has order 4 mod 15: outcome 128 alone gives r = 2 (rejected), 64 gives 4
        assert_eq!(extract_period(&[0, 128, 64, 192], 8, 7, 15), Ok(4));
        assert_eq!(extract_period(&[0, 128], 8, 7, 15), Err(AttemptFailure::NoPeriodFound));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_period(&[], 8, 2, 15), Err(AttemptFailure::NoPeriodFound));
    }
}
