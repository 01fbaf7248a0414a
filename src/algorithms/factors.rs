use crate::core::errors::AttemptFailure;
use crate::core::utils::{gcd, mod_pow};
use std::fmt;

/// The two gcd results of a period. Either may be `1` or `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorPair {
    pub first: u64,
    pub second: u64,
}

impl FactorPair {
    /// True when the pair does not split `modulus`.
    pub fn is_trivial(&self, modulus: u64) -> bool {
        [self.first, self.second]
            .iter()
            .any(|&f| f == 1 || f == modulus)
    }

    /// The pair as `(smaller, larger)`.
    pub fn sorted(&self) -> (u64, u64) {
        (self.first.min(self.second), self.first.max(self.second))
    }

    /// `Err(TrivialFactors)` for a pair that does not split `modulus`.
    pub fn nontrivial(self, modulus: u64) -> Result<FactorPair, AttemptFailure> {
        if self.is_trivial(modulus) {
            Err(AttemptFailure::TrivialFactors(self.first, self.second))
        } else {
            Ok(self)
        }
    }
}

impl fmt::Display for FactorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.first, self.second)
    }
}

/// Derives `gcd(a^(r/2) − 1, N)` and `gcd(a^(r/2) + 1, N)` from a period.
///
/// Fails with `NoPeriodFound` for a missing period and `InvalidPeriod` for an
/// odd one or one with `a^r ≢ 1 (mod N)`. Trivial pairs are returned as is.
pub fn extract_factors(
    period: Option<u64>,
    base: u64,
    modulus: u64,
) -> Result<FactorPair, AttemptFailure> {
    let r = period.ok_or(AttemptFailure::NoPeriodFound)?;
    if r == 0 || r % 2 != 0 || mod_pow(base, r, modulus) != 1 {
        return Err(AttemptFailure::InvalidPeriod { period: r });
    }

    // Reducing a^(r/2) mod N leaves both gcds unchanged
    let half = mod_pow(base, r / 2, modulus);
    let below = if half == 0 { modulus - 1 } else { half - 1 };
    let above = if half == modulus - 1 { 0 } else { half + 1 };
    Ok(FactorPair {
        first: gcd(below, modulus),
        second: gcd(above, modulus),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_two_mod_21() {
        let pair = extract_factors(Some(6), 2, 21).unwrap();
        assert_eq!(pair, FactorPair { first: 7, second: 3 });
        assert_eq!(pair.sorted(), (3, 7));
        assert!(!pair.is_trivial(21));
    }

    #[test]
    fn test_all_bases_mod_15() {
        for (base, r) in [(2, 4), (4, 2), (7, 4), (8, 4), (11, 2), (13, 4)] {
            let pair = extract_factors(Some(r), base, 15).unwrap();
            assert_eq!(pair.sorted(), (3, 5), "base {base}");
        }
    }

    #[test]
    fn test_trivial_pair_is_returned_unchecked() {
        // 14 ≡ -1 mod 15, so 14^1 + 1 ≡ 0
        let pair = extract_factors(Some(2), 14, 15).unwrap();
        assert_eq!(pair.sorted(), (1, 15));
        assert!(pair.is_trivial(15));
        assert_eq!(pair.nontrivial(15), Err(AttemptFailure::TrivialFactors(1, 15)));
    }

    #[test]
    fn test_modulus_near_u64_max() {
        // M = 2^64 - 1, base M - 1 ≡ -1 has order 2
        let modulus = u64::MAX;
        let pair = extract_factors(Some(2), modulus - 1, modulus).unwrap();
        assert_eq!(pair.sorted(), (1, modulus));
        assert!(pair.is_trivial(modulus));

        // 2 has order 64 mod 2^64 - 1; 2^32 ± 1 are its two halves
        let pair = extract_factors(Some(64), 2, modulus).unwrap();
        assert_eq!(pair.sorted(), ((1 << 32) - 1, (1 << 32) + 1));
    }

    #[test]
    fn test_rejects_missing_odd_and_wrong_periods() {
        assert_eq!(extract_factors(None, 2, 21), Err(AttemptFailure::NoPeriodFound));
        // 2 has order 3 mod 7
        assert_eq!(
            extract_factors(Some(3), 2, 7),
            Err(AttemptFailure::InvalidPeriod { period: 3 })
        );
        assert_eq!(
            extract_factors(Some(4), 2, 21),
            Err(AttemptFailure::InvalidPeriod { period: 4 })
        );
    }
}
