//! Modular exponentiation as a basis permutation.
//!
//! On the joint register `|x⟩|y⟩` (exponent `x` on the low `n_exponent` bits,
//! `y` on the high `n_target` bits) the gate maps
//!
//! - `|x⟩|y⟩ → |x⟩|y · a^x mod N⟩` when `y < N`,
//! - `|x⟩|y⟩ → |x⟩|y⟩` otherwise.
//!
//! Since `a` is invertible mod `N`, multiplication by `a^x` permutes the
//! residues for every `x`, so the map is a bijection and the gate is unitary.
//! The table is exponential in the register width; this is a reference
//! construction for small moduli, not an arithmetic circuit.

use crate::core::errors::{ExecutionError, GateError, ShorError};
use crate::core::utils::{gcd, mod_pow};
use crate::core::{BasisPermutation, Gate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModExpGate {
    base: u64,
    modulus: u64,
    n_exponent: usize,
    n_target: usize,
    /// `a^(2^k) mod N` for every exponent bit `k`.
    powers: Vec<u64>,
}

impl ModExpGate {
    /// # Errors
    ///
    /// - `InvalidModulus` if `modulus < 2`.
    /// - `InvalidBase` if `gcd(base, modulus) != 1`.
    /// - `RegisterTooNarrow` if residues of `modulus` do not fit in `n_target` bits.
    /// - `TooManyQubits` if the joint register cannot be indexed by `usize`.
    pub fn new(
        base: u64,
        modulus: u64,
        n_exponent: usize,
        n_target: usize,
    ) -> Result<Self, ShorError> {
        if modulus < 2 {
            return Err(ShorError::InvalidModulus(modulus));
        }
        if gcd(base, modulus) != 1 {
            return Err(ShorError::InvalidBase { base, modulus });
        }
        if n_target >= u64::BITS as usize || modulus - 1 >= 1u64 << n_target {
            return Err(ShorError::RegisterTooNarrow {
                modulus,
                width: n_target,
            });
        }

        let total = n_exponent + n_target;
        if total >= usize::BITS as usize {
            return Err(ExecutionError::TooManyQubits {
                required: total,
                limit: usize::BITS as usize - 1,
            }
            .into());
        }

        let mut powers = Vec::with_capacity(n_exponent);
        let mut p = base % modulus;
        for _ in 0..n_exponent {
            powers.push(p);
            p = mod_pow(p, 2, modulus);
        }

        Ok(Self {
            base,
            modulus,
            n_exponent,
            n_target,
            powers,
        })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// `a^x mod N`, assembled from the cached repeated squares.
    fn factor_for(&self, x: usize) -> u64 {
        let m = self.modulus as u128;
        self.powers
            .iter()
            .enumerate()
            .filter(|(k, _)| (x >> k) & 1 == 1)
            .fold(1u128, |acc, (_, &p)| acc * p as u128 % m) as u64
    }

    /// Dense `2^n × 2^n` matrix with `U[j, i] = 1` for `j = U(i)`.
    ///
    /// Memory grows as `4^n`; meant for verification on tiny registers.
    pub fn to_gate(&self) -> Result<Gate, GateError> {
        Gate::from_permutation(&self.permutation())
    }
}

impl BasisPermutation for ModExpGate {
    fn num_qubits(&self) -> usize {
        self.n_exponent + self.n_target
    }

    fn apply_index(&self, index: usize) -> usize {
        let x = index & ((1 << self.n_exponent) - 1);
        let y = (index >> self.n_exponent) as u64;

        let new_y = if y < self.modulus {
            (y as u128 * self.factor_for(x) as u128 % self.modulus as u128) as u64
        } else {
            y
        };
        ((new_y as usize) << self.n_exponent) | x
    }

    fn name(&self) -> String {
        format!("modexp_{}_mod_{}", self.base, self.modulus)
    }
}
