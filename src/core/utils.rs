//! Utility functions for quantum operations.
//!
//! This module contains helper functions for:
//! - Operator expansion to larger systems and adjoints.
//! - Bit manipulation for state indices.
//! - Modular arithmetic used by the classical half of Shor's algorithm.

use ndarray::Array2;
use num_complex::Complex64;
use num_integer::Integer;

/// Conjugate transpose $U^\dagger$ of a matrix.
pub fn adjoint(matrix: &Array2<Complex64>) -> Array2<Complex64> {
    matrix.t().mapv(|x| x.conj())
}

/// Checks that `matrix` is (numerically) the identity.
pub fn is_identity(matrix: &Array2<Complex64>, tol: f64) -> bool {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return false;
    }
    let eye = Array2::<Complex64>::eye(rows);
    matrix
        .iter()
        .zip(eye.iter())
        .all(|(a, b)| (*a - *b).norm() < tol)
}

/// Checks that every row and every column holds exactly one unit entry
/// and zeros elsewhere.
pub fn is_permutation_matrix(matrix: &Array2<Complex64>, tol: f64) -> bool {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return false;
    }
    let mut row_hits = vec![0usize; rows];
    let mut col_hits = vec![0usize; cols];

    for ((r, c), val) in matrix.indexed_iter() {
        if (*val - Complex64::new(1.0, 0.0)).norm() < tol {
            row_hits[r] += 1;
            col_hits[c] += 1;
        } else if val.norm() >= tol {
            return false;
        }
    }

    row_hits.iter().chain(col_hits.iter()).all(|&h| h == 1)
}

/// Generates the full operator matrix ($2^N \times 2^N$) for the whole system.
///
/// It expands a local operator acting on `targets` (and controlled by `controls`)
/// to an operator on the full system of `num_total_qubits`.
///
/// # Arguments
///
/// * `num_total_qubits` - Total number of qubits in the system.
/// * `matrix` - The matrix representation of the local gate.
/// * `targets` - Indices of the target qubits.
/// * `controls` - Indices of the control qubits.
pub fn expand_operator(
    num_total_qubits: usize,
    matrix: &Array2<Complex64>,
    targets: &[usize],
    controls: &[usize],
) -> Array2<Complex64> {
    let dim = 1 << num_total_qubits;
    let mut full_matrix = Array2::<Complex64>::zeros((dim, dim));
    let control_mask = mask_of(controls);
    let passive_mask = !mask_of(targets);

    for col_idx in 0..dim {
        // Controls not all set: this basis state passes through untouched
        if (col_idx & control_mask) != control_mask {
            full_matrix[[col_idx, col_idx]] = Complex64::new(1.0, 0.0);
            continue;
        }
        let small_col = extract_bits(col_idx, targets);
        for small_row in 0..matrix.nrows() {
            let val = matrix[[small_row, small_col]];
            if val.norm_sqr() < f64::EPSILON {
                continue;
            }
            // Keep passive bits, scatter the local row index onto the targets
            let row_idx = (col_idx & passive_mask) | deposit_bits(small_row, targets);
            full_matrix[[row_idx, col_idx]] = val;
        }
    }
    full_matrix
}

/// Bitmask with a 1 at every listed qubit position.
pub fn mask_of(indices: &[usize]) -> usize {
    indices.iter().fold(0usize, |mask, &q| mask | (1 << q))
}

/// Extracs the bits in positions `indices` of the sequence `value`
pub fn extract_bits(value: usize, indices: &[usize]) -> usize {
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (value >> pos) & 1 == 1 {
            result |= 1 << i;
        }
    }
    result
}

/// Scatters bits from `compact_value` into the positions specified by `indices`.
pub fn deposit_bits(compact_value: usize, indices: &[usize]) -> usize {
    let mut result = 0;
    for (i, &pos) in indices.iter().enumerate() {
        if (compact_value >> i) & 1 == 1 {
            result |= 1 << pos;
        }
    }
    result
}

/// Find duplicate in a slice of usize
pub fn find_duplicate(indices: &[usize]) -> Option<usize> {
    let mut seen = std::collections::HashSet::new();
    indices.iter().find(|&&idx| !seen.insert(idx)).copied()
}

/// Computes `base^exp mod modulus` by square-and-multiply.
///
/// Intermediate products are widened to `u128`, so any `u64` modulus is safe.
pub fn mod_pow(base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let m = modulus as u128;
    let mut result: u128 = 1;
    let mut b = base as u128 % m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % m;
        }
        b = b * b % m;
        exp >>= 1;
    }
    result as u64
}

/// Greatest common divisor.
pub fn gcd(a: u64, b: u64) -> u64 {
    a.gcd(&b)
}

/// Number of bits needed to hold every residue below `n`, i.e. `ceil(log2 n)`.
pub fn ceil_log2(n: u64) -> usize {
    if n <= 1 {
        return 0;
    }
    (u64::BITS - (n - 1).leading_zeros()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_pow_small_values() {
        assert_eq!(mod_pow(2, 6, 21), 1);
        assert_eq!(mod_pow(7, 4, 15), 1);
        assert_eq!(mod_pow(3, 0, 7), 1);
        assert_eq!(mod_pow(5, 3, 1), 0);
    }

    #[test]
    fn test_mod_pow_does_not_overflow() {
        let p = 18_446_744_073_709_551_557; // largest u64 prime
        assert_eq!(mod_pow(2, p - 1, p), 1);
    }

    #[test]
    fn test_ceil_log2_matches_register_sizing() {
        assert_eq!(ceil_log2(15), 4);
        assert_eq!(ceil_log2(16), 4);
        assert_eq!(ceil_log2(17), 5);
        assert_eq!(ceil_log2(21), 5);
        assert_eq!(ceil_log2(2), 1);
    }

    #[test]
    fn test_bit_scatter_gather_inverse() {
        let indices = [4, 1, 3];
        for v in 0..8 {
            assert_eq!(extract_bits(deposit_bits(v, &indices), &indices), v);
        }
        assert_eq!(mask_of(&indices), 0b11010);
    }

    #[test]
    fn test_find_duplicate() {
        assert_eq!(find_duplicate(&[0, 2, 1, 2]), Some(2));
        assert_eq!(find_duplicate(&[0, 1, 2]), None);
    }
}
