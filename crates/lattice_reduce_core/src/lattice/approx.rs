//! Floating approximations of exact basis rows
//!
//! Every row `b_i` is kept as `mantissa_i · 2^expo_i`, where `expo_i` is the
//! largest bit length in the row and each mantissa entry lies in `(-1, 1)`.
//! Entries are truncated to their top 53 bits, so the approximation never
//! overflows no matter how large the integers grow.

use super::basis::LatticeBasis;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

/// Bits kept from each entry (the `f64` significand width)
const MANTISSA_BITS: u64 = 53;

/// A fast product counts as sound while at most this many leading bits
/// cancel (half of the 53-bit mantissa).
const CANCELLATION_BITS: i32 = 26;

/// `x · 2^e`, exact whenever the result is representable
pub fn ldexp(mut x: f64, mut e: i32) -> f64 {
    const STEP: i32 = 1000;
    while e > STEP && x.is_finite() && x != 0.0 {
        x *= 2f64.powi(STEP);
        e -= STEP;
    }
    while e < -STEP && x != 0.0 {
        x *= 2f64.powi(-STEP);
        e += STEP;
    }
    x * 2f64.powi(e)
}

/// Split `x` into `(d, e)` with `x ≈ d · 2^e`, `0.5 ≤ |d| < 1`
///
/// Zero maps to `(0.0, 0)`. The mantissa is truncated, not rounded.
pub fn bigint_to_d_2exp(x: &BigInt) -> (f64, i32) {
    let bits = x.bits();
    if bits == 0 {
        return (0.0, 0);
    }
    let drop = bits.saturating_sub(MANTISSA_BITS);
    let top = (x.magnitude() >> drop).to_u64().unwrap_or(u64::MAX);
    let used = (bits - drop) as i32;
    let d = ldexp(top as f64, -used);
    let d = if x.is_negative() { -d } else { d };
    (d, bits as i32)
}

/// Approximate a whole row with a single shared exponent
pub fn vec_to_d_2exp(row: &[BigInt]) -> (Vec<f64>, i32) {
    let expo = row.iter().map(|x| x.bits()).max().unwrap_or(0) as i32;
    let mantissa = row
        .iter()
        .map(|x| {
            let (d, e) = bigint_to_d_2exp(x);
            ldexp(d, e - expo)
        })
        .collect();
    (mantissa, expo)
}

/// Floating mirror of a [`LatticeBasis`]
#[derive(Debug, Clone)]
pub struct ApproxBasis {
    rows: Vec<Vec<f64>>,
    expo: Vec<i32>,
}

impl ApproxBasis {
    /// Approximate every row of `basis`
    pub fn from_basis(basis: &LatticeBasis) -> Self {
        let (rows, expo) = basis.vectors.iter().map(|v| vec_to_d_2exp(v)).unzip();
        Self { rows, expo }
    }

    /// Binary exponent of row `i`
    pub fn expo(&self, i: usize) -> i32 {
        self.expo[i]
    }

    /// Mantissa vector of row `i`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    /// Recompute row `i` from the exact basis
    pub fn refresh(&mut self, basis: &LatticeBasis, i: usize) {
        let (row, expo) = vec_to_d_2exp(basis.get(i));
        self.rows[i] = row;
        self.expo[i] = expo;
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
        self.expo.swap(i, j);
    }

    /// Move row `from` to `to` (`to <= from`), as [`LatticeBasis::rotate_to`]
    pub fn rotate_to(&mut self, from: usize, to: usize) {
        self.rows[to..=from].rotate_right(1);
        self.expo[to..=from].rotate_right(1);
    }

    /// Dot product of the mantissas of rows `i` and `j` over the first `len`
    /// coordinates
    ///
    /// Returns `None` when cancellation has wiped out more than half of the
    /// mantissa bits; the caller must fall back to the exact product.
    pub fn dot(&self, i: usize, j: usize, len: usize) -> Option<f64> {
        let (a, b) = (&self.rows[i][..len], &self.rows[j][..len]);
        let (dot, magnitude) = a
            .iter()
            .zip(b)
            .fold((0.0, 0.0), |(d, m), (x, y)| (d + x * y, m + (x * y).abs()));

        if dot.abs() < ldexp(magnitude, -CANCELLATION_BITS) {
            None
        } else {
            Some(dot)
        }
    }
}

/// Exact scalar product of rows `i` and `j`, scaled to the units
/// `2^(expo_i + expo_j)` of the approximate rows
pub fn exact_dot(basis: &LatticeBasis, approx: &ApproxBasis, i: usize, j: usize, len: usize) -> f64 {
    let sp = basis.inner_product_prefix(i, j, len);
    let (d, e) = bigint_to_d_2exp(&sp);
    ldexp(d, e - approx.expo(i) - approx.expo(j))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ldexp() {
        assert_eq!(ldexp(0.75, 2), 3.0);
        assert_eq!(ldexp(3.0, -1), 1.5);
        assert_eq!(ldexp(1.0, 1500), f64::INFINITY);
        assert_eq!(ldexp(1.0, -1500), 0.0);
        // intermediate steps must not overflow before scaling back down
        assert_eq!(ldexp(ldexp(1.0, 1020), -1019), 2.0);
        // subnormal result: 2^-1071 is the eighth smallest positive f64
        assert_eq!(ldexp(0.5, -1070), f64::from_bits(8));
    }

    #[test]
    fn test_bigint_to_d_2exp() {
        assert_eq!(bigint_to_d_2exp(&BigInt::from(0)), (0.0, 0));
        assert_eq!(bigint_to_d_2exp(&BigInt::from(1)), (0.5, 1));
        assert_eq!(bigint_to_d_2exp(&BigInt::from(-6)), (-0.75, 3));

        // 2^100 + 1 keeps only the leading bit
        let big = (BigInt::from(1) << 100usize) + 1;
        assert_eq!(bigint_to_d_2exp(&big), (0.5, 101));

        let all_ones = (BigInt::from(1) << 200usize) - 1;
        let (d, e) = bigint_to_d_2exp(&all_ones);
        assert_eq!(e, 200);
        assert!(d < 1.0 && d > 1.0 - 1e-15);
    }

    #[test]
    fn test_row_approximation() {
        let (m, e) = vec_to_d_2exp(&[BigInt::from(3), BigInt::from(-8), BigInt::from(0)]);
        assert_eq!(e, 4);
        assert_eq!(m, vec![3.0 / 16.0, -0.5, 0.0]);

        let (m, e) = vec_to_d_2exp(&[BigInt::from(0), BigInt::from(0)]);
        assert_eq!(e, 0);
        assert_eq!(m, vec![0.0, 0.0]);
    }

    #[test]
    fn test_fast_dot_and_exact_fallback() {
        let basis = LatticeBasis::from_rows(&[vec![3i64, 4], vec![4, -3], vec![1, 1]]);
        let approx = ApproxBasis::from_basis(&basis);

        // rows 0 and 1 are orthogonal, so every bit cancels
        assert_eq!(approx.dot(0, 1, 2), None);
        assert_eq!(exact_dot(&basis, &approx, 0, 1, 2), 0.0);

        // <b_0, b_2> = 7 in units of 2^(3 + 1)
        let fast = approx.dot(0, 2, 2).unwrap();
        assert_eq!(ldexp(fast, approx.expo(0) + approx.expo(2)), 7.0);
        assert_eq!(exact_dot(&basis, &approx, 0, 2, 2), fast);
    }

    #[test]
    fn test_swap_and_rotate_follow_basis() {
        let mut basis = LatticeBasis::from_rows(&[vec![1i64, 0], vec![0, 5], vec![9, 9]]);
        let mut approx = ApproxBasis::from_basis(&basis);

        basis.rotate_to(2, 0);
        approx.rotate_to(2, 0);
        basis.swap(1, 2);
        approx.swap(1, 2);

        let expected = ApproxBasis::from_basis(&basis);
        for i in 0..3 {
            assert_eq!(approx.row(i), expected.row(i));
            assert_eq!(approx.expo(i), expected.expo(i));
        }

        basis.sub_row(0, 1);
        approx.refresh(&basis, 0);
        let expected = ApproxBasis::from_basis(&basis);
        assert_eq!(approx.row(0), expected.row(0));
    }
}
