//! Exact Gram-Schmidt orthogonalization
//!
//! Rational Gram-Schmidt data used to *check* a reduced basis. The reduction
//! engine itself works with floating approximations; this module is the
//! ground truth it is measured against.
//!
//! # The Gram-Schmidt Process
//!
//! Given basis B = [b_1, ..., b_n], compute orthogonal vectors b*_i and coefficients μ_ij:
//!
//! ```text
//! b*_1 = b_1
//! b*_i = b_i - Σ_{j<i} μ_ij b*_j
//! μ_ij = <b_i, b*_j> / <b*_j, b*_j>
//! ```
//!
//! A zero b*_j (a dependent row) gets μ_ij = 0 for every later i.
//!
//! Single entries are also available without the full table, through Gram
//! determinants `d_j = det(<b_s, b_t>)_{s,t < j}`:
//!
//! ```text
//! ||b*_j||^2 = d_{j+1} / d_j
//! μ_kj       = det(<b_s, b_t>)_{s ∈ (0..j, k), t ∈ 0..=j} / d_{j+1}
//! ```

use super::basis::LatticeBasis;
use super::transform::bareiss;
use crate::rational::Rational;
use num_bigint::BigInt;
use num_traits::Zero;

/// Gram-Schmidt orthogonalization data (exact rational representation)
#[derive(Debug, Clone)]
pub struct GramSchmidt {
    /// Gram-Schmidt coefficients μ_ij (i > j), relative to `start`
    ///
    /// Stored as lower triangular matrix: mu[i][j] for j < i
    pub mu: Vec<Vec<Rational>>,
    /// Squared norms ||b*_i||^2 (exact rationals)
    pub b_star_norms_sq: Vec<Rational>,
    /// First row taking part in the orthogonalization
    pub start: usize,
    /// Dimension
    pub n: usize,
}

impl GramSchmidt {
    /// Compute Gram-Schmidt orthogonalization of every row
    pub fn compute(basis: &LatticeBasis) -> Self {
        Self::compute_from(basis, 0)
    }

    /// Orthogonalize rows `[start, n)` only, ignoring the rows before `start`
    ///
    /// Entries for rows below `start` are left at zero.
    pub fn compute_from(basis: &LatticeBasis, start: usize) -> Self {
        let n = basis.n;

        let mut mu: Vec<Vec<Rational>> = (0..n).map(|i| vec![Rational::zero(); i]).collect();
        let mut b_star_norms_sq = vec![Rational::zero(); n];

        for i in start..n {
            // <b_i, b*_j> = <b_i, b_j> - Σ_{start≤k<j} μ_jk <b_i, b*_k>
            let mut inner_with_b_star: Vec<Rational> = vec![Rational::zero(); i];

            for j in start..i {
                let mut inner = Rational::from(basis.inner_product(i, j));
                for k in start..j {
                    inner = &inner - &(&mu[j][k] * &inner_with_b_star[k]);
                }

                mu[i][j] = if b_star_norms_sq[j].is_zero() {
                    Rational::zero()
                } else {
                    &inner / &b_star_norms_sq[j]
                };
                inner_with_b_star[j] = inner;
            }

            // ||b*_i||^2 = <b_i, b_i> - Σ_j μ_ij <b_i, b*_j>
            let mut norm = Rational::from(basis.norm_squared(i));
            for j in start..i {
                norm = &norm - &(&mu[i][j] * &inner_with_b_star[j]);
            }
            b_star_norms_sq[i] = norm;
        }

        Self {
            mu,
            b_star_norms_sq,
            start,
            n,
        }
    }

    /// Get μ_ij
    ///
    /// # Panics
    /// Panics unless j < i.
    pub fn get_mu(&self, i: usize, j: usize) -> &Rational {
        assert!(j < i, "μ_ij only defined for j < i");
        &self.mu[i][j]
    }

    /// Get ||b*_i||^2
    pub fn get_norm_sq(&self, i: usize) -> &Rational {
        &self.b_star_norms_sq[i]
    }

    /// Whether |μ_ij| ≤ η
    pub fn is_size_reduced(&self, i: usize, j: usize, eta: &Rational) -> bool {
        self.get_mu(i, j).abs() <= *eta
    }

    /// Check Lovász condition at position k
    ///
    /// The condition is: (δ - μ_{k,k-1}^2) ||b*_{k-1}||^2 ≤ ||b*_k||^2
    pub fn check_lovasz(&self, k: usize, delta: &Rational) -> bool {
        if k <= self.start {
            return true;
        }
        let mu = &self.mu[k][k - 1];
        let lhs = &(delta - &(mu * mu)) * &self.b_star_norms_sq[k - 1];
        lhs <= self.b_star_norms_sq[k]
    }

    /// Product of the non-zero ||b*_i||^2, the squared volume of the lattice
    pub fn squared_volume(&self) -> Rational {
        self.b_star_norms_sq[self.start..]
            .iter()
            .filter(|r| !r.is_zero())
            .fold(Rational::one(), |acc, r| &acc * r)
    }

    /// Number of non-zero Gram-Schmidt vectors
    pub fn rank(&self) -> usize {
        self.b_star_norms_sq[self.start..]
            .iter()
            .filter(|r| !r.is_zero())
            .count()
    }
}

/// Determinant of the inner products `<b_r, b_c>` for `r ∈ rows`, `c ∈ cols`
fn gram_minor(basis: &LatticeBasis, rows: &[usize], cols: &[usize]) -> BigInt {
    let gram = rows
        .iter()
        .map(|&r| cols.iter().map(|&c| basis.inner_product(r, c)).collect())
        .collect();
    bareiss(gram)
}

/// Rows `start..=last`, with the final entry replaced by `k`
fn prefix_ending_in(start: usize, last: usize, k: usize) -> Vec<usize> {
    let mut rows: Vec<usize> = (start..=last).collect();
    if let Some(end) = rows.last_mut() {
        *end = k;
    }
    rows
}

/// Exact ||b*_k||^2 against rows `[start, k)`
///
/// Zero when those rows are linearly dependent.
pub fn exact_norm_sq(basis: &LatticeBasis, start: usize, k: usize) -> Rational {
    let rows: Vec<usize> = (start..=k).collect();
    let below = gram_minor(basis, &rows[..rows.len() - 1], &rows[..rows.len() - 1]);
    if below.is_zero() {
        return Rational::zero();
    }
    Rational::new(gram_minor(basis, &rows, &rows), below)
}

/// Exact μ_kj against rows `[start, j]`, for `start <= j < k`
///
/// Zero when b*_j is zero.
pub fn exact_mu(basis: &LatticeBasis, start: usize, k: usize, j: usize) -> Rational {
    let cols: Vec<usize> = (start..=j).collect();
    let d = gram_minor(basis, &cols, &cols);
    if d.is_zero() {
        return Rational::zero();
    }
    Rational::new(gram_minor(basis, &prefix_ending_in(start, j, k), &cols), d)
}

/// Exact Lovász test between row `p` and row `k` (which will follow it)
///
/// Holds when `δ ||b*_p||^2 ≤ ||π_p(b_k)||^2`, with `π_p` the projection
/// orthogonal to rows `[start, p)`; multiplied through by `d_p` this is
/// `δ d_{p+1} ≤ det Gram(b_start, .., b_{p-1}, b_k)`.
pub fn exact_lovasz(basis: &LatticeBasis, start: usize, p: usize, k: usize, delta: &Rational) -> bool {
    let rows: Vec<usize> = (start..=p).collect();
    let with_k = prefix_ending_in(start, p, k);
    let lhs = delta * &Rational::from(gram_minor(basis, &rows, &rows));
    lhs <= Rational::from(gram_minor(basis, &with_k, &with_k))
}
