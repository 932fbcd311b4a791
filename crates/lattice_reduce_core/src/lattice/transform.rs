//! Unimodular transform tracking
//!
//! [`TrackedBasis`] applies every row operation to the basis and, when one is
//! attached, to the transform matrix as well. Starting from the identity this
//! keeps `T · B_in = B` at every step of a reduction.

use super::basis::LatticeBasis;
use crate::error::{LllError, Result};
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// A basis together with an optional transform updated in lockstep
#[derive(Debug)]
pub struct TrackedBasis<'a> {
    basis: &'a mut LatticeBasis,
    transform: Option<&'a mut LatticeBasis>,
}

impl<'a> TrackedBasis<'a> {
    /// Attach `transform` to `basis`
    ///
    /// The transform must be `n × n` for an `n`-row basis.
    pub fn new(basis: &'a mut LatticeBasis, transform: Option<&'a mut LatticeBasis>) -> Result<Self> {
        if let Some(t) = transform.as_deref() {
            let n = basis.n;
            if t.dims() != (n, n) {
                return Err(LllError::dims("transform", (n, n), t.dims()));
            }
        }
        Ok(Self { basis, transform })
    }

    pub fn basis(&self) -> &LatticeBasis {
        self.basis
    }

    pub fn transform(&self) -> Option<&LatticeBasis> {
        self.transform.as_deref()
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.basis.swap(i, j);
        if let Some(t) = self.transform.as_deref_mut() {
            t.swap(i, j);
        }
    }

    /// Move row `from` to position `to <= from`
    pub fn rotate_to_front(&mut self, from: usize, to: usize) {
        self.basis.rotate_to(from, to);
        if let Some(t) = self.transform.as_deref_mut() {
            t.rotate_to(from, to);
        }
    }

    /// b_i -= b_j
    pub fn sub_row(&mut self, i: usize, j: usize) {
        self.basis.sub_row(i, j);
        if let Some(t) = self.transform.as_deref_mut() {
            t.sub_row(i, j);
        }
    }

    /// b_i += b_j
    pub fn add_row(&mut self, i: usize, j: usize) {
        self.basis.add_row(i, j);
        if let Some(t) = self.transform.as_deref_mut() {
            t.add_row(i, j);
        }
    }

    /// b_i -= q · b_j
    pub fn sub_mul_row(&mut self, i: usize, j: usize, q: &BigInt) {
        self.basis.sub_mul_row(i, j, q);
        if let Some(t) = self.transform.as_deref_mut() {
            t.sub_mul_row(i, j, q);
        }
    }
}

/// Determinant of a square integer matrix by fraction-free (Bareiss)
/// elimination
pub fn determinant(matrix: &LatticeBasis) -> Result<BigInt> {
    let n = matrix.n;
    if matrix.m != n {
        return Err(LllError::dims("determinant", (n, n), matrix.dims()));
    }
    Ok(bareiss(matrix.vectors.clone()))
}

/// Bareiss elimination on the square matrix `a`, consuming it
pub(crate) fn bareiss(mut a: Vec<Vec<BigInt>>) -> BigInt {
    let n = a.len();
    let mut prev = BigInt::one();
    let mut negate = false;

    for k in 0..n {
        if a[k][k].is_zero() {
            match (k + 1..n).find(|&i| !a[i][k].is_zero()) {
                Some(i) => {
                    a.swap(k, i);
                    negate = !negate;
                }
                None => return BigInt::zero(),
            }
        }
        for i in k + 1..n {
            for j in k + 1..n {
                // exact: every entry is a minor of the input
                let v = (&a[i][j] * &a[k][k] - &a[i][k] * &a[k][j]) / &prev;
                a[i][j] = v;
            }
        }
        prev = a[k][k].clone();
    }

    if negate {
        -prev
    } else {
        prev
    }
}

/// Whether `matrix` is square with determinant ±1
pub fn is_unimodular(matrix: &LatticeBasis) -> bool {
    determinant(matrix).map_or(false, |d| d.abs().is_one())
}
