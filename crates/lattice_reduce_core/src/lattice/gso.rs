//! Floating-point Gram-Schmidt orthogonalization
//!
//! Orthonormalizes the *columns* of a floating matrix. Each column is
//! re-projected against the earlier columns until the projection pass stops
//! changing it in a measurable way, which damps the cancellation error of
//! classical Gram-Schmidt:
//!
//! ```text
//! repeat:
//!     s_i = <B_i, B_k>,  B_k -= s_i B_i      (i < k)
//!     t   = Σ s_i² + ||B_k||²
//! while ||B_k||² < t and ||B_k||² ≥ 2^-exp
//! ```
//!
//! A column whose residual drops below `2^-exp` lies in the span of the
//! earlier columns and is returned as the zero column.

use crate::error::{LllError, Result};
use crate::matrix::Matrix;
use num_traits::Float;

/// Upper bound on projection passes per column
const MAX_PASSES: usize = 64;

/// Orthonormalize the columns of `a` into a new matrix
pub fn gso<T: Float>(a: &Matrix<T>) -> Matrix<T> {
    let (rows, cols) = a.dims();
    let mut b = Matrix::zeros(rows, cols);
    orthogonalize(&mut b, a);
    b
}

/// Orthonormalize the columns of `a` into `b`
///
/// `b` must have the same shape as `a`; on mismatch nothing is written.
pub fn gso_into<T: Float>(b: &mut Matrix<T>, a: &Matrix<T>) -> Result<()> {
    if b.dims() != a.dims() {
        return Err(LllError::dims("gso_into", a.dims(), b.dims()));
    }
    orthogonalize(b, a);
    Ok(())
}

/// Orthonormalize the columns of `a` in place, through a scratch copy
pub fn gso_in_place<T: Float>(a: &mut Matrix<T>) {
    let source = a.clone();
    orthogonalize(a, &source);
}

/// Squared Euclidean norms of the columns of `a`
pub fn column_norms_squared<T: Float>(a: &Matrix<T>) -> Vec<T> {
    (0..a.cols())
        .map(|k| (0..a.rows()).fold(T::zero(), |acc, j| acc + *a.get(j, k) * *a.get(j, k)))
        .collect()
}

/// Residual threshold `2^-exp` with `exp` the working precision rounded up
/// to a multiple of 64 bits
fn residual_epsilon<T: Float>() -> T {
    let two = T::one() + T::one();
    let prec = (-T::epsilon().log2()).round() + T::one();
    let exp = (prec / T::from(64.0).unwrap_or(two)).ceil() * T::from(64.0).unwrap_or(two);
    two.powf(-exp)
}

fn orthogonalize<T: Float>(b: &mut Matrix<T>, a: &Matrix<T>) {
    let (rows, cols) = a.dims();
    if rows == 0 {
        return;
    }
    let eps = residual_epsilon::<T>();

    for k in 0..cols {
        for j in 0..rows {
            *b.get_mut(j, k) = *a.get(j, k);
        }

        let mut s;
        let mut passes = 0;
        loop {
            passes += 1;
            let mut t = T::zero();
            for i in 0..k {
                let proj = (0..rows).fold(T::zero(), |acc, j| acc + *b.get(j, i) * *b.get(j, k));
                t = t + proj * proj;
                for j in 0..rows {
                    let v = *b.get(j, k) - proj * *b.get(j, i);
                    *b.get_mut(j, k) = v;
                }
            }
            s = (0..rows).fold(T::zero(), |acc, j| acc + *b.get(j, k) * *b.get(j, k));
            t = t + s;

            if s >= t {
                break;
            }
            if s < eps {
                s = T::zero();
                break;
            }
            if passes >= MAX_PASSES {
                break;
            }
        }

        let norm = s.sqrt();
        let scale = if norm != T::zero() {
            T::one() / norm
        } else {
            T::zero()
        };
        for j in 0..rows {
            let v = *b.get(j, k) * scale;
            *b.get_mut(j, k) = v;
        }
    }
}
