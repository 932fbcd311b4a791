//! Dense matrix operations
//!
//! Row-major dense matrix representation used by the floating-point
//! orthogonalizer.

use crate::error::{LllError, Result};
use num_traits::Zero;

/// Dense matrix in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Matrix<T> {
    /// Create a matrix from a flat vector (row-major order)
    pub fn from_flat(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(LllError::DimensionMismatch {
                context: "Matrix::from_flat",
                expected: format!("{} entries", rows * cols),
                actual: format!("{} entries", data.len()),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Create a matrix from nested rows
    ///
    /// All rows must have the same length. An empty slice gives a 0×0 matrix.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(LllError::dims(
                "Matrix::from_rows",
                (rows.len(), cols),
                (rows.len(), bad.len()),
            ));
        }
        let data = rows.iter().flat_map(|r| r.iter().cloned()).collect();
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Get matrix dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Get number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Access element at (i, j)
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    /// Mutable access to element at (i, j)
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.data[i * self.cols + j]
    }

    /// Get underlying data as slice
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get a row as a slice
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Copy out column j
    pub fn column(&self, j: usize) -> Vec<T> {
        (0..self.rows).map(|i| self.get(i, j).clone()).collect()
    }
}

impl<T: Clone + Zero> Matrix<T> {
    /// Create a zero matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::zero(); rows * cols],
            rows,
            cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_access() {
        let data: Vec<f64> = (0..6).map(|x| x as f64).collect();
        let m = Matrix::from_flat(data, 2, 3).unwrap();

        assert_eq!(*m.get(0, 0), 0.0);
        assert_eq!(*m.get(0, 2), 2.0);
        assert_eq!(*m.get(1, 0), 3.0);
        assert_eq!(*m.get(1, 2), 5.0);
        assert_eq!(m.column(1), vec![1.0, 4.0]);
    }

    #[test]
    fn test_from_flat_rejects_bad_length() {
        let err = Matrix::from_flat(vec![1.0f64; 5], 2, 3).unwrap_err();
        assert!(matches!(err, LllError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_from_rows_ragged() {
        let rows = vec![vec![1.0f64, 2.0], vec![3.0]];
        assert!(Matrix::from_rows(&rows).is_err());

        let ok = Matrix::from_rows(&[vec![1.0f64, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(ok.dims(), (2, 2));
        assert_eq!(ok.row(1), &[3.0, 4.0]);
    }
}
