//! Lattice basis representation
//!
//! Rows of `BigInt` with the exact row operations the reduction engine
//! performs, plus conversion helpers and the fplll text format.

use crate::error::{LllError, Result};
use crate::matrix::Matrix;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// A lattice basis represented as a matrix of row vectors
///
/// Each row b_i is a basis vector in Z^m.
/// The lattice L(B) = {Σ x_i b_i : x_i ∈ Z}
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeBasis {
    /// Basis vectors as rows (n vectors of dimension m)
    pub vectors: Vec<Vec<BigInt>>,
    /// Number of basis vectors
    pub n: usize,
    /// Dimension of the ambient space
    pub m: usize,
}

impl LatticeBasis {
    /// Create a new lattice basis from row vectors
    ///
    /// # Panics
    /// Panics if rows have inconsistent dimensions or if the basis is empty
    pub fn new(vectors: Vec<Vec<BigInt>>) -> Self {
        match Self::try_new(vectors) {
            Ok(basis) => basis,
            Err(e) => panic!("{}", e),
        }
    }

    /// Fallible version of [`LatticeBasis::new`]
    pub fn try_new(vectors: Vec<Vec<BigInt>>) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(LllError::Parse("basis cannot be empty".into()));
        };
        let m = first.len();
        if m == 0 {
            return Err(LllError::Parse("vectors cannot be empty".into()));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != m) {
            return Err(LllError::dims(
                "LatticeBasis::new",
                (vectors.len(), m),
                (vectors.len(), bad.len()),
            ));
        }

        let n = vectors.len();
        Ok(Self { vectors, n, m })
    }

    /// Create a lattice basis from integer rows
    pub fn from_rows<T: Into<BigInt> + Clone>(rows: &[Vec<T>]) -> Self {
        let vectors: Vec<Vec<BigInt>> = rows
            .iter()
            .map(|row| row.iter().map(|x| x.clone().into()).collect())
            .collect();
        Self::new(vectors)
    }

    /// Create the n×n identity, the starting point of a transform
    pub fn identity(n: usize) -> Self {
        let vectors = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { BigInt::one() } else { BigInt::zero() })
                    .collect()
            })
            .collect();
        Self { vectors, n, m: n }
    }

    /// Create a reproducible random lattice basis
    pub fn random_seeded(n: usize, m: usize, bits: usize, seed: u64) -> Self {
        Self::random_with(&mut StdRng::seed_from_u64(seed), n, m, bits)
    }

    /// Create a random lattice basis from a caller-supplied generator
    ///
    /// Tests pass a seeded `StdRng` so failures reproduce.
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R, n: usize, m: usize, bits: usize) -> Self {
        assert!((1..=62).contains(&bits), "bits must be in 1..=62");
        let half = 1i64 << (bits - 1);

        let vectors: Vec<Vec<BigInt>> = (0..n)
            .map(|_| (0..m).map(|_| BigInt::from(rng.gen_range(-half..half))).collect())
            .collect();

        Self::new(vectors)
    }

    /// Create a knapsack/subset-sum lattice
    ///
    /// Given a = [a_1, ..., a_n] and target s, creates the lattice:
    /// ```text
    /// [ 2  0  0 ... 0  a_1 ]
    /// [ 0  2  0 ... 0  a_2 ]
    /// [ ...                ]
    /// [ 1  1  1 ... 1   s  ]
    /// ```
    pub fn knapsack(a: &[i64], s: i64) -> Self {
        let n = a.len() + 1;
        let m = a.len() + 1;

        let mut vectors = vec![vec![BigInt::zero(); m]; n];

        for (i, &ai) in a.iter().enumerate() {
            vectors[i][i] = BigInt::from(2);
            vectors[i][m - 1] = BigInt::from(ai);
        }

        for j in 0..a.len() {
            vectors[n - 1][j] = BigInt::one();
        }
        vectors[n - 1][m - 1] = BigInt::from(s);

        Self { vectors, n, m }
    }

    /// Get vector at index i
    pub fn get(&self, i: usize) -> &[BigInt] {
        &self.vectors[i]
    }

    /// Dimensions as (rows, columns)
    pub fn dims(&self) -> (usize, usize) {
        (self.n, self.m)
    }

    /// Swap two basis vectors
    pub fn swap(&mut self, i: usize, j: usize) {
        self.vectors.swap(i, j);
    }

    /// Move row `from` to position `to` (`to <= from`), shifting the rows
    /// in between up by one
    pub fn rotate_to(&mut self, from: usize, to: usize) {
        debug_assert!(to <= from);
        self.vectors[to..=from].rotate_right(1);
    }

    /// Compute inner product <b_i, b_j>
    pub fn inner_product(&self, i: usize, j: usize) -> BigInt {
        self.inner_product_prefix(i, j, self.m)
    }

    /// Inner product restricted to the first `len` coordinates
    pub fn inner_product_prefix(&self, i: usize, j: usize, len: usize) -> BigInt {
        self.vectors[i][..len]
            .iter()
            .zip(self.vectors[j][..len].iter())
            .fold(BigInt::zero(), |acc, (a, b)| acc + a * b)
    }

    /// Compute squared norm ||b_i||^2
    pub fn norm_squared(&self, i: usize) -> BigInt {
        self.inner_product(i, i)
    }

    /// Whether b_i is the zero vector
    pub fn is_zero_row(&self, i: usize) -> bool {
        self.vectors[i].iter().all(|x| x.is_zero())
    }

    /// b_i = b_i - b_j
    pub fn sub_row(&mut self, i: usize, j: usize) {
        let (dst, src) = self.pair_mut(i, j);
        for (x, y) in dst.iter_mut().zip(src) {
            *x -= y;
        }
    }

    /// b_i = b_i + b_j
    pub fn add_row(&mut self, i: usize, j: usize) {
        let (dst, src) = self.pair_mut(i, j);
        for (x, y) in dst.iter_mut().zip(src) {
            *x += y;
        }
    }

    /// b_i = b_i - q * b_j (size reduction step)
    pub fn sub_mul_row(&mut self, i: usize, j: usize, q: &BigInt) {
        let (dst, src) = self.pair_mut(i, j);
        for (x, y) in dst.iter_mut().zip(src) {
            *x -= q * y;
        }
    }

    fn pair_mut(&mut self, i: usize, j: usize) -> (&mut [BigInt], &[BigInt]) {
        assert_ne!(i, j, "row operation needs two distinct rows");
        if i < j {
            let (lo, hi) = self.vectors.split_at_mut(j);
            (lo[i].as_mut_slice(), hi[0].as_slice())
        } else {
            let (lo, hi) = self.vectors.split_at_mut(i);
            (hi[0].as_mut_slice(), lo[j].as_slice())
        }
    }

    /// Largest number of non-zero columns to the right of the diagonal
    ///
    /// For row i the last non-zero column c contributes `c - i`. Rows that are
    /// combinations of the first k rows vanish beyond column `k + shift`, which
    /// bounds how many coordinates a scalar product needs.
    pub fn shift(&self) -> usize {
        self.vectors
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                v.iter()
                    .rposition(|x| !x.is_zero())
                    .map(|c| c.saturating_sub(i))
            })
            .max()
            .unwrap_or(0)
    }

    /// Get maximum absolute entry
    pub fn max_entry(&self) -> BigInt {
        self.vectors
            .iter()
            .flat_map(|v| v.iter())
            .map(|x| x.abs())
            .max()
            .unwrap_or_else(BigInt::zero)
    }

    /// Lossy conversion to a floating matrix (entries beyond `f64` range
    /// become infinite)
    pub fn to_f64_matrix(&self) -> Result<Matrix<f64>> {
        let data = self
            .vectors
            .iter()
            .flat_map(|v| v.iter().map(|x| x.to_f64().unwrap_or(f64::NAN)))
            .collect();
        Matrix::from_flat(data, self.n, self.m)
    }

    /// Product `self · other` of two integer matrices
    pub fn mul(&self, other: &LatticeBasis) -> Result<LatticeBasis> {
        if self.m != other.n {
            return Err(LllError::dims("LatticeBasis::mul", (self.m, other.m), other.dims()));
        }
        let vectors = self
            .vectors
            .iter()
            .map(|row| {
                (0..other.m)
                    .map(|c| {
                        row.iter()
                            .zip(other.vectors.iter())
                            .fold(BigInt::zero(), |acc, (a, b)| acc + a * &b[c])
                    })
                    .collect()
            })
            .collect();
        Ok(LatticeBasis {
            vectors,
            n: self.n,
            m: other.m,
        })
    }

    /// Parse the fplll matrix format: `[[1 2 3]\n[4 5 6]\n]`
    pub fn parse_fplll(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(|| LllError::Parse("expected outer brackets".into()))?;

        let mut vectors = Vec::new();
        let mut rest = inner.trim_start();
        while !rest.is_empty() {
            let body = rest
                .strip_prefix('[')
                .ok_or_else(|| LllError::Parse(format!("expected '[' near {:?}", head(rest))))?;
            let end = body
                .find(']')
                .ok_or_else(|| LllError::Parse("unterminated row".into()))?;
            let row = body[..end]
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|tok| !tok.is_empty())
                .map(|tok| {
                    tok.parse::<BigInt>()
                        .map_err(|e| LllError::Parse(format!("bad entry {:?}: {}", tok, e)))
                })
                .collect::<Result<Vec<_>>>()?;
            vectors.push(row);
            rest = body[end + 1..].trim_start();
        }

        Self::try_new(vectors)
    }

    /// Render in the fplll matrix format
    pub fn to_fplll_string(&self) -> String {
        let mut out = String::from("[");
        for v in &self.vectors {
            out.push('[');
            let row: Vec<String> = v.iter().map(|x| x.to_string()).collect();
            out.push_str(&row.join(" "));
            out.push_str("]\n");
        }
        out.push(']');
        out
    }
}

fn head(s: &str) -> &str {
    let end = s.char_indices().nth(16).map_or(s.len(), |(i, _)| i);
    &s[..end]
}

impl fmt::Display for LatticeBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LatticeBasis ({}×{}):", self.n, self.m)?;
        for (i, v) in self.vectors.iter().enumerate() {
            write!(f, "  b_{}: [", i)?;
            for (j, x) in v.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", x)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
