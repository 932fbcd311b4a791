//! Incremental floating Gram-Schmidt state
//!
//! Holds `mu`, `r`, the partial sums `s` of the row being processed and the
//! cached approximate scalar products. All values live in the scaled units
//! of [`ApproxBasis`](super::approx::ApproxBasis):
//!
//! ```text
//! r[i][j]  ~ 2^(expo_i + expo_j)
//! mu[i][j] ~ 2^(expo_i - expo_j)
//! s[t]     ~ 2^(2 expo_k)        (k = row being processed)
//! ```
//!
//! `valid_from[i]` is the first column of row `i` whose `mu`/`r` entries are
//! stale. Every row operation of the main loop has a matching method here
//! that keeps the markers honest, so stale data is never read.

/// Floating Gram-Schmidt cache for an `n`-row basis
#[derive(Debug, Clone)]
pub struct GsoCache {
    pub mu: Vec<Vec<f64>>,
    pub r: Vec<Vec<f64>>,
    pub s: Vec<f64>,
    /// Cached scalar products, `NaN` when unknown
    sp: Vec<Vec<f64>>,
    valid_from: Vec<usize>,
    /// Highest row index processed so far
    pub kappamax: usize,
}

impl GsoCache {
    pub fn new(n: usize) -> Self {
        Self {
            mu: vec![vec![0.0; n]; n],
            r: vec![vec![0.0; n]; n],
            s: vec![0.0; n + 1],
            sp: vec![vec![f64::NAN; n]; n],
            valid_from: vec![0; n],
            kappamax: 0,
        }
    }

    /// Cached scalar product of rows `i` and `j`
    pub fn product(&self, i: usize, j: usize) -> Option<f64> {
        let v = self.sp[i][j];
        (!v.is_nan()).then_some(v)
    }

    pub fn store_product(&mut self, i: usize, j: usize, v: f64) {
        self.sp[i][j] = v;
        self.sp[j][i] = v;
    }

    /// Forget every cached product that involves row `i`
    pub fn drop_products(&mut self, i: usize) {
        self.sp[i].iter_mut().for_each(|v| *v = f64::NAN);
        for row in self.sp.iter_mut() {
            row[i] = f64::NAN;
        }
    }

    /// First stale column of row `i`, never below `zeros`
    pub fn stale_from(&self, i: usize, zeros: usize) -> usize {
        self.valid_from[i].max(zeros)
    }

    /// Row `i` changed: recompute it from `zeros`
    pub fn invalidate_row(&mut self, i: usize, zeros: usize) {
        self.drop_products(i);
        self.valid_from[i] = zeros;
    }

    /// Columns `[.., upto)` of row `i` are up to date
    pub fn mark_valid(&mut self, i: usize, upto: usize) {
        self.valid_from[i] = upto;
    }

    /// Swap rows `kappa - 1` and `kappa`
    ///
    /// The row moving down keeps its coefficients against the rows before
    /// `kappa - 1`; its new diagonal is the partial sum `s[kappa - 1]` of the
    /// row just processed. Every later processed row loses column `kappa - 1`
    /// onwards.
    pub fn swap_down(&mut self, kappa: usize) {
        let p = kappa - 1;
        self.mu.swap(p, kappa);
        self.r.swap(p, kappa);
        self.sp.swap(p, kappa);
        for row in self.sp.iter_mut() {
            row.swap(p, kappa);
        }

        self.r[p][p] = self.s[p];
        self.valid_from[p] = p;
        self.valid_from[kappa] = p;
        for i in kappa + 1..=self.kappamax {
            self.valid_from[i] = self.valid_from[i].min(p);
        }
    }

    /// Move row `kappa` to position `zeros` (the front of the active range)
    ///
    /// The rows `[zeros, kappa)` shift down by one together with their
    /// coefficients, which stay valid because the moved row came after them.
    /// Rows past `kappa` keep only the columns that precede it.
    pub fn rotate_to_front(&mut self, kappa: usize, zeros: usize) {
        self.mu[zeros..=kappa].rotate_right(1);
        self.r[zeros..=kappa].rotate_right(1);
        self.sp[zeros..=kappa].rotate_right(1);
        for row in self.sp.iter_mut() {
            row[zeros..=kappa].rotate_right(1);
        }
        self.drop_products(zeros);

        for i in zeros + 1..=kappa {
            self.mu[i].copy_within(zeros..i, zeros + 1);
            self.r[i].copy_within(zeros..i, zeros + 1);
            self.valid_from[i] = i;
        }
        for i in kappa + 1..=self.kappamax {
            self.mu[i].copy_within(zeros..kappa, zeros + 1);
            self.r[i].copy_within(zeros..kappa, zeros + 1);
            self.valid_from[i] = self.valid_from[i].min(kappa) + 1;
        }
    }

    /// The front row of the active range was dropped in place: everything
    /// processed after it must be rebuilt from the new front
    pub fn drop_front(&mut self, zeros: usize) {
        for i in zeros..=self.kappamax {
            self.valid_from[i] = zeros;
        }
    }
}
