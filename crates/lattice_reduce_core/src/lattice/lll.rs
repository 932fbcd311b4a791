//! LLL Lattice Reduction Algorithm
//!
//! Floating-point LLL with exact integer updates and vector removal.
//!
//! # The LLL Algorithm
//!
//! Given a basis B = [b_1, ..., b_n], LLL produces a (δ, η)-reduced basis satisfying:
//! 1. **Size reduction**: |μ_ij| ≤ η for all j < i
//! 2. **Lovász condition**: δ ||b*_{i-1}||² ≤ ||b*_i + μ_{i,i-1} b*_{i-1}||²
//!
//! # Floating Gram-Schmidt
//!
//! The Gram-Schmidt data is kept in `f64` against scaled copies of the rows
//! (see [`approx`](super::approx)) while every basis update is exact. Scalar
//! products are first taken from the `f64` rows; when that loses too much
//! precision the row is redone with exact products, and after too many such
//! failures every row uses exact products directly.
//!
//! Floating decisions use thresholds with a margin: `(δ+1)/2` for Lovász and
//! `(η+1/2)/2` for size reduction. A swap or size reduction that falls
//! inside the margin is confirmed exactly against δ and η first, so a basis
//! that is already reduced comes back unchanged.
//!
//! # Removal
//!
//! Zero vectors, and with [`RemoveBelow`] every vector whose Gram-Schmidt
//! norm falls under a bound, are rotated to the front of the basis. The
//! reduced basis is the range `[zeros, n)`.

use super::approx::{exact_dot, ldexp, ApproxBasis};
use super::babai::{BabaiOutcome, Precision};
use super::basis::LatticeBasis;
use super::cache::GsoCache;
use super::gram_schmidt::{exact_lovasz, exact_mu, exact_norm_sq, GramSchmidt};
use super::transform::TrackedBasis;
use crate::error::{LllError, Result};
use crate::rational::Rational;
use log::{debug, info, trace, warn};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::time::Instant;

/// Relative slack around δ, η and removal bounds inside which a floating
/// decision is confirmed exactly
pub(super) const RECHECK_SLACK: f64 = 1.0 / 65536.0;

/// How Gram-Schmidt scalar products are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GramSchmidtMode {
    /// Floating products first, exact products on failure
    #[default]
    Approx,
    /// Exact products for every row
    Exact,
}

/// LLL configuration parameters
#[derive(Debug, Clone)]
pub struct LLLConfig {
    /// Lovász parameter δ, in (1/4, 1)
    pub delta: f64,
    /// Size-reduction bound η, in [1/2, sqrt(δ))
    pub eta: f64,
    pub gram_schmidt: GramSchmidtMode,
    /// Rows that may fail with floating products before they are disabled
    pub fast_failure_limit: usize,
    /// Size-reduction passes per row before the row counts as failed
    pub babai_loop_limit: usize,
    /// Consecutive passes without the row shrinking before the row counts as failed
    pub stall_loops: usize,
}

impl Default for LLLConfig {
    fn default() -> Self {
        Self {
            delta: 0.99,
            eta: 0.51,
            gram_schmidt: GramSchmidtMode::Approx,
            fast_failure_limit: 50,
            babai_loop_limit: 1000,
            stall_loops: 20,
        }
    }
}

impl LLLConfig {
    /// Create config with δ = 0.999, η = 0.501 (strong reduction)
    pub fn strong() -> Self {
        Self {
            delta: 0.999,
            eta: 0.501,
            ..Default::default()
        }
    }

    /// Create config with δ = 0.75, η = 0.55 (fast but weaker reduction)
    pub fn fast() -> Self {
        Self {
            delta: 0.75,
            eta: 0.55,
            ..Default::default()
        }
    }

    /// Check δ ∈ (1/4, 1) and η ∈ [1/2, sqrt(δ))
    pub fn validate(&self) -> Result<()> {
        if !(self.delta > 0.25 && self.delta < 1.0) {
            return Err(LllError::InvalidParameter(format!(
                "delta = {} must lie in (0.25, 1)",
                self.delta
            )));
        }
        if !(self.eta >= 0.5 && self.eta < self.delta.sqrt()) {
            return Err(LllError::InvalidParameter(format!(
                "eta = {} must lie in [0.5, sqrt(delta) = {})",
                self.eta,
                self.delta.sqrt()
            )));
        }
        Ok(())
    }

    /// δ and η as exact rationals
    fn exact_parameters(&self) -> Result<(Rational, Rational)> {
        match (Rational::from_f64(self.delta), Rational::from_f64(self.eta)) {
            (Some(delta), Some(eta)) => Ok((delta, eta)),
            _ => Err(LllError::InvalidParameter(format!(
                "delta = {} and eta = {} must be finite",
                self.delta, self.eta
            ))),
        }
    }

    /// Lovász constant used on the floating data, halfway between δ and 1
    fn lovasz_constant(&self) -> f64 {
        (self.delta + 1.0) / 2.0
    }

    /// Size-reduction threshold used on the floating data, halfway between
    /// η and 1/2
    fn size_threshold(&self) -> f64 {
        (self.eta + 0.5) / 2.0
    }
}

/// Statistics from LLL execution
#[derive(Debug, Clone, Default)]
pub struct LLLStats {
    /// Number of size reductions performed
    pub size_reductions: usize,
    /// Number of swaps performed
    pub swaps: usize,
    /// Total iterations of the main loop
    pub iterations: usize,
    /// Size-reduction passes over single rows
    pub babai_loops: usize,
    /// Rows redone with exact scalar products after a floating failure
    pub escalations: usize,
    /// Floating scalar products replaced by exact ones because of cancellation
    pub exact_products: usize,
    /// Swaps, size reductions and removals settled by an exact check
    pub exact_checks: usize,
    /// Time spent size-reducing (seconds)
    pub reduce_time: f64,
    /// Total time (seconds)
    pub total_time: f64,
}

/// Result of a reduction
#[derive(Debug, Clone, Default)]
pub struct ReductionOutcome {
    /// Number of vectors in the reduced basis, `n - zeros`
    pub rank: usize,
    /// Number of removed vectors, all at the front of the basis
    pub zeros: usize,
    /// Removed vectors that were zero
    pub zero_vectors: usize,
    /// Removed vectors whose Gram-Schmidt norm fell below the bound
    pub removed_below_bound: usize,
    pub stats: LLLStats,
}

impl ReductionOutcome {
    pub fn any_removed(&self) -> bool {
        self.zeros > 0
    }
}

/// Decides which non-zero vectors leave the basis
pub trait RemovalPolicy {
    /// Whether a vector with squared Gram-Schmidt norm `gs_norm_sq` is removed
    fn removes(&self, gs_norm_sq: f64) -> bool;

    /// Exact threshold behind [`removes`](Self::removes), if there is one
    ///
    /// Norms close to it are compared exactly: the vector is removed when
    /// its squared Gram-Schmidt norm is strictly below.
    fn exact_bound(&self) -> Option<&BigInt> {
        None
    }
}

/// Keep every non-zero vector
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl RemovalPolicy for KeepAll {
    fn removes(&self, _gs_norm_sq: f64) -> bool {
        false
    }
}

/// Remove vectors whose squared Gram-Schmidt norm is strictly below a bound
#[derive(Debug, Clone)]
pub struct RemoveBelow {
    bound: BigInt,
    /// `bound` rounded to nearest, `+inf` past the `f64` range
    approx: f64,
}

impl RemoveBelow {
    pub fn new(bound: &BigInt) -> Self {
        Self {
            bound: bound.clone(),
            approx: bound.to_f64().unwrap_or(f64::INFINITY),
        }
    }

    pub fn bound(&self) -> &BigInt {
        &self.bound
    }
}

impl RemovalPolicy for RemoveBelow {
    fn removes(&self, gs_norm_sq: f64) -> bool {
        gs_norm_sq < self.approx
    }

    fn exact_bound(&self) -> Option<&BigInt> {
        Some(&self.bound)
    }
}

/// Why a vector left the basis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Zero,
    BelowBound,
}

/// Working state of one reduction
pub(super) struct ReductionContext<'a> {
    pub(super) basis: TrackedBasis<'a>,
    pub(super) approx: ApproxBasis,
    pub(super) cache: GsoCache,
    pub(super) config: &'a LLLConfig,
    pub(super) stats: LLLStats,
    /// Removed rows at the front of the basis
    pub(super) zeros: usize,
    /// Floating failures so far; the fast tier is skipped once this hits the limit
    failed_fast: usize,
    zero_vectors: usize,
    removed_below_bound: usize,
    shift: usize,
    ctt: f64,
    pub(super) halfplus: f64,
    delta: Rational,
    eta: Rational,
}

impl<'a> ReductionContext<'a> {
    fn new(basis: TrackedBasis<'a>, config: &'a LLLConfig) -> Result<Self> {
        let (delta, eta) = config.exact_parameters()?;
        let n = basis.basis().n;
        let approx = ApproxBasis::from_basis(basis.basis());
        let shift = basis.basis().shift();
        Ok(Self {
            basis,
            approx,
            cache: GsoCache::new(n),
            config,
            stats: LLLStats::default(),
            zeros: 0,
            failed_fast: 0,
            zero_vectors: 0,
            removed_below_bound: 0,
            shift,
            ctt: config.lovasz_constant(),
            halfplus: config.size_threshold(),
            delta,
            eta,
        })
    }

    /// Number of leading coordinates scalar products need
    pub(super) fn window(&self) -> usize {
        (self.cache.kappamax + 1 + self.shift).min(self.basis.basis().m)
    }

    /// Scalar product of rows `i` and `j` in the units of the approximate rows
    pub(super) fn scalar_product(&mut self, i: usize, j: usize, precision: Precision) -> f64 {
        if let Some(v) = self.cache.product(i, j) {
            return v;
        }
        let len = self.window();
        let fast = match precision {
            Precision::Fast => self.approx.dot(i, j, len),
            Precision::Heuristic => None,
        };
        let v = match fast {
            Some(v) => v,
            None => {
                if precision == Precision::Fast {
                    self.stats.exact_products += 1;
                }
                exact_dot(self.basis.basis(), &self.approx, i, j, len)
            }
        };
        self.cache.store_product(i, j, v);
        v
    }

    /// Squared Gram-Schmidt norm of row `i` from its scaled diagonal entry
    fn gs_norm_sq(&self, i: usize, scaled: f64) -> f64 {
        ldexp(scaled, 2 * self.approx.expo(i))
    }

    /// Whether `policy` removes row `i`, whose scaled diagonal entry is `scaled`
    fn below_bound<P: RemovalPolicy + ?Sized>(&mut self, policy: &P, i: usize, scaled: f64) -> bool {
        let norm = self.gs_norm_sq(i, scaled);
        if let Some(bound) = policy.exact_bound() {
            let approx = bound.to_f64().unwrap_or(f64::INFINITY);
            if (norm - approx).abs() <= approx.abs() * RECHECK_SLACK {
                self.stats.exact_checks += 1;
                let exact = exact_norm_sq(self.basis.basis(), self.zeros, i);
                return exact < Rational::from(bound.clone());
            }
        }
        policy.removes(norm)
    }

    /// Exact δ-Lovász test for row `kappa` behind row `p`
    fn lovasz_holds_exactly(&mut self, p: usize, kappa: usize) -> bool {
        self.stats.exact_checks += 1;
        let holds = exact_lovasz(self.basis.basis(), self.zeros, p, kappa, &self.delta);
        trace!("exact Lovász test on rows {} and {}: {}", p, kappa, holds);
        holds
    }

    /// Exact test `|μ_kappa,j| ≤ η`
    pub(super) fn size_reduced_exactly(&mut self, kappa: usize, j: usize) -> bool {
        self.stats.exact_checks += 1;
        exact_mu(self.basis.basis(), self.zeros, kappa, j).abs() <= self.eta
    }

    fn run<P: RemovalPolicy + ?Sized>(&mut self, policy: &P) -> Result<()> {
        let n = self.basis.basis().n;
        let mut kappa = 0;

        while kappa < n {
            self.stats.iterations += 1;
            self.cache.kappamax = self.cache.kappamax.max(kappa);

            if kappa == self.zeros {
                kappa = self.base_step(policy);
                continue;
            }

            let babai_start = Instant::now();
            let outcome = self.size_reduce(kappa);
            self.stats.reduce_time += babai_start.elapsed().as_secs_f64();

            match outcome {
                BabaiOutcome::Reduced => {}
                BabaiOutcome::Zero => {
                    self.remove(kappa, Removal::Zero);
                    kappa += 1;
                    continue;
                }
                BabaiOutcome::PrecisionInsufficient => {
                    warn!("precision exhausted while size-reducing row {}", kappa);
                    return Err(LllError::PrecisionExhausted { kappa });
                }
            }

            let p = kappa - 1;
            let rkk = self.cache.s[p] - self.cache.mu[kappa][p] * self.cache.r[kappa][p];
            self.cache.r[kappa][kappa] = rkk;

            if self.below_bound(policy, kappa, rkk) {
                self.remove(kappa, Removal::BelowBound);
                kappa += 1;
                continue;
            }

            let scale = 2 * (self.approx.expo(p) - self.approx.expo(kappa));
            let rpp = ldexp(self.cache.r[p][p], scale);
            let sp = self.cache.s[p];
            let lovasz = self.ctt * rpp <= sp
                || (sp >= self.config.delta * rpp * (1.0 - RECHECK_SLACK)
                    && self.lovasz_holds_exactly(p, kappa));
            if lovasz {
                self.cache.mark_valid(kappa, kappa);
                kappa += 1;
            } else {
                trace!("swap rows {} and {}", p, kappa);
                self.basis.swap_rows(p, kappa);
                self.approx.swap(p, kappa);
                self.cache.swap_down(kappa);
                self.stats.swaps += 1;
                // p == zeros sends the loop back through the base step
                kappa = p;
            }
        }

        Ok(())
    }

    /// Load the front row of the active range; returns the next position
    fn base_step<P: RemovalPolicy + ?Sized>(&mut self, policy: &P) -> usize {
        let z = self.zeros;
        let norm = self.scalar_product(z, z, Precision::Heuristic);
        self.cache.r[z][z] = norm;

        let removal = if self.basis.basis().is_zero_row(z) {
            Some(Removal::Zero)
        } else if self.below_bound(policy, z, norm) {
            Some(Removal::BelowBound)
        } else {
            None
        };

        match removal {
            Some(reason) => {
                self.count_removal(z, reason);
                self.zeros += 1;
                self.cache.drop_front(self.zeros);
                self.zeros
            }
            None => {
                self.cache.mark_valid(z, z);
                z + 1
            }
        }
    }

    /// Rotate row `kappa` to the front of the active range
    fn remove(&mut self, kappa: usize, reason: Removal) {
        self.count_removal(kappa, reason);
        let z = self.zeros;
        self.basis.rotate_to_front(kappa, z);
        self.approx.rotate_to(kappa, z);
        self.cache.rotate_to_front(kappa, z);
        self.zeros += 1;
    }

    fn count_removal(&mut self, row: usize, reason: Removal) {
        match reason {
            Removal::Zero => self.zero_vectors += 1,
            Removal::BelowBound => self.removed_below_bound += 1,
        }
        debug!("removing row {} ({:?}), {} removed so far", row, reason, self.zeros + 1);
    }

    /// Size-reduce row `kappa`, fast tier first while it keeps working
    fn size_reduce(&mut self, kappa: usize) -> BabaiOutcome {
        let fast_allowed = self.config.gram_schmidt == GramSchmidtMode::Approx
            && self.failed_fast < self.config.fast_failure_limit;

        if fast_allowed {
            match self.babai(kappa, Precision::Fast) {
                BabaiOutcome::PrecisionInsufficient => {
                    self.failed_fast += 1;
                    self.stats.escalations += 1;
                    warn!(
                        "floating size reduction failed at row {}, retrying with exact products ({}/{})",
                        kappa, self.failed_fast, self.config.fast_failure_limit
                    );
                    self.approx.refresh(self.basis.basis(), kappa);
                    self.cache.invalidate_row(kappa, self.zeros);
                }
                outcome => return outcome,
            }
        }

        self.babai(kappa, Precision::Heuristic)
    }
}

/// LLL lattice reduction algorithm
pub struct LLL;

impl LLL {
    /// Reduce `basis` in place under a removal policy
    ///
    /// When `transform` is given it must be `n × n`; every row operation is
    /// applied to it as well, so starting from the identity it ends up with
    /// `transform · input == output`. Removed vectors are rotated to the
    /// front: rows `[zeros, n)` of the result form the reduced basis.
    ///
    /// Parameters and shapes are checked before anything is modified.
    pub fn reduce_with_policy<P: RemovalPolicy + ?Sized>(
        basis: &mut LatticeBasis,
        transform: Option<&mut LatticeBasis>,
        policy: &P,
        config: &LLLConfig,
    ) -> Result<ReductionOutcome> {
        config.validate()?;
        let start = Instant::now();
        let n = basis.n;

        let tracked = TrackedBasis::new(basis, transform)?;
        let mut ctx = ReductionContext::new(tracked, config)?;
        ctx.run(policy)?;

        let mut stats = ctx.stats;
        stats.total_time = start.elapsed().as_secs_f64();

        let outcome = ReductionOutcome {
            rank: n - ctx.zeros,
            zeros: ctx.zeros,
            zero_vectors: ctx.zero_vectors,
            removed_below_bound: ctx.removed_below_bound,
            stats,
        };

        info!(
            "LLL completed: rank {}/{}, {} swaps, {} reductions, {} escalations, {:.3}s",
            outcome.rank,
            n,
            outcome.stats.swaps,
            outcome.stats.size_reductions,
            outcome.stats.escalations,
            outcome.stats.total_time
        );

        Ok(outcome)
    }

    /// Reduce in place, removing only zero vectors
    pub fn reduce_in_place(
        basis: &mut LatticeBasis,
        transform: Option<&mut LatticeBasis>,
        config: &LLLConfig,
    ) -> Result<ReductionOutcome> {
        Self::reduce_with_policy(basis, transform, &KeepAll, config)
    }

    /// Reduce in place, also removing vectors whose squared Gram-Schmidt
    /// norm is below `bound`
    pub fn reduce_with_removal(
        basis: &mut LatticeBasis,
        transform: Option<&mut LatticeBasis>,
        bound: &BigInt,
        config: &LLLConfig,
    ) -> Result<ReductionOutcome> {
        Self::reduce_with_policy(basis, transform, &RemoveBelow::new(bound), config)
    }

    /// Reduce a copy of `basis`
    pub fn reduce(basis: &LatticeBasis, config: &LLLConfig) -> Result<(LatticeBasis, ReductionOutcome)> {
        let mut b = basis.clone();
        let outcome = Self::reduce_in_place(&mut b, None, config)?;
        Ok((b, outcome))
    }

    /// Check if a basis is LLL-reduced, exactly
    pub fn is_reduced(basis: &LatticeBasis, config: &LLLConfig) -> bool {
        Self::is_reduced_with_removal(basis, 0, config)
    }

    /// Check that rows `[zeros, n)` form an LLL-reduced basis, ignoring the
    /// rows in front of them
    pub fn is_reduced_with_removal(basis: &LatticeBasis, zeros: usize, config: &LLLConfig) -> bool {
        let Ok((delta, eta)) = config.exact_parameters() else {
            return false;
        };
        let gs = GramSchmidt::compute_from(basis, zeros);
        let n = basis.n;

        // Check size reduction
        for i in zeros + 1..n {
            for j in zeros..i {
                if !gs.is_size_reduced(i, j, &eta) {
                    return false;
                }
            }
        }

        // Check Lovász condition
        (zeros + 1..n).all(|k| gs.check_lovasz(k, &delta))
    }
}

/// Reduce `basis` in place, optionally tracking a transform and removing
/// vectors whose squared Gram-Schmidt norm is below `removal_bound`
///
/// Zero vectors are always removed.
pub fn reduce(
    basis: &mut LatticeBasis,
    transform: Option<&mut LatticeBasis>,
    removal_bound: Option<&BigInt>,
    config: &LLLConfig,
) -> Result<ReductionOutcome> {
    match removal_bound {
        Some(bound) => LLL::reduce_with_removal(basis, transform, bound, config),
        None => LLL::reduce_in_place(basis, transform, config),
    }
}

#[cfg(test)]
mod tests {
    use crate::lattice::babai::FORCED_FAST_FAILURES;
    use super::*;

    #[test]
    fn test_lll_simple() {
        let basis = LatticeBasis::from_rows(&[vec![201i64, 37], vec![37, 7]]);

        let config = LLLConfig::default();
        let (reduced, outcome) = LLL::reduce(&basis, &config).unwrap();

        assert!(LLL::is_reduced(&reduced, &config));
        assert_eq!(outcome.rank, 2);
        assert_eq!(reduced.norm_squared(0), BigInt::from(34));
        assert_eq!(reduced.norm_squared(1), BigInt::from(50));
        assert_eq!(outcome.stats.swaps, 3);
    }

    #[test]
    fn test_lll_identity() {
        // Identity lattice (already reduced)
        let basis = LatticeBasis::from_rows(&[vec![1i64, 0, 0], vec![0, 1, 0], vec![0, 0, 1]]);

        let config = LLLConfig::default();
        let (reduced, outcome) = LLL::reduce(&basis, &config).unwrap();

        // Should remain the same (no swaps needed)
        assert_eq!(outcome.stats.swaps, 0);
        assert_eq!(reduced, basis);
    }

    #[test]
    fn test_lll_knapsack() {
        let basis = LatticeBasis::knapsack(&[3, 5, 7], 12);

        let config = LLLConfig::default();
        let (reduced, outcome) = LLL::reduce(&basis, &config).unwrap();

        assert!(LLL::is_reduced(&reduced, &config));
        assert_eq!(outcome.rank, 4);
        assert!(reduced.norm_squared(0) <= basis.norm_squared(0));
    }

    #[test]
    fn test_lll_strong_and_fast() {
        let basis = LatticeBasis::from_rows(&[vec![1i64, 1, 1], vec![-1, 0, 2], vec![3, 5, 6]]);

        for config in [LLLConfig::fast(), LLLConfig::default(), LLLConfig::strong()] {
            let (reduced, _) = LLL::reduce(&basis, &config).unwrap();
            assert!(LLL::is_reduced(&reduced, &config), "{:?}", config);
        }
    }

    #[test]
    fn test_zero_row_is_removed() {
        let mut basis = LatticeBasis::from_rows(&[vec![3i64, 1], vec![0, 0], vec![1, 2]]);
        let outcome =
            LLL::reduce_with_removal(&mut basis, None, &BigInt::from(0), &LLLConfig::default()).unwrap();

        assert_eq!(outcome.zeros, 1);
        assert_eq!(outcome.rank, 2);
        assert_eq!(outcome.zero_vectors, 1);
        assert!(outcome.any_removed());
        assert!(basis.is_zero_row(0));
        assert!(LLL::is_reduced_with_removal(&basis, 1, &LLLConfig::default()));
    }

    #[test]
    fn test_dependent_rows_collapse() {
        // (3, 0) = (2, 0) + (1, 0) is removed by the reduction
        let mut basis = LatticeBasis::from_rows(&[vec![2i64, 0], vec![3, 0]]);
        let mut transform = LatticeBasis::identity(2);
        let original = basis.clone();

        let outcome = LLL::reduce_in_place(&mut basis, Some(&mut transform), &LLLConfig::default()).unwrap();

        assert_eq!(outcome.rank, 1);
        assert!(basis.is_zero_row(0));
        assert_eq!(basis.norm_squared(1), BigInt::from(1));
        assert_eq!(transform.mul(&original).unwrap(), basis);
    }

    #[test]
    fn test_policies() {
        assert!(!KeepAll.removes(0.0));
        let below = RemoveBelow::new(&BigInt::from(10));
        assert!(below.removes(9.5));
        assert!(!below.removes(10.0));

        assert_eq!(below.exact_bound(), Some(&BigInt::from(10)));
        assert_eq!(KeepAll.exact_bound(), None);

        let huge = RemoveBelow::new(&(BigInt::from(1) << 2000usize));
        assert!(huge.removes(f64::MAX));
    }

    #[test]
    fn test_removal_bound_compared_exactly() {
        // ||b_0||^2 = 2^53, and 2^53 + 1 has no exact f64
        let a = BigInt::from(1) << 26usize;
        let input = LatticeBasis::new(vec![
            vec![a.clone(), a, BigInt::from(0)],
            vec![BigInt::from(0), BigInt::from(0), BigInt::from(1) << 30usize],
        ]);
        let two_53 = BigInt::from(1) << 53usize;
        let config = LLLConfig::default();

        let mut basis = input.clone();
        let outcome = LLL::reduce_with_removal(&mut basis, None, &(&two_53 + 1), &config).unwrap();
        assert_eq!(outcome.zeros, 1);
        assert_eq!(outcome.removed_below_bound, 1);
        assert_eq!(basis.vectors[0], input.vectors[0]);
        assert!(outcome.stats.exact_checks >= 1);

        let mut basis = input.clone();
        let outcome = LLL::reduce_with_removal(&mut basis, None, &two_53, &config).unwrap();
        assert_eq!(outcome.zeros, 0);
        assert_eq!(basis, input);
    }

    /// Reduce with a transform and check nothing at all changed
    fn assert_unchanged(input: &LatticeBasis, config: &LLLConfig) -> ReductionOutcome {
        assert!(LLL::is_reduced(input, config));
        let mut basis = input.clone();
        let mut transform = LatticeBasis::identity(input.n);
        let outcome = LLL::reduce_in_place(&mut basis, Some(&mut transform), config).unwrap();

        assert_eq!(&basis, input);
        assert_eq!(transform, LatticeBasis::identity(input.n));
        assert_eq!(outcome.stats.swaps, 0);
        assert_eq!(outcome.stats.size_reductions, 0);
        outcome
    }

    #[test]
    fn test_lovasz_inside_margin_keeps_basis() {
        // 0.75 · 16 ≤ 9 + (1/2)² · 16 = 13, but 13 < 0.875 · 16
        let input = LatticeBasis::from_rows(&[vec![4i64, 0], vec![2, 3]]);
        let outcome = assert_unchanged(&input, &LLLConfig::fast());
        assert_eq!(outcome.stats.exact_checks, 1);
    }

    #[test]
    fn test_size_reduction_inside_margin_keeps_basis() {
        // μ = 0.51 = η, above the floating threshold 0.505
        let input = LatticeBasis::from_rows(&[vec![100i64, 0], vec![51, 100]]);
        let outcome = assert_unchanged(&input, &LLLConfig::default());
        assert_eq!(outcome.stats.exact_checks, 1);

        // just past η the row is still reduced
        let mut basis = LatticeBasis::from_rows(&[vec![100i64, 0], vec![52, 100]]);
        let outcome = LLL::reduce_in_place(&mut basis, None, &LLLConfig::default()).unwrap();
        assert_eq!(outcome.stats.size_reductions, 1);
        assert_eq!(basis.vectors[1], vec![BigInt::from(-48), BigInt::from(100)]);
    }

    /// Makes the next `n` fast-tier passes on this thread fail
    struct ForcedFastFailures;

    impl ForcedFastFailures {
        fn set(n: usize) -> Self {
            FORCED_FAST_FAILURES.with(|pending| pending.set(n));
            Self
        }

        fn remaining(&self) -> usize {
            FORCED_FAST_FAILURES.with(|pending| pending.get())
        }
    }

    impl Drop for ForcedFastFailures {
        fn drop(&mut self) {
            FORCED_FAST_FAILURES.with(|pending| pending.set(0));
        }
    }

    #[test]
    fn test_fast_failure_retried_with_exact_products() {
        let _forced = ForcedFastFailures::set(usize::MAX);
        let input = LatticeBasis::from_rows(&[vec![201i64, 37], vec![37, 7]]);
        let mut basis = input.clone();
        let mut transform = LatticeBasis::identity(2);
        let config = LLLConfig::default();

        let outcome = LLL::reduce_in_place(&mut basis, Some(&mut transform), &config).unwrap();

        assert!(outcome.stats.escalations > 0);
        assert_eq!(outcome.stats.exact_products, 0);
        assert!(LLL::is_reduced(&basis, &config));
        assert_eq!(basis.norm_squared(0), BigInt::from(34));
        assert_eq!(basis.norm_squared(1), BigInt::from(50));
        assert_eq!(transform.mul(&input).unwrap(), basis);
    }

    #[test]
    fn test_single_fast_failure_recovers() {
        let forced = ForcedFastFailures::set(1);
        let input = LatticeBasis::random_seeded(8, 8, 20, 5);
        let config = LLLConfig::default();

        let (reduced, outcome) = LLL::reduce(&input, &config).unwrap();

        assert_eq!(outcome.stats.escalations, 1);
        assert_eq!(forced.remaining(), 0);
        assert!(LLL::is_reduced_with_removal(&reduced, outcome.zeros, &config));
    }

    #[test]
    fn test_fast_failures_saturate() {
        let input = LatticeBasis::random_seeded(8, 8, 20, 5);

        for limit in [1, 3] {
            let forced = ForcedFastFailures::set(usize::MAX);
            let config = LLLConfig {
                fast_failure_limit: limit,
                ..Default::default()
            };
            let (reduced, outcome) = LLL::reduce(&input, &config).unwrap();

            // once the limit is hit no row tries the fast tier again
            assert_eq!(outcome.stats.escalations, limit);
            assert_eq!(forced.remaining(), usize::MAX - limit);
            assert!(LLL::is_reduced_with_removal(&reduced, outcome.zeros, &config));
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let original = LatticeBasis::from_rows(&[vec![5i64, 3], vec![2, 2]]);

        for (delta, eta) in [(0.25, 0.51), (1.0, 0.51), (0.99, 0.49), (0.3, 0.55), (f64::NAN, 0.51)] {
            let mut basis = original.clone();
            let config = LLLConfig {
                delta,
                eta,
                ..Default::default()
            };
            let err = LLL::reduce_in_place(&mut basis, None, &config).unwrap_err();
            assert!(matches!(err, LllError::InvalidParameter(_)));
            assert_eq!(basis, original);
        }
    }

    #[test]
    fn test_precision_exhausted() {
        let mut basis = LatticeBasis::from_rows(&[vec![201i64, 37], vec![37, 7]]);
        let config = LLLConfig {
            gram_schmidt: GramSchmidtMode::Exact,
            babai_loop_limit: 1,
            ..Default::default()
        };
        let err = LLL::reduce_in_place(&mut basis, None, &config).unwrap_err();
        assert_eq!(err, LllError::PrecisionExhausted { kappa: 1 });
    }
}
