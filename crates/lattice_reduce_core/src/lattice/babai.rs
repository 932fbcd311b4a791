//! Size reduction of one row against the active prefix
//!
//! The row is reduced with floating Gram-Schmidt coefficients and updated
//! exactly, then its coefficients are recomputed from scratch; the pass
//! repeats until nothing changes. A pass that keeps changing the row without
//! shrinking it means the floating data can no longer be trusted.

use super::approx::ldexp;
use super::lll::{ReductionContext, RECHECK_SLACK};
use log::trace;
use num_bigint::BigInt;
use num_traits::FromPrimitive;

/// Where scalar products come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// `f64` products of the approximate rows, exact only on cancellation
    Fast,
    /// Exact integer products rounded to `f64`
    Heuristic,
}

#[cfg(test)]
thread_local! {
    /// Fast-tier passes still to be failed on purpose
    pub(super) static FORCED_FAST_FAILURES: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Consume one forced fast-tier failure, if any are pending
#[cfg(test)]
fn take_forced_failure() -> bool {
    FORCED_FAST_FAILURES.with(|pending| {
        let n = pending.get();
        if n > 0 {
            pending.set(n - 1);
        }
        n > 0
    })
}

#[cfg(not(test))]
fn take_forced_failure() -> bool {
    false
}

/// Result of size-reducing one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BabaiOutcome {
    /// The row is size-reduced and its partial sums `s` are filled
    Reduced,
    /// The floating data was not good enough; retry at a higher tier
    PrecisionInsufficient,
    /// The row became the zero vector
    Zero,
}

impl ReductionContext<'_> {
    /// Size-reduce row `kappa` against rows `[zeros, kappa)`
    pub(super) fn babai(&mut self, kappa: usize, precision: Precision) -> BabaiOutcome {
        if precision == Precision::Fast && take_forced_failure() {
            return BabaiOutcome::PrecisionInsufficient;
        }

        let zeros = self.zeros;
        let mut best_expo = self.approx.expo(kappa);
        let mut stalled = 0;
        let mut loops = 0;

        loop {
            loops += 1;
            self.stats.babai_loops += 1;
            if loops > self.config.babai_loop_limit {
                trace!("row {}: loop limit reached ({:?})", kappa, precision);
                return BabaiOutcome::PrecisionInsufficient;
            }

            if !self.recompute_row(kappa, precision) {
                return BabaiOutcome::PrecisionInsufficient;
            }

            match self.reduce_row(kappa) {
                None => return BabaiOutcome::PrecisionInsufficient,
                Some(false) => break,
                Some(true) => {}
            }

            self.approx.refresh(self.basis.basis(), kappa);
            self.cache.invalidate_row(kappa, zeros);

            let expo = self.approx.expo(kappa);
            if expo < best_expo {
                best_expo = expo;
                stalled = 0;
            } else {
                stalled += 1;
                if stalled > self.config.stall_loops {
                    trace!("row {}: stalled at exponent {} ({:?})", kappa, expo, precision);
                    return BabaiOutcome::PrecisionInsufficient;
                }
            }
        }

        if self.basis.basis().is_zero_row(kappa) {
            return BabaiOutcome::Zero;
        }

        let norm = self.scalar_product(kappa, kappa, precision);
        let cache = &mut self.cache;
        cache.s[zeros] = norm;
        for t in zeros..kappa {
            cache.s[t + 1] = cache.s[t] - cache.mu[kappa][t] * cache.r[kappa][t];
        }
        BabaiOutcome::Reduced
    }

    /// Bring `r[kappa][..kappa]` and `mu[kappa][..kappa]` up to date
    ///
    /// Returns `false` on a non-finite value or a non-positive diagonal.
    fn recompute_row(&mut self, kappa: usize, precision: Precision) -> bool {
        let zeros = self.zeros;
        for j in self.cache.stale_from(kappa, zeros)..kappa {
            let sp = self.scalar_product(kappa, j, precision);

            let cache = &mut self.cache;
            let rkj = (zeros..j).fold(sp, |acc, t| acc - cache.mu[j][t] * cache.r[kappa][t]);
            let rjj = cache.r[j][j];
            if !rkj.is_finite() || rjj.is_nan() || rjj <= 0.0 {
                return false;
            }

            let mu = rkj / rjj;
            if !mu.is_finite() {
                return false;
            }
            cache.r[kappa][j] = rkj;
            cache.mu[kappa][j] = mu;
        }
        self.cache.mark_valid(kappa, kappa);
        true
    }

    /// One size-reduction pass, from `kappa - 1` down to `zeros`
    ///
    /// Returns whether the row changed, or `None` when a coefficient is not
    /// finite.
    fn reduce_row(&mut self, kappa: usize) -> Option<bool> {
        let zeros = self.zeros;
        let ek = self.approx.expo(kappa);
        let mut changed = false;

        for j in (zeros..kappa).rev() {
            let ej = self.approx.expo(j);
            let x = ldexp(self.cache.mu[kappa][j], ek - ej);
            if !x.is_finite() {
                return None;
            }
            if x.abs() <= self.halfplus {
                continue;
            }
            if x.abs() <= self.config.eta * (1.0 + RECHECK_SLACK) && self.size_reduced_exactly(kappa, j) {
                continue;
            }

            let q = x.round();
            for t in zeros..j {
                let update = q * ldexp(self.cache.mu[j][t], ej - ek);
                self.cache.mu[kappa][t] -= update;
            }

            if q == 1.0 {
                self.basis.sub_row(kappa, j);
            } else if q == -1.0 {
                self.basis.add_row(kappa, j);
            } else {
                self.basis.sub_mul_row(kappa, j, &BigInt::from_f64(q)?);
            }
            self.stats.size_reductions += 1;
            changed = true;
        }

        Some(changed)
    }
}
