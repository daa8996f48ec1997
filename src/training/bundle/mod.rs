//! Bundle-method solvers for regularized risk minimization.
//!
//! A bundle solver minimizes `lambda/2 ||w||^2 + R(w)` for a convex (or, for
//! one variant, non-convex) risk `R` queried through a [`RiskOracle`]. Each
//! outer iteration accumulates a cutting plane from the oracle, solves the
//! master problem over the accumulated planes, and stops once the duality-gap
//! estimate falls below `max(tol_rel * |objective|, tol_abs)`.
//!
//! Four master-problem strategies are available, selected by value through
//! [`SolverVariant`]:
//!
//! - [`ClassicBundle`]: flat aggregation with a single active set
//! - [`ProximalBundle`]: proximal stabilization around the current iterate
//! - [`MultiPlaneBundle`]: several independent cutting-plane models solved
//!   simultaneously
//! - [`NonConvexBundle`]: relaxed convexity assumption plus a line search
//!   after each master solve
//!
//! All variants share the cutting-plane buffer contract (capacity bound,
//! inactive-plane eviction, the newest plane is never evicted) and the
//! terminal-state taxonomy ([`ExitStatus`]). A solver run owns its buffer for
//! the whole call; nothing is shared across calls.

mod buffer;
mod classic;
mod master;
mod multiplane;
mod nonconvex;
mod proximal;

pub use classic::ClassicBundle;
pub use multiplane::MultiPlaneBundle;
pub use nonconvex::NonConvexBundle;
pub use proximal::ProximalBundle;

use std::fmt;

use ndarray::{Array1, ArrayView1};

use crate::training::options::BundleParams;

/// Terminal state of one bundle-solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The duality-gap estimate dropped below the configured tolerance.
    Converged,
    /// The outer iteration cap was reached first; the best iterate found is
    /// still returned and usable.
    MaxIterExceeded,
    /// The master problem could not be solved. The caller's model must be
    /// left unchanged.
    Infeasible,
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Converged => write!(f, "converged"),
            ExitStatus::MaxIterExceeded => write!(f, "max iterations exceeded"),
            ExitStatus::Infeasible => write!(f, "infeasible"),
        }
    }
}

/// Outcome of one bundle-solver run.
#[derive(Debug, Clone)]
pub struct TrainingResult {
    /// Best iterate found.
    pub weights: Array1<f64>,
    /// Terminal state of the run.
    pub exit_status: ExitStatus,
    /// Outer iterations spent.
    pub n_iterations: usize,
    /// Best objective per outer iteration; present only when
    /// `BundleParams::store_trace` is set.
    pub objective_trace: Option<Vec<f64>>,
}

impl TrainingResult {
    /// True when `weights` is a usable iterate (`Converged` or
    /// `MaxIterExceeded`).
    pub fn is_usable(&self) -> bool {
        self.exit_status != ExitStatus::Infeasible
    }
}

/// The loss/subgradient oracle a bundle solver queries each iteration.
pub trait RiskOracle {
    /// Evaluate the empirical risk at `w` and write a subgradient into
    /// `subgrad` (same length as `w`).
    fn risk(&mut self, w: ArrayView1<f64>, subgrad: &mut Array1<f64>) -> f64;
}

/// Master-problem strategy: one capability, four implementations.
///
/// A solver runs the whole bundle iteration from `w0` to a terminal state.
/// `Infeasible` is reported through the result, not an error: the decision
/// how to react belongs to the caller.
pub trait BundleSolver {
    fn solve(
        &self,
        oracle: &mut dyn RiskOracle,
        w0: Array1<f64>,
        params: &BundleParams,
    ) -> TrainingResult;
}

/// Solver strategy selection. A value tag, not an inheritance root: the
/// variant is fixed for a whole training call and maps to exactly one
/// [`BundleSolver`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverVariant {
    /// Flat cutting-plane aggregation with a single active set.
    #[default]
    Classic,
    /// Proximal stabilization around the current iterate.
    ProximalPoint,
    /// Several independent cutting-plane models, aggregated.
    MultiPlaneModel,
    /// Relaxed convexity assumption plus a line search per master solve.
    NonConvex,
}

impl SolverVariant {
    /// Resolve the dispatch target. The match is exhaustive: every variant
    /// maps to exactly one execution path.
    pub fn solver(&self) -> Box<dyn BundleSolver> {
        match self {
            SolverVariant::Classic => Box::new(ClassicBundle),
            SolverVariant::ProximalPoint => Box::new(ProximalBundle),
            SolverVariant::MultiPlaneModel => Box::new(MultiPlaneBundle),
            SolverVariant::NonConvex => Box::new(NonConvexBundle),
        }
    }

    /// Short name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            SolverVariant::Classic => "classic",
            SolverVariant::ProximalPoint => "proximal-point",
            SolverVariant::MultiPlaneModel => "multi-plane",
            SolverVariant::NonConvex => "non-convex",
        }
    }
}

/// Regularized objective `lambda/2 ||w||^2 + R(w)`.
pub(crate) fn regularized_objective(lambda: f64, w: &Array1<f64>, risk: f64) -> f64 {
    0.5 * lambda * w.dot(w) + risk
}

/// Convergence threshold for the duality gap at the given objective scale.
pub(crate) fn gap_threshold(params: &BundleParams, objective: f64) -> f64 {
    f64::max(params.tol_rel * objective.abs(), params.tol_abs)
}

/// Result for a run capped at zero outer iterations: the warm start is
/// returned untouched, before any oracle call.
pub(crate) fn immediate_cap_result(w0: Array1<f64>, params: &BundleParams) -> TrainingResult {
    TrainingResult {
        weights: w0,
        exit_status: ExitStatus::MaxIterExceeded,
        n_iterations: 0,
        objective_trace: params.store_trace.then(Vec::new),
    }
}

#[cfg(test)]
pub(crate) mod test_oracles {
    use super::RiskOracle;
    use ndarray::{Array1, ArrayView1};

    /// 1-d piecewise-linear risk `|w - target|`; minimum of the regularized
    /// objective sits at `w = target` for small lambda.
    pub struct AbsRisk {
        pub target: f64,
    }

    impl RiskOracle for AbsRisk {
        fn risk(&mut self, w: ArrayView1<f64>, subgrad: &mut Array1<f64>) -> f64 {
            let d = w[0] - self.target;
            subgrad[0] = if d >= 0.0 { 1.0 } else { -1.0 };
            d.abs()
        }
    }

    /// Oracle returning NaN; drives the master solve into `Infeasible`.
    pub struct NanRisk;

    impl RiskOracle for NanRisk {
        fn risk(&mut self, _w: ArrayView1<f64>, subgrad: &mut Array1<f64>) -> f64 {
            subgrad.fill(f64::NAN);
            f64::NAN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names_are_distinct() {
        let variants = [
            SolverVariant::Classic,
            SolverVariant::ProximalPoint,
            SolverVariant::MultiPlaneModel,
            SolverVariant::NonConvex,
        ];
        for (i, a) in variants.iter().enumerate() {
            for b in &variants[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn gap_threshold_takes_the_larger_tolerance() {
        let params = BundleParams {
            tol_rel: 1e-2,
            tol_abs: 0.5,
            ..Default::default()
        };
        // Relative part: 1e-2 * 10 = 0.1 < 0.5.
        assert_eq!(gap_threshold(&params, 10.0), 0.5);
        // Relative part: 1e-2 * 100 = 1.0 > 0.5.
        assert_eq!(gap_threshold(&params, 100.0), 1.0);
    }

    #[test]
    fn usable_statuses() {
        let result = |status| TrainingResult {
            weights: ndarray::Array1::zeros(1),
            exit_status: status,
            n_iterations: 0,
            objective_trace: None,
        };
        assert!(result(ExitStatus::Converged).is_usable());
        assert!(result(ExitStatus::MaxIterExceeded).is_usable());
        assert!(!result(ExitStatus::Infeasible).is_usable());
    }
}
