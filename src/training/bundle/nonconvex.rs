//! Bundle method for non-convex risks.

use ndarray::Array1;

use super::buffer::{CuttingPlaneBuffer, Plane};
use super::{
    gap_threshold, immediate_cap_result, master, regularized_objective, BundleSolver, ExitStatus,
    RiskOracle, TrainingResult,
};
use crate::training::logger::TrainingLogger;
use crate::training::options::BundleParams;

/// Number of step halvings tried per line search.
const LINE_SEARCH_STEPS: u32 = 7;

/// Bundle method without the convexity assumption on the master model.
///
/// Shares the classic buffer-management policy, with two additions per outer
/// iteration:
///
/// - a backtracking line search from the incumbent towards the master
///   solution, accepting a step once the fraction `k` of the model-predicted
///   decrease is realized (the best trial point is kept otherwise);
/// - a conservative plane offset: a cut produced by a non-convex risk may
///   pass above the incumbent, so its offset is lowered until the plane is
///   valid at the incumbent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonConvexBundle;

impl BundleSolver for NonConvexBundle {
    fn solve(
        &self,
        oracle: &mut dyn RiskOracle,
        w0: Array1<f64>,
        params: &BundleParams,
    ) -> TrainingResult {
        let cfg = &params.buffer;
        if cfg.max_outer_iterations == 0 {
            return immediate_cap_result(w0, params);
        }

        let logger = TrainingLogger::new(params.verbosity);
        logger.start_training("non-convex", cfg.max_outer_iterations);

        let dim = w0.len();
        let mut buffer = CuttingPlaneBuffer::new(
            cfg.buffer_capacity,
            cfg.remove_inactive,
            cfg.inactive_age_threshold,
        );
        let mut trace = params.store_trace.then(Vec::new);

        let mut subgrad = Array1::zeros(dim);
        let risk = oracle.risk(w0.view(), &mut subgrad);
        let mut f_best = regularized_objective(params.lambda, &w0, risk);
        let mut w_best = w0.clone();
        let mut risk_best = risk;

        let mut status = ExitStatus::MaxIterExceeded;
        let mut n_iterations = 0;

        if buffer
            .insert(Plane::new(subgrad.clone(), risk - subgrad.dot(&w0)))
            .is_err()
        {
            status = ExitStatus::Infeasible;
        } else {
            while n_iterations < cfg.max_outer_iterations {
                n_iterations += 1;

                let sol = match master::solve(buffer.planes(), params.lambda, None) {
                    Ok(sol) => sol,
                    Err(_) => {
                        status = ExitStatus::Infeasible;
                        break;
                    }
                };
                buffer.update_activity(&sol.alpha);

                // Line search from the incumbent towards the master solution.
                let direction = &sol.w - &w_best;
                let predicted = f_best - sol.objective;

                let mut w = sol.w;
                let mut f = {
                    let risk = oracle.risk(w.view(), &mut subgrad);
                    regularized_objective(params.lambda, &w, risk)
                };
                let mut step = 1.0;
                for _ in 0..LINE_SEARCH_STEPS {
                    if f <= f_best - cfg.k * step * predicted {
                        break;
                    }
                    step *= 0.5;
                    let candidate = &w_best + &direction.mapv(|d| d * step);
                    let candidate_risk = oracle.risk(candidate.view(), &mut subgrad);
                    let candidate_f =
                        regularized_objective(params.lambda, &candidate, candidate_risk);
                    if candidate_f < f {
                        w = candidate;
                        f = candidate_f;
                    }
                }
                // Re-query at the accepted point: the last oracle call may
                // have been a rejected trial, and the plane below needs the
                // matching risk and subgradient.
                let risk = oracle.risk(w.view(), &mut subgrad);

                if f < f_best {
                    f_best = f;
                    w_best = w.clone();
                    risk_best = risk;
                }
                if let Some(trace) = trace.as_mut() {
                    trace.push(f_best);
                }

                let gap = f_best - sol.objective;
                logger.log_iteration(n_iterations, f_best, gap);
                if gap <= gap_threshold(params, f_best) {
                    status = ExitStatus::Converged;
                    break;
                }

                // A non-convex cut may pass above the incumbent; lower its
                // offset until it is valid there.
                let mut offset = risk - subgrad.dot(&w);
                let at_incumbent = subgrad.dot(&w_best) + offset;
                if at_incumbent > risk_best {
                    offset -= at_incumbent - risk_best;
                }

                if buffer.insert(Plane::new(subgrad.clone(), offset)).is_err() {
                    status = ExitStatus::Infeasible;
                    break;
                }
            }
        }

        logger.finish_training(status, n_iterations);
        TrainingResult {
            weights: w_best,
            exit_status: status,
            n_iterations,
            objective_trace: trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::bundle::test_oracles::{AbsRisk, NanRisk};
    use crate::training::bundle::RiskOracle;
    use crate::training::logger::Verbosity;
    use crate::training::options::CuttingPlaneConfig;
    use ndarray::{array, ArrayView1};

    fn quiet_params() -> BundleParams {
        BundleParams {
            lambda: 0.01,
            verbosity: Verbosity::Silent,
            ..Default::default()
        }
    }

    #[test]
    fn converges_on_piecewise_linear_risk() {
        let mut oracle = AbsRisk { target: 1.0 };
        let result = NonConvexBundle.solve(&mut oracle, array![0.0], &quiet_params());

        assert_eq!(result.exit_status, ExitStatus::Converged);
        assert!((result.weights[0] - 1.0).abs() < 0.1);
    }

    /// Concave-kink risk `min(|w|, 1)`: non-convex, with plateaus the plain
    /// cutting-plane model would over-cut.
    struct CappedAbsRisk;

    impl RiskOracle for CappedAbsRisk {
        fn risk(&mut self, w: ArrayView1<f64>, subgrad: &mut Array1<f64>) -> f64 {
            let v = w[0].abs();
            if v >= 1.0 {
                subgrad[0] = 0.0;
                1.0
            } else {
                subgrad[0] = w[0].signum();
                v
            }
        }
    }

    #[test]
    fn nonconvex_risk_reaches_a_minimum() {
        let mut oracle = CappedAbsRisk;
        let result = NonConvexBundle.solve(&mut oracle, array![2.0], &quiet_params());

        assert!(result.is_usable());
        // The global minimum region of 0.005 w^2 + min(|w|, 1) is w = 0.
        let f = 0.005 * result.weights[0].powi(2)
            + result.weights[0].abs().min(1.0);
        assert!(f <= 1.0 + 1e-9, "no worse than the starting plateau");
    }

    #[test]
    fn zero_iteration_cap_returns_warm_start() {
        let mut oracle = AbsRisk { target: 1.0 };
        let params = BundleParams {
            buffer: CuttingPlaneConfig {
                max_outer_iterations: 0,
                ..Default::default()
            },
            ..quiet_params()
        };
        let result = NonConvexBundle.solve(&mut oracle, array![1.5], &params);

        assert_eq!(result.exit_status, ExitStatus::MaxIterExceeded);
        assert_eq!(result.weights[0], 1.5);
    }

    #[test]
    fn nan_risk_reports_infeasible() {
        let mut oracle = NanRisk;
        let result = NonConvexBundle.solve(&mut oracle, array![0.0], &quiet_params());
        assert_eq!(result.exit_status, ExitStatus::Infeasible);
    }
}
