//! Proximal-point bundle method.

use ndarray::Array1;

use super::buffer::{CuttingPlaneBuffer, Plane};
use super::{
    gap_threshold, immediate_cap_result, master, regularized_objective, BundleSolver, ExitStatus,
    RiskOracle, TrainingResult,
};
use crate::training::logger::TrainingLogger;
use crate::training::options::BundleParams;

/// Bundle method with proximal stabilization.
///
/// The master problem carries an extra term `mu/2 ||w - center||^2` around
/// the current prox center, damping the oscillation the classic method shows
/// on flat risks. The center moves only on serious steps: when the actual
/// objective decrease reaches the fraction `k` of the decrease the
/// cutting-plane model predicted. The duality gap is still measured against
/// the unstabilized master bound, so the convergence criterion matches the
/// classic variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximalBundle;

impl BundleSolver for ProximalBundle {
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
        logger.start_training("proximal-point", cfg.max_outer_iterations);

        let dim = w0.len();
        let mut buffer = CuttingPlaneBuffer::new(
            cfg.buffer_capacity,
            cfg.remove_inactive,
            cfg.inactive_age_threshold,
        );
        let mut trace = params.store_trace.then(Vec::new);

        // Proximal weight on the same scale as the regularizer.
        let mu = params.lambda;

        let mut w = w0;
        let mut subgrad = Array1::zeros(dim);
        let risk = oracle.risk(w.view(), &mut subgrad);
        let mut f_best = regularized_objective(params.lambda, &w, risk);
        let mut w_best = w.clone();
        let mut center = w.clone();
        let mut f_center = f_best;

        let mut status = ExitStatus::MaxIterExceeded;
        let mut n_iterations = 0;

        if buffer
            .insert(Plane::new(subgrad.clone(), risk - subgrad.dot(&w)))
            .is_err()
        {
            status = ExitStatus::Infeasible;
        } else {
            while n_iterations < cfg.max_outer_iterations {
                n_iterations += 1;

                // The stabilized solve drives the iterate, the unstabilized
                // one supplies the lower bound for the gap.
                let prox_sol = match master::solve(
                    buffer.planes(),
                    params.lambda,
                    Some((mu, center.view())),
                ) {
                    Ok(sol) => sol,
                    Err(_) => {
                        status = ExitStatus::Infeasible;
                        break;
                    }
                };
                let bound = match master::solve(buffer.planes(), params.lambda, None) {
                    Ok(sol) => sol.objective,
                    Err(_) => {
                        status = ExitStatus::Infeasible;
                        break;
                    }
                };
                buffer.update_activity(&prox_sol.alpha);
                w = prox_sol.w;

                let risk = oracle.risk(w.view(), &mut subgrad);
                let f = regularized_objective(params.lambda, &w, risk);
                if f < f_best {
                    f_best = f;
                    w_best = w.clone();
                }
                if let Some(trace) = trace.as_mut() {
                    trace.push(f_best);
                }

                let gap = f_best - bound;
                logger.log_iteration(n_iterations, f_best, gap);
                if gap <= gap_threshold(params, f_best) {
                    status = ExitStatus::Converged;
                    break;
                }

                // Serious step: the model predicted f_center - prox objective;
                // move the center once the fraction k of it is realized.
                let predicted = f_center - prox_sol.objective;
                if f_center - f >= cfg.k * predicted {
                    center = w.clone();
                    f_center = f;
                }

                if buffer
                    .insert(Plane::new(subgrad.clone(), risk - subgrad.dot(&w)))
                    .is_err()
                {
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
