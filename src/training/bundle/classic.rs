//! Classic bundle method: flat cutting-plane aggregation.

use ndarray::Array1;

use super::buffer::{CuttingPlaneBuffer, Plane};
use super::{
    gap_threshold, immediate_cap_result, master, regularized_objective, BundleSolver, ExitStatus,
    RiskOracle, TrainingResult,
};
use crate::training::logger::TrainingLogger;
use crate::training::options::BundleParams;

/// Flat cutting-plane aggregation with a single active set.
///
/// The baseline strategy: one cutting-plane model, the master problem solved
/// over all buffered planes, no stabilization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicBundle;

impl BundleSolver for ClassicBundle {
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
        logger.start_training("classic", cfg.max_outer_iterations);

        let dim = w0.len();
        let mut buffer = CuttingPlaneBuffer::new(
            cfg.buffer_capacity,
            cfg.remove_inactive,
            cfg.inactive_age_threshold,
        );
        let mut trace = params.store_trace.then(Vec::new);

        let mut w = w0;
        let mut subgrad = Array1::zeros(dim);
        let risk = oracle.risk(w.view(), &mut subgrad);
        let mut f_best = regularized_objective(params.lambda, &w, risk);
        let mut w_best = w.clone();

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

                let sol = match master::solve(buffer.planes(), params.lambda, None) {
                    Ok(sol) => sol,
                    Err(_) => {
                        status = ExitStatus::Infeasible;
                        break;
                    }
                };
                buffer.update_activity(&sol.alpha);
                w = sol.w;

                let risk = oracle.risk(w.view(), &mut subgrad);
                let f = regularized_objective(params.lambda, &w, risk);
                if f < f_best {
                    f_best = f;
                    w_best = w.clone();
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
