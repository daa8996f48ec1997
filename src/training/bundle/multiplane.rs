//! Multiple simultaneous cutting-plane models.

use ndarray::Array1;
use rayon::prelude::*;

use super::buffer::{CuttingPlaneBuffer, Plane};
use super::master::MasterSolution;
use super::{
    gap_threshold, immediate_cap_result, master, regularized_objective, BundleSolver, ExitStatus,
    RiskOracle, TrainingResult,
};
use crate::training::logger::TrainingLogger;
use crate::training::options::BundleParams;

/// Bundle method over `num_cutting_plane_models` independent cutting-plane
/// models.
///
/// New planes are admitted round-robin, so each model sees every n-th cut.
/// Each outer iteration solves all per-model master problems (in parallel on
/// the rayon pool) and aggregates their minimizers into the next iterate.
/// Every model underestimates the same risk, so the tightest per-model master
/// objective is a valid lower bound and drives the duality gap. With one
/// model this reduces to the classic method.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiPlaneBundle;

impl BundleSolver for MultiPlaneBundle {
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
        logger.start_training("multi-plane", cfg.max_outer_iterations);

        let n_models = cfg.num_cutting_plane_models;
        debug_assert!(n_models >= 1, "validated before dispatch");

        let dim = w0.len();
        let mut buffers: Vec<CuttingPlaneBuffer> = (0..n_models)
            .map(|_| {
                CuttingPlaneBuffer::new(
                    cfg.buffer_capacity,
                    cfg.remove_inactive,
                    cfg.inactive_age_threshold,
                )
            })
            .collect();
        let mut trace = params.store_trace.then(Vec::new);

        let mut w = w0;
        let mut subgrad = Array1::zeros(dim);
        let risk = oracle.risk(w.view(), &mut subgrad);
        let mut f_best = regularized_objective(params.lambda, &w, risk);
        let mut w_best = w.clone();

        let mut status = ExitStatus::MaxIterExceeded;
        let mut n_iterations = 0;

        // Every model starts from the cut at the initial iterate.
        let initial = Plane::new(subgrad.clone(), risk - subgrad.dot(&w));
        let seeded = buffers
            .iter_mut()
            .all(|buffer| buffer.insert(initial.clone()).is_ok());

        if !seeded {
            status = ExitStatus::Infeasible;
        } else {
            while n_iterations < cfg.max_outer_iterations {
                n_iterations += 1;

                let solves: Vec<Result<MasterSolution, master::MasterError>> = buffers
                    .par_iter()
                    .map(|buffer| master::solve(buffer.planes(), params.lambda, None))
                    .collect();

                let mut solutions = Vec::with_capacity(n_models);
                let mut failed = false;
                for solve in solves {
                    match solve {
                        Ok(sol) => solutions.push(sol),
                        Err(_) => {
                            failed = true;
                            break;
                        }
                    }
                }
                if failed {
                    status = ExitStatus::Infeasible;
                    break;
                }

                for (buffer, sol) in buffers.iter_mut().zip(&solutions) {
                    buffer.update_activity(&sol.alpha);
                }

                // Aggregate the per-model minimizers; the tightest master
                // objective is the lower bound.
                let mut aggregated = Array1::zeros(dim);
                let mut bound = f64::NEG_INFINITY;
                for sol in &solutions {
                    aggregated += &sol.w;
                    bound = bound.max(sol.objective);
                }
                aggregated.mapv_inplace(|x| x / n_models as f64);
                w = aggregated;

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

                let target = (n_iterations - 1) % n_models;
                if buffers[target]
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
