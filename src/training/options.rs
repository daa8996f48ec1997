//! Configuration values for the two training paths.
//!
//! All of these are plain value objects: constructed per training call,
//! consumed once, never shared mutable state between calls.

use ndarray::{Array1, Array2};

use crate::error::Error;
use crate::training::logger::Verbosity;

/// Options for one joint-optimizer invocation (logistic path).
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    /// Convergence tolerance on the gradient max-norm.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Previous solution to resume from: `[dim, classes]` weights plus
    /// per-class biases.
    pub warm_start: Option<(Array2<f64>, Array1<f64>)>,
}

/// Cutting-plane buffer sizing and cleanup policy (structured path).
///
/// Shared by all four solver variants.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CuttingPlaneConfig {
    /// Maximum number of planes held at once. Must be positive.
    pub buffer_capacity: usize,
    /// Evict planes that stayed inactive past the age threshold when the
    /// buffer is full.
    pub remove_inactive: bool,
    /// Consecutive inactive master solves before a plane may be evicted.
    pub inactive_age_threshold: u32,
    /// Aggregation parameter K. The proximal-point variant uses it as the
    /// serious-step threshold, the non-convex variant as the line-search
    /// acceptance threshold; the other variants ignore it.
    pub k: f64,
    /// Outer iteration cap.
    pub max_outer_iterations: usize,
    /// Number of simultaneous cutting-plane models. Only consumed by
    /// `SolverVariant::MultiPlaneModel`; must be at least 1.
    pub num_cutting_plane_models: usize,
}

impl Default for CuttingPlaneConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1000,
            remove_inactive: true,
            inactive_age_threshold: 10,
            k: 0.4,
            max_outer_iterations: 100,
            num_cutting_plane_models: 1,
        }
    }
}

/// Parameters for one bundle-solver run.
#[derive(Debug, Clone)]
pub struct BundleParams {
    /// Relative duality-gap tolerance.
    pub tol_rel: f64,
    /// Absolute duality-gap tolerance.
    pub tol_abs: f64,
    /// Regularization constant lambda. Must be positive.
    pub lambda: f64,
    /// Buffer sizing and cleanup policy.
    pub buffer: CuttingPlaneConfig,
    /// Record the objective value per outer iteration.
    pub store_trace: bool,
    /// Training log verbosity.
    pub verbosity: Verbosity,
}

impl Default for BundleParams {
    fn default() -> Self {
        Self {
            tol_rel: 1e-3,
            tol_abs: 0.0,
            lambda: 1.0,
            buffer: CuttingPlaneConfig::default(),
            store_trace: false,
            verbosity: Verbosity::default(),
        }
    }
}

impl BundleParams {
    /// Reject invalid configuration before any iteration runs.
    pub fn validate(&self) -> Result<(), Error> {
        if self.lambda <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "lambda must be positive, got {}",
                self.lambda
            )));
        }
        if self.buffer.buffer_capacity == 0 {
            return Err(Error::InvalidConfig(
                "buffer_capacity must be positive".into(),
            ));
        }
        if self.buffer.num_cutting_plane_models == 0 {
            return Err(Error::InvalidConfig(
                "num_cutting_plane_models must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
