//! Training infrastructure.
//!
//! Two training paths share the model types:
//!
//! ## Logistic path
//!
//! - [`MulticlassTrainer`]: one linear discriminant per class through a
//!   single joint solve, warm-started from the previous bank
//! - [`JointOptimizer`] / [`BatchLogistic`]: the joint optimization oracle
//!   and its reference implementation
//! - [`SolverOptions`]: tolerance, iteration cap, warm start
//!
//! ## Structured path
//!
//! - [`StructuredTrainer`] / [`StructuredModel`]: bundle-method training
//!   over a loss/subgradient oracle
//! - [`SolverVariant`]: selects one of the four bundle strategies
//! - [`BundleParams`] / [`CuttingPlaneConfig`]: tolerances, buffer sizing,
//!   cleanup policy
//! - [`TrainingResult`] / [`ExitStatus`]: terminal states and diagnostics
//!
//! ## Shared Infrastructure
//!
//! - [`TrainingLogger`], [`Verbosity`]: structured logging

pub mod bundle;
mod logger;
pub mod logistic;
mod multiclass;
mod options;
mod structured;

pub use bundle::{
    BundleSolver, ClassicBundle, ExitStatus, MultiPlaneBundle, NonConvexBundle, ProximalBundle,
    RiskOracle, SolverVariant, TrainingResult,
};
pub use logger::{TrainingLogger, Verbosity};
pub use logistic::{BatchLogistic, JointOptimizer, JointSolution};
pub use multiclass::{MulticlassParams, MulticlassTrainer};
pub use options::{BundleParams, CuttingPlaneConfig, SolverOptions};
pub use structured::{StructuredModel, StructuredTrainer};
