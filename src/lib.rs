//! bundlers: multiclass linear discriminant training for Rust.
//!
//! Trains banks of linear discriminant models two ways: a jointly
//! regularized multiclass logistic-regression path and a structured-output
//! path driven by a family of cutting-plane (bundle) solvers. Both paths are
//! warm-startable: a previously trained model bank seeds the next solve so
//! incremental retraining spends fewer iterations.
//!
//! # Key Types
//!
//! - [`MulticlassTrainer`] - logistic path: one [`LinearModel`] per class
//!   via a shared joint optimizer
//! - [`StructuredTrainer`] / [`StructuredModel`] - structured-output path
//!   over a loss/subgradient oracle
//! - [`SolverVariant`] - selects one of the four bundle strategies
//! - [`ModelBank`] - the per-class models, replaced atomically per fit
//! - [`Dataset`] - feature-major data handling
//!
//! # Training
//!
//! Build a [`MulticlassParams`] (or [`BundleParams`]) with struct update
//! syntax, construct the trainer, call `train`. See the [`training`] module
//! for details.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod error;
pub mod model;
pub mod testing;
pub mod training;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level trainer types
pub use training::{MulticlassParams, MulticlassTrainer, StructuredModel, StructuredTrainer};

// Solver configuration and outcomes
pub use training::{
    BundleParams, CuttingPlaneConfig, ExitStatus, SolverOptions, SolverVariant, TrainingResult,
    Verbosity,
};

// Model types
pub use model::{LinearModel, ModelBank};

// Data handling
pub use data::Dataset;

// Errors
pub use error::Error;
