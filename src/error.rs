//! Crate-wide error types.

use thiserror::Error;

/// Errors surfaced by the training entry points.
///
/// Every variant is a fatal precondition or configuration failure: nothing is
/// retried, and a returned error means no model state was replaced. Solver
/// outcomes that a caller may want to react to (`Infeasible`,
/// `MaxIterExceeded`) are reported through
/// [`ExitStatus`](crate::training::ExitStatus) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The dataset carries no samples or no features.
    #[error("dataset is empty: {n_features} features x {n_samples} samples")]
    EmptyDataset {
        n_features: usize,
        n_samples: usize,
    },

    /// Training was requested on a dataset without labels.
    #[error("no labels attached to the dataset")]
    MissingLabels,

    /// Multiclass training needs at least two classes.
    #[error("need at least 2 classes, labels resolve to {0}")]
    TooFewClasses(usize),

    /// Two containers that must agree on a dimension do not.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A warm-start bank's class count differs from the incoming label set's.
    ///
    /// The bank is left untouched when this is returned, so the previous
    /// models remain usable for prediction.
    #[error("class count changed since the last fit: bank has {bank}, labels resolve to {labels}")]
    ClassCountMismatch { bank: usize, labels: usize },

    /// Solver configuration rejected before any iteration ran.
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// The joint optimizer oracle failed. Fatal on the logistic path.
    #[error("joint optimizer failed: {0}")]
    Optimizer(String),
}
