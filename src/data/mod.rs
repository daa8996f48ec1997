//! Data containers for training and prediction.
//!
//! The core type is [`Dataset`]: a feature matrix plus optional class labels.
//!
//! # Storage Layout
//!
//! Features are stored in **feature-major** layout: `[n_features, n_samples]`.
//! Each feature's values across all samples are contiguous in memory, and one
//! sample is one column. Trainers and predictors all consume this layout.

mod dataset;

pub use dataset::Dataset;
