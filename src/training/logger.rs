//! Verbosity-gated training log output.
//!
//! Emits through the `log` facade so library users control the sink.

use std::fmt::Display;

use log::{debug, info};

/// Verbosity level for training output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verbosity {
    /// No training output.
    Silent,
    /// Start/finish summaries.
    #[default]
    Info,
    /// Per-iteration objective and gap lines.
    Debug,
}

/// Structured logging for training runs.
#[derive(Debug, Clone)]
pub struct TrainingLogger {
    verbosity: Verbosity,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Log the start of a training run.
    pub fn start_training(&self, solver: &str, max_iterations: usize) {
        if self.verbosity >= Verbosity::Info {
            info!("training started: solver={solver}, max_iterations={max_iterations}");
        }
    }

    /// Log one outer iteration.
    pub fn log_iteration(&self, iteration: usize, objective: f64, gap: f64) {
        if self.verbosity >= Verbosity::Debug {
            debug!("iter {iteration}: objective={objective:.6e} gap={gap:.6e}");
        }
    }

    /// Log the end of a training run with its terminal state.
    pub fn finish_training(&self, status: impl Display, n_iterations: usize) {
        if self.verbosity >= Verbosity::Info {
            info!("training finished: status={status}, iterations={n_iterations}");
        }
    }
}
