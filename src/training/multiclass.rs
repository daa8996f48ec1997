//! Multiclass logistic-regression trainer.

use ndarray::{ArrayView1, ArrayView2};

use crate::data::Dataset;
use crate::error::Error;
use crate::model::{assemble, ModelBank};
use crate::training::logger::{TrainingLogger, Verbosity};
use crate::training::logistic::{BatchLogistic, JointOptimizer};
use crate::training::options::SolverOptions;

/// Parameters for multiclass logistic-regression training.
#[derive(Debug, Clone)]
pub struct MulticlassParams {
    /// Regularization constant z.
    pub z: f64,
    /// Convergence tolerance epsilon, applied to the optimizer's gradient
    /// max-norm.
    pub epsilon: f64,
    /// Iteration cap for the joint optimizer.
    pub max_iter: usize,
    /// Training log verbosity.
    pub verbosity: Verbosity,
}

impl Default for MulticlassParams {
    fn default() -> Self {
        Self {
            z: 0.1,
            epsilon: 1e-2,
            max_iter: 10_000,
            verbosity: Verbosity::default(),
        }
    }
}

/// One-vs-rest multiclass trainer over a shared, jointly regularized
/// optimizer.
///
/// Holds a [`ModelBank`] with one [`LinearModel`](crate::model::LinearModel)
/// per class. Training packs an existing bank into a warm start for the
/// optimizer, then replaces the bank wholesale from the returned solution;
/// a partially updated bank is never observable.
///
/// # Example
///
/// ```ignore
/// let mut trainer = MulticlassTrainer::logistic(MulticlassParams::default());
/// trainer.train(&dataset)?;
/// let class = trainer.predict(sample.view());
/// ```
#[derive(Debug, Clone)]
pub struct MulticlassTrainer<O: JointOptimizer = BatchLogistic> {
    optimizer: O,
    params: MulticlassParams,
    bank: ModelBank,
    last_iterations: Option<usize>,
}

impl MulticlassTrainer<BatchLogistic> {
    /// Trainer backed by the reference batch softmax optimizer.
    pub fn logistic(params: MulticlassParams) -> Self {
        Self::new(BatchLogistic, params)
    }
}

impl<O: JointOptimizer> MulticlassTrainer<O> {
    /// Trainer over a custom joint optimizer.
    pub fn new(optimizer: O, params: MulticlassParams) -> Self {
        Self {
            optimizer,
            params,
            bank: ModelBank::empty(),
            last_iterations: None,
        }
    }

    /// The trained per-class models. Empty before the first `train` call.
    pub fn bank(&self) -> &ModelBank {
        &self.bank
    }

    /// Optimizer iterations spent by the last `train` call.
    pub fn n_iterations(&self) -> Option<usize> {
        self.last_iterations
    }

    /// Train one model per class on `data`.
    ///
    /// Preconditions: the dataset has features, labels, and at least two
    /// classes. If a bank from a previous call exists, it is packed into a
    /// warm start so the optimizer resumes near the previous optimum — but
    /// only when its class count still matches the label set
    /// ([`Error::ClassCountMismatch`] otherwise, with the bank left intact).
    ///
    /// On success the bank is replaced atomically with exactly
    /// `num_classes` models in class-index order. Optimizer failure is fatal
    /// and propagated; the bank is cleared in that case (the warm start was
    /// already handed off by value).
    pub fn train(&mut self, data: &Dataset) -> Result<(), Error> {
        if data.n_features() == 0 || data.n_samples() == 0 {
            return Err(Error::EmptyDataset {
                n_features: data.n_features(),
                n_samples: data.n_samples(),
            });
        }
        if data.labels().is_none() {
            return Err(Error::MissingLabels);
        }
        let n_classes = data.num_classes();
        if n_classes < 2 {
            return Err(Error::TooFewClasses(n_classes));
        }

        let mut options = SolverOptions {
            tolerance: self.params.epsilon,
            max_iterations: self.params.max_iter,
            warm_start: None,
        };
        if !self.bank.is_empty() {
            if self.bank.len() != n_classes {
                return Err(Error::ClassCountMismatch {
                    bank: self.bank.len(),
                    labels: n_classes,
                });
            }
            let (weights, biases) = assemble::pack(&self.bank)?;
            options.warm_start = Some((weights, biases));
            self.bank = ModelBank::empty();
        }

        let logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training("joint-logistic", self.params.max_iter);
        let solution = self.optimizer.solve(data, self.params.z, &options)?;
        logger.finish_training("done", solution.n_iterations);

        let bank = assemble::unpack(solution.weights.view(), solution.biases.view())?;
        debug_assert_eq!(bank.len(), n_classes);
        self.last_iterations = Some(solution.n_iterations);
        self.bank = bank;
        Ok(())
    }

    /// Predicted class for one sample (arg-max over per-class scores).
    ///
    /// Returns `None` before the first successful `train` call.
    pub fn predict(&self, x: ArrayView1<f64>) -> Option<usize> {
        self.bank.predict(x)
    }

    /// Predicted classes for a feature-major batch `[n_features, n_samples]`.
    pub fn predict_batch(&self, features: ArrayView2<f64>) -> Vec<usize> {
        self.bank.predict_batch(features)
    }
}
