//! Per-class model collection.

use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

use crate::error::Error;
use crate::model::LinearModel;

/// An ordered collection of [`LinearModel`], one per class.
///
/// The index in the bank is the class id. All models share the same weight
/// dimension; [`ModelBank::from_models`] rejects a mixed-dimension set.
///
/// A bank starts empty, is replaced wholesale after each successful training
/// call, and is read by prediction. Callers only ever see a bank through
/// shared references.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelBank {
    models: Vec<LinearModel>,
}

impl ModelBank {
    /// An empty bank (no classes trained yet).
    pub fn empty() -> Self {
        Self { models: Vec::new() }
    }

    /// Build a bank from per-class models, in class-index order.
    ///
    /// Fails with [`Error::DimensionMismatch`] if the models disagree on the
    /// weight dimension.
    pub fn from_models(models: Vec<LinearModel>) -> Result<Self, Error> {
        if let Some(first) = models.first() {
            let dim = first.dim();
            for model in &models[1..] {
                if model.dim() != dim {
                    return Err(Error::DimensionMismatch {
                        expected: dim,
                        got: model.dim(),
                    });
                }
            }
        }
        Ok(Self { models })
    }

    /// Number of classes in the bank.
    #[inline]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True before the first successful training call.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Shared weight dimension, or `None` for an empty bank.
    pub fn dim(&self) -> Option<usize> {
        self.models.first().map(LinearModel::dim)
    }

    /// The model for one class.
    pub fn get(&self, class: usize) -> Option<&LinearModel> {
        self.models.get(class)
    }

    /// Iterate models in class-index order.
    pub fn iter(&self) -> std::slice::Iter<'_, LinearModel> {
        self.models.iter()
    }

    /// Per-class scores for one sample.
    pub fn scores(&self, x: ArrayView1<f64>) -> Vec<f64> {
        self.models.iter().map(|m| m.score(x)).collect()
    }

    /// Predicted class for one sample (arg-max of per-class scores).
    ///
    /// Returns `None` for an empty bank.
    pub fn predict(&self, x: ArrayView1<f64>) -> Option<usize> {
        if self.models.is_empty() {
            return None;
        }
        Some(argmax_class(&self.models, x))
    }

    /// Predicted classes for a feature-major batch `[n_features, n_samples]`.
    ///
    /// Samples are scored on the rayon pool. Returns an empty vector for an
    /// empty bank.
    pub fn predict_batch(&self, features: ArrayView2<f64>) -> Vec<usize> {
        if self.models.is_empty() {
            return Vec::new();
        }
        (0..features.ncols())
            .into_par_iter()
            .map(|i| argmax_class(&self.models, features.column(i)))
            .collect()
    }
}

fn argmax_class(models: &[LinearModel], x: ArrayView1<f64>) -> usize {
    let mut best_class = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (class, model) in models.iter().enumerate() {
        let score = model.score(x);
        if score > best_score {
            best_score = score;
            best_class = class;
        }
    }
    best_class
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn make_bank() -> ModelBank {
        // Class 0 prefers x0, class 1 prefers x1.
        ModelBank::from_models(vec![
            LinearModel::new(array![1.0, 0.0], 0.0),
            LinearModel::new(array![0.0, 1.0], 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn empty_bank() {
        let bank = ModelBank::empty();
        assert!(bank.is_empty());
        assert_eq!(bank.dim(), None);
        assert_eq!(bank.predict(array![1.0].view()), None);
        assert!(bank.predict_batch(array![[1.0, 2.0]].view()).is_empty());
    }

    #[test]
    fn mixed_dims_rejected() {
        let result = ModelBank::from_models(vec![
            LinearModel::new(array![1.0, 0.0], 0.0),
            LinearModel::new(array![1.0], 0.0),
        ]);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn predict_argmax() {
        let bank = make_bank();
        assert_eq!(bank.predict(array![2.0, 1.0].view()), Some(0));
        assert_eq!(bank.predict(array![1.0, 2.0].view()), Some(1));
    }

    #[test]
    fn predict_batch_matches_single() {
        let bank = make_bank();
        // Feature-major: 2 features, 3 samples.
        let features = array![[2.0, 1.0, 0.0], [1.0, 2.0, 3.0]];
        let batch = bank.predict_batch(features.view());
        assert_eq!(batch, vec![0, 1, 1]);
    }

    #[test]
    fn scores_ordered_by_class() {
        let bank = make_bank();
        let scores = bank.scores(array![2.0, 1.0].view());
        assert_eq!(scores.len(), 2);
        assert!((scores[0] - 2.0).abs() < 1e-12);
        assert!((scores[1] - 1.0).abs() < 1e-12);
    }
}
