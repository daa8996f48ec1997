//! Linear discriminant data structure.

use ndarray::{Array1, ArrayView1};

/// A trained linear discriminant: weight vector plus bias scalar.
///
/// Models are immutable once produced. Trainers never mutate a model in
/// place; they build a fresh one and replace the old one wholesale.
///
/// # Example
///
/// ```
/// use bundlers::model::LinearModel;
/// use ndarray::array;
///
/// let model = LinearModel::new(array![0.5, 0.3], 0.1);
///
/// // score = dot(w, x) + bias
/// let x = array![1.0, 2.0];
/// assert!((model.score(x.view()) - 1.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearModel {
    weights: Array1<f64>,
    bias: f64,
}

impl LinearModel {
    /// Create a model from a weight vector and bias.
    pub fn new(weights: Array1<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    /// Create a zero model of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        Self {
            weights: Array1::zeros(dim),
            bias: 0.0,
        }
    }

    /// Dimension of the weight vector.
    #[inline]
    pub fn dim(&self) -> usize {
        self.weights.len()
    }

    /// The weight vector.
    #[inline]
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// The bias term.
    #[inline]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Score a sample: `dot(w, x) + bias`.
    ///
    /// # Panics
    ///
    /// Panics if `x` does not match the model dimension (ndarray dot).
    #[inline]
    pub fn score(&self, x: ArrayView1<f64>) -> f64 {
        self.weights.dot(&x) + self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn score_is_dot_plus_bias() {
        // y = 0.5*x0 + 0.3*x1 + 0.1
        let model = LinearModel::new(array![0.5, 0.3], 0.1);

        let s = model.score(array![1.0, 2.0].view());
        assert!((s - 1.2).abs() < 1e-12);

        let s = model.score(array![0.0, 0.0].view());
        assert!((s - 0.1).abs() < 1e-12);
    }

    #[test]
    fn zeros_model() {
        let model = LinearModel::zeros(3);
        assert_eq!(model.dim(), 3);
        assert_eq!(model.bias(), 0.0);
        assert_eq!(model.score(array![1.0, 2.0, 3.0].view()), 0.0);
    }
}
