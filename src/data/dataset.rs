//! Dataset container.

use ndarray::{Array2, ArrayView1, ArrayView2};

/// Feature matrix plus class labels.
///
/// # Storage Layout
///
/// Features are stored in **feature-major** layout: `[n_features, n_samples]`.
/// Sample `i` is column `i`. Labels are class ids in `0..num_classes`.
///
/// Labels are optional: a prediction dataset carries features only.
///
/// # Example
///
/// ```
/// use bundlers::data::Dataset;
/// use ndarray::array;
///
/// // Feature-major: 2 features, 3 samples
/// let features = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
/// let ds = Dataset::new(features.view(), Some(vec![0, 1, 0]));
///
/// assert_eq!(ds.n_samples(), 3);
/// assert_eq!(ds.n_features(), 2);
/// assert_eq!(ds.num_classes(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature data: `[n_features, n_samples]` (feature-major).
    features: Array2<f64>,
    /// Class id per sample.
    labels: Option<Vec<usize>>,
}

impl Dataset {
    /// Create a dataset from feature-major data.
    ///
    /// # Arguments
    ///
    /// * `features` - Feature matrix `[n_features, n_samples]` (feature-major)
    /// * `labels` - Optional class ids, length = n_samples
    ///
    /// # Panics
    ///
    /// Debug-asserts that the label count matches the sample count.
    pub fn new(features: ArrayView2<f64>, labels: Option<Vec<usize>>) -> Self {
        if let Some(ref l) = labels {
            debug_assert_eq!(
                l.len(),
                features.ncols(),
                "labels must have same sample count as features"
            );
        }
        Self {
            features: features.to_owned(),
            labels,
        }
    }

    /// Number of samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.ncols()
    }

    /// Dimension of the feature space.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    /// Number of classes the labels resolve to (`max id + 1`).
    ///
    /// Returns 0 when no labels are attached.
    pub fn num_classes(&self) -> usize {
        self.labels
            .as_ref()
            .and_then(|l| l.iter().map(|&y| y + 1).max())
            .unwrap_or(0)
    }

    /// Class ids, one per sample, if attached.
    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    /// The full feature matrix `[n_features, n_samples]`.
    #[inline]
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Feature values of one sample.
    #[inline]
    pub fn sample(&self, index: usize) -> ArrayView1<'_, f64> {
        self.features.column(index)
    }

    /// Dot product of a weight vector with sample `index`.
    #[inline]
    pub fn dot(&self, w: ArrayView1<f64>, index: usize) -> f64 {
        w.dot(&self.features.column(index))
    }
}
