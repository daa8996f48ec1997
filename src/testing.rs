//! Synthetic data generators for tests and benches.

use ndarray::Array2;
use rand::prelude::*;

use crate::data::Dataset;

/// Generate one blob of samples per class, feature-major.
///
/// Class `k` is centered at `separation` along axis `k % n_features`, with
/// the sign flipping on each wrap, and uniform noise of amplitude `noise`
/// around the center. With `separation` well above `noise` the classes are
/// linearly separable.
pub fn multiclass_blobs(
    n_per_class: usize,
    n_features: usize,
    n_classes: usize,
    separation: f64,
    noise: f64,
    seed: u64,
) -> Dataset {
    assert!(n_classes >= 2);
    assert!(n_features >= 1);
    let mut rng = StdRng::seed_from_u64(seed);

    let n_samples = n_per_class * n_classes;
    let mut features = Array2::zeros((n_features, n_samples));
    let mut labels = Vec::with_capacity(n_samples);

    for class in 0..n_classes {
        let axis = class % n_features;
        let sign = if (class / n_features) % 2 == 0 { 1.0 } else { -1.0 };
        for i in 0..n_per_class {
            let col = class * n_per_class + i;
            for feature in 0..n_features {
                let center = if feature == axis { sign * separation } else { 0.0 };
                features[[feature, col]] = center + (rng.gen::<f64>() * 2.0 - 1.0) * noise;
            }
            labels.push(class);
        }
    }

    Dataset::new(features.view(), Some(labels))
}

/// Generate a separable binary set, feature-major, with labels in `{-1, +1}`.
///
/// Positive samples sit at `+separation` along the first axis, negatives at
/// `-separation`, with uniform noise of amplitude `noise`.
pub fn binary_blobs(
    n_per_class: usize,
    n_features: usize,
    separation: f64,
    noise: f64,
    seed: u64,
) -> (Array2<f64>, Vec<f64>) {
    assert!(n_features >= 1);
    let mut rng = StdRng::seed_from_u64(seed);

    let n_samples = 2 * n_per_class;
    let mut features = Array2::zeros((n_features, n_samples));
    let mut labels = Vec::with_capacity(n_samples);

    for (half, &y) in [1.0f64, -1.0].iter().enumerate() {
        for i in 0..n_per_class {
            let col = half * n_per_class + i;
            features[[0, col]] = y * separation + (rng.gen::<f64>() * 2.0 - 1.0) * noise;
            for feature in 1..n_features {
                features[[feature, col]] = (rng.gen::<f64>() * 2.0 - 1.0) * noise;
            }
            labels.push(y);
        }
    }

    (features, labels)
}
