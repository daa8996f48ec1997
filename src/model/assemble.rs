//! Pack/unpack between a [`ModelBank`] and a dense weight matrix.
//!
//! The solvers consume and produce a `[dim, classes]` weight matrix plus a
//! bias vector; the bank is the per-class view of the same data. [`pack`]
//! seeds warm starts from a previously trained bank, [`unpack`] materializes
//! solver output into a fresh bank.
//!
//! Both are pure transformations and satisfy the round-trip law
//! `unpack(pack(bank)) == bank`.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::Error;
use crate::model::{LinearModel, ModelBank};

/// Pack a bank into a `[dim, classes]` weight matrix and a bias vector.
///
/// Column `i` holds class `i`'s weight vector; `biases[i]` its bias. Fails
/// with [`Error::DimensionMismatch`] if the models disagree on dimension.
pub fn pack(bank: &ModelBank) -> Result<(Array2<f64>, Array1<f64>), Error> {
    let n_classes = bank.len();
    let dim = bank.dim().unwrap_or(0);

    let mut weights = Array2::zeros((dim, n_classes));
    let mut biases = Array1::zeros(n_classes);
    for (class, model) in bank.iter().enumerate() {
        if model.dim() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                got: model.dim(),
            });
        }
        weights.column_mut(class).assign(&model.weights());
        biases[class] = model.bias();
    }
    Ok((weights, biases))
}

/// Unpack a `[dim, classes]` weight matrix and bias vector into a bank.
///
/// Inverse of [`pack`]: one [`LinearModel`] per column, in class-index
/// order. Requires `weights.ncols() == biases.len()`.
pub fn unpack(weights: ArrayView2<f64>, biases: ArrayView1<f64>) -> Result<ModelBank, Error> {
    if weights.ncols() != biases.len() {
        return Err(Error::DimensionMismatch {
            expected: weights.ncols(),
            got: biases.len(),
        });
    }
    let models = weights
        .columns()
        .into_iter()
        .zip(biases.iter())
        .map(|(col, &bias)| LinearModel::new(col.to_owned(), bias))
        .collect();
    ModelBank::from_models(models)
}
