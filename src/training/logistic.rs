//! Joint multiclass logistic-regression optimization.
//!
//! The logistic path trains one discriminant per class through a single
//! *joint* solve: all class weight vectors share one regularized objective
//! instead of C independent binary problems. The trainer talks to the
//! optimizer through the [`JointOptimizer`] trait; [`BatchLogistic`] is the
//! reference implementation, a batch gradient method with backtracking step
//! search on the L2-regularized softmax objective.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::data::Dataset;
use crate::error::Error;
use crate::training::options::SolverOptions;

/// Solution returned by a joint multiclass optimizer.
#[derive(Debug, Clone)]
pub struct JointSolution {
    /// Weight matrix `[dim, classes]`, column i = class i.
    pub weights: Array2<f64>,
    /// Per-class biases.
    pub biases: Array1<f64>,
    /// Outer iterations spent. Zero when the warm start already satisfied
    /// the tolerance.
    pub n_iterations: usize,
}

/// Jointly regularized multiclass optimization oracle.
///
/// `solve` produces the full `[dim, classes]` solution in one call. Failure
/// is fatal for the calling trainer; implementations must not return a
/// partial solution.
pub trait JointOptimizer {
    fn solve(&self, data: &Dataset, z: f64, options: &SolverOptions)
        -> Result<JointSolution, Error>;
}

/// Armijo acceptance constant for the backtracking step search.
const ARMIJO_C: f64 = 1e-4;
/// Step below which the search is considered stalled.
const MIN_STEP: f64 = 1e-18;
/// Upper bound for the adaptive step.
const MAX_STEP: f64 = 1e6;

/// Batch gradient optimizer for L2-regularized softmax regression.
///
/// Minimizes
///
/// ```text
/// f(W, c) = 1/N sum_n -log softmax(W^T x_n + c)[y_n] + z/2 ||W||_F^2
/// ```
///
/// with backtracking on the step size. Convergence is declared when the
/// gradient max-norm over both `W` and `c` drops to `options.tolerance`; a
/// warm start that already satisfies the tolerance terminates after zero
/// iterations, which is what makes warm-started iteration counts comparable
/// to cold starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchLogistic;

impl JointOptimizer for BatchLogistic {
    fn solve(
        &self,
        data: &Dataset,
        z: f64,
        options: &SolverOptions,
    ) -> Result<JointSolution, Error> {
        let labels = data.labels().ok_or(Error::MissingLabels)?;
        let dim = data.n_features();
        let n_classes = data.num_classes();
        let x = data.features();

        let (mut w, mut bias) = match &options.warm_start {
            Some((w0, c0)) => {
                if w0.nrows() != dim {
                    return Err(Error::DimensionMismatch {
                        expected: dim,
                        got: w0.nrows(),
                    });
                }
                if w0.ncols() != n_classes || c0.len() != n_classes {
                    return Err(Error::ClassCountMismatch {
                        bank: w0.ncols(),
                        labels: n_classes,
                    });
                }
                (w0.clone(), c0.clone())
            }
            None => (Array2::zeros((dim, n_classes)), Array1::zeros(n_classes)),
        };

        let (mut f, mut grad_w, mut grad_b) = objective_and_gradient(x, labels, &w, &bias, z);
        let mut step = 1.0;
        let mut n_iterations = 0;

        for _ in 0..options.max_iterations {
            let grad_inf = grad_w
                .iter()
                .chain(grad_b.iter())
                .fold(0.0f64, |m, &g| m.max(g.abs()));
            if grad_inf <= options.tolerance {
                break;
            }
            let grad_sq = grad_w.iter().map(|&g| g * g).sum::<f64>()
                + grad_b.iter().map(|&g| g * g).sum::<f64>();

            // Backtracking: shrink until the Armijo decrease is met.
            let mut accepted = false;
            while step > MIN_STEP {
                let w_try = &w - &grad_w.mapv(|g| g * step);
                let b_try = &bias - &grad_b.mapv(|g| g * step);
                let f_try = objective(x, labels, &w_try, &b_try, z);
                if f_try <= f - ARMIJO_C * step * grad_sq {
                    w = w_try;
                    bias = b_try;
                    accepted = true;
                    break;
                }
                step *= 0.5;
            }
            if !accepted {
                break;
            }
            n_iterations += 1;
            step = (step * 2.0).min(MAX_STEP);

            let (f_new, gw_new, gb_new) = objective_and_gradient(x, labels, &w, &bias, z);
            f = f_new;
            grad_w = gw_new;
            grad_b = gb_new;
        }

        Ok(JointSolution {
            weights: w,
            biases: bias,
            n_iterations,
        })
    }
}

/// Per-sample score matrix `[classes, samples]` turned into `(P - Y) / N`
/// in place, returning the mean negative log-likelihood.
fn scores_to_scaled_residuals(
    x: ArrayView2<f64>,
    labels: &[usize],
    w: &Array2<f64>,
    bias: &Array1<f64>,
    subtract_onehot: bool,
) -> (f64, Array2<f64>) {
    let n = labels.len();
    let n_f = n as f64;

    let mut scores = w.t().dot(&x);
    for mut col in scores.axis_iter_mut(Axis(1)) {
        col += bias;
    }

    let mut nll = 0.0;
    for (j, &y) in labels.iter().enumerate() {
        let mut col = scores.column_mut(j);
        let max = col.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let score_y = col[y];
        let mut sum = 0.0;
        for v in col.iter_mut() {
            *v = (*v - max).exp();
            sum += *v;
        }
        nll += max + sum.ln() - score_y;
        // Normalize to probabilities, subtract the one-hot target, scale.
        for v in col.iter_mut() {
            *v /= sum;
        }
        if subtract_onehot {
            col[y] -= 1.0;
            for v in col.iter_mut() {
                *v /= n_f;
            }
        }
    }

    (nll / n_f, scores)
}

/// Regularized objective value only.
fn objective(
    x: ArrayView2<f64>,
    labels: &[usize],
    w: &Array2<f64>,
    bias: &Array1<f64>,
    z: f64,
) -> f64 {
    let (nll, _) = scores_to_scaled_residuals(x, labels, w, bias, false);
    nll + 0.5 * z * w.iter().map(|&v| v * v).sum::<f64>()
}

/// Regularized objective plus its gradient in `W` and `c`.
fn objective_and_gradient(
    x: ArrayView2<f64>,
    labels: &[usize],
    w: &Array2<f64>,
    bias: &Array1<f64>,
    z: f64,
) -> (f64, Array2<f64>, Array1<f64>) {
    let (nll, residuals) = scores_to_scaled_residuals(x, labels, w, bias, true);
    let f = nll + 0.5 * z * w.iter().map(|&v| v * v).sum::<f64>();

    // grad_W = X (P - Y)^T / N + z W; the residuals are already scaled.
    let mut grad_w = x.dot(&residuals.t());
    grad_w.scaled_add(z, w);
    // The bias is unregularized.
    let grad_b = residuals.sum_axis(Axis(1));

    (f, grad_w, grad_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_class_line() -> Dataset {
        // 1 feature; class 1 sits right of class 0.
        let features = array![[-2.0, -1.5, -1.0, 1.0, 1.5, 2.0]];
        Dataset::new(features.view(), Some(vec![0, 0, 0, 1, 1, 1]))
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let data = two_class_line();
        let labels = data.labels().unwrap();
        let w = array![[0.3, -0.2]];
        let b = array![0.1, 0.0];
        let z = 0.5;

        let (_, grad_w, grad_b) = objective_and_gradient(data.features(), labels, &w, &b, z);

        let eps = 1e-6;
        for class in 0..2 {
            let mut w_hi = w.clone();
            w_hi[[0, class]] += eps;
            let mut w_lo = w.clone();
            w_lo[[0, class]] -= eps;
            let numeric = (objective(data.features(), labels, &w_hi, &b, z)
                - objective(data.features(), labels, &w_lo, &b, z))
                / (2.0 * eps);
            assert!((grad_w[[0, class]] - numeric).abs() < 1e-5);

            let mut b_hi = b.clone();
            b_hi[class] += eps;
            let mut b_lo = b.clone();
            b_lo[class] -= eps;
            let numeric = (objective(data.features(), labels, &w, &b_hi, z)
                - objective(data.features(), labels, &w, &b_lo, z))
                / (2.0 * eps);
            assert!((grad_b[class] - numeric).abs() < 1e-5);
        }
    }

    #[test]
    fn separates_two_classes() {
        let data = two_class_line();
        let options = SolverOptions {
            tolerance: 1e-3,
            max_iterations: 10_000,
            warm_start: None,
        };
        let solution = BatchLogistic.solve(&data, 0.1, &options).unwrap();

        // Class 1 must score higher than class 0 on the right.
        let score = |class: usize, x: f64| solution.weights[[0, class]] * x + solution.biases[class];
        assert!(score(1, 2.0) > score(0, 2.0));
        assert!(score(0, -2.0) > score(1, -2.0));
        assert!(solution.n_iterations > 0);
    }

    #[test]
    fn warm_start_at_optimum_takes_zero_iterations() {
        let data = two_class_line();
        let options = SolverOptions {
            tolerance: 1e-3,
            max_iterations: 10_000,
            warm_start: None,
        };
        let first = BatchLogistic.solve(&data, 0.1, &options).unwrap();

        let warm = SolverOptions {
            tolerance: 1e-3,
            max_iterations: 10_000,
            warm_start: Some((first.weights.clone(), first.biases.clone())),
        };
        let second = BatchLogistic.solve(&data, 0.1, &warm).unwrap();
        assert_eq!(second.n_iterations, 0);
    }

    #[test]
    fn warm_start_class_count_checked() {
        let data = two_class_line();
        let warm = SolverOptions {
            tolerance: 1e-3,
            max_iterations: 100,
            warm_start: Some((Array2::zeros((1, 3)), Array1::zeros(3))),
        };
        let result = BatchLogistic.solve(&data, 0.1, &warm);
        assert!(matches!(result, Err(Error::ClassCountMismatch { .. })));
    }

    #[test]
    fn warm_start_dimension_checked() {
        let data = two_class_line();
        let warm = SolverOptions {
            tolerance: 1e-3,
            max_iterations: 100,
            warm_start: Some((Array2::zeros((4, 2)), Array1::zeros(2))),
        };
        let result = BatchLogistic.solve(&data, 0.1, &warm);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }
}
