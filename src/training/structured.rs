//! Structured-output training over the bundle solvers.

use ndarray::{Array1, ArrayView1};

use crate::error::Error;
use crate::training::bundle::{RiskOracle, SolverVariant, TrainingResult};
use crate::training::options::BundleParams;

/// A structured-output model: the joint weight dimension plus the
/// loss/subgradient oracle the bundle solvers query each iteration.
///
/// `init_training` runs once per training call, before the first oracle
/// query.
pub trait StructuredModel: RiskOracle {
    /// Dimension of the joint weight vector.
    fn dim(&self) -> usize;

    /// One-time setup before solving.
    fn init_training(&mut self) {}
}

/// Linear structured-output trainer.
///
/// Owns the joint weight vector and a [`StructuredModel`] oracle. A training
/// call validates the configuration, initializes the model, hands the
/// current weights to the solver selected by [`SolverVariant`], and
/// interprets the terminal state: `Converged` and `MaxIterExceeded` update
/// the weights and report success, `Infeasible` reports failure and leaves
/// the weights untouched.
#[derive(Debug)]
pub struct StructuredTrainer<M: StructuredModel> {
    model: M,
    variant: SolverVariant,
    params: BundleParams,
    weights: Array1<f64>,
    result: Option<TrainingResult>,
}

impl<M: StructuredModel> StructuredTrainer<M> {
    /// Trainer with zero-initialized weights of the model's dimension.
    pub fn new(model: M, variant: SolverVariant, params: BundleParams) -> Self {
        let dim = model.dim();
        Self {
            model,
            variant,
            params,
            weights: Array1::zeros(dim),
            result: None,
        }
    }

    /// Trainer resuming from a previous solution.
    ///
    /// Fails with [`Error::DimensionMismatch`] if the warm start does not
    /// match the model dimension.
    pub fn with_warm_start(
        model: M,
        variant: SolverVariant,
        params: BundleParams,
        warm_start: Array1<f64>,
    ) -> Result<Self, Error> {
        if warm_start.len() != model.dim() {
            return Err(Error::DimensionMismatch {
                expected: model.dim(),
                got: warm_start.len(),
            });
        }
        Ok(Self {
            model,
            variant,
            params,
            weights: warm_start,
            result: None,
        })
    }

    /// Current weight vector.
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// The underlying model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Full result of the last `train` call, including the objective trace
    /// when `store_trace` was set.
    pub fn result(&self) -> Option<&TrainingResult> {
        self.result.as_ref()
    }

    /// Run one training call to a terminal state.
    ///
    /// Returns `Ok(true)` when the solver produced a usable iterate
    /// (`Converged` or `MaxIterExceeded`), `Ok(false)` on `Infeasible` (the
    /// trainer's weights are left unchanged), and `Err` for configuration
    /// errors rejected before any iteration.
    pub fn train(&mut self) -> Result<bool, Error> {
        self.params.validate()?;
        self.model.init_training();

        let solver = self.variant.solver();
        let result = solver.solve(&mut self.model, self.weights.clone(), &self.params);

        let usable = result.is_usable();
        if usable {
            self.weights = result.weights.clone();
        }
        self.result = Some(result);
        Ok(usable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::bundle::{ExitStatus, RiskOracle};
    use crate::training::logger::Verbosity;
    use crate::training::options::CuttingPlaneConfig;
    use ndarray::array;

    /// 2-d separable hinge risk over four fixed points.
    struct ToyHinge {
        initialized: bool,
    }

    impl ToyHinge {
        fn points() -> [([f64; 2], f64); 4] {
            [
                ([2.0, 0.5], 1.0),
                ([1.5, -0.5], 1.0),
                ([-2.0, 0.5], -1.0),
                ([-1.5, -0.5], -1.0),
            ]
        }
    }

    impl RiskOracle for ToyHinge {
        fn risk(&mut self, w: ArrayView1<f64>, subgrad: &mut Array1<f64>) -> f64 {
            subgrad.fill(0.0);
            let points = Self::points();
            let n = points.len() as f64;
            let mut risk = 0.0;
            for (x, y) in points {
                let margin = y * (w[0] * x[0] + w[1] * x[1]);
                if margin < 1.0 {
                    risk += 1.0 - margin;
                    subgrad[0] -= y * x[0];
                    subgrad[1] -= y * x[1];
                }
            }
            subgrad.mapv_inplace(|v| v / n);
            risk / n
        }
    }

    impl StructuredModel for ToyHinge {
        fn dim(&self) -> usize {
            2
        }

        fn init_training(&mut self) {
            self.initialized = true;
        }
    }

    fn quiet_params() -> BundleParams {
        BundleParams {
            lambda: 0.1,
            verbosity: Verbosity::Silent,
            buffer: CuttingPlaneConfig {
                max_outer_iterations: 300,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn trains_and_updates_weights() {
        let mut trainer =
            StructuredTrainer::new(ToyHinge { initialized: false }, SolverVariant::Classic, quiet_params());
        let ok = trainer.train().unwrap();

        assert!(ok);
        assert!(trainer.model().initialized);
        let result = trainer.result().expect("result stored");
        assert_eq!(result.exit_status, ExitStatus::Converged);
        // The separating direction is positive along the first feature.
        assert!(trainer.weights()[0] > 0.0);
    }

    #[test]
    fn invalid_config_rejected_before_iterating() {
        let params = BundleParams {
            buffer: CuttingPlaneConfig {
                num_cutting_plane_models: 0,
                ..Default::default()
            },
            ..quiet_params()
        };
        let mut trainer =
            StructuredTrainer::new(ToyHinge { initialized: false }, SolverVariant::MultiPlaneModel, params);
        let result = trainer.train();

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        // Rejected before setup: the model was never initialized.
        assert!(!trainer.model().initialized);
    }

    #[test]
    fn warm_start_dimension_checked() {
        let result = StructuredTrainer::with_warm_start(
            ToyHinge { initialized: false },
            SolverVariant::Classic,
            quiet_params(),
            array![1.0, 2.0, 3.0],
        );
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn infeasible_leaves_weights_unchanged() {
        struct NanModel;
        impl RiskOracle for NanModel {
            fn risk(&mut self, _w: ArrayView1<f64>, subgrad: &mut Array1<f64>) -> f64 {
                subgrad.fill(f64::NAN);
                f64::NAN
            }
        }
        impl StructuredModel for NanModel {
            fn dim(&self) -> usize {
                2
            }
        }

        let mut trainer = StructuredTrainer::with_warm_start(
            NanModel,
            SolverVariant::Classic,
            quiet_params(),
            array![0.5, -0.5],
        )
        .unwrap();
        let ok = trainer.train().unwrap();

        assert!(!ok);
        assert_eq!(trainer.weights()[0], 0.5);
        assert_eq!(trainer.weights()[1], -0.5);
        assert_eq!(
            trainer.result().unwrap().exit_status,
            ExitStatus::Infeasible
        );
    }
}
