//! # horsepower-mpg
//!
//! Fits a small linear regressor that predicts a car's fuel efficiency (miles
//! per gallon) from its horsepower, and produces the points needed to plot the
//! fitted curve next to the data.
//!
//! ## Core Design Principles
//!
//! - **Stateful Type Safety**: models carry their training state in the type
//!   system (`Unfitted` vs `Fitted`); only unfitted models can be trained and
//!   only fitted ones can predict.
//! - **Training/Inference Separation**: losses, optimizers and the trainer live
//!   outside the model, which only knows its forward and backward passes.
//! - **Backend Agnosticism**: the `Backend` trait hides the tensor
//!   implementation (`CpuBackend`, or `NdarrayBackend` behind the `ndarray`
//!   feature).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use horsepower_mpg::backend::CpuBackend;
//! use horsepower_mpg::config::PipelineConfig;
//! use horsepower_mpg::pipeline::Pipeline;
//!
//! # async fn demo() -> Result<(), horsepower_mpg::PipelineError> {
//! let pipeline = Pipeline::from_config(PipelineConfig::default())?;
//! let predictions = pipeline.run::<CpuBackend>().await?;
//! println!("{}", predictions.predicted_points.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `backend` — tensor abstractions (`Tensor1D`, `Tensor2D`, `Scalar`)
//! - `data` — raw records, cleaning and dataset sources
//! - `preprocessing` — min-max scaling and the tensor normalizer
//! - `model` — dense layers and the sequential model
//! - `loss` / `optimizer` — MSE/MAE and Adam/SGD
//! - `dataset` / `trainer` — mini-batching and the training loop
//! - `predict` — the plotting sweep
//! - `pipeline` — the end-to-end run

pub mod backend;

/// Pipeline configuration with serde defaults.
pub mod config;

/// Raw records, the cleaner and dataset sources.
pub mod data;

/// Mini-batch iteration over training data.
pub mod dataset;

pub mod error;

/// `tracing` subscriber installation for binaries.
pub mod logging;

/// Differentiable loss functions for model training.
pub mod loss;

/// Models with compile-time training state.
pub mod model;

/// Optimization algorithms for parameter updates.
pub mod optimizer;

pub mod pipeline;

pub mod predict;

/// Data preprocessing transformers.
pub mod preprocessing;

/// High-level training loop orchestration.
pub mod trainer;

pub use backend::{Backend, CpuBackend, ScalarOps, Tensor1D, Tensor2D};
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use predict::{PredictionPoint, Predictions};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CleanedRecord;
    use crate::loss::{Loss, MSELoss};
    use crate::model::{
        DenseParams, ModelSpec, Sequential, SequentialParams, TrainableModel, Unfitted,
    };
    use crate::optimizer::{Adam, Optimizer, SGD};
    use crate::predict::Predictor;
    use crate::preprocessing::TensorNormalizer;
    use crate::trainer::Trainer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_layer(w1: f64, w2: f64) -> Sequential<CpuBackend, Unfitted> {
        let layer = |w: f64| DenseParams {
            kernel: Tensor2D::new(vec![w], 1, 1),
            bias: Some(Tensor1D::new(vec![0.0])),
        };
        Sequential::from_params(
            ModelSpec::default(),
            SequentialParams {
                layers: vec![layer(w1), layer(w2)],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_manual_loop_fits_line() {
        // y = 2x + 1 on [0, 1]
        let x = Tensor2D::<CpuBackend>::column(vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let y = Tensor2D::<CpuBackend>::column(vec![1.0, 1.5, 2.0, 2.5, 3.0]);

        let mut model = two_layer(0.5, 0.5);
        let mut optimizer = SGD::<CpuBackend>::new(0.05);

        for _ in 0..3000 {
            let pred = model.forward(&x);
            let grad_pred = Loss::<CpuBackend>::grad_wrt_prediction(&MSELoss, &pred, &y);
            let grads = model.backward(&x, &grad_pred);
            let new_params = optimizer.step(model.params(), &grads);
            model.update_params(new_params);
        }

        let pred = model.forward(&x);
        let loss = Loss::<CpuBackend>::loss(&MSELoss, &pred, &y).to_f64();
        assert!(loss < 1e-3, "loss = {loss}");
    }

    #[tokio::test]
    async fn test_normalize_train_predict_recovers_line() {
        // mpg = -0.2 * hp + 40 with small deterministic noise
        let records: Vec<CleanedRecord> = (0..50)
            .map(|i| {
                let hp = 50.0 + i as f64 * 180.0 / 49.0;
                let noise = (((i * 7) % 5) as f64 - 2.0) * 0.1;
                CleanedRecord {
                    horsepower: hp,
                    mpg: -0.2 * hp + 40.0 + noise,
                }
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(7);

        let data = TensorNormalizer::<CpuBackend>::new()
            .normalize(&records, &mut rng)
            .unwrap();
        // 50 samples in batches of 32 is 2 steps per epoch. Adam moves each
        // weight by roughly the learning rate per step, so 100 steps at the
        // default 0.001 cannot leave a Glorot draw; 0.05 can.
        let mut model = two_layer(0.8, -0.6);
        let mut trainer = Trainer::builder(MSELoss, Adam::new(0.05))
            .batch_size(32)
            .epochs(50)
            .build();
        trainer
            .fit_tensors(&mut model, &data.inputs, &data.labels, &mut rng)
            .await
            .unwrap();

        let predictions = Predictor::default()
            .predict(&model.into_fitted(), &records, &data.bounds)
            .unwrap();
        assert_eq!(predictions.predicted_points.len(), 100);
        let mse = predictions
            .predicted_points
            .iter()
            .map(|p| (p.y - (-0.2 * p.x + 40.0)).powi(2))
            .sum::<f64>()
            / 100.0;
        assert!(mse < 1.0, "sweep mse = {mse}");
    }
}
