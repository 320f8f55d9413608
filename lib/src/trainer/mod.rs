//! Mini-batch training loop.

use crate::{
    backend::{Backend, Tensor2D},
    config::{Metric, TrainingConfig},
    dataset::{Dataset, InMemoryDataset},
    loss::Loss,
    model::TrainableModel,
    optimizer::Optimizer,
};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrainingError {
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("invalid trainer configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load batch: {0}")]
    Dataset(String),
}

/// Loss and metric values recorded at the end of one epoch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpochSummary {
    pub epoch: usize,
    /// Sample-weighted mean of the batch losses seen during the epoch.
    pub loss: f64,
    pub metrics: BTreeMap<&'static str, f64>,
}

/// Per-epoch record of a `fit` call.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct History {
    pub epochs: Vec<EpochSummary>,
}

impl History {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.loss)
    }

    /// Values of one metric across epochs.
    pub fn metric(&self, name: &str) -> Vec<f64> {
        self.epochs
            .iter()
            .filter_map(|e| e.metrics.get(name).copied())
            .collect()
    }
}

/// Orchestrates the training loop for a `TrainableModel`.
///
/// The trainer owns the loss function and the optimizer; the model is borrowed
/// mutably and updated in place, so the caller decides when to freeze it with
/// `into_fitted()`.
pub struct Trainer<B, L, O, M>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B>,
    O: Optimizer<B, M::Params>,
{
    pub(crate) batch_size: usize,
    pub(crate) epochs: usize,
    pub(crate) shuffle: bool,
    pub(crate) verbose: bool,
    pub(crate) metrics: Vec<Metric>,
    pub(crate) loss_fn: L,
    pub(crate) optimizer: O,
    _phantom_backend: PhantomData<B>,
    _phantom_model: PhantomData<M>,
}

/// Fluent builder for constructing a `Trainer`.
///
/// Defaults:
/// - `batch_size`: 32
/// - `epochs`: 50
/// - `shuffle`: true
/// - `metrics`: `[mse]`
/// - `verbose`: false
pub struct TrainerBuilder<B, L, O, M>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B>,
    O: Optimizer<B, M::Params>,
{
    batch_size: usize,
    epochs: usize,
    shuffle: bool,
    verbose: bool,
    metrics: Vec<Metric>,
    loss_fn: L,
    optimizer: O,
    _phantom_backend: PhantomData<B>,
    _phantom_model: PhantomData<M>,
}

impl<B, L, O, M> TrainerBuilder<B, L, O, M>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B>,
    O: Optimizer<B, M::Params>,
{
    pub fn new(loss_fn: L, optimizer: O) -> Self {
        Self {
            batch_size: 32,
            epochs: 50,
            shuffle: true,
            verbose: false,
            metrics: vec![Metric::MeanSquaredError],
            loss_fn,
            optimizer,
            _phantom_backend: PhantomData,
            _phantom_model: PhantomData,
        }
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Re-shuffle the sample order at the start of every epoch.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    /// When `true`, epoch summaries are logged at `info` instead of `debug`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Applies every field of a [`TrainingConfig`].
    pub fn with_config(self, config: &TrainingConfig) -> Self {
        self.batch_size(config.batch_size)
            .epochs(config.epochs)
            .shuffle(config.shuffle)
            .verbose(config.verbose)
    }

    pub fn build(self) -> Trainer<B, L, O, M> {
        Trainer {
            batch_size: self.batch_size,
            epochs: self.epochs,
            shuffle: self.shuffle,
            verbose: self.verbose,
            metrics: self.metrics,
            loss_fn: self.loss_fn,
            optimizer: self.optimizer,
            _phantom_backend: PhantomData,
            _phantom_model: PhantomData,
        }
    }
}

impl<B, L, O, M> Trainer<B, L, O, M>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B>,
    O: Optimizer<B, M::Params>,
{
    /// Convenience constructor that starts the builder pattern.
    pub fn builder(loss_fn: L, optimizer: O) -> TrainerBuilder<B, L, O, M> {
        TrainerBuilder::new(loss_fn, optimizer)
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }
}

impl<B, L, O, M> Trainer<B, L, O, M>
where
    B: Backend,
    L: Loss<B, Prediction = Tensor2D<B>, Target = Tensor2D<B>>,
    M: TrainableModel<B, Input = Tensor2D<B>, Prediction = Tensor2D<B>>,
    O: Optimizer<B, M::Params>,
{
    /// Trains `model` in place for the configured number of epochs.
    ///
    /// The dataset and configuration are checked before the first optimizer
    /// step, and the optimizer state is reset so every call starts fresh.
    /// Yields to the runtime between epochs.
    pub async fn fit<D, R>(
        &mut self,
        model: &mut M,
        dataset: &D,
        rng: &mut R,
    ) -> Result<History, TrainingError>
    where
        D: Dataset,
        R: Rng + ?Sized,
    {
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidConfig("batch size must be > 0".into()));
        }
        if self.epochs == 0 {
            return Err(TrainingError::InvalidConfig("epochs must be > 0".into()));
        }
        let n_total = dataset
            .len()
            .ok_or_else(|| TrainingError::InvalidDataset("dataset length unknown".into()))?;
        if n_total == 0 {
            return Err(TrainingError::InvalidDataset("dataset is empty".into()));
        }
        Self::check_widths(model, dataset)?;

        self.optimizer.reset();
        let mut history = History::default();

        for epoch in 0..self.epochs {
            let batches = if self.shuffle {
                dataset.shuffled_batches::<B, R>(self.batch_size, rng)
            } else {
                dataset.batches::<B>(self.batch_size)
            };

            let mut weighted_loss = 0.0;
            for batch in batches {
                let (batch_x, batch_y) =
                    batch.map_err(|e| TrainingError::Dataset(e.to_string()))?;
                let preds = model.forward(&batch_x);
                weighted_loss +=
                    self.loss_fn.loss(&preds, &batch_y).to_f64() * batch_x.rows() as f64;

                let grad_preds = self.loss_fn.grad_wrt_prediction(&preds, &batch_y);
                let grads = model.backward(&batch_x, &grad_preds);
                let new_params = self.optimizer.step(model.params(), &grads);
                model.update_params(new_params);
            }

            let summary = EpochSummary {
                epoch,
                loss: weighted_loss / n_total as f64,
                metrics: self.evaluate(model, dataset, n_total)?,
            };
            if self.verbose {
                info!(epoch, loss = summary.loss, metrics = ?summary.metrics, "epoch finished");
            } else {
                debug!(epoch, loss = summary.loss, metrics = ?summary.metrics, "epoch finished");
            }
            history.epochs.push(summary);

            tokio::task::yield_now().await;
        }

        Ok(history)
    }

    /// Validates and wraps a pair of tensors, then calls [`Trainer::fit`].
    pub async fn fit_tensors<R>(
        &mut self,
        model: &mut M,
        inputs: &Tensor2D<B>,
        labels: &Tensor2D<B>,
        rng: &mut R,
    ) -> Result<History, TrainingError>
    where
        R: Rng + ?Sized,
    {
        let dataset = InMemoryDataset::from_tensors(inputs, labels)
            .map_err(|e| TrainingError::InvalidDataset(e.to_string()))?;
        self.fit(model, &dataset, rng).await
    }

    /// Loads the first sample and compares its widths against the model.
    fn check_widths<D: Dataset>(model: &M, dataset: &D) -> Result<(), TrainingError> {
        let (x, y) = dataset
            .get_batch::<B>(&[0])
            .map_err(|e| TrainingError::Dataset(e.to_string()))?;
        if x.cols() != model.input_dim() {
            return Err(TrainingError::InvalidDataset(format!(
                "inputs have {} columns, model expects {}",
                x.cols(),
                model.input_dim()
            )));
        }
        if y.cols() != model.output_dim() {
            return Err(TrainingError::InvalidDataset(format!(
                "labels have {} columns, model predicts {}",
                y.cols(),
                model.output_dim()
            )));
        }
        Ok(())
    }

    fn evaluate<D: Dataset>(
        &self,
        model: &M,
        dataset: &D,
        n_total: usize,
    ) -> Result<BTreeMap<&'static str, f64>, TrainingError> {
        if self.metrics.is_empty() {
            return Ok(BTreeMap::new());
        }
        let mut predictions = Vec::with_capacity(n_total);
        let mut targets = Vec::with_capacity(n_total);
        for batch in dataset.batches::<B>(n_total) {
            let (x, y) = batch.map_err(|e| TrainingError::Dataset(e.to_string()))?;
            predictions.extend(model.forward(&x).to_vec());
            targets.extend(y.to_vec());
        }
        Ok(self
            .metrics
            .iter()
            .map(|m| (m.name(), m.evaluate(&predictions, &targets)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{CpuBackend, Tensor1D},
        loss::{MAELoss, MSELoss},
        model::{DenseParams, LayerSpec, ModelSpec, Sequential, SequentialParams, Unfitted},
        optimizer::{Adam, SGD},
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type Model = Sequential<CpuBackend, Unfitted>;
    type Params = SequentialParams<CpuBackend>;

    fn single_layer(w: f64, b: f64) -> Model {
        let spec = ModelSpec {
            input_dim: 1,
            layers: vec![LayerSpec::dense(1)],
        };
        let params = SequentialParams {
            layers: vec![DenseParams {
                kernel: Tensor2D::new(vec![w], 1, 1),
                bias: Some(Tensor1D::new(vec![b])),
            }],
        };
        Sequential::from_params(spec, params).unwrap()
    }

    fn line(n: usize) -> (Tensor2D<CpuBackend>, Tensor2D<CpuBackend>) {
        let x: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
        let y = x.iter().map(|v| 2.0 * v + 1.0).collect();
        (Tensor2D::column(x), Tensor2D::column(y))
    }

    #[derive(Default)]
    struct CountingOptimizer {
        steps: usize,
        resets: usize,
    }

    impl Optimizer<CpuBackend, Params> for CountingOptimizer {
        fn step(&mut self, params: &Params, _gradients: &Params) -> Params {
            self.steps += 1;
            params.clone()
        }

        fn reset(&mut self) {
            self.resets += 1;
        }

        fn learning_rate(&self) -> f64 {
            0.0
        }
    }

    fn counting_trainer() -> Trainer<CpuBackend, MSELoss, CountingOptimizer, Model> {
        Trainer::builder(MSELoss, CountingOptimizer::default())
            .batch_size(4)
            .epochs(3)
            .build()
    }

    #[test]
    fn test_trainer_builder_defaults() {
        let builder: TrainerBuilder<CpuBackend, MSELoss, SGD<CpuBackend>, Model> =
            TrainerBuilder::new(MSELoss, SGD::new(0.01));
        assert_eq!(builder.batch_size, 32);
        assert_eq!(builder.epochs, 50);
        assert!(builder.shuffle);
        assert!(!builder.verbose);
        assert_eq!(builder.metrics, vec![Metric::MeanSquaredError]);
    }

    #[test]
    fn test_trainer_builder_with_config() {
        let config = TrainingConfig {
            epochs: 7,
            batch_size: 5,
            shuffle: false,
            seed: Some(1),
            verbose: true,
        };
        let trainer: Trainer<CpuBackend, MSELoss, SGD<CpuBackend>, Model> =
            Trainer::builder(MSELoss, SGD::new(0.01))
                .with_config(&config)
                .build();
        assert_eq!(trainer.epochs, 7);
        assert_eq!(trainer.batch_size, 5);
        assert!(!trainer.shuffle);
        assert!(trainer.verbose);
    }

    #[tokio::test]
    async fn test_fit_learns_line_with_sgd() {
        let (x, y) = line(10);
        let mut model = single_layer(0.0, 0.0);
        let mut trainer = Trainer::builder(MSELoss, SGD::<CpuBackend>::new(0.5))
            .batch_size(10)
            .epochs(200)
            .shuffle(false)
            .build();

        let history = trainer
            .fit_tensors(&mut model, &x, &y, &mut StdRng::seed_from_u64(0))
            .await
            .unwrap();

        assert_eq!(history.len(), 200);
        let pred = model.forward(&Tensor2D::column(vec![0.5])).to_vec()[0];
        assert!((pred - 2.0).abs() < 1e-3, "pred = {pred}");
        assert!(history.final_loss().unwrap() < 1e-5);
    }

    #[tokio::test]
    async fn test_fit_records_metrics_and_decreasing_loss() {
        let (x, y) = line(20);
        let mut model = single_layer(0.1, 0.0);
        let mut trainer = Trainer::builder(MSELoss, Adam::<CpuBackend, Params>::new(0.05))
            .batch_size(8)
            .epochs(30)
            .metrics(vec![Metric::MeanSquaredError, Metric::MeanAbsoluteError])
            .build();

        let history = trainer
            .fit_tensors(&mut model, &x, &y, &mut StdRng::seed_from_u64(42))
            .await
            .unwrap();

        let mse = history.metric("mse");
        assert_eq!(mse.len(), 30);
        assert_eq!(history.metric("mae").len(), 30);
        assert!(mse[29] < mse[0]);
        assert!(history.epochs[29].loss < history.epochs[0].loss);
        assert_eq!(trainer.optimizer().steps(), 30 * 3);
    }

    #[tokio::test]
    async fn test_fit_with_mae_loss() {
        let (x, y) = line(16);
        let mut model = single_layer(0.0, 0.0);
        let mut trainer = Trainer::builder(MAELoss, Adam::<CpuBackend, Params>::new(0.05))
            .batch_size(16)
            .epochs(100)
            .metrics(vec![Metric::MeanAbsoluteError])
            .build();
        let history = trainer
            .fit_tensors(&mut model, &x, &y, &mut StdRng::seed_from_u64(5))
            .await
            .unwrap();
        let mae = history.metric("mae");
        assert!(mae[99] < mae[0]);
    }

    #[tokio::test]
    async fn test_fit_rejects_mismatched_rows_before_any_step() {
        let mut model = single_layer(0.0, 0.0);
        let mut trainer = counting_trainer();
        let x = Tensor2D::column(vec![0.0, 0.5, 1.0]);
        let y = Tensor2D::column(vec![1.0, 2.0]);

        let err = trainer
            .fit_tensors(&mut model, &x, &y, &mut StdRng::seed_from_u64(0))
            .await
            .unwrap_err();
        assert!(matches!(err, TrainingError::InvalidDataset(_)));
        assert_eq!(trainer.optimizer().steps, 0);
    }

    #[tokio::test]
    async fn test_fit_rejects_width_mismatch_before_any_step() {
        let mut model = single_layer(0.0, 0.0);
        let mut trainer = counting_trainer();
        let mut rng = StdRng::seed_from_u64(0);

        let x = Tensor2D::column(vec![0.0, 0.5, 1.0]);
        let wide_y = Tensor2D::new(vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0], 3, 2);
        let err = trainer
            .fit_tensors(&mut model, &x, &wide_y, &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, TrainingError::InvalidDataset(_)), "{err}");

        let wide_x = Tensor2D::new(vec![0.0, 0.0, 0.5, 0.5, 1.0, 1.0], 3, 2);
        let y = Tensor2D::column(vec![1.0, 2.0, 3.0]);
        let err = trainer
            .fit_tensors(&mut model, &wide_x, &y, &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, TrainingError::InvalidDataset(_)), "{err}");

        assert_eq!(trainer.optimizer().steps, 0);
        assert_eq!(trainer.optimizer().resets, 0);
    }

    #[tokio::test]
    async fn test_fit_rejects_empty_dataset() {
        let mut model = single_layer(0.0, 0.0);
        let mut trainer = counting_trainer();
        let empty = Tensor2D::<CpuBackend>::new(vec![], 0, 1);

        let err = trainer
            .fit_tensors(&mut model, &empty, &empty, &mut StdRng::seed_from_u64(0))
            .await
            .unwrap_err();
        assert!(matches!(err, TrainingError::InvalidDataset(_)));
        assert_eq!(trainer.optimizer().steps, 0);
    }

    #[tokio::test]
    async fn test_fit_rejects_zero_batch_size_and_epochs() {
        let (x, y) = line(4);
        let mut model = single_layer(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let mut trainer = Trainer::builder(MSELoss, CountingOptimizer::default())
            .batch_size(0)
            .build();
        let err = trainer.fit_tensors(&mut model, &x, &y, &mut rng).await.unwrap_err();
        assert!(matches!(err, TrainingError::InvalidConfig(_)));

        let mut trainer = Trainer::builder(MSELoss, CountingOptimizer::default())
            .epochs(0)
            .build();
        let err = trainer.fit_tensors(&mut model, &x, &y, &mut rng).await.unwrap_err();
        assert!(matches!(err, TrainingError::InvalidConfig(_)));
        assert_eq!(trainer.optimizer().steps, 0);
    }

    #[tokio::test]
    async fn test_fit_resets_optimizer_each_call() {
        let (x, y) = line(10);
        let mut model = single_layer(0.0, 0.0);
        let mut trainer = counting_trainer();
        let mut rng = StdRng::seed_from_u64(0);

        trainer.fit_tensors(&mut model, &x, &y, &mut rng).await.unwrap();
        trainer.fit_tensors(&mut model, &x, &y, &mut rng).await.unwrap();

        // 10 samples in batches of 4 is 3 steps per epoch.
        assert_eq!(trainer.optimizer().resets, 2);
        assert_eq!(trainer.optimizer().steps, 2 * 3 * 3);
    }
}
