//! End-to-end run: fetch, clean, normalize, build, train and predict.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::backend::{Backend, Tensor2D};
use crate::config::{LossKind, OptimizerKind, PipelineConfig};
use crate::data::source::{DatasetSource, HttpSource};
use crate::data::DataCleaner;
use crate::error::PipelineError;
use crate::loss::{Loss, MAELoss, MSELoss};
use crate::model::{build_model, Sequential, TrainableModel, Unfitted};
use crate::optimizer::{Adam, SGD};
use crate::predict::{Predictions, Predictor};
use crate::preprocessing::{NormalizedDataset, ScaleBounds, TensorNormalizer};
use crate::trainer::{History, Trainer, TrainingError};

/// Everything a run produced, for callers that want more than the plot data.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub predictions: Predictions,
    pub history: History,
    pub bounds: ScaleBounds,
}

/// A configured run over one dataset source.
#[derive(Clone, Debug)]
pub struct Pipeline<S> {
    source: S,
    config: PipelineConfig,
}

impl Pipeline<HttpSource> {
    /// Fetches from `config.dataset_url`.
    pub fn from_config(config: PipelineConfig) -> Result<Self, PipelineError> {
        let source = HttpSource::new(config.dataset_url.clone());
        Self::new(source, config)
    }
}

impl<S: DatasetSource> Pipeline<S> {
    pub fn new(source: S, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage and returns the points to plot.
    pub async fn run<B: Backend>(&self) -> Result<Predictions, PipelineError> {
        Ok(self.run_with_report::<B>().await?.predictions)
    }

    /// Like [`Pipeline::run`], also returning the training history and the
    /// normalization bounds.
    ///
    /// Any stage failure aborts the run; nothing partial is returned.
    #[tracing::instrument(skip_all, fields(seed = ?self.config.training.seed))]
    pub async fn run_with_report<B: Backend>(&self) -> Result<RunReport, PipelineError> {
        let raw = self.source.fetch().await?;
        let cleaned = DataCleaner::new(self.config.fields.clone()).clean(&raw);
        info!(raw = raw.len(), cleaned = cleaned.len(), "cleaned dataset");

        let mut rng = match self.config.training.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let data = TensorNormalizer::<B>::new().normalize(&cleaned, &mut rng)?;
        let mut model = build_model::<B, _>(&self.config.model, &mut rng)?;
        info!(params = model.param_count(), "built model");

        let history = match self.config.compile.loss {
            LossKind::MeanSquaredError => self.train(MSELoss, &mut model, &data, &mut rng).await?,
            LossKind::MeanAbsoluteError => self.train(MAELoss, &mut model, &data, &mut rng).await?,
        };
        info!(
            epochs = history.len(),
            final_loss = ?history.final_loss(),
            "training finished"
        );

        let fitted = model.into_fitted();
        let predictions = Predictor::new(self.config.sweep_size).predict::<B, _>(
            &fitted,
            &cleaned,
            &data.bounds,
        )?;

        Ok(RunReport {
            predictions,
            history,
            bounds: data.bounds,
        })
    }

    async fn train<B, L>(
        &self,
        loss: L,
        model: &mut Sequential<B, Unfitted>,
        data: &NormalizedDataset<B>,
        rng: &mut StdRng,
    ) -> Result<History, TrainingError>
    where
        B: Backend,
        L: Loss<B, Prediction = Tensor2D<B>, Target = Tensor2D<B>>,
    {
        let compile = &self.config.compile;
        let lr = compile.learning_rate;
        match compile.optimizer {
            OptimizerKind::Adam => {
                Trainer::builder(loss, Adam::new(lr))
                    .with_config(&self.config.training)
                    .metrics(compile.metrics.clone())
                    .build()
                    .fit_tensors(model, &data.inputs, &data.labels, rng)
                    .await
            }
            OptimizerKind::Sgd => {
                Trainer::builder(loss, SGD::new(lr))
                    .with_config(&self.config.training)
                    .metrics(compile.metrics.clone())
                    .build()
                    .fit_tensors(model, &data.inputs, &data.labels, rng)
                    .await
            }
        }
    }
}
