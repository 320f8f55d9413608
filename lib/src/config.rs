//! Pipeline configuration.
//!
//! Every field has a default equal to the fixed behaviour of the demo, so an
//! empty JSON object (`{}`) is a complete configuration. Partial JSON documents
//! override only the keys they name.
//!
//! ```
//! use horsepower_mpg::config::{OptimizerKind, PipelineConfig};
//!
//! let cfg = PipelineConfig::from_json(r#"{"training": {"epochs": 10}}"#).unwrap();
//! assert_eq!(cfg.training.epochs, 10);
//! assert_eq!(cfg.training.batch_size, 32);
//! assert_eq!(cfg.compile.optimizer, OptimizerKind::Adam);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ModelSpec;

/// Endpoint serving the cars dataset as a JSON array.
pub const DEFAULT_DATASET_URL: &str = "https://storage.googleapis.com/tfjs-tutorials/carsData.json";

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Names of the raw record fields carrying the regression input and label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub horsepower: String,
    pub mpg: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            horsepower: "Horsepower".to_string(),
            mpg: "Miles_per_Gallon".to_string(),
        }
    }
}

/// Optimization algorithm used by the trainer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Adam,
    Sgd,
}

/// Training objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossKind {
    #[serde(rename = "meanSquaredError")]
    MeanSquaredError,
    #[serde(rename = "meanAbsoluteError")]
    MeanAbsoluteError,
}

/// Metric evaluated over the full training set after every epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "mse")]
    MeanSquaredError,
    #[serde(rename = "mae")]
    MeanAbsoluteError,
}

impl Metric {
    /// Short name used in logs and history keys.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::MeanSquaredError => "mse",
            Metric::MeanAbsoluteError => "mae",
        }
    }

    /// Evaluates the metric on host vectors of equal length.
    pub fn evaluate(&self, predictions: &[f64], targets: &[f64]) -> f64 {
        let n = predictions.len().max(1) as f64;
        let residuals = predictions.iter().zip(targets).map(|(p, t)| p - t);
        match self {
            Metric::MeanSquaredError => residuals.map(|r| r * r).sum::<f64>() / n,
            Metric::MeanAbsoluteError => residuals.map(f64::abs).sum::<f64>() / n,
        }
    }
}

/// Optimizer, loss and metrics for a training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    pub optimizer: OptimizerKind,
    pub learning_rate: f64,
    pub loss: LossKind,
    pub metrics: Vec<Metric>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerKind::Adam,
            learning_rate: 0.001,
            loss: LossKind::MeanSquaredError,
            metrics: vec![Metric::MeanSquaredError],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle: bool,
    /// Seed for every random choice of a run. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Log per-epoch summaries at `info` instead of `debug`.
    pub verbose: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            shuffle: true,
            seed: None,
            verbose: false,
        }
    }
}

/// Complete configuration of one pipeline run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dataset_url: String,
    pub fields: FieldMapping,
    pub model: ModelSpec,
    pub compile: CompileConfig,
    pub training: TrainingConfig,
    /// Number of evenly spaced inputs in the prediction sweep.
    pub sweep_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            fields: FieldMapping::default(),
            model: ModelSpec::default(),
            compile: CompileConfig::default(),
            training: TrainingConfig::default(),
            sweep_size: 100,
        }
    }
}

impl PipelineConfig {
    /// Parses a (possibly partial) JSON document and validates the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.training.epochs == 0 {
            return Err(ConfigError::invalid("training.epochs", "must be > 0"));
        }
        if self.training.batch_size == 0 {
            return Err(ConfigError::invalid("training.batch_size", "must be > 0"));
        }
        if self.sweep_size == 0 {
            return Err(ConfigError::invalid("sweep_size", "must be > 0"));
        }
        let lr = self.compile.learning_rate;
        if !(lr.is_finite() && lr > 0.0) {
            return Err(ConfigError::invalid(
                "compile.learning_rate",
                format!("must be a positive finite number, got {lr}"),
            ));
        }
        if self.dataset_url.trim().is_empty() {
            return Err(ConfigError::invalid("dataset_url", "must not be empty"));
        }
        // One horsepower column in, one mpg column out.
        if self.model.input_dim != 1 || self.model.output_dim() != 1 {
            return Err(ConfigError::invalid(
                "model",
                format!(
                    "must map 1 input to 1 output, got {} -> {}",
                    self.model.input_dim,
                    self.model.output_dim()
                ),
            ));
        }
        Ok(())
    }
}
