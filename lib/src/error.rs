use thiserror::Error;

use crate::config::ConfigError;
use crate::data::source::FetchError;
use crate::model::ModelError;
use crate::preprocessing::PreprocessingError;
use crate::trainer::TrainingError;

/// Any failure that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("preprocessing failed: {0}")]
    Preprocessing(#[from] PreprocessingError),

    #[error("model construction failed: {0}")]
    Model(#[from] ModelError),

    #[error("training failed: {0}")]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
