//! Error types for preprocessing operations.

use thiserror::Error;

/// Error type for preprocessing operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PreprocessingError {
    /// Empty data provided where non-empty was required.
    #[error("empty dataset: nothing to normalize")]
    EmptyDataset,

    /// A column whose minimum equals its maximum cannot be min-max scaled.
    #[error("degenerate range for feature `{feature}`: every value equals {value}")]
    DegenerateRange { feature: String, value: f64 },

    /// Feature dimension mismatch.
    #[error("feature mismatch: expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },

    /// Shape mismatch between expected and actual dimensions.
    #[error("invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },
}
