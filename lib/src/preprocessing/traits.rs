//! Core traits for preprocessing transformers.
//!
//! - [`Transformer`]: the configurable, unfitted state; learns from data.
//! - [`FittedTransformer`]: holds the learned parameters and transforms data.

use serde::{de::DeserializeOwned, Serialize};

use crate::backend::Backend;
use crate::preprocessing::error::PreprocessingError;

/// Trait for unfitted transformers with hyperparameters.
///
/// # Type Parameters
/// - `B`: The backend used for computation.
/// - `Input` / `Output`: data types before and after transformation
///   (typically `Tensor2D<B>`).
/// - `Params`: Serializable representation of learned parameters.
/// - `Fitted`: The corresponding fitted transformer type.
pub trait Transformer<B: Backend>: Clone {
    type Input;
    type Output;
    type Params: Serialize + DeserializeOwned + Clone;
    type Fitted: FittedTransformer<
        B,
        Params = Self::Params,
        Input = Self::Input,
        Output = Self::Output,
    >;

    /// Learns parameters from the data.
    ///
    /// # Errors
    /// Returns [`PreprocessingError`] if the data is empty or cannot be
    /// transformed by this transformer.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError>;

    /// Fits on `data` and returns both the fitted transformer and the
    /// transformed data.
    fn fit_transform(
        &self,
        data: &Self::Input,
    ) -> Result<(Self::Fitted, Self::Output), PreprocessingError> {
        let fitted = self.fit(data)?;
        let out = fitted.transform(data)?;
        Ok((fitted, out))
    }
}

/// Trait for fitted transformers ready for inference.
///
/// `extract_params()` followed by `from_params()` reproduces the transformer.
pub trait FittedTransformer<B: Backend>: Clone {
    type Input;
    type Output;
    type Params: Serialize + DeserializeOwned + Clone;

    /// # Errors
    /// Returns [`PreprocessingError`] if the input does not have the number of
    /// features seen during fit.
    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError>;

    /// Reverses the transformation.
    fn inverse_transform(&self, data: &Self::Output) -> Result<Self::Input, PreprocessingError>;

    fn extract_params(&self) -> Self::Params;

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError>
    where
        Self: Sized;

    /// Returns the number of features seen during fit.
    fn n_features_in(&self) -> usize;
}
