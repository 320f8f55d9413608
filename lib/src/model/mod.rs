//! Models, their parameter algebra and the typestate markers.
//!
//! - [`TrainableModel`]: forward/backward passes and in-place parameter
//!   updates, available on `Unfitted` models.
//! - [`InferenceModel`]: frozen prediction, available on `Fitted` models.
//! - [`ParamOps`]: element-wise arithmetic over a full parameter set, used by
//!   optimizers.

pub mod dense;
pub mod sequential;
pub mod state;

pub use dense::{Dense, DenseParams};
pub use sequential::{build_model, LayerSpec, ModelSpec, Sequential, SequentialParams};
pub use state::{Fitted, Unfitted};

use crate::backend::{Backend, Scalar};
use thiserror::Error;

/// Errors raised while building a model from a spec or from parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("model spec has no layers")]
    EmptySpec,

    #[error("layer {layer} has zero units")]
    ZeroUnits { layer: usize },

    #[error("model input dimension is zero")]
    ZeroInputDim,

    #[error("parameters for layer {layer} have shape {got}, expected {expected}")]
    ParamShape {
        layer: usize,
        expected: String,
        got: String,
    },
}

pub trait TrainableModel<B: Backend> {
    type Input;
    type Prediction;
    type Params: ParamOps<B>;
    type Output;

    /// Width of each input row.
    fn input_dim(&self) -> usize;

    /// Width of each prediction row.
    fn output_dim(&self) -> usize;

    fn forward(&self, input: &Self::Input) -> Self::Prediction;

    /// Gradients of the loss w.r.t. every parameter, given the gradient of the
    /// loss w.r.t. this model's prediction on `input`.
    fn backward(&self, input: &Self::Input, grad_output: &Self::Prediction) -> Self::Params;

    fn params(&self) -> &Self::Params;

    fn update_params(&mut self, new_params: Self::Params);

    fn into_fitted(self) -> Self::Output;
}

/// Element-wise arithmetic over a whole parameter set.
pub trait ParamOps<B: Backend>: Clone {
    fn add(&self, other: &Self) -> Self;
    fn mul(&self, other: &Self) -> Self;
    fn div(&self, other: &Self) -> Self;
    fn scale(&self, scalar: &Scalar<B>) -> Self;
    fn add_scalar(&self, scalar: &Scalar<B>) -> Self;
    fn sqrt(&self) -> Self;
    /// Same structure, every value zero.
    fn zeros_like(&self) -> Self;
}

pub trait InferenceModel<B: Backend> {
    type Input;
    type Output;

    fn predict(&self, input: &Self::Input) -> Self::Output;
}
