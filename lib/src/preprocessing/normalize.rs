//! Shuffling and min-max normalization of cleaned records into training
//! tensors.

use std::marker::PhantomData;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::backend::{Backend, Tensor2D};
use crate::data::CleanedRecord;
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::scaling::{
    FittedMinMaxScaler, MinMaxScaler, MinMaxScalerConfig, MinMaxScalerParams,
};
use crate::preprocessing::traits::{FittedTransformer, Transformer};

pub const INPUT_FEATURE: &str = "horsepower";
pub const LABEL_FEATURE: &str = "mpg";

/// Column bounds used to normalize a dataset and to map model outputs back
/// into original units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleBounds {
    pub input_min: f64,
    pub input_max: f64,
    pub label_min: f64,
    pub label_max: f64,
}

impl ScaleBounds {
    fn scaler<B: Backend>(
        min: f64,
        max: f64,
        name: &str,
    ) -> Result<FittedMinMaxScaler<B>, PreprocessingError> {
        FittedMinMaxScaler::from_params(MinMaxScalerParams {
            config: MinMaxScalerConfig::default(),
            data_min: vec![min],
            data_max: vec![max],
            feature_names: vec![name.to_string()],
        })
    }

    /// Scaler reproducing the input normalization.
    pub fn input_scaler<B: Backend>(&self) -> Result<FittedMinMaxScaler<B>, PreprocessingError> {
        Self::scaler(self.input_min, self.input_max, INPUT_FEATURE)
    }

    /// Scaler reproducing the label normalization.
    pub fn label_scaler<B: Backend>(&self) -> Result<FittedMinMaxScaler<B>, PreprocessingError> {
        Self::scaler(self.label_min, self.label_max, LABEL_FEATURE)
    }
}

/// Normalized training tensors, both `N x 1` with values in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct NormalizedDataset<B: Backend> {
    pub inputs: Tensor2D<B>,
    pub labels: Tensor2D<B>,
    pub bounds: ScaleBounds,
}

impl<B: Backend> NormalizedDataset<B> {
    pub fn len(&self) -> usize {
        self.inputs.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.rows() == 0
    }
}

/// Turns cleaned records into shuffled, min-max normalized tensors.
#[derive(Clone, Copy, Debug)]
pub struct TensorNormalizer<B: Backend> {
    _backend: PhantomData<B>,
}

impl<B: Backend> Default for TensorNormalizer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> TensorNormalizer<B> {
    pub fn new() -> Self {
        Self {
            _backend: PhantomData,
        }
    }

    /// Shuffles a copy of `records` and min-max scales horsepower (inputs)
    /// and mpg (labels) independently.
    ///
    /// The caller's slice keeps its order.
    ///
    /// # Errors
    /// - [`PreprocessingError::EmptyDataset`] if `records` is empty.
    /// - [`PreprocessingError::DegenerateRange`] if either column is constant.
    #[tracing::instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn normalize<R: Rng + ?Sized>(
        &self,
        records: &[CleanedRecord],
        rng: &mut R,
    ) -> Result<NormalizedDataset<B>, PreprocessingError> {
        if records.is_empty() {
            return Err(PreprocessingError::EmptyDataset);
        }

        let mut shuffled = records.to_vec();
        shuffled.shuffle(rng);

        let (input_scaler, inputs) = {
            let raw = Tensor2D::column(shuffled.iter().map(|r| r.horsepower).collect());
            MinMaxScaler::<B>::new()
                .with_feature_names([INPUT_FEATURE])
                .fit_transform(&raw)?
        };
        let (label_scaler, labels) = {
            let raw = Tensor2D::column(shuffled.iter().map(|r| r.mpg).collect());
            MinMaxScaler::<B>::new()
                .with_feature_names([LABEL_FEATURE])
                .fit_transform(&raw)?
        };

        let input_params = input_scaler.extract_params();
        let label_params = label_scaler.extract_params();
        let bounds = ScaleBounds {
            input_min: input_params.data_min[0],
            input_max: input_params.data_max[0],
            label_min: label_params.data_min[0],
            label_max: label_params.data_max[0],
        };
        tracing::debug!(?bounds, "normalized dataset");

        Ok(NormalizedDataset {
            inputs,
            labels,
            bounds,
        })
    }
}
