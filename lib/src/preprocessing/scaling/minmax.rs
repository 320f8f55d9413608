//! Min-Max Scaler.
//!
//! Scales each column independently into a target range (default `[0, 1]`):
//! ```text
//! X_scaled = (X - X_min) / (X_max - X_min) * (max - min) + min
//! ```
//! A column whose minimum equals its maximum is rejected at fit time rather
//! than producing NaN or infinite values.
//!
//! # Example
//! ```
//! use horsepower_mpg::backend::{CpuBackend, Tensor2D};
//! use horsepower_mpg::preprocessing::{FittedTransformer, MinMaxScaler, Transformer};
//!
//! let data: Tensor2D<CpuBackend> = Tensor2D::column(vec![50.0, 100.0, 150.0]);
//! let (fitted, scaled) = MinMaxScaler::new().fit_transform(&data).unwrap();
//! assert_eq!(scaled.to_vec(), vec![0.0, 0.5, 1.0]);
//! assert_eq!(fitted.inverse_transform(&scaled).unwrap().to_vec(), data.to_vec());
//! ```

use crate::backend::{Backend, Scalar, Tensor1D, Tensor2D};
use crate::preprocessing::error::PreprocessingError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Target range of a [`MinMaxScaler`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerConfig {
    pub min: f64,
    pub max: f64,
}

impl Default for MinMaxScalerConfig {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Serializable parameters for a fitted MinMaxScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerParams {
    pub config: MinMaxScalerConfig,
    /// Minimum of each feature.
    pub data_min: Vec<f64>,
    /// Maximum of each feature.
    pub data_max: Vec<f64>,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

/// MinMaxScaler transformer (unfitted).
#[derive(Clone, Debug)]
pub struct MinMaxScaler<B: Backend> {
    config: MinMaxScalerConfig,
    feature_names: Vec<String>,
    _backend: PhantomData<B>,
}

impl<B: Backend> Default for MinMaxScaler<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> MinMaxScaler<B> {
    /// Create a new MinMaxScaler with default range [0, 1].
    pub fn new() -> Self {
        Self {
            config: MinMaxScalerConfig::default(),
            feature_names: Vec::new(),
            _backend: PhantomData,
        }
    }

    /// Set the target range for scaling.
    ///
    /// # Panics
    /// If `max <= min`.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        assert!(max > min, "max must be greater than min");
        self.config.min = min;
        self.config.max = max;
        self
    }

    /// Names reported in errors for each column, in column order.
    pub fn with_feature_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.feature_names = names.into_iter().map(Into::into).collect();
        self
    }
}

fn feature_name(names: &[String], j: usize) -> String {
    names
        .get(j)
        .cloned()
        .unwrap_or_else(|| format!("column {j}"))
}

fn check_bounds(
    data_min: &[f64],
    data_max: &[f64],
    names: &[String],
) -> Result<(), PreprocessingError> {
    for (j, (&lo, &hi)) in data_min.iter().zip(data_max).enumerate() {
        // `!(hi > lo)` also rejects NaN bounds
        if !(hi > lo) {
            return Err(PreprocessingError::DegenerateRange {
                feature: feature_name(names, j),
                value: lo,
            });
        }
    }
    Ok(())
}

impl<B: Backend> Transformer<B> for MinMaxScaler<B> {
    type Input = Tensor2D<B>;
    type Output = Tensor2D<B>;
    type Params = MinMaxScalerParams;
    type Fitted = FittedMinMaxScaler<B>;

    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted, PreprocessingError> {
        let (rows, cols) = data.shape();
        if rows == 0 || cols == 0 {
            return Err(PreprocessingError::EmptyDataset);
        }

        let data_min = data.col_min();
        let data_max = data.col_max();
        check_bounds(&data_min.to_vec(), &data_max.to_vec(), &self.feature_names)?;

        Ok(FittedMinMaxScaler {
            config: self.config.clone(),
            data_range: data_max.sub(&data_min),
            data_min,
            data_max,
            n_features: cols,
            feature_names: self.feature_names.clone(),
        })
    }
}

/// Fitted MinMaxScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedMinMaxScaler<B: Backend> {
    config: MinMaxScalerConfig,
    data_min: Tensor1D<B>,
    data_max: Tensor1D<B>,
    data_range: Tensor1D<B>,
    n_features: usize,
    feature_names: Vec<String>,
}

impl<B: Backend> FittedMinMaxScaler<B> {
    /// Per-feature minimum seen during fit.
    pub fn data_min(&self) -> &Tensor1D<B> {
        &self.data_min
    }

    /// Per-feature maximum seen during fit.
    pub fn data_max(&self) -> &Tensor1D<B> {
        &self.data_max
    }

    /// Per-feature `max - min`.
    pub fn data_range(&self) -> &Tensor1D<B> {
        &self.data_range
    }

    fn check_features(&self, data: &Tensor2D<B>) -> Result<(), PreprocessingError> {
        let (_, cols) = data.shape();
        if cols != self.n_features {
            return Err(PreprocessingError::FeatureMismatch {
                expected_features: self.n_features,
                got_features: cols,
            });
        }
        Ok(())
    }

    fn target_span(&self) -> Scalar<B> {
        Scalar::new(self.config.max - self.config.min)
    }
}

impl<B: Backend> FittedTransformer<B> for FittedMinMaxScaler<B> {
    type Input = Tensor2D<B>;
    type Output = Tensor2D<B>;
    type Params = MinMaxScalerParams;

    fn transform(&self, data: &Self::Input) -> Result<Self::Output, PreprocessingError> {
        self.check_features(data)?;
        Ok(data
            .sub_row(&self.data_min)
            .div_row(&self.data_range)
            .scale(&self.target_span())
            .add_scalar(&Scalar::new(self.config.min)))
    }

    fn inverse_transform(&self, data: &Self::Output) -> Result<Self::Input, PreprocessingError> {
        self.check_features(data)?;
        Ok(data
            .add_scalar(&Scalar::new(-self.config.min))
            .scale(&(Scalar::new(1.0) / self.target_span()))
            .mul_row(&self.data_range)
            .add_row(&self.data_min))
    }

    fn extract_params(&self) -> Self::Params {
        MinMaxScalerParams {
            config: self.config.clone(),
            data_min: self.data_min.to_vec(),
            data_max: self.data_max.to_vec(),
            feature_names: self.feature_names.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, PreprocessingError> {
        if params.data_min.len() != params.data_max.len() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} maxima", params.data_min.len()),
                got: format!("{} maxima", params.data_max.len()),
            });
        }
        if params.data_min.is_empty() {
            return Err(PreprocessingError::EmptyDataset);
        }
        check_bounds(&params.data_min, &params.data_max, &params.feature_names)?;

        let data_min = Tensor1D::new(params.data_min);
        let data_max = Tensor1D::new(params.data_max);
        Ok(Self {
            config: params.config,
            n_features: data_min.len(),
            data_range: data_max.sub(&data_min),
            data_min,
            data_max,
            feature_names: params.feature_names,
        })
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    fn create_test_data() -> Tensor2D<CpuBackend> {
        // [[0, 1], [0, 1], [1, 3]]
        Tensor2D::new(vec![0.0, 1.0, 0.0, 1.0, 1.0, 3.0], 3, 2)
    }

    #[test]
    fn test_minmax_scaler_fit() {
        let fitted = MinMaxScaler::<CpuBackend>::new()
            .fit(&create_test_data())
            .unwrap();
        assert_eq!(fitted.data_min().to_vec(), vec![0.0, 1.0]);
        assert_eq!(fitted.data_max().to_vec(), vec![1.0, 3.0]);
        assert_eq!(fitted.data_range().to_vec(), vec![1.0, 2.0]);
        assert_eq!(fitted.n_features_in(), 2);
    }

    #[test]
    fn test_minmax_scaler_transform() {
        let data = create_test_data();
        let (_, transformed) = MinMaxScaler::<CpuBackend>::new()
            .fit_transform(&data)
            .unwrap();
        assert_eq!(transformed.to_vec(), vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_minmax_scaler_custom_range() {
        let data = create_test_data();
        let (fitted, transformed) = MinMaxScaler::<CpuBackend>::new()
            .with_range(-1.0, 1.0)
            .fit_transform(&data)
            .unwrap();
        assert_eq!(transformed.to_vec(), vec![-1.0, -1.0, -1.0, -1.0, 1.0, 1.0]);
        let restored = fitted.inverse_transform(&transformed).unwrap();
        for (a, b) in restored.to_vec().iter().zip(data.to_vec()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_minmax_scaler_constant_column_is_rejected() {
        let data: Tensor2D<CpuBackend> = Tensor2D::from_rows(&[vec![1.0, 5.0], vec![2.0, 5.0]]);
        let err = MinMaxScaler::<CpuBackend>::new()
            .with_feature_names(["horsepower", "mpg"])
            .fit(&data)
            .unwrap_err();
        assert_eq!(
            err,
            PreprocessingError::DegenerateRange {
                feature: "mpg".to_string(),
                value: 5.0
            }
        );
    }

    #[test]
    fn test_minmax_scaler_unnamed_column_in_error() {
        let data: Tensor2D<CpuBackend> = Tensor2D::column(vec![3.0, 3.0]);
        let err = MinMaxScaler::<CpuBackend>::new().fit(&data).unwrap_err();
        assert!(err.to_string().contains("column 0"));
    }

    #[test]
    fn test_minmax_scaler_empty_data() {
        let data: Tensor2D<CpuBackend> = Tensor2D::zeros(0, 1);
        let err = MinMaxScaler::<CpuBackend>::new().fit(&data).unwrap_err();
        assert_eq!(err, PreprocessingError::EmptyDataset);
    }

    #[test]
    fn test_minmax_scaler_feature_mismatch() {
        let fitted = MinMaxScaler::<CpuBackend>::new()
            .fit(&create_test_data())
            .unwrap();
        let wrong: Tensor2D<CpuBackend> = Tensor2D::column(vec![1.0, 2.0]);
        assert!(matches!(
            fitted.transform(&wrong),
            Err(PreprocessingError::FeatureMismatch {
                expected_features: 2,
                got_features: 1
            })
        ));
    }

    #[test]
    fn test_minmax_params_roundtrip() {
        let fitted = MinMaxScaler::<CpuBackend>::new()
            .fit(&create_test_data())
            .unwrap();
        let params = fitted.extract_params();
        let json = serde_json::to_string(&params).unwrap();
        let restored =
            FittedMinMaxScaler::<CpuBackend>::from_params(serde_json::from_str(&json).unwrap())
                .unwrap();
        let probe: Tensor2D<CpuBackend> = Tensor2D::from_rows(&[vec![0.5, 2.0]]);
        assert_eq!(
            restored.transform(&probe).unwrap().to_vec(),
            fitted.transform(&probe).unwrap().to_vec()
        );
    }

    #[test]
    fn test_from_params_rejects_degenerate_bounds() {
        let params = MinMaxScalerParams {
            config: MinMaxScalerConfig::default(),
            data_min: vec![4.0],
            data_max: vec![4.0],
            feature_names: vec!["horsepower".into()],
        };
        assert!(matches!(
            FittedMinMaxScaler::<CpuBackend>::from_params(params),
            Err(PreprocessingError::DegenerateRange { .. })
        ));
    }
}
