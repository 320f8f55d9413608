//! Prediction sweep over the normalized input range, mapped back to original
//! units for plotting.

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, Tensor2D};
use crate::data::CleanedRecord;
use crate::model::InferenceModel;
use crate::preprocessing::{FittedTransformer, PreprocessingError, ScaleBounds};

/// One `(x, y)` point in original units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub x: f64,
    pub y: f64,
}

/// The model's curve over the input range alongside the cleaned data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictions {
    pub predicted_points: Vec<PredictionPoint>,
    pub original_points: Vec<PredictionPoint>,
}

/// `n` evenly spaced values covering `[0, 1]` inclusive.
///
/// A one-point sweep is `[0.0]`; an empty sweep is empty.
///
/// ```
/// use horsepower_mpg::predict::sweep;
///
/// assert_eq!(sweep(3), vec![0.0, 0.5, 1.0]);
/// assert_eq!(sweep(1), vec![0.0]);
/// ```
pub fn sweep(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}

/// Runs a fitted model on a sweep of normalized inputs.
#[derive(Clone, Copy, Debug)]
pub struct Predictor {
    sweep_size: usize,
}

impl Default for Predictor {
    fn default() -> Self {
        Self { sweep_size: 100 }
    }
}

impl Predictor {
    pub fn new(sweep_size: usize) -> Self {
        Self { sweep_size }
    }

    pub fn sweep_size(&self) -> usize {
        self.sweep_size
    }

    /// Predicts over the sweep and denormalizes both axes with `bounds`.
    ///
    /// `records` are reported as `originalPoints` in the order given.
    #[tracing::instrument(level = "debug", skip_all, fields(sweep = self.sweep_size))]
    pub fn predict<B, M>(
        &self,
        model: &M,
        records: &[CleanedRecord],
        bounds: &ScaleBounds,
    ) -> Result<Predictions, PreprocessingError>
    where
        B: Backend,
        M: InferenceModel<B, Input = Tensor2D<B>, Output = Tensor2D<B>>,
    {
        let xs = Tensor2D::<B>::column(sweep(self.sweep_size));
        let preds = model.predict(&xs);

        let x_orig = bounds.input_scaler::<B>()?.inverse_transform(&xs)?.to_vec();
        let y_orig = bounds.label_scaler::<B>()?.inverse_transform(&preds)?.to_vec();

        let predicted_points = x_orig
            .into_iter()
            .zip(y_orig)
            .map(|(x, y)| PredictionPoint { x, y })
            .collect();
        let original_points = records
            .iter()
            .map(|r| PredictionPoint {
                x: r.horsepower,
                y: r.mpg,
            })
            .collect();

        Ok(Predictions {
            predicted_points,
            original_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CpuBackend, Tensor1D};
    use crate::model::{DenseParams, ModelSpec, Sequential, SequentialParams, TrainableModel};
    use serde_json::json;

    fn identity_model() -> Sequential<CpuBackend, crate::model::Fitted> {
        let layer = |w: f64| DenseParams {
            kernel: Tensor2D::new(vec![w], 1, 1),
            bias: Some(Tensor1D::new(vec![0.0])),
        };
        Sequential::from_params(
            ModelSpec::default(),
            SequentialParams {
                layers: vec![layer(1.0), layer(1.0)],
            },
        )
        .unwrap()
        .into_fitted()
    }

    fn bounds() -> ScaleBounds {
        ScaleBounds {
            input_min: 50.0,
            input_max: 250.0,
            label_min: 10.0,
            label_max: 40.0,
        }
    }

    #[test]
    fn test_sweep_edges() {
        assert!(sweep(0).is_empty());
        assert_eq!(sweep(1), vec![0.0]);
        assert_eq!(sweep(2), vec![0.0, 1.0]);
        let s = sweep(100);
        assert_eq!(s.len(), 100);
        assert_eq!(s[0], 0.0);
        assert_eq!(s[99], 1.0);
    }

    #[test]
    fn test_predict_has_sweep_size_points_in_original_units() {
        let p = Predictor::default()
            .predict(&identity_model(), &[], &bounds())
            .unwrap();

        assert_eq!(p.predicted_points.len(), 100);
        assert!(p
            .predicted_points
            .windows(2)
            .all(|w| w[0].x <= w[1].x));
        assert_eq!(p.predicted_points[0], PredictionPoint { x: 50.0, y: 10.0 });
        let last = p.predicted_points[99];
        assert!((last.x - 250.0).abs() < 1e-9);
        assert!((last.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_original_points_keep_order() {
        let records = vec![
            CleanedRecord {
                horsepower: 130.0,
                mpg: 18.0,
            },
            CleanedRecord {
                horsepower: 95.0,
                mpg: 24.0,
            },
        ];
        let p = Predictor::new(3)
            .predict(&identity_model(), &records, &bounds())
            .unwrap();
        assert_eq!(
            p.original_points,
            vec![
                PredictionPoint { x: 130.0, y: 18.0 },
                PredictionPoint { x: 95.0, y: 24.0 },
            ]
        );
    }

    #[test]
    fn test_degenerate_bounds_are_rejected() {
        let flat = ScaleBounds {
            input_max: 50.0,
            ..bounds()
        };
        let err = Predictor::default()
            .predict(&identity_model(), &[], &flat)
            .unwrap_err();
        assert!(matches!(err, PreprocessingError::DegenerateRange { .. }));
    }

    #[test]
    fn test_predictions_json_shape() {
        let p = Predictions {
            predicted_points: vec![PredictionPoint { x: 1.0, y: 2.0 }],
            original_points: vec![],
        };
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({"predictedPoints": [{"x": 1.0, "y": 2.0}], "originalPoints": []})
        );
    }
}
