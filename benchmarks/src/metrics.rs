use horsepower_mpg::Predictions;

/// Regression metrics over host slices.
pub struct Metrics;

impl Metrics {
    /// `mean((y_true - y_pred)^2)`; zero for empty input.
    pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        sum_sq / y_true.len() as f64
    }

    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        Self::mse(y_true, y_pred).sqrt()
    }

    /// `mean(|y_true - y_pred|)`; zero for empty input.
    pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let sum_abs: f64 = y_true.iter().zip(y_pred).map(|(&t, &p)| (t - p).abs()).sum();
        sum_abs / y_true.len() as f64
    }

    /// Coefficient of determination, `1 - SS_res / SS_tot`.
    ///
    /// A constant target scores 1.0 when matched exactly and 0.0 otherwise.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have the same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let mean_true = y_true.iter().sum::<f64>() / y_true.len() as f64;
        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    pub fn calculate_all(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
        RegressionMetrics::new(
            Self::mse(y_true, y_pred),
            Self::mae(y_true, y_pred),
            Self::r_squared(y_true, y_pred),
        )
    }

    /// Scores the predicted curve of a run against a known ground truth.
    pub fn against_truth(predictions: &Predictions, truth: impl Fn(f64) -> f64) -> RegressionMetrics {
        let (expected, predicted): (Vec<f64>, Vec<f64>) = predictions
            .predicted_points
            .iter()
            .map(|p| (truth(p.x), p.y))
            .unzip();
        Self::calculate_all(&expected, &predicted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r_squared: f64,
}

impl RegressionMetrics {
    pub fn new(mse: f64, mae: f64, r_squared: f64) -> Self {
        Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r_squared,
        }
    }
}
