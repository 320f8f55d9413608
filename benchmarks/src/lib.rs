//! Shared helpers for the horsepower-mpg benchmarks:
//!
//! - Synthetic cars data with a known ground truth
//! - Regression metrics (MSE, MAE, R²)

pub mod data;
pub mod metrics;

pub use data::SyntheticCars;
pub use metrics::{Metrics, RegressionMetrics};
