//! Scaling transformers for feature normalization.

pub mod minmax;

pub use minmax::{FittedMinMaxScaler, MinMaxScaler, MinMaxScalerConfig, MinMaxScalerParams};
