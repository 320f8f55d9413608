//! Data preprocessing: min-max scaling and the normalizer that prepares
//! training tensors.
//!
//! Transformers follow a two-state pattern:
//!
//! - [`Transformer`]: unfitted transformer with hyperparameters
//! - [`FittedTransformer`]: fitted transformer holding learned parameters
//!
//! # Example
//!
//! ```
//! use horsepower_mpg::backend::CpuBackend;
//! use horsepower_mpg::data::CleanedRecord;
//! use horsepower_mpg::preprocessing::TensorNormalizer;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let records = vec![
//!     CleanedRecord { horsepower: 50.0, mpg: 40.0 },
//!     CleanedRecord { horsepower: 150.0, mpg: 20.0 },
//! ];
//! let ds = TensorNormalizer::<CpuBackend>::new()
//!     .normalize(&records, &mut StdRng::seed_from_u64(0))
//!     .unwrap();
//! assert_eq!(ds.bounds.input_min, 50.0);
//! assert_eq!(ds.bounds.label_max, 40.0);
//! ```

pub mod error;
pub mod normalize;
pub mod scaling;
pub mod traits;

pub use error::PreprocessingError;
pub use normalize::{NormalizedDataset, ScaleBounds, TensorNormalizer};
pub use scaling::{FittedMinMaxScaler, MinMaxScaler, MinMaxScalerConfig, MinMaxScalerParams};
pub use traits::{FittedTransformer, Transformer};
