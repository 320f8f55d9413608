use super::Dataset;
use crate::backend::{Backend, Tensor2D};
use thiserror::Error;

/// Errors raised when building or slicing an [`InMemoryDataset`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DatasetError {
    #[error("dataset has no samples")]
    Empty,

    #[error("features have {features} rows but targets have {targets}")]
    LengthMismatch { features: usize, targets: usize },

    #[error("row {row} has {got} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("sample index {index} out of bounds for {len} samples")]
    OutOfBounds { index: usize, len: usize },
}

/// Dataset held entirely in host memory, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct InMemoryDataset {
    x: Vec<f64>,
    y: Vec<f64>,
    n_samples: usize,
    n_features: usize,
    n_targets: usize,
}

impl InMemoryDataset {
    /// Builds a dataset from per-sample feature and target rows.
    pub fn new(x: Vec<Vec<f64>>, y: Vec<Vec<f64>>) -> Result<Self, DatasetError> {
        if x.len() != y.len() {
            return Err(DatasetError::LengthMismatch {
                features: x.len(),
                targets: y.len(),
            });
        }
        let (x, n_features) = flatten(x)?;
        let (y, n_targets) = flatten(y)?;
        let n_samples = x.len() / n_features;
        Ok(Self {
            x,
            y,
            n_samples,
            n_features,
            n_targets,
        })
    }

    /// Copies a pair of tensors into a dataset.
    pub fn from_tensors<B: Backend>(
        inputs: &Tensor2D<B>,
        labels: &Tensor2D<B>,
    ) -> Result<Self, DatasetError> {
        let (n_samples, n_features) = inputs.shape();
        let (n_labels, n_targets) = labels.shape();
        if n_samples != n_labels {
            return Err(DatasetError::LengthMismatch {
                features: n_samples,
                targets: n_labels,
            });
        }
        if n_samples == 0 || n_features == 0 || n_targets == 0 {
            return Err(DatasetError::Empty);
        }
        Ok(Self {
            x: inputs.to_vec(),
            y: labels.to_vec(),
            n_samples,
            n_features,
            n_targets,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_targets(&self) -> usize {
        self.n_targets
    }
}

fn flatten(rows: Vec<Vec<f64>>) -> Result<(Vec<f64>, usize), DatasetError> {
    let width = rows.first().map(Vec::len).ok_or(DatasetError::Empty)?;
    if width == 0 {
        return Err(DatasetError::Empty);
    }
    let mut flat = Vec::with_capacity(rows.len() * width);
    for (row, values) in rows.into_iter().enumerate() {
        if values.len() != width {
            return Err(DatasetError::RaggedRow {
                row,
                expected: width,
                got: values.len(),
            });
        }
        flat.extend(values);
    }
    Ok((flat, width))
}

impl Dataset for InMemoryDataset {
    type Error = DatasetError;

    fn len(&self) -> Option<usize> {
        Some(self.n_samples)
    }

    fn get_batch<B: Backend>(
        &self,
        indices: &[usize],
    ) -> Result<(Tensor2D<B>, Tensor2D<B>), Self::Error> {
        let mut x = Vec::with_capacity(indices.len() * self.n_features);
        let mut y = Vec::with_capacity(indices.len() * self.n_targets);
        for &i in indices {
            if i >= self.n_samples {
                return Err(DatasetError::OutOfBounds {
                    index: i,
                    len: self.n_samples,
                });
            }
            x.extend_from_slice(&self.x[i * self.n_features..(i + 1) * self.n_features]);
            y.extend_from_slice(&self.y[i * self.n_targets..(i + 1) * self.n_targets]);
        }
        Ok((
            Tensor2D::new(x, indices.len(), self.n_features),
            Tensor2D::new(y, indices.len(), self.n_targets),
        ))
    }
}
