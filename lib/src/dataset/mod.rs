//! Dataset abstractions for training.
//!
//! A [`Dataset`] is a source of `(X, y)` pairs where `X` is a feature matrix of
//! shape `(n_samples, n_features)` and `y` a target matrix of shape
//! `(n_samples, n_targets)`. [`DatasetBatchIter`] walks a dataset in
//! mini-batches, either in storage order or in a shuffled order drawn once per
//! pass.
//!
//! # Example
//!
//! ```rust
//! use horsepower_mpg::dataset::{Dataset, InMemoryDataset};
//! use horsepower_mpg::backend::CpuBackend;
//!
//! let x = vec![vec![1.0], vec![2.0], vec![3.0]];
//! let y = vec![vec![0.0], vec![1.0], vec![2.0]];
//! let dataset = InMemoryDataset::new(x, y).unwrap();
//!
//! let shapes: Vec<_> = dataset
//!     .batches::<CpuBackend>(2)
//!     .map(|batch| batch.unwrap().0.shape())
//!     .collect();
//! assert_eq!(shapes, vec![(2, 1), (1, 1)]);
//! ```

use crate::backend::{Backend, Tensor2D};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt::{Debug, Display};
use std::marker::PhantomData;

pub mod memory;
pub use self::memory::{DatasetError, InMemoryDataset};

/// Abstract interface for a training dataset.
pub trait Dataset {
    /// Error type returned when accessing data.
    type Error: Debug + Display + 'static;

    /// Total number of samples, if known.
    fn len(&self) -> Option<usize>;

    fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Loads the samples at `indices`, in that order.
    fn get_batch<B: Backend>(&self, indices: &[usize])
        -> Result<(Tensor2D<B>, Tensor2D<B>), Self::Error>;

    /// Consecutive batches in storage order; the last one may be smaller.
    fn batches<B: Backend>(&self, batch_size: usize) -> DatasetBatchIter<'_, B, Self>
    where
        Self: Sized,
    {
        let order = (0..self.len().unwrap_or(0)).collect();
        DatasetBatchIter::new(self, order, batch_size)
    }

    /// Batches over a fresh random permutation of the samples.
    fn shuffled_batches<B: Backend, R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> DatasetBatchIter<'_, B, Self>
    where
        Self: Sized,
    {
        let mut order: Vec<usize> = (0..self.len().unwrap_or(0)).collect();
        order.shuffle(rng);
        DatasetBatchIter::new(self, order, batch_size)
    }
}

/// Iterator over dataset batches.
///
/// Created by [`Dataset::batches`] or [`Dataset::shuffled_batches`]. Data is
/// loaded lazily, one batch per `next()`; errors from `get_batch` are yielded
/// as `Some(Err(_))`.
pub struct DatasetBatchIter<'a, B: Backend, D: ?Sized> {
    dataset: &'a D,
    order: Vec<usize>,
    batch_size: usize,
    current: usize,
    _backend: PhantomData<B>,
}

impl<'a, B: Backend, D: Dataset> DatasetBatchIter<'a, B, D> {
    fn new(dataset: &'a D, order: Vec<usize>, batch_size: usize) -> Self {
        Self {
            dataset,
            order,
            batch_size,
            current: 0,
            _backend: PhantomData,
        }
    }
}

impl<B: Backend, D: Dataset> Iterator for DatasetBatchIter<'_, B, D> {
    type Item = Result<(Tensor2D<B>, Tensor2D<B>), D::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        // A zero batch size would never advance.
        if self.batch_size == 0 || self.current >= self.order.len() {
            return None;
        }

        let end = (self.current + self.batch_size).min(self.order.len());
        let indices = &self.order[self.current..end];
        self.current = end;
        Some(self.dataset.get_batch::<B>(indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // Sample i has features [2i, 2i+1] and target i.
    struct MockDataset {
        len: usize,
    }

    impl Dataset for MockDataset {
        type Error = &'static str;

        fn len(&self) -> Option<usize> {
            Some(self.len)
        }

        fn get_batch<B: Backend>(
            &self,
            indices: &[usize],
        ) -> Result<(Tensor2D<B>, Tensor2D<B>), Self::Error> {
            if indices.iter().any(|&i| i >= self.len) {
                return Err("index out of bounds");
            }
            let x: Vec<f64> = indices
                .iter()
                .flat_map(|&i| [2.0 * i as f64, 2.0 * i as f64 + 1.0])
                .collect();
            let y = indices.iter().map(|&i| i as f64).collect();
            Ok((Tensor2D::new(x, indices.len(), 2), Tensor2D::column(y)))
        }
    }

    #[test]
    fn test_dataset_is_empty() {
        assert!(MockDataset { len: 0 }.is_empty());
        assert!(!MockDataset { len: 1 }.is_empty());
    }

    #[test]
    fn test_batches_full() {
        let dataset = MockDataset { len: 6 };
        let mut iter = dataset.batches::<CpuBackend>(2);

        for i in 0..3 {
            let (x, y) = iter.next().unwrap().unwrap();
            assert_eq!(x.shape(), (2, 2));
            assert_eq!(y.to_vec(), vec![i as f64 * 2.0, i as f64 * 2.0 + 1.0]);
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_batches_partial_last() {
        let dataset = MockDataset { len: 5 };
        let mut iter = dataset.batches::<CpuBackend>(2);

        assert_eq!(iter.next().unwrap().unwrap().0.shape(), (2, 2));
        assert_eq!(iter.next().unwrap().unwrap().0.shape(), (2, 2));
        assert_eq!(iter.next().unwrap().unwrap().0.shape(), (1, 2));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_batches_larger_than_dataset() {
        let dataset = MockDataset { len: 3 };
        let mut iter = dataset.batches::<CpuBackend>(10);
        assert_eq!(iter.next().unwrap().unwrap().0.shape(), (3, 2));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_batches_empty_dataset_and_zero_batch_size() {
        assert!(MockDataset { len: 0 }.batches::<CpuBackend>(2).next().is_none());
        assert!(MockDataset { len: 4 }.batches::<CpuBackend>(0).next().is_none());
    }

    #[test]
    fn test_shuffled_batches_visit_every_sample_once() {
        let dataset = MockDataset { len: 37 };
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen: Vec<f64> = dataset
            .shuffled_batches::<CpuBackend, _>(8, &mut rng)
            .flat_map(|b| b.unwrap().1.to_vec())
            .collect();
        assert_eq!(seen.len(), 37);
        seen.sort_by(f64::total_cmp);
        let expected: Vec<f64> = (0..37).map(|i| i as f64).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_shuffled_batches_keep_rows_aligned() {
        let dataset = MockDataset { len: 10 };
        let mut rng = StdRng::seed_from_u64(11);
        for batch in dataset.shuffled_batches::<CpuBackend, _>(4, &mut rng) {
            let (x, y) = batch.unwrap();
            for (row, target) in x.to_rows().iter().zip(y.to_vec()) {
                assert_eq!(row[0], 2.0 * target);
            }
        }
    }

    #[test]
    fn test_shuffled_order_depends_on_seed() {
        let dataset = MockDataset { len: 20 };
        let order = |seed| -> Vec<f64> {
            let mut rng = StdRng::seed_from_u64(seed);
            dataset
                .shuffled_batches::<CpuBackend, _>(20, &mut rng)
                .flat_map(|b| b.unwrap().1.to_vec())
                .collect()
        };
        assert_eq!(order(1), order(1));
        assert_ne!(order(1), order(2));
    }
}
