use super::scalar::Scalar;
use super::tensor1d::Tensor1D;
use crate::backend::Backend;
use std::marker::PhantomData;

/// Backend-typed, row-major 2D tensor.
///
/// Rows are samples, columns are features. Every method returns a new tensor;
/// nothing is mutated in place.
///
/// # Example
/// ```
/// use horsepower_mpg::backend::{CpuBackend, Tensor1D, Tensor2D};
///
/// let x: Tensor2D<CpuBackend> = Tensor2D::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
/// let shifted = x.sub_row(&Tensor1D::new(vec![1.0, 2.0]));
/// assert_eq!(shifted.to_vec(), vec![0.0, 0.0, 2.0, 2.0]);
/// assert_eq!(x.shape(), (2, 2));
/// ```
#[derive(Clone, Debug)]
pub struct Tensor2D<B: Backend> {
    pub(crate) data: B::Tensor2D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Tensor2D<B> {
    pub(crate) fn wrap(data: B::Tensor2D) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    /// Creates a tensor from row-major host values.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Self {
        Self::wrap(B::from_vec_2d(data, rows, cols))
    }

    /// Builds a tensor from a slice of equally long rows.
    ///
    /// # Panics
    /// If rows have different lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "All rows must have same length"
        );
        let data: Vec<f64> = rows.iter().flat_map(|r| r.iter()).copied().collect();
        Self::new(data, rows.len(), cols)
    }

    /// A single-column tensor, one row per value.
    pub fn column(values: Vec<f64>) -> Self {
        let rows = values.len();
        Self::new(values, rows, 1)
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::wrap(B::zeros_2d(rows, cols))
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::wrap(B::add_2d(&self.data, &other.data))
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::wrap(B::sub_2d(&self.data, &other.data))
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::wrap(B::mul_2d(&self.data, &other.data))
    }

    pub fn div(&self, other: &Self) -> Self {
        Self::wrap(B::div_2d(&self.data, &other.data))
    }

    pub fn scale(&self, a: &Scalar<B>) -> Self {
        Self::wrap(B::mul_scalar_2d(&self.data, &a.data))
    }

    pub fn add_scalar(&self, a: &Scalar<B>) -> Self {
        Self::wrap(B::add_scalar_2d(&self.data, &a.data))
    }

    pub fn sqrt(&self) -> Self {
        Self::wrap(B::sqrt_2d(&self.data))
    }

    pub fn abs(&self) -> Self {
        Self::wrap(B::abs_2d(&self.data))
    }

    /// Element-wise sign: -1.0, 0.0 or 1.0.
    pub fn sign(&self) -> Self {
        Self::wrap(B::sign_2d(&self.data))
    }

    pub fn sum(&self) -> Scalar<B> {
        Scalar {
            data: B::sum_all_2d(&self.data),
            backend: PhantomData,
        }
    }

    /// Mean over every element. NaN for an empty tensor.
    pub fn mean(&self) -> Scalar<B> {
        Scalar {
            data: B::mean_all_2d(&self.data),
            backend: PhantomData,
        }
    }

    /// Matrix product `self @ other`.
    ///
    /// # Panics
    /// If `self.cols() != other.rows()`.
    pub fn matmul(&self, other: &Self) -> Self {
        Self::wrap(B::matmul(&self.data, &other.data))
    }

    pub fn transpose(&self) -> Self {
        Self::wrap(B::transpose(&self.data))
    }

    /// Per-column minimum.
    pub fn col_min(&self) -> Tensor1D<B> {
        Tensor1D::wrap(B::col_min_2d(&self.data))
    }

    /// Per-column maximum.
    pub fn col_max(&self) -> Tensor1D<B> {
        Tensor1D::wrap(B::col_max_2d(&self.data))
    }

    /// Per-column sum.
    pub fn col_sum(&self) -> Tensor1D<B> {
        Tensor1D::wrap(B::col_sum_2d(&self.data))
    }

    /// Adds `v[j]` to every element of column `j`.
    pub fn add_row(&self, v: &Tensor1D<B>) -> Self {
        Self::wrap(B::broadcast_add_1d_to_2d_rows(&self.data, &v.data))
    }

    /// Subtracts `v[j]` from every element of column `j`.
    pub fn sub_row(&self, v: &Tensor1D<B>) -> Self {
        Self::wrap(B::broadcast_sub_1d_to_2d_rows(&self.data, &v.data))
    }

    /// Multiplies every element of column `j` by `v[j]`.
    pub fn mul_row(&self, v: &Tensor1D<B>) -> Self {
        Self::wrap(B::broadcast_mul_1d_to_2d_rows(&self.data, &v.data))
    }

    /// Divides every element of column `j` by `v[j]`.
    pub fn div_row(&self, v: &Tensor1D<B>) -> Self {
        Self::wrap(B::broadcast_div_1d_to_2d_rows(&self.data, &v.data))
    }

    /// Row-major host copy of the data.
    pub fn to_vec(&self) -> Vec<f64> {
        B::to_vec_2d(&self.data)
    }

    /// Host copy split into rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let (_, cols) = self.shape();
        if cols == 0 {
            return Vec::new();
        }
        self.to_vec().chunks(cols).map(<[f64]>::to_vec).collect()
    }

    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        B::shape(&self.data)
    }

    pub fn rows(&self) -> usize {
        self.shape().0
    }

    pub fn cols(&self) -> usize {
        self.shape().1
    }

    pub fn is_empty(&self) -> bool {
        let (r, c) = self.shape();
        r == 0 || c == 0
    }
}
