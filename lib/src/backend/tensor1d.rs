use super::scalar::Scalar;
use crate::backend::Backend;
use std::marker::PhantomData;

/// Backend-typed 1D tensor.
///
/// Wraps a backend's native 1D tensor representation (`B::Tensor1D`) while carrying phantom
/// type information about its originating backend. Used for dense-layer biases, scaler
/// bounds and other per-column quantities.
///
/// # Type safety guarantees
/// ```compile_fail
/// use horsepower_mpg::backend::{CpuBackend, NdarrayBackend};
/// use horsepower_mpg::backend::Tensor1D;
///
/// let cpu_tensor: Tensor1D<CpuBackend> = Tensor1D::zeros(3);
/// let ndarray_tensor: Tensor1D<NdarrayBackend> = Tensor1D::zeros(3);
/// let _ = cpu_tensor.sub(&ndarray_tensor); // mismatched backends
/// ```
///
/// # Example
/// ```
/// use horsepower_mpg::backend::{CpuBackend, Scalar, Tensor1D};
///
/// let x: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 2.0, 3.0]);
/// let y = x.scale(&Scalar::<CpuBackend>::new(2.0));
/// assert_eq!(y.to_vec(), vec![2.0, 4.0, 6.0]);
/// ```
#[derive(Clone, Debug)]
pub struct Tensor1D<B: Backend> {
    pub(crate) data: B::Tensor1D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Tensor1D<B> {
    pub(crate) fn wrap(data: B::Tensor1D) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    /// Creates a new 1D tensor from host values.
    pub fn new(data: Vec<f64>) -> Self {
        Self::wrap(B::from_vec_1d(data))
    }

    /// Creates a 1D tensor filled with zeros of specified length.
    pub fn zeros(len: usize) -> Self {
        Self::wrap(B::zeros_1d(len))
    }

    /// Element-wise `self + other`.
    pub fn add(&self, other: &Self) -> Self {
        Self::wrap(B::add_1d(&self.data, &other.data))
    }

    /// Element-wise `self - other`.
    ///
    /// # Example
    /// ```
    /// use horsepower_mpg::backend::{CpuBackend, Tensor1D};
    ///
    /// let a = Tensor1D::<CpuBackend>::new(vec![5.0, 7.0, 9.0]);
    /// let b = Tensor1D::<CpuBackend>::new(vec![2.0, 3.0, 4.0]);
    /// assert_eq!(a.sub(&b).to_vec(), vec![3.0, 4.0, 5.0]);
    /// ```
    pub fn sub(&self, other: &Self) -> Self {
        Self::wrap(B::sub_1d(&self.data, &other.data))
    }

    /// Element-wise `self * other`.
    pub fn mul(&self, other: &Self) -> Self {
        Self::wrap(B::mul_1d(&self.data, &other.data))
    }

    /// Element-wise `self / other`.
    pub fn div(&self, other: &Self) -> Self {
        Self::wrap(B::div_1d(&self.data, &other.data))
    }

    /// Multiplies each element by a scalar.
    pub fn scale(&self, a: &Scalar<B>) -> Self {
        Self::wrap(B::mul_scalar_1d(&self.data, &a.data))
    }

    /// Adds a scalar to each element.
    pub fn add_scalar(&self, a: &Scalar<B>) -> Self {
        Self::wrap(B::add_scalar_1d(&self.data, &a.data))
    }

    /// Element-wise square root.
    pub fn sqrt(&self) -> Self {
        Self::wrap(B::sqrt_1d(&self.data))
    }

    /// Sum of all elements.
    pub fn sum(&self) -> Scalar<B> {
        Scalar {
            data: B::sum_all_1d(&self.data),
            backend: PhantomData,
        }
    }

    /// Converts the tensor to a host `Vec<f64>`.
    pub fn to_vec(&self) -> Vec<f64> {
        B::to_vec_1d(&self.data)
    }

    /// Returns the number of elements in the tensor.
    pub fn len(&self) -> usize {
        B::len_1d(&self.data)
    }

    /// Returns `true` if the tensor contains no elements.
    pub fn is_empty(&self) -> bool {
        B::len_1d(&self.data) == 0
    }
}
