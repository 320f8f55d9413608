//! Fully connected affine layer, `y = xW + b`.

use crate::backend::{Backend, Scalar, Tensor1D, Tensor2D};
use crate::model::ParamOps;

/// Learnable parameters of one dense layer.
///
/// `kernel` has shape `(inputs, units)`; `bias`, when present, has `units`
/// elements.
#[derive(Clone, Debug)]
pub struct DenseParams<B: Backend> {
    pub kernel: Tensor2D<B>,
    pub bias: Option<Tensor1D<B>>,
}

impl<B: Backend> DenseParams<B> {
    pub fn zeros(inputs: usize, units: usize, use_bias: bool) -> Self {
        Self {
            kernel: Tensor2D::zeros(inputs, units),
            bias: use_bias.then(|| Tensor1D::zeros(units)),
        }
    }

    pub fn inputs(&self) -> usize {
        self.kernel.rows()
    }

    pub fn units(&self) -> usize {
        self.kernel.cols()
    }

    pub fn param_count(&self) -> usize {
        let (r, c) = self.kernel.shape();
        r * c + self.bias.as_ref().map_or(0, Tensor1D::len)
    }

    fn map(&self, f: impl Fn(&Tensor2D<B>) -> Tensor2D<B>, g: impl Fn(&Tensor1D<B>) -> Tensor1D<B>) -> Self {
        Self {
            kernel: f(&self.kernel),
            bias: self.bias.as_ref().map(g),
        }
    }

    fn zip(
        &self,
        other: &Self,
        f: impl Fn(&Tensor2D<B>, &Tensor2D<B>) -> Tensor2D<B>,
        g: impl Fn(&Tensor1D<B>, &Tensor1D<B>) -> Tensor1D<B>,
    ) -> Self {
        Self {
            kernel: f(&self.kernel, &other.kernel),
            bias: match (&self.bias, &other.bias) {
                (Some(a), Some(b)) => Some(g(a, b)),
                _ => None,
            },
        }
    }
}

impl<B: Backend> ParamOps<B> for DenseParams<B> {
    fn add(&self, other: &Self) -> Self {
        self.zip(other, Tensor2D::add, Tensor1D::add)
    }

    fn mul(&self, other: &Self) -> Self {
        self.zip(other, Tensor2D::mul, Tensor1D::mul)
    }

    fn div(&self, other: &Self) -> Self {
        self.zip(other, Tensor2D::div, Tensor1D::div)
    }

    fn scale(&self, scalar: &Scalar<B>) -> Self {
        self.map(|k| k.scale(scalar), |b| b.scale(scalar))
    }

    fn add_scalar(&self, scalar: &Scalar<B>) -> Self {
        self.map(|k| k.add_scalar(scalar), |b| b.add_scalar(scalar))
    }

    fn sqrt(&self) -> Self {
        self.map(Tensor2D::sqrt, Tensor1D::sqrt)
    }

    fn zeros_like(&self) -> Self {
        Self::zeros(self.inputs(), self.units(), self.bias.is_some())
    }
}

/// Evaluator for a dense layer over borrowed parameters.
#[derive(Clone, Copy, Debug)]
pub struct Dense<'p, B: Backend> {
    params: &'p DenseParams<B>,
}

impl<'p, B: Backend> Dense<'p, B> {
    pub fn new(params: &'p DenseParams<B>) -> Self {
        Self { params }
    }

    /// `x @ kernel + bias` for a batch `x` of shape `(n, inputs)`.
    pub fn forward(&self, x: &Tensor2D<B>) -> Tensor2D<B> {
        let z = x.matmul(&self.params.kernel);
        match &self.params.bias {
            Some(b) => z.add_row(b),
            None => z,
        }
    }

    /// Returns the parameter gradients and the gradient w.r.t. `x`.
    ///
    /// `grad_output` has shape `(n, units)`.
    pub fn backward(&self, x: &Tensor2D<B>, grad_output: &Tensor2D<B>) -> (DenseParams<B>, Tensor2D<B>) {
        let grads = DenseParams {
            kernel: x.transpose().matmul(grad_output),
            bias: self.params.bias.as_ref().map(|_| grad_output.col_sum()),
        };
        let grad_input = grad_output.matmul(&self.params.kernel.transpose());
        (grads, grad_input)
    }
}
