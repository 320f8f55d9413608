use crate::backend::{Backend, Scalar};
use crate::model::ParamOps;
use std::marker::PhantomData;

/// Trait for gradient-based optimizers.
///
/// Training logic (`Trainer`) is decoupled from the parameter update rule:
/// any model whose parameters implement [`ParamOps`] can be paired with any
/// optimizer, without dynamic dispatch.
///
/// # Type Parameters
/// * `B` — computation backend implementing [`Backend`]
/// * `P` — model parameters type
///
/// # Example
/// ```rust
/// use horsepower_mpg::backend::{CpuBackend, Tensor1D, Tensor2D};
/// use horsepower_mpg::model::DenseParams;
/// use horsepower_mpg::optimizer::{Optimizer, SGD};
///
/// let params = DenseParams::<CpuBackend> {
///     kernel: Tensor2D::new(vec![1.0], 1, 1),
///     bias: Some(Tensor1D::new(vec![0.5])),
/// };
/// let grads = DenseParams::<CpuBackend> {
///     kernel: Tensor2D::new(vec![10.0], 1, 1),
///     bias: Some(Tensor1D::new(vec![-10.0])),
/// };
/// let mut sgd = SGD::<CpuBackend>::new(0.01);
/// let updated = sgd.step(&params, &grads);
/// assert!((updated.kernel.to_vec()[0] - 0.9).abs() < 1e-12);
/// assert!((updated.bias.unwrap().to_vec()[0] - 0.6).abs() < 1e-12);
/// ```
pub trait Optimizer<B: Backend, P> {
    /// Returns the updated parameters for one step.
    ///
    /// Stateful optimizers advance their internal moments here.
    fn step(&mut self, params: &P, gradients: &P) -> P;

    /// Forgets any accumulated state so the next step is a first step.
    fn reset(&mut self) {}

    fn learning_rate(&self) -> f64;
}

/// Stochastic Gradient Descent.
///
/// ```text
/// θ ← θ - η · ∇L(θ)
/// ```
#[derive(Clone, Debug)]
pub struct SGD<B: Backend> {
    lr: Scalar<B>,
}

impl<B: Backend> SGD<B> {
    pub fn new(lr: f64) -> Self {
        Self {
            lr: Scalar::<B>::new(lr),
        }
    }
}

impl<B: Backend, P: ParamOps<B>> Optimizer<B, P> for SGD<B> {
    fn step(&mut self, params: &P, grads: &P) -> P {
        let neg_lr = Scalar::<B>::new(0.0) - self.lr;
        params.add(&grads.scale(&neg_lr))
    }

    fn learning_rate(&self) -> f64 {
        self.lr.to_f64()
    }
}

/// Adam with bias-corrected moment estimates.
///
/// ```text
/// m ← β1·m + (1-β1)·g
/// v ← β2·v + (1-β2)·g²
/// θ ← θ - η · m̂ / (√v̂ + ε),   m̂ = m/(1-β1^t), v̂ = v/(1-β2^t)
/// ```
///
/// Defaults: `β1 = 0.9`, `β2 = 0.999`, `ε = 1e-7`.
#[derive(Clone, Debug)]
pub struct Adam<B: Backend, P> {
    lr: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: i32,
    moments: Option<(P, P)>,
    _backend: PhantomData<B>,
}

impl<B: Backend, P> Adam<B, P> {
    pub fn new(lr: f64) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            t: 0,
            moments: None,
            _backend: PhantomData,
        }
    }

    pub fn with_betas(mut self, beta1: f64, beta2: f64) -> Self {
        self.beta1 = beta1;
        self.beta2 = beta2;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Number of steps taken since construction or the last reset.
    pub fn steps(&self) -> i32 {
        self.t
    }
}

impl<B: Backend, P: ParamOps<B>> Optimizer<B, P> for Adam<B, P> {
    fn step(&mut self, params: &P, grads: &P) -> P {
        self.t += 1;
        let (m, v) = match self.moments.take() {
            Some(mv) => mv,
            None => (grads.zeros_like(), grads.zeros_like()),
        };

        let m = m
            .scale(&Scalar::new(self.beta1))
            .add(&grads.scale(&Scalar::new(1.0 - self.beta1)));
        let v = v
            .scale(&Scalar::new(self.beta2))
            .add(&grads.mul(grads).scale(&Scalar::new(1.0 - self.beta2)));

        let m_hat = m.scale(&Scalar::new(1.0 / (1.0 - self.beta1.powi(self.t))));
        let v_hat = v.scale(&Scalar::new(1.0 / (1.0 - self.beta2.powi(self.t))));
        let update = m_hat
            .div(&v_hat.sqrt().add_scalar(&Scalar::new(self.epsilon)))
            .scale(&Scalar::new(-self.lr));

        self.moments = Some((m, v));
        params.add(&update)
    }

    fn reset(&mut self) {
        self.t = 0;
        self.moments = None;
    }

    fn learning_rate(&self) -> f64 {
        self.lr
    }
}
