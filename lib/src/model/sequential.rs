//! Layer descriptors, the sequential model built from them, and
//! Glorot-uniform initialization.
//!
//! # Example
//! ```
//! use horsepower_mpg::backend::{CpuBackend, Tensor2D};
//! use horsepower_mpg::model::{build_model, ModelSpec, TrainableModel};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let model = build_model::<CpuBackend, _>(&ModelSpec::default(), &mut StdRng::seed_from_u64(0)).unwrap();
//! assert_eq!(model.param_count(), 4);
//! let y = model.forward(&Tensor2D::column(vec![0.0, 0.5, 1.0]));
//! assert_eq!(y.shape(), (3, 1));
//! ```

use std::marker::PhantomData;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::backend::{Backend, Scalar, Tensor1D, Tensor2D};
use crate::model::dense::{Dense, DenseParams};
use crate::model::{Fitted, InferenceModel, ModelError, ParamOps, TrainableModel, Unfitted};

fn default_use_bias() -> bool {
    true
}

/// Tagged descriptor of one layer.
///
/// Serialized as `{"type": "dense", "units": 1, "useBias": true}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayerSpec {
    #[serde(rename_all = "camelCase")]
    Dense {
        units: usize,
        #[serde(default = "default_use_bias")]
        use_bias: bool,
    },
}

impl LayerSpec {
    pub fn dense(units: usize) -> Self {
        LayerSpec::Dense {
            units,
            use_bias: true,
        }
    }

    pub fn units(&self) -> usize {
        match self {
            LayerSpec::Dense { units, .. } => *units,
        }
    }
}

/// Input width plus an ordered stack of layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelSpec {
    pub input_dim: usize,
    pub layers: Vec<LayerSpec>,
}

impl Default for ModelSpec {
    /// One input, two single-unit dense layers with bias, no activations.
    fn default() -> Self {
        Self {
            input_dim: 1,
            layers: vec![LayerSpec::dense(1), LayerSpec::dense(1)],
        }
    }
}

impl ModelSpec {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.input_dim == 0 {
            return Err(ModelError::ZeroInputDim);
        }
        if self.layers.is_empty() {
            return Err(ModelError::EmptySpec);
        }
        if let Some(layer) = self.layers.iter().position(|l| l.units() == 0) {
            return Err(ModelError::ZeroUnits { layer });
        }
        Ok(())
    }

    /// Width of the model output.
    pub fn output_dim(&self) -> usize {
        self.layers.last().map_or(self.input_dim, LayerSpec::units)
    }

    /// `(inputs, units, use_bias)` for every layer.
    fn shapes(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        let mut inputs = self.input_dim;
        self.layers.iter().map(move |l| match l {
            LayerSpec::Dense { units, use_bias } => {
                let shape = (inputs, *units, *use_bias);
                inputs = *units;
                shape
            }
        })
    }
}

/// Parameters of every layer, in layer order.
#[derive(Clone, Debug)]
pub struct SequentialParams<B: Backend> {
    pub layers: Vec<DenseParams<B>>,
}

impl<B: Backend> SequentialParams<B> {
    fn map(&self, f: impl Fn(&DenseParams<B>) -> DenseParams<B>) -> Self {
        Self {
            layers: self.layers.iter().map(f).collect(),
        }
    }

    fn zip(&self, other: &Self, f: impl Fn(&DenseParams<B>, &DenseParams<B>) -> DenseParams<B>) -> Self {
        Self {
            layers: self
                .layers
                .iter()
                .zip(&other.layers)
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }

    pub fn param_count(&self) -> usize {
        self.layers.iter().map(DenseParams::param_count).sum()
    }
}

impl<B: Backend> ParamOps<B> for SequentialParams<B> {
    fn add(&self, other: &Self) -> Self {
        self.zip(other, |a, b| a.add(b))
    }

    fn mul(&self, other: &Self) -> Self {
        self.zip(other, |a, b| a.mul(b))
    }

    fn div(&self, other: &Self) -> Self {
        self.zip(other, |a, b| a.div(b))
    }

    fn scale(&self, scalar: &Scalar<B>) -> Self {
        self.map(|p| p.scale(scalar))
    }

    fn add_scalar(&self, scalar: &Scalar<B>) -> Self {
        self.map(|p| p.add_scalar(scalar))
    }

    fn sqrt(&self) -> Self {
        self.map(|p| p.sqrt())
    }

    fn zeros_like(&self) -> Self {
        self.map(|p| p.zeros_like())
    }
}

/// A stack of layers evaluated in order, with its training state in `S`.
#[derive(Clone, Debug)]
pub struct Sequential<B: Backend, S> {
    spec: ModelSpec,
    params: SequentialParams<B>,
    _state: PhantomData<S>,
}

/// Builds an unfitted model: Glorot-uniform kernels, zero biases.
pub fn build_model<B: Backend, R: Rng + ?Sized>(
    spec: &ModelSpec,
    rng: &mut R,
) -> Result<Sequential<B, Unfitted>, ModelError> {
    spec.validate()?;
    let layers = spec
        .shapes()
        .map(|(inputs, units, use_bias)| {
            let limit = (6.0 / (inputs + units) as f64).sqrt();
            let kernel = (0..inputs * units)
                .map(|_| rng.random_range(-limit..limit))
                .collect();
            DenseParams {
                kernel: Tensor2D::new(kernel, inputs, units),
                bias: use_bias.then(|| Tensor1D::zeros(units)),
            }
        })
        .collect();
    tracing::debug!(layers = spec.layers.len(), "built model");
    Ok(Sequential {
        spec: spec.clone(),
        params: SequentialParams { layers },
        _state: PhantomData,
    })
}

impl<B: Backend, S> Sequential<B, S> {
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn param_count(&self) -> usize {
        self.params.param_count()
    }

    fn run(&self, x: &Tensor2D<B>) -> Tensor2D<B> {
        let mut out = x.clone();
        for p in &self.params.layers {
            out = Dense::new(p).forward(&out);
        }
        out
    }
}

impl<B: Backend> Sequential<B, Unfitted> {
    /// Builds an unfitted model from explicit parameters, checking that they
    /// match `spec` layer by layer.
    pub fn from_params(spec: ModelSpec, params: SequentialParams<B>) -> Result<Self, ModelError> {
        spec.validate()?;
        if params.layers.len() != spec.layers.len() {
            return Err(ModelError::ParamShape {
                layer: params.layers.len().min(spec.layers.len()),
                expected: format!("{} layers", spec.layers.len()),
                got: format!("{} layers", params.layers.len()),
            });
        }
        for (layer, ((inputs, units, use_bias), p)) in spec.shapes().zip(&params.layers).enumerate() {
            let got_bias = p.bias.as_ref().map(Tensor1D::len);
            let want_bias = use_bias.then_some(units);
            if p.kernel.shape() != (inputs, units) || got_bias != want_bias {
                return Err(ModelError::ParamShape {
                    layer,
                    expected: format!("kernel {inputs}x{units}, bias {want_bias:?}"),
                    got: format!("kernel {:?}, bias {got_bias:?}", p.kernel.shape()),
                });
            }
        }
        Ok(Self {
            spec,
            params,
            _state: PhantomData,
        })
    }
}

impl<B: Backend> TrainableModel<B> for Sequential<B, Unfitted> {
    type Input = Tensor2D<B>;
    type Prediction = Tensor2D<B>;
    type Params = SequentialParams<B>;
    type Output = Sequential<B, Fitted>;

    fn input_dim(&self) -> usize {
        self.spec.input_dim
    }

    fn output_dim(&self) -> usize {
        self.spec.output_dim()
    }

    fn forward(&self, input: &Self::Input) -> Self::Prediction {
        self.run(input)
    }

    fn backward(&self, input: &Self::Input, grad_output: &Self::Prediction) -> Self::Params {
        // Keep every layer's input for the reverse pass.
        let mut activations = Vec::with_capacity(self.params.layers.len());
        let mut x = input.clone();
        for p in &self.params.layers {
            let next = Dense::new(p).forward(&x);
            activations.push(x);
            x = next;
        }

        let mut grads = Vec::with_capacity(self.params.layers.len());
        let mut grad = grad_output.clone();
        for (p, x) in self.params.layers.iter().zip(&activations).rev() {
            let (g, grad_input) = Dense::new(p).backward(x, &grad);
            grads.push(g);
            grad = grad_input;
        }
        grads.reverse();
        SequentialParams { layers: grads }
    }

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn update_params(&mut self, new_params: Self::Params) {
        self.params = new_params;
    }

    fn into_fitted(self) -> Self::Output {
        Sequential {
            spec: self.spec,
            params: self.params,
            _state: PhantomData,
        }
    }
}

impl<B: Backend> InferenceModel<B> for Sequential<B, Fitted> {
    type Input = Tensor2D<B>;
    type Output = Tensor2D<B>;

    fn predict(&self, input: &Self::Input) -> Self::Output {
        self.run(input)
    }
}

impl<B: Backend> Sequential<B, Fitted> {
    pub fn params(&self) -> &SequentialParams<B> {
        &self.params
    }
}
