use crate::backend::{Backend, Scalar, Tensor2D};

/// A differentiable loss function used during model training.
///
/// Implementors define:
/// - the scalar loss value (for logging/metrics);
/// - the gradient of the loss w.r.t. the model's predictions, which is fed to
///   the model's `backward()`.
pub trait Loss<B: Backend> {
    type Prediction;
    type Target;

    fn loss(&self, prediction: &Self::Prediction, target: &Self::Target) -> Scalar<B>;

    /// ∂L/∂prediction.
    fn grad_wrt_prediction(
        &self,
        prediction: &Self::Prediction,
        target: &Self::Target,
    ) -> Self::Prediction;
}

/// Mean Squared Error: `L = (1/n) * Σ(pred_i - target_i)^2`
///
/// Gradient w.r.t. prediction: `∂L/∂pred = 2 * (pred - target) / n`
#[derive(Clone, Copy, Debug, Default)]
pub struct MSELoss;

impl<B: Backend> Loss<B> for MSELoss {
    type Prediction = Tensor2D<B>;
    type Target = Tensor2D<B>;

    fn loss(&self, pred: &Self::Prediction, target: &Self::Target) -> Scalar<B> {
        let diff = pred.sub(target);
        diff.mul(&diff).mean()
    }

    fn grad_wrt_prediction(&self, pred: &Self::Prediction, target: &Self::Target) -> Tensor2D<B> {
        let (rows, cols) = pred.shape();
        let n = (rows * cols).max(1) as f64;
        pred.sub(target).scale(&Scalar::new(2.0 / n))
    }
}

/// Mean Absolute Error: `L = (1/n) * Σ|pred_i - target_i|`
///
/// Gradient w.r.t. prediction: `sign(pred - target) / n` (0 at ties).
#[derive(Clone, Copy, Debug, Default)]
pub struct MAELoss;

impl<B: Backend> Loss<B> for MAELoss {
    type Prediction = Tensor2D<B>;
    type Target = Tensor2D<B>;

    fn loss(&self, pred: &Self::Prediction, target: &Self::Target) -> Scalar<B> {
        pred.sub(target).abs().mean()
    }

    fn grad_wrt_prediction(&self, pred: &Self::Prediction, target: &Self::Target) -> Tensor2D<B> {
        let (rows, cols) = pred.shape();
        let n = (rows * cols).max(1) as f64;
        pred.sub(target).sign().scale(&Scalar::new(1.0 / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    fn col(v: Vec<f64>) -> Tensor2D<CpuBackend> {
        Tensor2D::column(v)
    }

    #[test]
    fn test_mse_loss() {
        let pred = col(vec![3.0, 5.0]);
        let target = col(vec![1.0, 2.0]);

        let loss_val = MSELoss.loss(&pred, &target);
        // ((3-1)^2 + (5-2)^2) / 2 = 6.5
        assert!((loss_val.to_f64() - 6.5).abs() < 1e-12);

        let grad = MSELoss.grad_wrt_prediction(&pred, &target);
        // 2 * [2, 3] / 2
        assert_eq!(grad.to_vec(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_mae_loss() {
        let pred = col(vec![3.0, -1.0]);
        let target = col(vec![1.0, 2.0]);

        let loss_val = MAELoss.loss(&pred, &target);
        // (|3-1| + |-1-2|) / 2 = 2.5
        assert!((loss_val.to_f64() - 2.5).abs() < 1e-12);

        let grad = MAELoss.grad_wrt_prediction(&pred, &target);
        assert_eq!(grad.to_vec(), vec![0.5, -0.5]);
    }

    #[test]
    fn test_mse_gradient_matches_finite_difference() {
        let target = col(vec![0.2, 0.9, 0.4]);
        let base = vec![0.5, 0.1, 0.7];
        let grad = MSELoss.grad_wrt_prediction(&col(base.clone()), &target).to_vec();
        let h = 1e-6;
        for i in 0..base.len() {
            let mut up = base.clone();
            let mut down = base.clone();
            up[i] += h;
            down[i] -= h;
            let numeric = (MSELoss.loss(&col(up), &target).to_f64()
                - MSELoss.loss(&col(down), &target).to_f64())
                / (2.0 * h);
            assert!((numeric - grad[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_perfect_prediction_has_zero_loss_and_gradient() {
        let t = col(vec![0.1, 0.2]);
        assert_eq!(MSELoss.loss(&t, &t).to_f64(), 0.0);
        assert_eq!(MAELoss.grad_wrt_prediction(&t, &t).to_vec(), vec![0.0, 0.0]);
    }
}
