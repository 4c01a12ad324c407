//! Loss of the policy and value networks.
use anyhow::Result;
use candle_core::Tensor;

/// Components of the loss computed by [`a3c_loss`].
pub struct A3cLoss {
    /// `policy + 0.5 * value`, the objective minimized.
    pub total: Tensor,

    /// Policy gradient loss including the entropy term.
    pub policy: Tensor,

    /// Sum of squared advantages.
    pub value: Tensor,

    /// Entropy of the action distributions summed over the batch.
    pub entropy: Tensor,
}

/// Computes the actor-critic loss of a batch.
///
/// * `probs` - action probabilities, shape `(batch, n_actions)`.
/// * `values` - value estimates, shape `(batch,)`.
/// * `actions` - one-hot actions, shape `(batch, n_actions)`.
/// * `targets` - discounted targets, shape `(batch,)`.
///
/// The advantage `targets - values` is treated as a constant in the policy loss.
pub fn a3c_loss(
    probs: &Tensor,
    values: &Tensor,
    actions: &Tensor,
    targets: &Tensor,
    entropy_beta: f64,
) -> Result<A3cLoss> {
    let log_probs = probs.clamp(1e-20f32, 1f32)?.log()?;
    let entropy = (probs * &log_probs)?.sum_all()?.neg()?;
    let advantage = (targets - values)?;

    let log_probs_taken = (&log_probs * actions)?.sum(1)?;
    let policy = (log_probs_taken * advantage.detach())?.sum_all()?.neg()?;
    let policy = (policy - (&entropy * entropy_beta)?)?;
    let value = advantage.sqr()?.sum_all()?;
    let total = (&policy + (&value * 0.5)?)?;

    Ok(A3cLoss {
        total,
        policy,
        value,
        entropy,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::{Device, Var};

    fn scalar(t: &Tensor) -> f32 {
        t.to_scalar::<f32>().unwrap()
    }

    #[test]
    fn test_loss_values() -> Result<()> {
        let device = Device::Cpu;
        let probs = Tensor::new(&[[0.5f32, 0.5], [0.25, 0.75]], &device)?;
        let values = Tensor::new(&[0.5f32, 1.0], &device)?;
        let actions = Tensor::new(&[[1f32, 0.], [0., 1.]], &device)?;
        let targets = Tensor::new(&[1.5f32, 0.0], &device)?;
        let loss = a3c_loss(&probs, &values, &actions, &targets, 0.01)?;

        let ln = |x: f32| x.ln();
        let entropy = -(2.0 * 0.5 * ln(0.5) + 0.25 * ln(0.25) + 0.75 * ln(0.75));
        let policy = -(ln(0.5) * 1.0 + ln(0.75) * -1.0) - 0.01 * entropy;
        let value = 1.0 + 1.0;

        assert!((scalar(&loss.entropy) - entropy).abs() < 1e-5);
        assert!((scalar(&loss.policy) - policy).abs() < 1e-5);
        assert!((scalar(&loss.value) - value).abs() < 1e-5);
        assert!((scalar(&loss.total) - (policy + 0.5 * value)).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_zero_probability_is_finite() -> Result<()> {
        let device = Device::Cpu;
        let probs = Tensor::new(&[[1f32, 0.]], &device)?;
        let values = Tensor::new(&[0f32], &device)?;
        let actions = Tensor::new(&[[0f32, 1.]], &device)?;
        let targets = Tensor::new(&[1f32], &device)?;
        let loss = a3c_loss(&probs, &values, &actions, &targets, 0.01)?;
        assert!(scalar(&loss.total).is_finite());
        Ok(())
    }

    #[test]
    fn test_advantage_is_constant_for_policy() -> Result<()> {
        // The value enters the policy loss only through the advantage.
        let device = Device::Cpu;
        let probs = Tensor::new(&[[0.5f32, 0.5]], &device)?;
        let values = Var::new(&[0.3f32], &device)?;
        let actions = Tensor::new(&[[1f32, 0.]], &device)?;
        let targets = Tensor::new(&[1f32], &device)?;
        let loss = a3c_loss(&probs, values.as_tensor(), &actions, &targets, 0.0)?;

        let grads = loss.policy.backward()?;
        assert!(grads.get(values.as_tensor()).is_none());
        let grads = loss.value.backward()?;
        let g = grads.get(values.as_tensor()).unwrap().to_vec1::<f32>()?;
        assert!((g[0] - (-2.0 * 0.7)).abs() < 1e-5);
        Ok(())
    }
}
