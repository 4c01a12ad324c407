//! Policy and value networks with shared layers.
use crate::{A3cModelConfig, TrunkConfig};
use a3c_core::A3cError;
use anyhow::Result;
use candle_core::{Tensor, D};
use candle_nn::{conv2d, linear, ops::softmax, Conv2d, Conv2dConfig, Linear, Module, VarBuilder};

// (out channels, kernel size, stride)
const CONV1: (usize, usize, usize) = (16, 8, 4);
const CONV2: (usize, usize, usize) = (32, 4, 2);

fn conv_out(size: usize, kernel: usize, stride: usize) -> Option<usize> {
    (size >= kernel).then(|| (size - kernel) / stride + 1)
}

fn conv(in_channels: usize, spec: (usize, usize, usize), vb: VarBuilder) -> Result<Conv2d> {
    let (out_channels, kernel, stride) = spec;
    let config = Conv2dConfig {
        stride,
        ..Default::default()
    };
    Ok(conv2d(in_channels, out_channels, kernel, config, vb)?)
}

enum Trunk {
    Cnn { c1: Conv2d, c2: Conv2d, fc: Linear },
    Mlp { layers: Vec<Linear> },
}

impl Trunk {
    /// Returns the layers and the dimension of their output.
    fn build(vb: VarBuilder, config: &A3cModelConfig) -> Result<(Self, usize)> {
        match &config.trunk {
            TrunkConfig::Cnn { hidden } => {
                let size = |s: usize| {
                    conv_out(s, CONV1.1, CONV1.2).and_then(|s| conv_out(s, CONV2.1, CONV2.2))
                };
                let (h, w) = match (size(config.height), size(config.width)) {
                    (Some(h), Some(w)) => (h, w),
                    _ => {
                        return Err(A3cError::Configuration(format!(
                            "frames of {}x{} are too small for the convolutional network",
                            config.width, config.height
                        ))
                        .into())
                    }
                };
                let c1 = conv(config.n_stack, CONV1, vb.pp("c1"))?;
                let c2 = conv(CONV1.0, CONV2, vb.pp("c2"))?;
                let fc = linear(CONV2.0 * h * w, *hidden, vb.pp("fc"))?;
                Ok((Self::Cnn { c1, c2, fc }, *hidden))
            }
            TrunkConfig::Mlp { hidden } => {
                let mut in_dim = config.n_stack * config.height * config.width;
                let mut layers = Vec::with_capacity(hidden.len());
                for (i, &units) in hidden.iter().enumerate() {
                    layers.push(linear(in_dim, units, vb.pp(format!("l{}", i)))?);
                    in_dim = units;
                }
                Ok((Self::Mlp { layers }, in_dim))
            }
        }
    }

    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        match self {
            Self::Cnn { c1, c2, fc } => {
                let xs = c1.forward(xs)?.relu()?;
                let xs = c2.forward(&xs)?.relu()?.flatten_from(1)?;
                Ok(fc.forward(&xs)?.relu()?)
            }
            Self::Mlp { layers } => {
                let mut xs = xs.flatten_from(1)?;
                for l in layers.iter() {
                    xs = l.forward(&xs)?.relu()?;
                }
                Ok(xs)
            }
        }
    }
}

/// Policy and value heads on top of shared layers.
pub(crate) struct PolicyValueNet {
    trunk: Trunk,
    policy: Linear,
    value: Linear,
}

impl PolicyValueNet {
    pub fn build(vb: VarBuilder, config: &A3cModelConfig) -> Result<Self> {
        if config.n_actions == 0 {
            return Err(A3cError::Configuration("no actions".to_string()).into());
        }
        let (trunk, dim) = Trunk::build(vb.pp("trunk"), config)?;
        let policy = linear(dim, config.n_actions, vb.pp("policy"))?;
        let value = linear(dim, 1, vb.pp("value"))?;

        Ok(Self {
            trunk,
            policy,
            value,
        })
    }

    /// Takes states of shape `(batch, n_stack, height, width)`, returns action probabilities
    /// `(batch, n_actions)` and values `(batch,)`.
    pub fn forward(&self, xs: &Tensor) -> Result<(Tensor, Tensor)> {
        let h = self.trunk.forward(xs)?;
        let probs = softmax(&self.policy.forward(&h)?, D::Minus1)?;
        let values = self.value.forward(&h)?.squeeze(1)?;
        Ok((probs, values))
    }
}
