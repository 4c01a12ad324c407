//! Configuration of [`A3cModel`](super::A3cModel).
use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Layers shared by the policy and value heads.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum TrunkConfig {
    /// Two convolutional layers (16 8x8 filters with stride 4, 32 4x4 filters with stride 2)
    /// followed by a dense layer, all with ReLU.
    Cnn {
        /// The number of units of the dense layer.
        hidden: usize,
    },

    /// Dense layers with ReLU on flattened frames.
    Mlp {
        /// The numbers of units of the hidden layers.
        hidden: Vec<usize>,
    },
}

impl Default for TrunkConfig {
    fn default() -> Self {
        Self::Cnn { hidden: 256 }
    }
}

/// Configuration of [`A3cModel`](super::A3cModel).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct A3cModelConfig {
    /// The number of stacked frames in a state.
    pub n_stack: usize,

    /// Width of frames.
    pub width: usize,

    /// Height of frames.
    pub height: usize,

    /// The number of actions.
    pub n_actions: usize,

    /// Shared layers.
    pub trunk: TrunkConfig,

    /// Coefficient of the entropy regularization term.
    pub entropy_beta: f64,

    /// Optimizer, instantiated by every actor-learner.
    pub opt: OptimizerConfig,

    /// Device.
    pub device: Device,
}

impl Default for A3cModelConfig {
    fn default() -> Self {
        Self {
            n_stack: 4,
            width: 84,
            height: 84,
            n_actions: 3,
            trunk: TrunkConfig::default(),
            entropy_beta: 0.01,
            opt: OptimizerConfig::default(),
            device: Device::Cpu,
        }
    }
}

impl A3cModelConfig {
    /// Sets the shape of states.
    pub fn state_shape(mut self, n_stack: usize, height: usize, width: usize) -> Self {
        self.n_stack = n_stack;
        self.height = height;
        self.width = width;
        self
    }

    /// Sets the number of actions.
    pub fn n_actions(mut self, v: usize) -> Self {
        self.n_actions = v;
        self
    }

    /// Sets the shared layers.
    pub fn trunk(mut self, v: TrunkConfig) -> Self {
        self.trunk = v;
        self
    }

    /// Sets the coefficient of the entropy regularization term.
    pub fn entropy_beta(mut self, v: f64) -> Self {
        self.entropy_beta = v;
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt(mut self, v: OptimizerConfig) -> Self {
        self.opt = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`A3cModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`A3cModelConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
