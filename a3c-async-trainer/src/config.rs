//! Configurations of training and evaluation.
use a3c_core::A3cError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of training with [`Coordinator`](crate::Coordinator).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct A3cConfig {
    /// The number of actor-learner threads.
    pub n_actor_learners: usize,

    /// Budget of environment steps summed over all actor-learners.
    pub max_steps: usize,

    /// The maximum number of transitions of a rollout segment.
    pub t_max: usize,

    /// Discount factor.
    pub discount_factor: f32,

    /// Directory where checkpoints are saved.
    pub checkpoint_dir: PathBuf,

    /// Interval of checkpoints in environment steps.
    pub checkpoint_interval: usize,

    /// Interval of calls to the [`Observer`](crate::Observer) in milliseconds.
    pub observe_interval_ms: u64,

    /// Base of random seeds, offset by the actor-learner id.
    pub seed: i64,

    /// Delay before an actor-learner starts acting, multiplied by its id.
    pub stagger_start_ms: u64,
}

impl Default for A3cConfig {
    fn default() -> Self {
        Self {
            n_actor_learners: 8,
            max_steps: 80_000_000,
            t_max: 5,
            discount_factor: 0.99,
            checkpoint_dir: PathBuf::from("/tmp/checkpoints"),
            checkpoint_interval: 6_000_000,
            observe_interval_ms: 1000,
            seed: 42,
            stagger_start_ms: 0,
        }
    }
}

impl A3cConfig {
    /// Sets the number of actor-learners.
    pub fn n_actor_learners(mut self, v: usize) -> Self {
        self.n_actor_learners = v;
        self
    }

    /// Sets the budget of environment steps.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the maximum length of rollout segments.
    pub fn t_max(mut self, v: usize) -> Self {
        self.t_max = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the checkpoint directory.
    pub fn checkpoint_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = v.into();
        self
    }

    /// Sets the interval of checkpoints.
    pub fn checkpoint_interval(mut self, v: usize) -> Self {
        self.checkpoint_interval = v;
        self
    }

    /// Sets the interval of calls to the observer.
    pub fn observe_interval_ms(mut self, v: u64) -> Self {
        self.observe_interval_ms = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the start delay of actor-learners.
    pub fn stagger_start_ms(mut self, v: u64) -> Self {
        self.stagger_start_ms = v;
        self
    }

    /// Checks the values.
    pub fn validate(&self) -> Result<()> {
        let err = |s: &str| Err(A3cError::Configuration(s.to_string()).into());
        if self.n_actor_learners == 0 {
            return err("n_actor_learners must be at least 1");
        }
        if self.t_max == 0 {
            return err("t_max must be at least 1");
        }
        if self.checkpoint_interval == 0 {
            return err("checkpoint_interval must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return err("discount_factor must be in [0, 1]");
        }
        Ok(())
    }

    /// Constructs [`A3cConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`A3cConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Configuration of evaluation with [`Coordinator`](crate::Coordinator).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EvalConfig {
    /// Checkpoint loaded before evaluation.
    pub checkpoint_path: PathBuf,

    /// The number of episodes.
    pub n_episodes: usize,

    /// Random seed of the environment and action sampling.
    pub seed: i64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            checkpoint_path: PathBuf::new(),
            n_episodes: 100,
            seed: 42,
        }
    }
}

impl EvalConfig {
    /// Sets the checkpoint path.
    pub fn checkpoint_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = v.into();
        self
    }

    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`EvalConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EvalConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = A3cConfig::default();
        assert_eq!(config.n_actor_learners, 8);
        assert_eq!(config.t_max, 5);
        assert_eq!(config.checkpoint_interval, 6_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(A3cConfig::default().t_max(0).validate().is_err());
        assert!(A3cConfig::default().n_actor_learners(0).validate().is_err());
        assert!(A3cConfig::default().discount_factor(1.5).validate().is_err());
        assert!(A3cConfig::default()
            .checkpoint_interval(0)
            .validate()
            .is_err());
    }
}
