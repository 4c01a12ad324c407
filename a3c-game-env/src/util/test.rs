//! Utilities for test.
use a3c_core::{record::Record, NativeAction, RawFrame, SimStep, Simulator};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Configuration of [`StubSim`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubSimConfig {
    /// Width of raw frames.
    pub width: u32,

    /// Height of raw frames.
    pub height: u32,

    /// Episode length. Episodes never terminate if `None`.
    pub episode_len: Option<usize>,

    /// Reward of every step.
    pub reward: f32,

    /// `step` fails after this number of successful steps.
    pub fail_after: Option<usize>,

    /// If set, only the simulator built with this seed fails.
    pub fail_seed: Option<i64>,
}

impl Default for StubSimConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 12,
            episode_len: None,
            reward: 1.0,
            fail_after: None,
            fail_seed: None,
        }
    }
}

impl StubSimConfig {
    /// Sets the episode length.
    pub fn episode_len(mut self, v: usize) -> Self {
        self.episode_len = Some(v);
        self
    }

    /// Sets the reward of every step.
    pub fn reward(mut self, v: f32) -> Self {
        self.reward = v;
        self
    }

    /// Makes `step` fail after `v` successful steps.
    pub fn fail_after(mut self, v: usize) -> Self {
        self.fail_after = Some(v);
        self
    }

    /// Restricts failures to the simulator built with seed `v`.
    pub fn fail_seed(mut self, v: i64) -> Self {
        self.fail_seed = Some(v);
        self
    }
}

/// A simulator with scripted behaviour.
///
/// Frames are uniformly filled with an intensity depending on the number of steps taken,
/// so consecutive frames differ.
pub struct StubSim {
    config: StubSimConfig,
    fails: bool,
    n_steps: usize,
    n_episode_steps: usize,
    n_resets: usize,
    received: Vec<NativeAction>,
}

impl StubSim {
    fn frame(&self) -> RawFrame {
        let v = ((self.n_steps * 17) % 256) as u8;
        RawFrame::filled(self.config.width, self.config.height, [v, v, v])
    }

    /// Actions received by `step`.
    pub fn received(&self) -> &[NativeAction] {
        &self.received
    }

    /// The number of episodes started.
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }
}

impl Simulator for StubSim {
    type Config = StubSimConfig;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            fails: config.fail_seed.map_or(true, |s| s == seed),
            n_steps: 0,
            n_episode_steps: 0,
            n_resets: 0,
            received: vec![],
        })
    }

    fn reset(&mut self) -> Result<RawFrame> {
        self.n_episode_steps = 0;
        self.n_resets += 1;
        Ok(self.frame())
    }

    fn step(&mut self, action: &NativeAction) -> Result<SimStep> {
        if let (true, Some(n)) = (self.fails, self.config.fail_after) {
            if self.n_steps >= n {
                bail!("stub simulator failed after {} steps", n);
            }
        }
        self.received.push(action.clone());
        self.n_steps += 1;
        self.n_episode_steps += 1;
        let is_terminated = match self.config.episode_len {
            Some(n) => self.n_episode_steps >= n,
            None => false,
        };

        Ok(SimStep {
            frame: self.frame(),
            reward: self.config.reward,
            is_terminated,
            info: Record::empty(),
        })
    }
}
