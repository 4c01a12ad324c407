//! Simulator.
use crate::{frame::RawFrame, record::Record};
use anyhow::Result;

/// An action in the encoding the simulator understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeAction {
    /// A single action code, as in Atari games.
    Discrete(i64),

    /// A vector of button states, as in Doom games.
    Buttons(Vec<u8>),
}

/// The result of a simulator step.
#[derive(Debug, Clone)]
pub struct SimStep {
    /// Observation after the step.
    pub frame: RawFrame,

    /// Reward of the step, not clipped.
    pub reward: f32,

    /// Flag denoting if the episode is terminated.
    pub is_terminated: bool,

    /// Additional information defined by the simulator.
    pub info: Record,
}

/// A game backend with reset/step semantics.
///
/// Each actor-learner builds and exclusively owns its own instance.
pub trait Simulator {
    /// Configuration.
    type Config: Clone;

    /// Builds a simulator with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns its first observation.
    fn reset(&mut self) -> Result<RawFrame>;

    /// Performs a simulation step.
    fn step(&mut self, action: &NativeAction) -> Result<SimStep>;
}
