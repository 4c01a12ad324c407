#![warn(missing_docs)]
//! Core types and traits of the asynchronous advantage actor-critic (A3C) trainer.
//!
//! * [`Simulator`] is a game backend with reset/step semantics.
//! * [`FramePreprocessor`] and [`StateBuffer`] turn raw observations into [`State`]s.
//! * [`PolicyValueModel`] is the shared policy/value function with its global parameters.
//! * [`RolloutSegment`] collects transitions and computes n-step targets.
//! * [`GlobalStepCounter`] counts environment steps across threads.
pub mod error;
pub use error::A3cError;
pub mod record;

mod base;
pub use base::{NativeAction, PolicyValue, PolicyValueModel, SimStep, Simulator};

mod counter;
pub use counter::GlobalStepCounter;

mod frame;
pub use frame::{Frame, FramePreprocessor, RawFrame};

mod rollout;
pub use rollout::{
    clip_reward, discounted_targets, one_hot, RolloutBatch, RolloutSegment, Transition,
};

mod sampling;
pub use sampling::{argmax, sample_action, PROB_EPSILON};

mod state;
pub use state::{State, StateBuffer};
