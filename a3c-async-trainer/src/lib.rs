#![warn(missing_docs)]
//! Asynchronous advantage actor-critic (A3C) training.
//!
//! [`Coordinator`] spawns [`ActorLearner`]s on threads. Each actor-learner repeatedly
//!
//! 1. copies the global parameters into its local replica,
//! 2. takes up to `t_max` steps in its own environment with actions sampled from the
//!    local replica,
//! 3. computes n-step discounted targets, bootstrapped with zero on a terminal state or
//!    with the value estimate of the local replica otherwise,
//! 4. applies a gradient update to the global parameters,
//!
//! until the global step budget is exhausted. Updates of different actor-learners are not
//! synchronized with each other.
//!
//! ```no_run
//! # use anyhow::Result;
//! # use std::sync::Arc;
//! use a3c_async_trainer::{A3cConfig, Coordinator, ProgressLogger};
//! use a3c_core::record::NullRecorder;
//! use a3c_game_env::{util::test::{StubSim, StubSimConfig}, GameEnvConfig, GameRegistry};
//! use a3c_async_trainer::util::test::StubModel;
//!
//! # fn main() -> Result<()> {
//! let config = A3cConfig::default().n_actor_learners(4).max_steps(10_000);
//! let env_config = GameEnvConfig::<StubSimConfig>::default();
//! let model = Arc::new(StubModel::new(3));
//! let coordinator =
//!     Coordinator::<_, StubSim>::build(config, env_config, GameRegistry::builtin(), model)?;
//! let stat = coordinator.train(&mut NullRecorder {}, &mut ProgressLogger::default())?;
//! # Ok(())
//! # }
//! ```
mod actor;
mod checkpointer;
mod config;
mod coordinator;
mod messages;
mod observer;
pub mod util;
pub use actor::{actor_stats_fmt, ActorLearner, ActorStat, Phase};
pub use checkpointer::Checkpointer;
pub use config::{A3cConfig, EvalConfig};
pub use coordinator::{ActorFailure, Coordinator, EvalStat, Mode, Outcome, TrainStat};
pub use messages::EpisodeMessage;
pub use observer::{NullObserver, Observer, ProgressLogger};
