#![warn(missing_docs)]
//! Game environments for the A3C trainer.
//!
//! [`GameEnv`] wraps a [`Simulator`](a3c_core::Simulator), restricting its actions to the
//! [`ActionTable`] of the game and converting observations into stacked, grayscale frames.
//! [`Catch`] is a small game bundled with this crate; backends of the other games in
//! [`GameRegistry::builtin`] are provided by implementing
//! [`Simulator`](a3c_core::Simulator).
//!
//! ```no_run
//! # use anyhow::Result;
//! use a3c_game_env::{Catch, CatchConfig, GameEnv, GameEnvConfig, GameRegistry};
//!
//! # fn main() -> Result<()> {
//! let config = GameEnvConfig::<CatchConfig>::default().game("Catch-v0");
//! let mut env = GameEnv::<Catch>::build(&config, &GameRegistry::builtin(), 42)?;
//! let state = env.get_initial_state()?;
//! let step = env.step(1)?;
//! # Ok(())
//! # }
//! ```
mod catch;
mod config;
mod env;
mod registry;
pub mod util;
pub use catch::{Catch, CatchConfig};
pub use config::GameEnvConfig;
pub use env::{EnvStep, GameEnv};
pub use registry::{ActionTable, GameFamily, GameRegistry, CATCH, DOOM_BUTTONS};
