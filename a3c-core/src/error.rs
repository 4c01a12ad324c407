//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
///
/// Functions of this workspace return [`anyhow::Result`]; an error of this type can be
/// recovered with `err.downcast_ref::<A3cError>()` when the caller needs to know its kind.
#[derive(Error, Debug)]
pub enum A3cError {
    /// Invalid game identifier, or an action table that does not fit the game.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Action index outside of the action table of an environment.
    #[error("Invalid action: index {index} for {n_actions} actions")]
    InvalidAction {
        /// The action index given.
        index: usize,
        /// The number of actions of the action table.
        n_actions: usize,
    },

    /// The simulator failed in `reset` or `step`.
    #[error("Environment failure: {0}")]
    Environment(String),

    /// Reading or writing a checkpoint failed.
    #[error("Checkpoint I/O failure at {path}: {reason}")]
    CheckpointIo {
        /// Path of the checkpoint.
        path: String,
        /// Cause of the failure.
        reason: String,
    },

    /// A raw observation that cannot be converted into a frame.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Action probabilities from which no action can be sampled.
    #[error("Invalid action distribution: {0}")]
    InvalidDistribution(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKey(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueType(String),
}
