//! Policy and value model.
use crate::{record::Record, RolloutBatch, State};
use anyhow::Result;
use std::path::Path;

/// Output of the policy and value networks for a single state.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyValue {
    /// Action probabilities.
    pub probs: Vec<f32>,

    /// State value estimate.
    pub value: f32,
}

/// The shared, differentiable policy/value function.
///
/// An implementor owns the global parameters. Actor-learners hold private replicas of type
/// [`PolicyValueModel::Local`], which are related to the global parameters only through
/// [`PolicyValueModel::copy_parameters_into`].
///
/// The model is shared between threads without a lock around it. Implementations must make
/// each per-variable read and write atomic, so that [`PolicyValueModel::copy_parameters_into`]
/// never observes a partially written variable while updates from other threads interleave
/// with it.
pub trait PolicyValueModel: Send + Sync {
    /// Private replica of the parameters, owned by a single actor-learner.
    type Local: Send;

    /// Per-thread state needed to apply updates, typically optimizer statistics.
    type Updater: Send;

    /// The number of actions.
    fn n_actions(&self) -> usize;

    /// Evaluates the global parameters.
    fn forward(&self, state: &State) -> Result<PolicyValue>;

    /// Evaluates a local replica.
    fn forward_local(&self, local: &Self::Local, state: &State) -> Result<PolicyValue>;

    /// Creates a local replica. Its values are unspecified until the first copy.
    fn new_local(&self) -> Result<Self::Local>;

    /// Assigns the current values of the global parameters to `local`.
    fn copy_parameters_into(&self, local: &mut Self::Local) -> Result<()>;

    /// Creates the per-thread update state.
    fn new_updater(&self) -> Result<Self::Updater>;

    /// Applies one optimization step to the global parameters.
    ///
    /// This is the only operation mutating the global parameters. Returns losses and other
    /// values for logging.
    fn gradient_update(&self, updater: &mut Self::Updater, batch: &RolloutBatch) -> Result<Record>;

    /// Saves the global parameters.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the global parameters.
    fn load_params(&self, path: &Path) -> Result<()>;
}
