//! Periodic checkpoints of the global parameters.
use a3c_core::PolicyValueModel;
use log::{info, warn};
use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Writes the global parameters every `interval` environment steps.
///
/// The step numbers handed out by [`GlobalStepCounter`](a3c_core::GlobalStepCounter) are
/// unique, so the actor-learner that receives a multiple of `interval` is the only writer of
/// that checkpoint.
pub struct Checkpointer {
    dir: PathBuf,
    prefix: String,
    interval: usize,
    n_written: AtomicUsize,
}

impl Checkpointer {
    /// Constructs a checkpointer for a game.
    ///
    /// Checkpoint files are named after the part of `game` following the last `/`.
    pub fn new(dir: impl Into<PathBuf>, game: &str, interval: usize) -> Self {
        let prefix = game.rsplit('/').next().unwrap_or(game).to_string();
        Self {
            dir: dir.into(),
            prefix,
            interval,
            n_written: AtomicUsize::new(0),
        }
    }

    /// Creates the checkpoint directory.
    ///
    /// A failure is logged; the following writes will fail and be logged as well.
    pub fn prepare(&self) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!("Failed to create checkpoint directory {:?}: {}", self.dir, e);
        }
    }

    /// Path of the checkpoint of a step.
    pub fn path(&self, step: usize) -> PathBuf {
        self.dir.join(format!("{}.ckpt-{}.safetensors", self.prefix, step))
    }

    /// Returns `true` if a checkpoint is due at `step`.
    pub fn is_due(&self, step: usize) -> bool {
        step > 0 && step % self.interval == 0
    }

    /// Saves the global parameters of `model` as the checkpoint of `step`.
    ///
    /// Returns `false` if writing failed. The failure is logged and does not stop training.
    pub fn save<M: PolicyValueModel>(&self, model: &M, step: usize) -> bool {
        let path = self.path(step);
        match model.save_params(&path) {
            Ok(()) => {
                self.n_written.fetch_add(1, Ordering::SeqCst);
                info!("Saved checkpoint {:?}", path);
                true
            }
            Err(e) => {
                warn!("Failed to save checkpoint {:?}: {:#}", path, e);
                false
            }
        }
    }

    /// The number of checkpoints written.
    pub fn n_written(&self) -> usize {
        self.n_written.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_path() {
        let c = Checkpointer::new("/tmp/checkpoints", "ppaquette/DoomBasic-v0", 100);
        assert_eq!(
            c.path(200),
            PathBuf::from("/tmp/checkpoints/DoomBasic-v0.ckpt-200.safetensors")
        );
        let c = Checkpointer::new("ckpt", "Pong-v0", 100);
        assert_eq!(c.path(5), PathBuf::from("ckpt/Pong-v0.ckpt-5.safetensors"));
    }

    #[test]
    fn test_is_due() {
        let c = Checkpointer::new("/tmp", "Pong-v0", 100);
        let due = (0..=250).filter(|&s| c.is_due(s)).collect::<Vec<_>>();
        assert_eq!(due, vec![100, 200]);
    }
}
