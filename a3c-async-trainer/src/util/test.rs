//! Utilities for test.
use a3c_core::{
    record::{Record, RecordValue},
    A3cError, PolicyValue, PolicyValueModel, RolloutBatch, State,
};
use anyhow::Result;
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

/// A model with uniform action probabilities and a constant value.
///
/// It records the batches given to [`PolicyValueModel::gradient_update`] and the paths of
/// saved checkpoints. The parameters are a version number incremented by every update.
pub struct StubModel {
    n_actions: usize,
    value: f32,
    version: AtomicUsize,
    n_copies: AtomicUsize,
    batches: Mutex<Vec<RolloutBatch>>,
    saved: Mutex<Vec<PathBuf>>,
}

/// Local replica of [`StubModel`].
pub struct StubLocal {
    /// Version of the global parameters at the last copy.
    pub version: usize,
}

impl StubModel {
    /// Constructs a model.
    pub fn new(n_actions: usize) -> Self {
        Self {
            n_actions,
            value: 0.0,
            version: AtomicUsize::new(0),
            n_copies: AtomicUsize::new(0),
            batches: Mutex::new(vec![]),
            saved: Mutex::new(vec![]),
        }
    }

    /// Sets the value estimate returned for every state.
    pub fn with_value(mut self, v: f32) -> Self {
        self.value = v;
        self
    }

    /// Batches given to the updates.
    pub fn batches(&self) -> Vec<RolloutBatch> {
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The number of updates.
    pub fn n_updates(&self) -> usize {
        self.version.load(Ordering::SeqCst)
    }

    /// The number of copies into local replicas.
    pub fn n_copies(&self) -> usize {
        self.n_copies.load(Ordering::SeqCst)
    }

    /// Paths of saved checkpoints.
    pub fn saved(&self) -> Vec<PathBuf> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn output(&self) -> PolicyValue {
        PolicyValue {
            probs: vec![1.0 / self.n_actions as f32; self.n_actions],
            value: self.value,
        }
    }
}

impl PolicyValueModel for StubModel {
    type Local = StubLocal;
    type Updater = ();

    fn n_actions(&self) -> usize {
        self.n_actions
    }

    fn forward(&self, _state: &State) -> Result<PolicyValue> {
        Ok(self.output())
    }

    fn forward_local(&self, _local: &Self::Local, _state: &State) -> Result<PolicyValue> {
        Ok(self.output())
    }

    fn new_local(&self) -> Result<Self::Local> {
        Ok(StubLocal { version: 0 })
    }

    fn copy_parameters_into(&self, local: &mut Self::Local) -> Result<()> {
        local.version = self.version.load(Ordering::SeqCst);
        self.n_copies.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn new_updater(&self) -> Result<Self::Updater> {
        Ok(())
    }

    fn gradient_update(&self, _updater: &mut (), batch: &RolloutBatch) -> Result<Record> {
        self.batches
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(batch.clone());
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Record::from_slice(&[(
            "version",
            RecordValue::Scalar(version as f32),
        )]))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.version.load(Ordering::SeqCst).to_string()).map_err(|e| {
            A3cError::CheckpointIo {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_path_buf());
        Ok(())
    }

    fn load_params(&self, path: &Path) -> Result<()> {
        let s = std::fs::read_to_string(path).map_err(|e| A3cError::CheckpointIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let version = s.trim().parse::<usize>().map_err(|e| A3cError::CheckpointIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.version.store(version, Ordering::SeqCst);
        Ok(())
    }
}
