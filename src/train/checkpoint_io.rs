//! Checkpoint IO plugin
//!
//! The harness delegates checkpoint persistence to a plugin; the pruning
//! implementation strips optimizer state before writing, so saved
//! checkpoints carry weights without the optimizer's moment tensors.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// A checkpoint as the harness hands it over: a string-keyed mapping of
/// serialized state sections (`state_dict`, `optimizer_states`, ...).
pub type Checkpoint = serde_json::Map<String, serde_json::Value>;

/// Trait for checkpoint persistence plugins.
pub trait CheckpointIo: Send {
    fn save_checkpoint(&self, checkpoint: &Checkpoint, path: &Path) -> Result<()>;
    fn load_checkpoint(&self, path: &Path) -> Result<Checkpoint>;
}

/// Drops optimizer state on save, keeping checkpoints weights-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct PruningCheckpointIo;

impl PruningCheckpointIo {
    const PRUNED_KEYS: [&'static str; 2] = ["optimizer_states", "lr_schedulers"];

    pub fn new() -> Self {
        Self
    }
}

impl CheckpointIo for PruningCheckpointIo {
    fn save_checkpoint(&self, checkpoint: &Checkpoint, path: &Path) -> Result<()> {
        let mut pruned = checkpoint.clone();
        for key in Self::PRUNED_KEYS {
            pruned.remove(key);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&pruned)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, data)?;
        Ok(())
    }

    fn load_checkpoint(&self, path: &Path) -> Result<Checkpoint> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| Error::Serialization(e.to_string()))
    }
}
