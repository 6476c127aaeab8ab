//! Per-run directory layout
//!
//! Derives the log, checkpoint, and config directories for one run from an
//! output root and a timestamped run name. Paths are only derived here;
//! creating them is the setup callback's job.

use chrono::Local;
use std::path::{Path, PathBuf};

/// Filesystem layout for one training run.
///
/// The run folder name is fixed at construction time, so every accessor is
/// a pure function of it: calling twice yields the same paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    log_dir: PathBuf,
    run_name: String,
}

impl RunPaths {
    /// Layout rooted at `output_root`, with a run folder named
    /// `<timestamp>_<project_name>`.
    pub fn new(output_root: impl AsRef<Path>, project_name: &str) -> Self {
        let stamp = Local::now().format("%Y-%m-%dT%H-%M-%S");
        Self::with_run_name(output_root, &format!("{}_{}", stamp, project_name))
    }

    /// Layout with an explicit run folder name.
    pub fn with_run_name(output_root: impl AsRef<Path>, run_name: &str) -> Self {
        Self {
            log_dir: output_root.as_ref().join(run_name),
            run_name: run_name.to_string(),
        }
    }

    /// Run folder name.
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Root of everything this run writes.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Directory for final and periodic checkpoints.
    pub fn checkpoint_dir(&self) -> PathBuf {
        self.log_dir.join("ckpts")
    }

    /// Directory for intermediate per-interval checkpoints.
    pub fn intermediate_checkpoint_dir(&self) -> PathBuf {
        self.checkpoint_dir().join("trainstep_ckpts")
    }

    /// Directory for resolved config snapshots.
    pub fn config_dir(&self) -> PathBuf {
        self.log_dir.join("configs")
    }
}
