//! Callbacks for training events
//!
//! Live implementations of the callback specs the configuration names.
//! Hooks are driven by the harness that consumes `TrainerKwargs`; all
//! methods have default no-op implementations, so a callback only
//! implements the events it cares about.

use log::{debug, info};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{
    HarnessConfig, LoggingInterval, ModelCheckpointParams, RunConfig, SetupParams,
};
use crate::error::{Error, Result};

/// Context passed to callbacks with current training state.
#[derive(Clone, Debug, Default)]
pub struct TrainContext {
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Global step count across epochs
    pub global_step: usize,
    /// Total steps planned
    pub max_steps: usize,
    /// Current learning rate
    pub lr: f64,
    /// Metric values as of the latest validation pass
    pub metrics: HashMap<String, f64>,
    /// Training duration in seconds
    pub elapsed_secs: f64,
}

/// Trait for training callbacks.
pub trait TrainingCallback: Send + std::fmt::Debug {
    /// Called once before training starts
    fn on_train_begin(&mut self, _ctx: &TrainContext) -> Result<()> {
        Ok(())
    }

    /// Called before each epoch
    fn on_epoch_begin(&mut self, _ctx: &TrainContext) -> Result<()> {
        Ok(())
    }

    /// Called after each training step
    fn on_step_end(&mut self, _ctx: &TrainContext) -> Result<()> {
        Ok(())
    }

    /// Called after each epoch
    fn on_epoch_end(&mut self, _ctx: &TrainContext) -> Result<()> {
        Ok(())
    }

    /// Called once after training ends
    fn on_train_end(&mut self, _ctx: &TrainContext) {}

    /// Callback name for logging
    fn name(&self) -> &str {
        "TrainingCallback"
    }
}

// =============================================================================
// Setup Callback
// =============================================================================

/// Creates the run directories and snapshots the resolved configs to disk
/// before any training work starts.
#[derive(Debug, Clone)]
pub struct SetupCallback {
    resume: String,
    run_name: String,
    logdir: PathBuf,
    ckptdir: PathBuf,
    cfgdir: PathBuf,
    config: RunConfig,
    harness: HarnessConfig,
}

impl SetupCallback {
    pub fn from_params(params: &SetupParams) -> Self {
        Self {
            resume: params.resume.clone(),
            run_name: params.now.clone(),
            logdir: params.logdir.clone(),
            ckptdir: params.ckptdir.clone(),
            cfgdir: params.cfgdir.clone(),
            config: (*params.config).clone(),
            harness: (*params.harness_config).clone(),
        }
    }

    fn snapshot(&self) -> Result<()> {
        fs::create_dir_all(&self.logdir)?;
        fs::create_dir_all(&self.ckptdir)?;
        fs::create_dir_all(&self.cfgdir)?;

        let project = serde_yaml::to_string(&self.config)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(
            self.cfgdir.join(format!("{}-project.yaml", self.run_name)),
            project,
        )?;

        let harness = serde_yaml::to_string(&self.harness)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(
            self.cfgdir.join(format!("{}-harness.yaml", self.run_name)),
            harness,
        )?;

        Ok(())
    }
}

impl TrainingCallback for SetupCallback {
    fn on_train_begin(&mut self, _ctx: &TrainContext) -> Result<()> {
        if !self.resume.is_empty() {
            debug!("resuming from {}", self.resume);
        }
        self.snapshot()
    }

    fn name(&self) -> &str {
        "SetupCallback"
    }
}

// =============================================================================
// Image Logger
// =============================================================================

/// Decides at which steps sample images are logged.
///
/// Fires on every multiple of `batch_frequency`; with `increase_log_steps`
/// a doubling ladder of early steps (1, 2, 4, ...) below the base frequency
/// fires once each, for feedback before the first full interval elapses.
#[derive(Debug, Clone)]
pub struct ImageLogger {
    batch_frequency: u32,
    max_images: u32,
    log_steps: Vec<usize>,
    logged: Vec<usize>,
}

impl ImageLogger {
    pub fn new(batch_frequency: u32, max_images: u32, increase_log_steps: bool) -> Self {
        let batch_frequency = batch_frequency.max(1);
        let log_steps = if increase_log_steps {
            let mut steps = Vec::new();
            let mut n = 1usize;
            while n < batch_frequency as usize {
                steps.push(n);
                n *= 2;
            }
            steps
        } else {
            Vec::new()
        };

        Self {
            batch_frequency,
            max_images,
            log_steps,
            logged: Vec::new(),
        }
    }

    /// Whether images should be logged at this step. Ladder steps are
    /// consumed on first use.
    pub fn check_frequency(&mut self, step: usize) -> bool {
        if step % self.batch_frequency as usize == 0 {
            return true;
        }
        if let Some(pos) = self.log_steps.iter().position(|&s| s == step) {
            self.log_steps.remove(pos);
            return true;
        }
        false
    }

    /// Steps at which images were logged, oldest first.
    pub fn logged_steps(&self) -> &[usize] {
        &self.logged
    }
}

impl TrainingCallback for ImageLogger {
    fn on_step_end(&mut self, ctx: &TrainContext) -> Result<()> {
        if self.check_frequency(ctx.global_step) {
            debug!(
                "logging up to {} images at step {}",
                self.max_images, ctx.global_step
            );
            self.logged.push(ctx.global_step);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ImageLogger"
    }
}

// =============================================================================
// Learning Rate Logger
// =============================================================================

/// Records the learning rate over training, per step or per epoch.
#[derive(Debug, Clone)]
pub struct LearningRateLogger {
    interval: LoggingInterval,
    history: Vec<(usize, f64)>,
}

impl LearningRateLogger {
    pub fn new(interval: LoggingInterval) -> Self {
        Self {
            interval,
            history: Vec::new(),
        }
    }

    /// Recorded `(step-or-epoch, lr)` pairs, oldest first.
    pub fn history(&self) -> &[(usize, f64)] {
        &self.history
    }
}

impl TrainingCallback for LearningRateLogger {
    fn on_step_end(&mut self, ctx: &TrainContext) -> Result<()> {
        if self.interval == LoggingInterval::Step {
            self.history.push((ctx.global_step, ctx.lr));
        }
        Ok(())
    }

    fn on_epoch_end(&mut self, ctx: &TrainContext) -> Result<()> {
        if self.interval == LoggingInterval::Epoch {
            self.history.push((ctx.epoch, ctx.lr));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "LearningRateLogger"
    }
}

// =============================================================================
// CUDA Callback
// =============================================================================

/// Per-epoch timing. The original synchronizes the device before reading
/// the clock; without a device handle this reduces to wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct CudaCallback {
    epoch_start: Option<Instant>,
    epoch_secs: Vec<f64>,
}

impl CudaCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds each finished epoch took, oldest first.
    pub fn epoch_secs(&self) -> &[f64] {
        &self.epoch_secs
    }
}

impl TrainingCallback for CudaCallback {
    fn on_epoch_begin(&mut self, _ctx: &TrainContext) -> Result<()> {
        self.epoch_start = Some(Instant::now());
        Ok(())
    }

    fn on_epoch_end(&mut self, ctx: &TrainContext) -> Result<()> {
        if let Some(start) = self.epoch_start.take() {
            let secs = start.elapsed().as_secs_f64();
            info!("epoch {} took {:.2}s", ctx.epoch, secs);
            self.epoch_secs.push(secs);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "CudaCallback"
    }
}

// =============================================================================
// Model Checkpoint Callback
// =============================================================================

/// Persists checkpoint markers at step intervals, per epoch, and on
/// best-metric improvement.
///
/// Without a `dirpath` nothing is written: placement is delegated to the
/// harness checkpoint defaults. With a monitored metric and
/// `save_top_k = 1`, only the best checkpoint is retained; older best
/// files are removed as improvements arrive.
#[derive(Debug, Clone)]
pub struct ModelCheckpointCallback {
    dirpath: Option<PathBuf>,
    filename: String,
    verbose: bool,
    save_last: bool,
    monitor: Option<String>,
    save_top_k: i32,
    every_n_train_steps: u32,
    save_weights_only: bool,
    best_value: Option<f64>,
    best_path: Option<PathBuf>,
    saved: Vec<PathBuf>,
}

impl ModelCheckpointCallback {
    pub fn from_params(params: &ModelCheckpointParams) -> Self {
        Self {
            dirpath: params.dirpath.clone(),
            filename: params
                .filename
                .clone()
                .unwrap_or_else(|| "{epoch:06}".to_string()),
            verbose: params.verbose,
            save_last: params.save_last.unwrap_or(false),
            monitor: params.monitor.clone(),
            save_top_k: params.save_top_k.unwrap_or(-1),
            every_n_train_steps: params.every_n_train_steps.unwrap_or(0),
            save_weights_only: params.save_weights_only,
            best_value: None,
            best_path: None,
            saved: Vec::new(),
        }
    }

    /// Checkpoints written and still on disk, oldest first.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Best monitored value seen so far.
    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    fn due_on_step(&self, global_step: usize) -> bool {
        self.every_n_train_steps > 0
            && global_step > 0
            && global_step % self.every_n_train_steps as usize == 0
    }

    fn payload(&self, ctx: &TrainContext) -> serde_json::Value {
        let mut payload = json!({
            "epoch": ctx.epoch,
            "global_step": ctx.global_step,
            "save_weights_only": self.save_weights_only,
        });
        if let Some(metric) = &self.monitor {
            if let Some(value) = ctx.metrics.get(metric) {
                payload[metric.as_str()] = json!(value);
            }
        }
        payload
    }

    fn write_checkpoint(&mut self, ctx: &TrainContext) -> Result<Option<PathBuf>> {
        let dir = match &self.dirpath {
            Some(dir) => dir.clone(),
            None => return Ok(None),
        };
        fs::create_dir_all(&dir)?;

        let stem = render_filename(&self.filename, ctx.epoch, ctx.global_step);
        let path = dir.join(format!("{}.ckpt", stem));
        let payload = serde_json::to_string_pretty(&self.payload(ctx))
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(&path, payload)?;

        if self.verbose {
            info!("saved checkpoint {}", path.display());
        }
        if !self.saved.contains(&path) {
            self.saved.push(path.clone());
        }
        Ok(Some(path))
    }

    fn write_last(&mut self, ctx: &TrainContext) -> Result<()> {
        if !self.save_last {
            return Ok(());
        }
        let dir = match &self.dirpath {
            Some(dir) => dir.clone(),
            None => return Ok(()),
        };
        fs::create_dir_all(&dir)?;

        let payload = serde_json::to_string_pretty(&self.payload(ctx))
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(dir.join("last.ckpt"), payload)?;
        Ok(())
    }
}

impl TrainingCallback for ModelCheckpointCallback {
    fn on_step_end(&mut self, ctx: &TrainContext) -> Result<()> {
        if self.due_on_step(ctx.global_step) {
            self.write_checkpoint(ctx)?;
            self.write_last(ctx)?;
        }
        Ok(())
    }

    fn on_epoch_end(&mut self, ctx: &TrainContext) -> Result<()> {
        match self.monitor.clone() {
            Some(metric) => {
                if let Some(value) = ctx.metrics.get(&metric).copied() {
                    let improved = self.best_value.map_or(true, |best| value < best);
                    if improved {
                        self.best_value = Some(value);
                        if let Some(path) = self.write_checkpoint(ctx)? {
                            if self.save_top_k == 1 {
                                if let Some(previous) = self.best_path.take() {
                                    if previous != path {
                                        fs::remove_file(&previous).ok();
                                        self.saved.retain(|p| p != &previous);
                                    }
                                }
                            }
                            self.best_path = Some(path);
                        }
                    }
                }
            }
            // Keep-last default: a checkpoint per epoch when no step
            // interval is driving the saves.
            None => {
                if self.every_n_train_steps == 0 {
                    self.write_checkpoint(ctx)?;
                }
            }
        }
        self.write_last(ctx)
    }

    fn name(&self) -> &str {
        "ModelCheckpoint"
    }
}

/// Render a checkpoint filename template.
///
/// Understands `{epoch}` and `{step}` fields with an optional zero-padding
/// width, e.g. `{epoch:06}-{step:09}`. Unknown fields are left verbatim.
fn render_filename(template: &str, epoch: usize, step: usize) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let close = match tail.find('}') {
            Some(idx) => open + idx,
            None => {
                out.push_str(tail);
                return out;
            }
        };

        let field = &rest[open + 1..close];
        let (name, width) = match field.split_once(':') {
            Some((name, spec)) => (name, spec.parse::<usize>().unwrap_or(0)),
            None => (field, 0),
        };
        match name {
            "epoch" => out.push_str(&format!("{:0width$}", epoch, width = width)),
            "step" => out.push_str(&format!("{:0width$}", step, width = width)),
            _ => out.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

// =============================================================================
// Tests
// =============================================================================
