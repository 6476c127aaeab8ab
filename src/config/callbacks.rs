//! Callback specs and the ordered callback spec set
//!
//! Each callback the harness should run is described by a tagged spec; the
//! factory resolves specs into live `TrainingCallback` objects. The spec
//! set preserves insertion order because the harness invokes callbacks in
//! that order for same-priority hooks, and setup must run first.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::args::RunArguments;
use crate::config::harness::{HarnessConfig, RunConfig};
use crate::paths::RunPaths;

/// Constructible callback kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum CallbackSpec {
    Setup(SetupParams),
    ImageLogger(ImageLoggerParams),
    LearningRateLogger(LearningRateLoggerParams),
    CudaCallback,
    ModelCheckpoint(ModelCheckpointParams),
}

/// Constructor arguments for the setup callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupParams {
    /// Checkpoint a resumed run continues from; empty for fresh runs
    pub resume: String,
    /// Run folder name
    pub now: String,
    pub logdir: PathBuf,
    pub ckptdir: PathBuf,
    pub cfgdir: PathBuf,
    /// Resolved run config, snapshotted to disk on train begin
    pub config: Box<RunConfig>,
    /// Resolved harness section, snapshotted alongside
    pub harness_config: Box<HarnessConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLoggerParams {
    /// Log sample images every N steps
    pub batch_frequency: u32,
    pub max_images: u32,
    /// Also log on a doubling ladder of early steps
    pub increase_log_steps: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRateLoggerParams {
    pub logging_interval: LoggingInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggingInterval {
    Step,
    Epoch,
}

/// Constructor arguments for the model checkpoint callback. Absent fields
/// leave the callback's own defaults in effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCheckpointParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dirpath: Option<PathBuf>,
    /// Filename template; `{epoch:06}` renders zero-padded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub verbose: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_last: Option<bool>,
    /// Metric to track for best-checkpoint selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,
    /// How many checkpoints to retain: -1 keeps all, 1 keeps the best
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_top_k: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every_n_train_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub save_weights_only: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Per-callback spec builders, sharing the run arguments and path layout.
pub struct CallbackBuilders<'a> {
    args: &'a RunArguments,
    paths: &'a RunPaths,
}

impl<'a> CallbackBuilders<'a> {
    pub fn new(args: &'a RunArguments, paths: &'a RunPaths) -> Self {
        Self { args, paths }
    }

    /// Setup callback: creates the run directories and snapshots the
    /// resolved configs.
    pub fn setup(&self, config: &RunConfig, harness: &HarnessConfig) -> CallbackSpec {
        CallbackSpec::Setup(SetupParams {
            resume: String::new(),
            now: self.paths.run_name().to_string(),
            logdir: self.paths.log_dir().to_path_buf(),
            ckptdir: self.paths.checkpoint_dir(),
            cfgdir: self.paths.config_dir(),
            config: Box::new(config.clone()),
            harness_config: Box::new(harness.clone()),
        })
    }

    pub fn image_logger(&self) -> CallbackSpec {
        CallbackSpec::ImageLogger(ImageLoggerParams {
            batch_frequency: if self.args.save_every_x_steps == 0 {
                500
            } else {
                self.args.save_every_x_steps
            },
            max_images: 8,
            increase_log_steps: false,
        })
    }

    pub fn learning_rate_logger(&self) -> CallbackSpec {
        CallbackSpec::LearningRateLogger(LearningRateLoggerParams {
            logging_interval: LoggingInterval::Step,
        })
    }

    pub fn cuda_callback(&self) -> CallbackSpec {
        CallbackSpec::CudaCallback
    }

    /// Final checkpoint callback: keep-last under the run checkpoint dir.
    pub fn model_checkpoint(&self) -> CallbackSpec {
        CallbackSpec::ModelCheckpoint(ModelCheckpointParams {
            dirpath: Some(self.paths.checkpoint_dir()),
            filename: Some("{epoch:06}".to_string()),
            verbose: true,
            save_last: Some(true),
            every_n_train_steps: Some(self.args.save_every_x_steps),
            ..Default::default()
        })
    }

    /// Weights-only interval checkpoint. With `in_intermediate_dir` the
    /// checkpoints land in the dedicated trainstep directory and every
    /// interval is retained; without it, placement is left to the harness
    /// checkpoint defaults.
    pub fn metrics_over_trainsteps_checkpoint(&self, in_intermediate_dir: bool) -> CallbackSpec {
        if in_intermediate_dir {
            CallbackSpec::ModelCheckpoint(ModelCheckpointParams {
                dirpath: Some(self.paths.intermediate_checkpoint_dir()),
                filename: Some("{epoch:06}-{step:09}".to_string()),
                verbose: true,
                save_top_k: Some(-1),
                every_n_train_steps: Some(self.args.save_every_x_steps),
                save_weights_only: true,
                ..Default::default()
            })
        } else {
            CallbackSpec::ModelCheckpoint(ModelCheckpointParams {
                every_n_train_steps: Some(self.args.save_every_x_steps),
                save_weights_only: true,
                ..Default::default()
            })
        }
    }
}

/// The callback specs for one run, in the order the harness will invoke
/// them: setup first, the interval checkpoint (when configured) last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackSpecSet {
    pub setup: CallbackSpec,
    pub image_logger: CallbackSpec,
    pub learning_rate_logger: CallbackSpec,
    pub cuda_callback: CallbackSpec,
    pub checkpoint_callback: CallbackSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_over_trainsteps_checkpoint: Option<CallbackSpec>,
}

impl CallbackSpecSet {
    /// Specs in insertion order.
    pub fn specs(&self) -> Vec<&CallbackSpec> {
        let mut specs = vec![
            &self.setup,
            &self.image_logger,
            &self.learning_rate_logger,
            &self.cuda_callback,
            &self.checkpoint_callback,
        ];
        if let Some(spec) = &self.metrics_over_trainsteps_checkpoint {
            specs.push(spec);
        }
        specs
    }

    pub fn len(&self) -> usize {
        self.specs().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Callback spec set for one run.
///
/// The interval checkpoint is present only when a positive step interval
/// was configured, under the same condition as the harness section's
/// callback sub-mapping.
pub fn callback_specs(
    args: &RunArguments,
    paths: &RunPaths,
    config: &RunConfig,
    harness: &HarnessConfig,
) -> CallbackSpecSet {
    let cb = CallbackBuilders::new(args, paths);

    CallbackSpecSet {
        setup: cb.setup(config, harness),
        image_logger: cb.image_logger(),
        learning_rate_logger: cb.learning_rate_logger(),
        cuda_callback: cb.cuda_callback(),
        checkpoint_callback: cb.model_checkpoint(),
        metrics_over_trainsteps_checkpoint: (args.save_every_x_steps > 0)
            .then(|| cb.metrics_over_trainsteps_checkpoint(true)),
    }
}
