//! Harness (trainer-level) section of the run config
//!
//! Trainer knobs, the checkpoint-interval override folded into the
//! harness's own checkpoint machinery, and the callback sub-section.
//! Also home to the aggregate `RunConfig` that nests the model, data,
//! and harness sections.

use serde::{Deserialize, Serialize};

use crate::args::RunArguments;
use crate::config::callbacks::{CallbackBuilders, CallbackSpec};
use crate::config::data::DataConfig;
use crate::config::model::ModelConfig;
use crate::paths::RunPaths;

/// Trainer knobs forwarded to the harness entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerSettings {
    pub accelerator: Accelerator,
    pub devices: Vec<u32>,
    /// Let the backend auto-tune kernels for fixed input shapes
    pub benchmark: bool,
    pub accumulate_grad_batches: u32,
    pub max_steps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accelerator {
    Gpu,
    Cpu,
}

/// Override for the harness's built-in checkpoint machinery. Plain data,
/// not an instantiation directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointDefaults {
    pub every_n_train_steps: u32,
}

/// Callbacks the harness section itself carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessCallbacks {
    pub image_logger: CallbackSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_over_trainsteps_checkpoint: Option<CallbackSpec>,
}

/// Harness section of the run config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub checkpoint_defaults: CheckpointDefaults,
    pub callbacks: HarnessCallbacks,
    pub trainer: TrainerSettings,
}

/// Aggregate run config: what gets snapshotted to disk and handed to the
/// harness entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub model: ModelConfig,
    pub data: DataConfig,
    pub harness: HarnessConfig,
}

/// Harness section for a personalization run.
///
/// The interval checkpoint entry appears only when a positive step
/// interval was configured; the checkpoint-interval override falls back
/// to every 500 steps otherwise.
pub fn harness_config(args: &RunArguments, paths: &RunPaths) -> HarnessConfig {
    let cb = CallbackBuilders::new(args, paths);

    HarnessConfig {
        checkpoint_defaults: CheckpointDefaults {
            every_n_train_steps: if args.save_every_x_steps == 0 {
                500
            } else {
                args.save_every_x_steps
            },
        },
        callbacks: HarnessCallbacks {
            image_logger: cb.image_logger(),
            metrics_over_trainsteps_checkpoint: (args.save_every_x_steps > 0)
                .then(|| cb.metrics_over_trainsteps_checkpoint(false)),
        },
        trainer: TrainerSettings {
            accelerator: Accelerator::Gpu,
            devices: vec![0],
            benchmark: true,
            accumulate_grad_batches: 1,
            max_steps: args.max_training_steps,
        },
    }
}

/// Aggregate config nesting the three sections.
pub fn run_config(model: ModelConfig, data: DataConfig, harness: HarnessConfig) -> RunConfig {
    RunConfig {
        model,
        data,
        harness,
    }
}
