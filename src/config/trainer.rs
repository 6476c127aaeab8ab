//! Trainer config and the final trainer-kwargs assembly
//!
//! The trainer config names the experiment logger and the checkpoint
//! callback; the kwargs assembler resolves specs into live objects via the
//! factory and bundles them with the step budget and the checkpoint-IO
//! plugin.

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::args::RunArguments;
use crate::config::callbacks::{CallbackBuilders, CallbackSpec, CallbackSpecSet};
use crate::config::harness::{HarnessConfig, TrainerSettings};
use crate::config::model::ModelDescription;
use crate::error::Result;
use crate::factory;
use crate::paths::RunPaths;
use crate::train::{ExperimentLogger, PruningCheckpointIo, TrainingCallback};

/// Constructible experiment-logger kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum LoggerSpec {
    CsvLogger(CsvLoggerParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvLoggerParams {
    /// Subdirectory of `save_dir` the metrics file lands in
    pub name: String,
    pub save_dir: PathBuf,
}

/// Trainer config: logger, checkpoint callback, and the trainer knobs
/// copied out of the harness section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub logger: LoggerSpec,
    pub checkpoint_callback: CallbackSpec,
    #[serde(flatten)]
    pub settings: TrainerSettings,
}

/// Trainer config for a personalization run.
///
/// When the instantiated model tracks a metric, the checkpoint callback is
/// switched from keep-last to best-only: it monitors that metric and
/// retains a single best checkpoint. A model without a metric leaves the
/// defaults untouched.
pub fn trainer_config(
    model: &ModelDescription,
    args: &RunArguments,
    paths: &RunPaths,
    harness: &HarnessConfig,
) -> TrainerConfig {
    let cb = CallbackBuilders::new(args, paths);
    let mut checkpoint_callback = cb.model_checkpoint();

    if let Some(metric) = &model.monitor {
        if let CallbackSpec::ModelCheckpoint(params) = &mut checkpoint_callback {
            params.monitor = Some(metric.clone());
            params.save_top_k = Some(1);
        }
        debug!("monitoring {} as checkpoint metric", metric);
    }

    TrainerConfig {
        logger: LoggerSpec::CsvLogger(CsvLoggerParams {
            name: "csv".to_string(),
            save_dir: paths.log_dir().to_path_buf(),
        }),
        checkpoint_callback,
        settings: harness.trainer.clone(),
    }
}

/// Fully resolved inputs for the harness trainer entry point. Built once
/// per run, at the end of the assembly chain.
pub struct TrainerKwargs {
    pub logger: Box<dyn ExperimentLogger>,
    /// Live callbacks, in spec-set insertion order
    pub callbacks: Vec<Box<dyn TrainingCallback>>,
    pub max_steps: u32,
    pub checkpoint_io: PruningCheckpointIo,
}

/// Resolve the trainer config and callback spec set into live objects.
///
/// Factory failures propagate to the caller untouched; an unresolvable
/// spec is a fatal configuration error, not a retryable condition.
pub fn trainer_kwargs(
    args: &RunArguments,
    trainer: &TrainerConfig,
    callbacks: &CallbackSpecSet,
) -> Result<TrainerKwargs> {
    let logger = factory::logger(&trainer.logger)?;
    let callbacks = callbacks
        .specs()
        .into_iter()
        .map(factory::callback)
        .collect::<Result<Vec<_>>>()?;

    Ok(TrainerKwargs {
        logger,
        callbacks,
        max_steps: args.max_training_steps,
        checkpoint_io: PruningCheckpointIo::new(),
    })
}
