//! Declarative spec → live object construction
//!
//! The reserved `target` key names the kind to construct and `params`
//! carries its constructor arguments. Kinds are closed enums resolved by
//! match; the value-level entry points accept snapshotted YAML and fail
//! with `UnknownTarget` on names no kind claims. Errors are never
//! recovered here; the caller decides, and for run assembly a failed
//! resolution is fatal.

use crate::config::{CallbackSpec, LoggerSpec};
use crate::error::{Error, Result};
use crate::train::{
    CsvLogger, CudaCallback, ExperimentLogger, ImageLogger, LearningRateLogger,
    ModelCheckpointCallback, SetupCallback, TrainingCallback,
};

/// Construct the live experiment logger a spec names.
pub fn logger(spec: &LoggerSpec) -> Result<Box<dyn ExperimentLogger>> {
    match spec {
        LoggerSpec::CsvLogger(params) => {
            Ok(Box::new(CsvLogger::new(&params.name, &params.save_dir)))
        }
    }
}

/// Construct the live callback a spec names.
pub fn callback(spec: &CallbackSpec) -> Result<Box<dyn TrainingCallback>> {
    match spec {
        CallbackSpec::Setup(params) => Ok(Box::new(SetupCallback::from_params(params))),
        CallbackSpec::ImageLogger(params) => Ok(Box::new(ImageLogger::new(
            params.batch_frequency,
            params.max_images,
            params.increase_log_steps,
        ))),
        CallbackSpec::LearningRateLogger(params) => {
            Ok(Box::new(LearningRateLogger::new(params.logging_interval)))
        }
        CallbackSpec::CudaCallback => Ok(Box::new(CudaCallback::new())),
        CallbackSpec::ModelCheckpoint(params) => {
            Ok(Box::new(ModelCheckpointCallback::from_params(params)))
        }
    }
}

/// Callback construction from a snapshotted mapping.
///
/// A mapping without a `target` key is plain data, never instantiated; an
/// explicit null value is treated the same as an absent one.
pub fn callback_from_value(value: &serde_yaml::Value) -> Result<Box<dyn TrainingCallback>> {
    match target_of(value)? {
        "setup" | "image_logger" | "learning_rate_logger" | "cuda_callback"
        | "model_checkpoint" => {
            let spec: CallbackSpec = serde_yaml::from_value(value.clone())
                .map_err(|e| Error::Serialization(e.to_string()))?;
            callback(&spec)
        }
        other => Err(Error::UnknownTarget(other.to_string())),
    }
}

/// Logger construction from a snapshotted mapping.
pub fn logger_from_value(value: &serde_yaml::Value) -> Result<Box<dyn ExperimentLogger>> {
    match target_of(value)? {
        "csv_logger" => {
            let spec: LoggerSpec = serde_yaml::from_value(value.clone())
                .map_err(|e| Error::Serialization(e.to_string()))?;
            logger(&spec)
        }
        other => Err(Error::UnknownTarget(other.to_string())),
    }
}

fn target_of(value: &serde_yaml::Value) -> Result<&str> {
    value
        .get("target")
        .and_then(serde_yaml::Value::as_str)
        .ok_or(Error::MissingTarget)
}
