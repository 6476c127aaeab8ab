//! Training-side collaborators the configuration names
//!
//! The config sections describe callbacks, an experiment logger, and a
//! checkpoint-IO plugin by spec; this module holds their live
//! implementations. There is no training loop here: the harness that
//! consumes `TrainerKwargs` drives these hooks.

pub mod callback;
mod checkpoint_io;
mod logger;

pub use callback::{
    CudaCallback, ImageLogger, LearningRateLogger, ModelCheckpointCallback, SetupCallback,
    TrainContext, TrainingCallback,
};
pub use checkpoint_io::{Checkpoint, CheckpointIo, PruningCheckpointIo};
pub use logger::{CsvLogger, ExperimentLogger};
