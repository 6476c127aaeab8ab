//! Run configuration sections
//!
//! One builder per config section, composed by nesting: the aggregate run
//! config embeds the model, data, and harness sections; the trainer config
//! consumes the harness section and the model description; the kwargs
//! assembler resolves specs through the factory.
//!
//! Specs meant for instantiation carry a `target` tag and a `params`
//! mapping when snapshotted:
//!
//! ```yaml
//! target: model_checkpoint
//! params:
//!   dirpath: logs/2024-03-01T10-00-00_sks-dog/ckpts
//!   filename: '{epoch:06}'
//!   verbose: true
//!   save_last: true
//! ```
//!
//! Builders are pure functions of the run arguments and path layout: the
//! same inputs produce structurally identical configs.

mod callbacks;
mod data;
mod harness;
mod model;
mod trainer;



pub use callbacks::{
    callback_specs, CallbackBuilders, CallbackSpec, CallbackSpecSet, ImageLoggerParams,
    LearningRateLoggerParams, LoggingInterval, ModelCheckpointParams, SetupParams,
};
pub use data::{
    data_config, DataConfig, DataModuleParams, DatasetSpec, DatasetSplit,
    PersonalizedImagesParams,
};
pub use harness::{
    harness_config, run_config, Accelerator, CheckpointDefaults, HarnessCallbacks, HarnessConfig,
    RunConfig, TrainerSettings,
};
pub use model::{
    model_config, AutoencoderParams, CondStageSpec, ConditioningKey, DenoiserSpec,
    EmbeddingManagerParams, EncoderDecoderParams, FirstStageSpec, LatentDiffusionParams,
    LossSpec, ModelConfig, ModelDescription, ModelSpec, PersonalizationSpec, UnetParams,
};
pub use trainer::{
    trainer_config, trainer_kwargs, CsvLoggerParams, LoggerSpec, TrainerConfig, TrainerKwargs,
};
