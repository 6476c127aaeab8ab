//! # Afinar: Dreambooth Fine-Tuning Run Configuration
//!
//! Afinar assembles the configuration for a Dreambooth-style
//! personalization run of a latent diffusion model: which model
//! architecture, dataset partitions, callbacks, and experiment logger the
//! training harness should instantiate, and with which parameters.
//!
//! ## Architecture
//!
//! - **args**: resolved command-line arguments for one run
//! - **paths**: per-run directory layout
//! - **config**: one builder per config section (model, data, harness,
//!   trainer) plus the ordered callback spec set
//! - **factory**: declarative spec → live object construction
//! - **train**: the callback, logger, and checkpoint-IO implementations
//!   the configuration names
//!
//! ## Example
//!
//! ```
//! use afinar::{
//!     callback_specs, data_config, harness_config, model_config, run_config,
//!     trainer_config, trainer_kwargs, RunArguments, RunPaths,
//! };
//! use clap::Parser;
//!
//! let args = RunArguments::parse_from([
//!     "afinar",
//!     "--training-model", "sd-v1-5.ckpt",
//!     "--training-images", "./subject",
//! ]);
//! let paths = RunPaths::new("logs", &args.project_name);
//!
//! let model = model_config(&args);
//! let data = data_config(&args);
//! let harness = harness_config(&args, &paths);
//! let config = run_config(model.clone(), data, harness.clone());
//!
//! let trainer = trainer_config(&model.describe(), &args, &paths, &harness);
//! let callbacks = callback_specs(&args, &paths, &config, &harness);
//! let kwargs = trainer_kwargs(&args, &trainer, &callbacks)?;
//! assert_eq!(kwargs.callbacks.len(), 5);
//! # Ok::<(), afinar::Error>(())
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod factory;
pub mod paths;
pub mod train;

// Re-export commonly used types
pub use args::RunArguments;
pub use config::{
    callback_specs, data_config, harness_config, model_config, run_config, trainer_config,
    trainer_kwargs, CallbackSpec, CallbackSpecSet, DataConfig, HarnessConfig, LoggerSpec,
    ModelConfig, ModelDescription, RunConfig, TrainerConfig, TrainerKwargs,
};
pub use error::{Error, Result};
pub use paths::RunPaths;
