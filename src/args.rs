//! Command-line arguments for a fine-tuning run
//!
//! Arguments are parsed once at process start and passed by reference into
//! every configuration builder. No validation happens here; values are
//! forwarded verbatim into the assembled configs and fail, if at all, when
//! the consuming harness instantiates them.
//!
//! # Usage
//!
//! ```bash
//! afinar --project-name sks-dog \
//!        --training-model sd-v1-5.ckpt \
//!        --training-images ./subject \
//!        --regularization-images ./class-images \
//!        --token sks --class-word dog \
//!        --max-training-steps 2000 --save-every-x-steps 250
//! ```

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolved command-line arguments for one personalization run.
#[derive(Parser, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[command(name = "afinar")]
#[command(version)]
#[command(about = "Dreambooth-style fine-tuning run configuration for latent diffusion models")]
pub struct RunArguments {
    /// Name of this run; becomes part of the run folder name
    #[arg(long, default_value = "project")]
    pub project_name: String,

    /// Base learning rate
    #[arg(long, default_value_t = 1e-6)]
    pub learning_rate: f64,

    /// Save an intermediate checkpoint every N training steps (0 disables)
    #[arg(long, default_value_t = 0)]
    pub save_every_x_steps: u32,

    /// Total number of training steps
    #[arg(long, default_value_t = 3000)]
    pub max_training_steps: u32,

    /// Model checkpoint to fine-tune from
    #[arg(long)]
    pub training_model: PathBuf,

    /// Directory of subject training images
    #[arg(long)]
    pub training_images: PathBuf,

    /// Directory of class regularization images
    #[arg(long)]
    pub regularization_images: Option<PathBuf>,

    /// Placeholder token identifying the subject in captions
    #[arg(long, default_value = "firstNameLastName")]
    pub token: String,

    /// Caption with the token alone, dropping the class word
    #[arg(long)]
    pub token_only: bool,

    /// Coarse class word describing the subject (e.g. "person", "dog")
    #[arg(long, default_value = "person")]
    pub class_word: String,

    /// Probability of horizontally flipping a training image
    #[arg(long, default_value_t = 0.5)]
    pub flip_p: f64,

    /// Global random seed
    #[arg(long, default_value_t = 23)]
    pub seed: u32,

    /// Emit extra diagnostics
    #[arg(long)]
    pub debug: bool,
}
