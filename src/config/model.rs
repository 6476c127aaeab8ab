//! Model section of the run config
//!
//! Describes the latent diffusion model to fine-tune: noise schedule,
//! denoiser, autoencoder, text conditioning, and the personalization
//! embedding manager. Architecture constants are fixed; only the learning
//! rate and the initial checkpoint come from the run arguments.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::args::RunArguments;

/// Top-level model section: the diffusion model spec plus the base
/// learning rate the harness reads off the section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base learning rate before any batch-size scaling
    pub base_learning_rate: f64,

    #[serde(flatten)]
    pub model: ModelSpec,
}

/// Constructible diffusion-model kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum ModelSpec {
    LatentDiffusion(LatentDiffusionParams),
}

/// Constructor arguments for the latent diffusion model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentDiffusionParams {
    /// Weight of the regularization-image loss term
    pub reg_weight: f64,
    pub linear_start: f64,
    pub linear_end: f64,
    pub num_timesteps_cond: u32,
    pub log_every_t: u32,
    pub timesteps: u32,
    pub first_stage_key: String,
    pub cond_stage_key: String,
    /// Latent-space resolution
    pub image_size: u32,
    pub channels: u32,
    pub cond_stage_trainable: bool,
    pub conditioning_key: ConditioningKey,
    /// Metric tracked for best-checkpoint selection, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,
    pub scale_factor: f64,
    pub use_ema: bool,
    pub embedding_reg_weight: f64,
    /// Fine-tune the whole model, not just the embedding
    pub unfreeze_model: bool,
    pub model_lr: f64,
    pub personalization_config: PersonalizationSpec,
    pub unet_config: DenoiserSpec,
    pub first_stage_config: FirstStageSpec,
    pub cond_stage_config: CondStageSpec,
    /// Checkpoint to initialize from
    pub ckpt_path: PathBuf,
}

/// How the conditioning signal enters the denoiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditioningKey {
    Crossattn,
    Concat,
    Hybrid,
}

/// Constructible denoising-network kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum DenoiserSpec {
    Unet(UnetParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnetParams {
    pub image_size: u32,
    pub in_channels: u32,
    pub out_channels: u32,
    pub model_channels: u32,
    pub attention_resolutions: Vec<u32>,
    pub num_res_blocks: u32,
    pub channel_mult: Vec<u32>,
    pub num_heads: u32,
    pub use_spatial_transformer: bool,
    pub transformer_depth: u32,
    pub context_dim: u32,
    /// Gradient checkpointing
    pub use_checkpoint: bool,
    pub legacy: bool,
}

/// Constructible first-stage (autoencoder) kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum FirstStageSpec {
    AutoencoderKl(AutoencoderParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderParams {
    pub embed_dim: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,
    pub ddconfig: EncoderDecoderParams,
    pub lossconfig: LossSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderDecoderParams {
    pub double_z: bool,
    pub z_channels: u32,
    /// Pixel-space resolution
    pub resolution: u32,
    pub in_channels: u32,
    pub out_ch: u32,
    pub ch: u32,
    pub ch_mult: Vec<u32>,
    pub num_res_blocks: u32,
    pub attn_resolutions: Vec<u32>,
    pub dropout: f64,
}

/// Constructible autoencoder-loss kinds. The first stage is frozen during
/// fine-tuning, so the identity loss is the only one assembled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum LossSpec {
    Identity,
}

/// Constructible text-conditioning encoder kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum CondStageSpec {
    FrozenClipEmbedder,
}

/// Constructible personalization (embedding manager) kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum PersonalizationSpec {
    EmbeddingManager(EmbeddingManagerParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingManagerParams {
    pub placeholder_strings: Vec<String>,
    pub initializer_words: Vec<String>,
    pub per_image_tokens: bool,
    pub num_vectors_per_token: u32,
    pub progressive_words: bool,
}

/// The slice of an instantiated model the trainer-config builder looks at.
///
/// The harness hands back a live model after instantiation; the only thing
/// the trainer config needs from it is which metric (if any) it tracks for
/// best-checkpoint selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDescription {
    pub monitor: Option<String>,
}

impl ModelConfig {
    /// Description of the model this config instantiates.
    pub fn describe(&self) -> ModelDescription {
        let ModelSpec::LatentDiffusion(params) = &self.model;
        ModelDescription {
            monitor: params.monitor.clone(),
        }
    }
}

/// Model section for a personalization run.
///
/// Malformed argument values are forwarded verbatim; error detection is
/// deferred to the harness instantiating the spec.
pub fn model_config(args: &RunArguments) -> ModelConfig {
    ModelConfig {
        base_learning_rate: args.learning_rate,
        model: ModelSpec::LatentDiffusion(LatentDiffusionParams {
            reg_weight: 1.0,
            linear_start: 0.000_85,
            linear_end: 0.012,
            num_timesteps_cond: 1,
            log_every_t: 200,
            timesteps: 1000,
            first_stage_key: "image".to_string(),
            cond_stage_key: "caption".to_string(),
            image_size: 64,
            channels: 4,
            cond_stage_trainable: true,
            conditioning_key: ConditioningKey::Crossattn,
            monitor: Some("val/loss_simple_ema".to_string()),
            scale_factor: 0.18215,
            use_ema: false,
            embedding_reg_weight: 0.0,
            unfreeze_model: true,
            model_lr: args.learning_rate,
            personalization_config: PersonalizationSpec::EmbeddingManager(
                EmbeddingManagerParams {
                    placeholder_strings: vec!["*".to_string()],
                    initializer_words: vec!["sculpture".to_string()],
                    per_image_tokens: false,
                    num_vectors_per_token: 1,
                    progressive_words: false,
                },
            ),
            unet_config: DenoiserSpec::Unet(UnetParams {
                image_size: 32,
                in_channels: 4,
                out_channels: 4,
                model_channels: 320,
                attention_resolutions: vec![4, 2, 1],
                num_res_blocks: 2,
                channel_mult: vec![1, 2, 4, 4],
                num_heads: 8,
                use_spatial_transformer: true,
                transformer_depth: 1,
                context_dim: 768,
                use_checkpoint: true,
                legacy: false,
            }),
            first_stage_config: FirstStageSpec::AutoencoderKl(AutoencoderParams {
                embed_dim: 4,
                monitor: Some("val/rec_loss".to_string()),
                ddconfig: EncoderDecoderParams {
                    double_z: true,
                    z_channels: 4,
                    resolution: 512,
                    in_channels: 3,
                    out_ch: 3,
                    ch: 128,
                    ch_mult: vec![1, 2, 4, 4],
                    num_res_blocks: 2,
                    attn_resolutions: vec![],
                    dropout: 0.0,
                },
                lossconfig: LossSpec::Identity,
            }),
            cond_stage_config: CondStageSpec::FrozenClipEmbedder,
            ckpt_path: args.training_model.clone(),
        }),
    }
}
