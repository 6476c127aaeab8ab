//! Data section of the run config
//!
//! Three dataset partitions: train, optional regularization, validation.
//! The regularization partition exists only when a regularization-image
//! directory was supplied; with none, the slot is omitted from the config
//! entirely rather than serialized as an empty or null mapping, so no
//! dangling instantiation directive can reach the factory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::args::RunArguments;

/// Constructible data-module kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum DataConfig {
    DataModule(DataModuleParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataModuleParams {
    pub batch_size: u32,
    pub num_workers: u32,
    pub wrap: bool,
    pub train: DatasetSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg: Option<DatasetSpec>,
    pub validation: DatasetSpec,
}

/// Constructible dataset kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "params", rename_all = "snake_case")]
pub enum DatasetSpec {
    PersonalizedImages(PersonalizedImagesParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedImagesParams {
    /// Edge length images are resized to
    pub size: u32,
    pub set: DatasetSplit,
    /// This partition holds class regularization images
    #[serde(default, skip_serializing_if = "is_false")]
    pub reg: bool,
    pub per_image_tokens: bool,
    /// How many times each image repeats per epoch
    pub repeats: u32,
    pub coarse_class_text: String,
    pub data_root: PathBuf,
    pub placeholder_token: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub token_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_p: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSplit {
    Train,
    Val,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Data section for a personalization run.
pub fn data_config(args: &RunArguments) -> DataConfig {
    let train = DatasetSpec::PersonalizedImages(PersonalizedImagesParams {
        size: 512,
        set: DatasetSplit::Train,
        reg: false,
        per_image_tokens: false,
        repeats: 100,
        coarse_class_text: args.class_word.clone(),
        data_root: args.training_images.clone(),
        placeholder_token: args.token.clone(),
        token_only: args.token_only || args.class_word.is_empty(),
        flip_p: Some(args.flip_p),
    });

    let reg = args.regularization_images.as_ref().map(|data_root| {
        DatasetSpec::PersonalizedImages(PersonalizedImagesParams {
            size: 512,
            set: DatasetSplit::Train,
            reg: true,
            per_image_tokens: false,
            repeats: 10,
            coarse_class_text: args.class_word.clone(),
            data_root: data_root.clone(),
            placeholder_token: args.token.clone(),
            token_only: false,
            flip_p: None,
        })
    });

    let validation = DatasetSpec::PersonalizedImages(PersonalizedImagesParams {
        size: 512,
        set: DatasetSplit::Val,
        reg: false,
        per_image_tokens: false,
        repeats: 10,
        coarse_class_text: args.class_word.clone(),
        data_root: args.training_images.clone(),
        placeholder_token: args.token.clone(),
        token_only: false,
        flip_p: None,
    });

    DataConfig::DataModule(DataModuleParams {
        batch_size: 1,
        num_workers: 1,
        wrap: false,
        train,
        reg,
        validation,
    })
}
