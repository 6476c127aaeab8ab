//! Error types for Afinar

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Mapping carries no `target` key; it is plain data, not an instantiation directive")]
    MissingTarget,

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;
