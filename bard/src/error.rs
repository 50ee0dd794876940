use crate::ConfigError;
use bard_core::TransformError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BardError {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no pointer is configured for this session")]
    PointerUnavailable,
    #[error("tracker failed: {0}")]
    Tracker(String),
    #[error("unable to read recorded tracking: {0}")]
    Recording(#[from] serde_json::Error),
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BardError>;
