use std::path::PathBuf;

use sslforslr_audio::AudioError;
use thiserror::Error;

/// Errors returned by dataset operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("manifest {path}:{line}: expected `<label> <path>`, got {content:?}")]
    Manifest {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("audio too short: need at least {need} samples, got {got}")]
    AudioTooShort { need: usize, got: usize },

    #[error("frame length mismatch: expected {expected}, got {got}")]
    FrameLength { expected: usize, got: usize },

    #[error("batch {index} out of range (len {len})")]
    BatchOutOfRange { index: usize, len: usize },

    #[error("invalid sample index {0}")]
    InvalidIndex(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("augmentation changed length from {before} to {after}")]
    AugmentLength { before: usize, after: usize },

    #[error("no augmentation sources found: {0}")]
    NoAugmentSources(String),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatasetError>;
