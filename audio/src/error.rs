use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("wav error on {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("unsupported sample format: {bits}-bit {format}")]
    UnsupportedFormat { format: &'static str, bits: u16 },

    #[error("resample error: {0}")]
    Resample(String),

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(e: rubato::ResampleError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AudioError>;
