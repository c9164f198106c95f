// src/utils/error.rs

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why the image collaborator could not produce a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailureReason {
    /// The source path does not exist.
    NotFound,
    /// The file exists but is not a decodable single-channel image.
    Decode(String),
}

impl fmt::Display for LoadFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFailureReason::NotFound => write!(f, "file not found"),
            LoadFailureReason::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

/// The primary error type for every operation in the codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// An error occurred while reading or writing a compressed stream file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A grid dimension violates a transform or stream precondition.
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// The cutoff percentage lies outside [-100, 100] or is not a number.
    #[error("Invalid cutoff {0}: must lie within [-100, 100]")]
    InvalidCutoff(f32),

    #[error("Failed to load image {path:?}: {reason}")]
    ImageLoadFailure {
        path: PathBuf,
        reason: LoadFailureReason,
    },

    #[error("Failed to save image {path:?}: {reason}")]
    ImageSaveFailure { path: PathBuf, reason: String },

    /// The compressed stream is truncated or internally inconsistent.
    #[error("Stream corruption: {0}")]
    StreamCorruption(String),

    /// A raw buffer does not match the dimensions it was paired with.
    #[error("Dimension mismatch: expected {expected} samples, but got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
