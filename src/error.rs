//! Crate-wide error type.

use std::path::PathBuf;

use crate::schema::ConfigError;

/// Errors surfaced by container encoding, decoding and sequence assembly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No frames to encode")]
    EmptyInput,

    #[error("Frame {index} is {found:?} but the container is {expected:?} (width, height)")]
    DimensionMismatch {
        index: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("Frame count exceeds the u32 header field")]
    TooManyFrames,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Header needs 16 bytes, only {found} available")]
    TruncatedHeader { found: usize },

    #[error("Frame data truncated: expected {expected} bytes, found {found}")]
    TruncatedFrame { expected: usize, found: usize },

    #[error("Trailer at offset {offset} truncated: {found} of 16 bytes available")]
    TruncatedTrailer { offset: usize, found: usize },

    #[error("File has trailing data: expected {expected} bytes, found {found}")]
    TrailingData { expected: u64, found: u64 },

    #[error("Frame index {index} out of range ({available} usable frames)")]
    OutOfRange { index: u64, available: u64 },

    #[error("Corrupt trailer: {0}")]
    CorruptTrailer(String),

    #[error("No image files found in {0}")]
    NoImages(PathBuf),

    #[error("config.json not found in {0}")]
    MissingConfig(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
