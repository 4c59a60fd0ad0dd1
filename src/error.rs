//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O and config errors, and provides semantic variants for
//! precondition violations (bad source, bad target) and composition failures.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode source image {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Source image {source_id} has no pixels")]
    EmptySource { source_id: String },

    #[error("Invalid target {target}: {width}x{height} (both dimensions must be > 0)")]
    InvalidTarget {
        target: String,
        width: u32,
        height: u32,
    },

    #[error("Composition failed for {source_id} -> {target_id}: {detail}")]
    Composition {
        source_id: String,
        target_id: String,
        detail: String,
    },

    #[error("Resize error: {0}")]
    Resize(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }

    pub fn resize<E: std::fmt::Display>(e: E) -> Self {
        Error::Resize(e.to_string())
    }

    pub fn encode<E: std::fmt::Display>(e: E) -> Self {
        Error::Encode(e.to_string())
    }

    /// True for failures caused by bad inputs rather than by processing.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::Decode { .. } | Error::EmptySource { .. } | Error::InvalidTarget { .. }
        )
    }
}
