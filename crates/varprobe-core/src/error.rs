//! Error types for varprobe

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProbeError>;

/// Main error type for varprobe
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to open font file {}: {source}", path.display())]
    FontOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid font data from {origin}: {reason}")]
    InvalidFont { origin: String, reason: String },

    #[error("{host} host does not support {what}")]
    Unsupported { host: &'static str, what: String },

    #[error("Platform call failed: {0}")]
    Platform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
