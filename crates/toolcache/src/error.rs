//! Error types for cache operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during cache operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The commit source is not a directory.
    #[error("Cache source is not a directory: {}", .0.display())]
    InvalidSource(PathBuf),

    /// Manifest serialization error.
    #[error("Cache manifest error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
