//! Core types for steamup.
//!
//! Platform detection, archive resolution, and build-version handling shared
//! by the acquisition pipeline and the cache store adapters.

pub mod archive;
pub mod platform;
pub mod version;

use std::path::PathBuf;
use thiserror::Error;

/// Name of the provisioned tool, used for cache keys and layout paths.
pub const TOOL_NAME: &str = "steamcmd";

/// Result type for steamup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring the tool.
///
/// Everything here is fatal for the setup phase except where callers
/// explicitly contain it (the config cache bridge never lets a `Cache`
/// error escape).
#[derive(Error, Debug)]
pub enum Error {
    /// The platform has no SteamCMD distribution.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Archive download failed.
    #[error("Failed to download {url}: {message}")]
    Download {
        /// The URL that was being fetched.
        url: String,
        /// Transport-level error message.
        message: String,
    },

    /// Archive extraction produced nothing usable.
    #[error("Failed to extract {archive}: {message}")]
    Extract {
        /// The archive being unpacked.
        archive: String,
        /// Extraction error message.
        message: String,
    },

    /// The version banner was absent from the tool's output.
    ///
    /// An install without a version cannot be committed to the store, so
    /// this aborts the acquisition.
    #[error("Failed to get version: banner not found in tool output")]
    VersionParse,

    /// The resolved invocation path is not executable.
    #[error("Tool is not executable: {}", .0.display())]
    ToolNotExecutable(PathBuf),

    /// A spawned process exited with an unexpected status.
    #[error("Command '{program}' exited with status {code:?}")]
    CommandFailed {
        /// The program that was invoked.
        program: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
    },

    /// Cache store operation failed.
    #[error("Cache store error: {0}")]
    Cache(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an unsupported platform error.
    #[must_use]
    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(platform.into())
    }

    /// Create a download error.
    #[must_use]
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error.
    #[must_use]
    pub fn extract(archive: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extract {
            archive: archive.into(),
            message: message.into(),
        }
    }

    /// Create a command failure error.
    #[must_use]
    pub fn command_failed(program: impl Into<String>, code: Option<i32>) -> Self {
        Self::CommandFailed {
            program: program.into(),
            code,
        }
    }

    /// Create a cache store error.
    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }
}
