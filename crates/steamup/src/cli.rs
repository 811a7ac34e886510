//! CLI argument parsing and exit codes.

use clap::{Parser, Subcommand};
use miette::Diagnostic;
use thiserror::Error;

use crate::acquire::SmokeTolerance;
use crate::tracing::LogLevel;

/// Success exit code.
pub const EXIT_OK: i32 = 0;
/// Configuration or platform error exit code.
pub const EXIT_CONFIG: i32 = 2;
/// Acquisition error exit code.
pub const EXIT_ACQUIRE: i32 = 3;

/// CLI-level error with exit-code mapping.
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// Configuration or platform error (exit code 2).
    #[error("Configuration error: {message}")]
    #[diagnostic(code(steamup::cli::config))]
    Config {
        /// The error message.
        message: String,
        /// Optional help text.
        #[help]
        help: Option<String>,
    },
    /// Acquisition error (exit code 3).
    #[error("Acquisition error: {message}")]
    #[diagnostic(code(steamup::cli::acquire))]
    Acquire {
        /// The error message.
        message: String,
        /// Optional help text.
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text.
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an acquisition error.
    #[must_use]
    pub fn acquire(message: impl Into<String>) -> Self {
        Self::Acquire {
            message: message.into(),
            help: None,
        }
    }
}

impl From<steamup_core::Error> for CliError {
    fn from(error: steamup_core::Error) -> Self {
        match &error {
            steamup_core::Error::UnsupportedPlatform(_) => Self::config_with_help(
                error.to_string(),
                "SteamCMD is only distributed for Linux, macOS and Windows",
            ),
            _ => Self::acquire(error.to_string()),
        }
    }
}

/// Map an error to its process exit code.
#[must_use]
pub fn exit_code_for(error: &CliError) -> i32 {
    match error {
        CliError::Config { .. } => EXIT_CONFIG,
        CliError::Acquire { .. } => EXIT_ACQUIRE,
    }
}

/// Main CLI entry point for steamup.
#[derive(Parser, Debug)]
#[command(name = "steamup")]
#[command(about = "Provision the SteamCMD console client in CI runners")]
#[command(version)]
pub struct Cli {
    /// The phase subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,
}

/// Available CLI subcommands, one per run phase.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire SteamCMD, publish its environment, restore the config cache.
    #[command(about = "Acquire SteamCMD and prepare the runner environment")]
    Setup {
        /// When a non-zero smoke-test exit counts as a pass.
        #[arg(
            long,
            value_enum,
            default_value_t = SmokeTolerance::Always,
            help = "When a non-zero smoke-test exit counts as a pass"
        )]
        smoke_tolerance: SmokeTolerance,
    },
    /// Save the config cache at the end of the run.
    #[command(about = "Save the SteamCMD config cache")]
    Cleanup,
}

/// Parse CLI arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
