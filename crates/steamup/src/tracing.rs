//! Tracing initialization for the steamup CLI.

use std::io;

pub use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log level options for the CLI.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevel {
    /// Show all logs (trace level).
    Trace,
    /// Show debug and above.
    Debug,
    /// Show info and above (default).
    Info,
    /// Show warnings and above.
    Warn,
    /// Show errors only.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Initialize tracing with a compact stderr layer.
///
/// `RUST_LOG` overrides the CLI-provided level when set.
///
/// # Errors
///
/// Returns an error when the filter directive cannot be built.
pub fn init(level: LogLevel) -> miette::Result<()> {
    let level_str = match Level::from(level) {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "steamup={level_str},steamup_core={level_str},steamup_toolcache={level_str}"
            ))
        })
        .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))?;

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    tracing_subscriber::registry().with(env_filter).with(layer).init();
    Ok(())
}
