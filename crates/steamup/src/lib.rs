//! steamup - provision the SteamCMD console client in CI runners.
//!
//! The acquisition pipeline checks the runner's tool cache, downloads and
//! unpacks the platform archive on a miss, derives a version from the
//! tool's own startup banner, commits the install to the cache, and
//! resolves a stable invocation path. A small config-cache bridge carries
//! the tool's `config.vdf` between runs on a best-effort basis.
//!
//! Two phases, two subcommands: `steamup setup` acquires the tool and
//! restores the config cache; `steamup cleanup` saves it at the end of
//! the run. The phases communicate only through the persisted
//! [`state::RunState`] record.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

/// Acquisition controller.
pub mod acquire;
/// CLI argument parsing and exit codes.
pub mod cli;
/// Command implementations (setup, cleanup).
pub mod commands;
/// Best-effort config.vdf cache bridge.
pub mod config_cache;
/// Process execution with output capture.
pub mod exec;
/// Archive extraction.
pub mod extract;
/// Archive download.
pub mod fetch;
/// Platform layout strategy.
pub mod layout;
/// Version probing via the tool's startup banner.
pub mod probe;
/// Hosted runner environment interface.
pub mod runner;
/// Run-scoped state carried between the two phases.
pub mod state;
/// Tracing initialization.
pub mod tracing;

pub use steamup_core::{Error, Result, TOOL_NAME};
