//! Hosted runner environment interface.
//!
//! On hosted infrastructure the runner exposes append-only command files
//! (`GITHUB_ENV`, `GITHUB_PATH`, `GITHUB_STATE`) and well-known roots
//! (`RUNNER_TEMP`, `RUNNER_TOOL_CACHE`). Everything resolved here falls
//! back to sensible local defaults so both phases also work outside a
//! hosted runner.

use std::io::Write;
use std::path::{Path, PathBuf};

use steamup_core::Result;
use tracing::{debug, info};

/// Resolved runner environment, captured once at startup.
#[derive(Debug, Clone)]
pub struct RunnerEnv {
    env_file: Option<PathBuf>,
    path_file: Option<PathBuf>,
    state_file: Option<PathBuf>,
    temp_dir: PathBuf,
    tool_cache_root: PathBuf,
    file_cache_root: PathBuf,
}

impl RunnerEnv {
    /// Capture the runner environment from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let temp_dir = std::env::var_os("RUNNER_TEMP")
            .map_or_else(std::env::temp_dir, PathBuf::from);
        let tool_cache_root = std::env::var_os("RUNNER_TOOL_CACHE")
            .map_or_else(|| default_root("tools"), PathBuf::from);
        let file_cache_root = std::env::var_os("STEAMUP_CACHE_DIR")
            .map_or_else(|| default_root("cache"), PathBuf::from);

        Self {
            env_file: std::env::var_os("GITHUB_ENV").map(PathBuf::from),
            path_file: std::env::var_os("GITHUB_PATH").map(PathBuf::from),
            state_file: std::env::var_os("GITHUB_STATE").map(PathBuf::from),
            temp_dir,
            tool_cache_root,
            file_cache_root,
        }
    }

    /// Scratch root surviving for the duration of the run.
    #[must_use]
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Root of the versioned tool cache.
    #[must_use]
    pub fn tool_cache_root(&self) -> &Path {
        &self.tool_cache_root
    }

    /// Root of the keyed file cache.
    #[must_use]
    pub fn file_cache_root(&self) -> &Path {
        &self.file_cache_root
    }

    /// Prepend a directory to the executable search path of later steps.
    ///
    /// # Errors
    ///
    /// Returns an error when the runner's path file cannot be written.
    pub fn add_path(&self, dir: &Path) -> Result<()> {
        if let Some(file) = &self.path_file {
            append_line(file, &dir.display().to_string())?;
            debug!(dir = %dir.display(), "Added to search path");
        } else {
            // No hosted runner: later steps are not ours to configure.
            info!(dir = %dir.display(), "No runner path file, add this to PATH manually");
        }
        Ok(())
    }

    /// Export an environment variable to later steps.
    ///
    /// # Errors
    ///
    /// Returns an error when the runner's env file cannot be written.
    pub fn export_var(&self, name: &str, value: &str) -> Result<()> {
        if let Some(file) = &self.env_file {
            append_line(file, &format!("{name}={value}"))?;
        } else {
            info!("{name} -> {value} (no runner env file, export manually)");
        }
        Ok(())
    }

    /// Persist a state value for the cleanup phase.
    ///
    /// # Errors
    ///
    /// Returns an error when the runner's state file cannot be written.
    pub fn save_state(&self, name: &str, value: &str) -> Result<()> {
        if let Some(file) = &self.state_file {
            append_line(file, &format!("{name}={value}"))?;
        }
        Ok(())
    }

    /// Read back a state value in the cleanup phase.
    ///
    /// The hosted runner re-exposes saved state as `STATE_<name>`
    /// environment variables to the post step.
    #[must_use]
    pub fn state_value(&self, name: &str) -> Option<String> {
        std::env::var(format!("STATE_{name}")).ok().filter(|v| !v.is_empty())
    }

    /// Whether a hosted state file is available.
    #[must_use]
    pub fn has_state_file(&self) -> bool {
        self.state_file.is_some()
    }
}

fn default_root(kind: &str) -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("steamup")
        .join(kind)
}

fn append_line(file: &Path, line: &str) -> Result<()> {
    let mut handle = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)?;
    writeln!(handle, "{line}")?;
    Ok(())
}
