//! Run-scoped state carried between the two phases.
//!
//! The setup and cleanup phases are separate process invocations; this
//! record is the only channel between them. On hosted runners it rides
//! the state file / `STATE_*` variables; locally it falls back to a JSON
//! file under the run's temp directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use steamup_core::Result;
use tracing::debug;

use crate::runner::RunnerEnv;

const KEY_STEAM_CMD: &str = "steam_cmd";
const KEY_STEAM_DIR: &str = "steam_dir";
const KEY_CONFIG_CACHE: &str = "config_cache_key";
const FALLBACK_FILE: &str = "steamup-state.json";

/// State produced by setup and consumed by cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Invocation path of the acquired tool.
    pub steam_cmd: Option<PathBuf>,
    /// Data directory holding the tool's mutable state.
    pub steam_dir: Option<PathBuf>,
    /// Config cache key matched by the setup-phase restore, if any.
    pub config_cache_key: Option<String>,
}

impl RunState {
    /// Persist this record for the cleanup phase.
    ///
    /// # Errors
    ///
    /// Returns an error when neither the runner state file nor the local
    /// fallback file can be written.
    pub fn save(&self, runner: &RunnerEnv) -> Result<()> {
        if runner.has_state_file() {
            if let Some(steam_cmd) = &self.steam_cmd {
                runner.save_state(KEY_STEAM_CMD, &steam_cmd.display().to_string())?;
            }
            if let Some(steam_dir) = &self.steam_dir {
                runner.save_state(KEY_STEAM_DIR, &steam_dir.display().to_string())?;
            }
            if let Some(key) = &self.config_cache_key {
                runner.save_state(KEY_CONFIG_CACHE, key)?;
            }
        } else {
            let path = runner.temp_dir().join(FALLBACK_FILE);
            std::fs::write(&path, serde_json::to_vec_pretty(self).map_err(io_err)?)?;
            debug!(path = %path.display(), "Saved run state to fallback file");
        }
        Ok(())
    }

    /// Load the record in the cleanup phase.
    ///
    /// Missing state is not an error: cleanup with no prior setup just
    /// sees an empty record and skips its work.
    #[must_use]
    pub fn load(runner: &RunnerEnv) -> Self {
        let from_env = Self {
            steam_cmd: runner.state_value(KEY_STEAM_CMD).map(PathBuf::from),
            steam_dir: runner.state_value(KEY_STEAM_DIR).map(PathBuf::from),
            config_cache_key: runner.state_value(KEY_CONFIG_CACHE),
        };
        if from_env != Self::default() {
            return from_env;
        }

        let path = runner.temp_dir().join(FALLBACK_FILE);
        match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }
}

fn io_err(e: serde_json::Error) -> std::io::Error {
    std::io::Error::other(e)
}
