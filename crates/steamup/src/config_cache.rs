//! Best-effort config.vdf cache bridge.
//!
//! SteamCMD keeps login/session state in `config/config.vdf` under its
//! data directory. Carrying that file between runs is an optimization,
//! never a requirement: every store failure at this boundary is logged
//! and swallowed, and outcomes are returned as values so callers and
//! tests can assert on the non-fatal path without reading logs.

use std::path::{Path, PathBuf};

use steamup_core::TOOL_NAME;
use steamup_core::platform::Platform;
use steamup_toolcache::FileCache;
use tracing::{error, info, warn};

use crate::state::RunState;

/// Outcome of a setup-phase restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A cache entry matched; the key is remembered for the run.
    Hit(String),
    /// No entry matched any key.
    Miss,
    /// The store failed; treated as a miss.
    StoreError(String),
}

/// Outcome of a cleanup-phase save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A fresh entry was stored.
    Saved(u64),
    /// The setup phase already restored a matching entry.
    SkippedAlreadyRestored,
    /// Setup never established a data directory.
    SkippedNoDataDir,
    /// The config file does not exist.
    SkippedNoConfigFile,
    /// The store accepted the call but stored nothing.
    NotSaved,
    /// The store failed; the run is unaffected.
    StoreError(String),
}

/// Path of the persisted configuration file inside a data directory.
#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config").join("config.vdf")
}

/// Bridge between the config file and the keyed file cache.
pub struct ConfigCacheBridge<'a, C> {
    cache: &'a C,
    platform: Platform,
}

impl<'a, C: FileCache> ConfigCacheBridge<'a, C> {
    /// Create a bridge for the given platform.
    #[must_use]
    pub fn new(cache: &'a C, platform: Platform) -> Self {
        Self { cache, platform }
    }

    fn primary_key(&self) -> String {
        format!(
            "{TOOL_NAME}-config-{}-{}",
            self.platform.os, self.platform.arch
        )
    }

    fn restore_keys(&self) -> Vec<String> {
        vec![
            format!("{TOOL_NAME}-config-{}", self.platform.os),
            format!("{TOOL_NAME}-config"),
        ]
    }

    /// Restore the config file at the end of the setup phase.
    ///
    /// Never fails the setup: a store error is logged and reported as
    /// [`RestoreOutcome::StoreError`], which callers treat like a miss.
    pub fn restore(&self, data_dir: &Path) -> RestoreOutcome {
        let config = config_path(data_dir);
        match self
            .cache
            .restore(&[config.clone()], &self.primary_key(), &self.restore_keys())
        {
            Ok(Some(key)) => {
                info!(key, "Restored config cache");
                RestoreOutcome::Hit(key)
            }
            Ok(None) => {
                info!(config = %config.display(), "No config cache found");
                RestoreOutcome::Miss
            }
            Err(e) => {
                error!("Failed to restore config cache: {e}");
                RestoreOutcome::StoreError(e.to_string())
            }
        }
    }

    /// Save the config file in the cleanup phase.
    ///
    /// Skipped when this run already restored a matching entry, when the
    /// data directory was never established, or when the config file is
    /// absent. Store failures are logged and swallowed.
    pub fn save(&self, state: &RunState) -> SaveOutcome {
        if let Some(key) = &state.config_cache_key {
            info!(key, "Cache entry already exists, skipping save");
            return SaveOutcome::SkippedAlreadyRestored;
        }
        let Some(steam_dir) = &state.steam_dir else {
            warn!("Data directory is not set, skipping cache save");
            return SaveOutcome::SkippedNoDataDir;
        };

        let config = config_path(steam_dir);
        if !config.exists() {
            warn!(config = %config.display(), "Config file does not exist, skipping cache save");
            return SaveOutcome::SkippedNoConfigFile;
        }

        match self.cache.save(&[config], &self.primary_key()) {
            Ok(Some(id)) => {
                info!(id, "Saved config cache");
                SaveOutcome::Saved(id)
            }
            Ok(None) => {
                info!("No config cache saved");
                SaveOutcome::NotSaved
            }
            Err(e) => {
                error!("Failed to save config cache: {e}");
                SaveOutcome::StoreError(e.to_string())
            }
        }
    }
}
