//! The cleanup phase.
//!
//! Loads the run state persisted by setup and attempts one best-effort
//! config-cache save. Nothing here can fail the run except a platform
//! that should never have reached setup in the first place.

use steamup_core::platform::Platform;
use steamup_toolcache::DirFileCache;

use crate::cli::CliError;
use crate::config_cache::{ConfigCacheBridge, SaveOutcome};
use crate::runner::RunnerEnv;
use crate::state::RunState;

/// Execute the cleanup phase.
///
/// # Errors
///
/// Only platform detection can fail; every cache outcome is reported and
/// tolerated.
pub fn execute() -> Result<(), CliError> {
    let platform = Platform::detect()?;
    let runner = RunnerEnv::from_env();
    let state = RunState::load(&runner);

    let file_cache = DirFileCache::new(runner.file_cache_root().to_path_buf());
    let bridge = ConfigCacheBridge::new(&file_cache, platform);

    match bridge.save(&state) {
        SaveOutcome::Saved(id) => println!("Saved config cache entry {id}"),
        SaveOutcome::SkippedAlreadyRestored => {
            println!("Config cache already current, nothing to save");
        }
        SaveOutcome::SkippedNoDataDir | SaveOutcome::SkippedNoConfigFile => {
            println!("No config file to save");
        }
        SaveOutcome::NotSaved => println!("Config cache store saved nothing"),
        SaveOutcome::StoreError(_) => println!("Config cache save failed, continuing"),
    }

    Ok(())
}
