//! The setup phase.
//!
//! Acquires the tool, publishes its environment to later steps, restores
//! the config cache, and persists the run state for the cleanup phase.

use std::io::ErrorKind;
use std::path::PathBuf;

use steamup_core::platform::Platform;
use steamup_toolcache::{DirFileCache, HostedToolStore};

use crate::acquire::{AcquireOptions, Acquirer, SmokeTolerance};
use crate::cli::CliError;
use crate::config_cache::{ConfigCacheBridge, RestoreOutcome};
use crate::fetch::HttpFetcher;
use crate::layout::Layout;
use crate::runner::RunnerEnv;
use crate::state::RunState;

/// Execute the setup phase.
///
/// # Errors
///
/// Acquisition-path failures abort the phase; config-cache failures do
/// not.
pub async fn execute(smoke_tolerance: SmokeTolerance) -> Result<(), CliError> {
    let platform = Platform::detect()?;
    let runner = RunnerEnv::from_env();
    let layout = Layout::new(platform);

    let store = HostedToolStore::new(
        runner.tool_cache_root().to_path_buf(),
        platform.arch.to_string(),
    );
    let fetcher = HttpFetcher::new();
    let options = AcquireOptions {
        scratch_dir: runner.temp_dir().join("steamup"),
        smoke_tolerance,
    };

    let acquisition = Acquirer::new(&store, &fetcher, layout, options)
        .acquire()
        .await?;
    println!(
        "Installed steamcmd {} -> {}",
        acquisition.tool.version,
        acquisition.tool.root_dir.display()
    );

    runner.add_path(&acquisition.path_entry)?;
    runner.export_var(
        "STEAM_CMD_HOME",
        &acquisition.tool.root_dir.display().to_string(),
    )?;
    runner.export_var(
        "STEAM_CMD",
        &acquisition.tool.invocation_path.display().to_string(),
    )?;
    runner.export_var("STEAM_DIR", &acquisition.data_dir.display().to_string())?;
    println!("STEAM_CMD -> {}", acquisition.tool.invocation_path.display());
    println!("STEAM_DIR -> {}", acquisition.data_dir.display());

    let steam_temp = ensure_steam_temp(&runner)?;
    runner.export_var("STEAM_TEMP", &steam_temp.display().to_string())?;
    println!("STEAM_TEMP -> {}", steam_temp.display());

    let file_cache = DirFileCache::new(runner.file_cache_root().to_path_buf());
    let bridge = ConfigCacheBridge::new(&file_cache, platform);
    let outcome = bridge.restore(&acquisition.data_dir);

    let state = RunState {
        steam_cmd: Some(acquisition.tool.invocation_path.clone()),
        steam_dir: Some(acquisition.data_dir.clone()),
        config_cache_key: match outcome {
            RestoreOutcome::Hit(key) => Some(key),
            RestoreOutcome::Miss | RestoreOutcome::StoreError(_) => None,
        },
    };
    state.save(&runner)?;

    Ok(())
}

/// Scratch directory the Steamworks SDK and the tool's own temp files
/// land in. Created lazily; absence is expected, other errors are not.
fn ensure_steam_temp(runner: &RunnerEnv) -> Result<PathBuf, CliError> {
    let steam_temp = runner.temp_dir().join(".steamworks");
    match std::fs::metadata(&steam_temp) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            std::fs::create_dir_all(&steam_temp).map_err(steamup_core::Error::from)?;
        }
        Err(e) => return Err(steamup_core::Error::from(e).into()),
    }
    Ok(steam_temp)
}
