//! Acquisition controller.
//!
//! Orchestrates the cache lookup, the miss-path download/extract/probe
//! pipeline, the commit into the tool store, and the final invocation
//! path resolution. Terminal states are a usable [`Acquisition`] or an
//! error; a warm cache makes the whole thing stat-only.

use std::path::{Path, PathBuf};

use steamup_core::platform::Os;
use steamup_core::version::{self, BuildVersion};
use steamup_core::{Error, Result, TOOL_NAME, archive};
use steamup_toolcache::ToolStore;
use tracing::{debug, info, warn};

use crate::exec::{self, ExecOptions};
use crate::extract;
use crate::fetch::Fetcher;
use crate::layout::Layout;
use crate::probe;

/// When a non-zero exit from the post-install smoke test is tolerated.
///
/// Kept configurable: the tool's first-run behavior differs between
/// builds, and some Windows builds exit non-zero even on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SmokeTolerance {
    /// Any exit status counts as a pass.
    #[default]
    Always,
    /// Only the Windows build may exit non-zero.
    WindowsOnly,
}

/// Options for one acquisition run.
#[derive(Debug, Clone)]
pub struct AcquireOptions {
    /// Scratch directory for the download and extraction staging.
    pub scratch_dir: PathBuf,
    /// Smoke-test exit tolerance.
    pub smoke_tolerance: SmokeTolerance,
}

/// A committed install: immutable once in the store.
#[derive(Debug, Clone)]
pub struct InstalledTool {
    /// Cache-owned directory containing the unpacked tool.
    pub root_dir: PathBuf,
    /// Absolute, executable invocation path inside `root_dir`.
    pub invocation_path: PathBuf,
    /// Version derived from the tool's startup banner.
    pub version: BuildVersion,
}

/// Result of a successful acquisition.
#[derive(Debug, Clone)]
pub struct Acquisition {
    /// The committed install.
    pub tool: InstalledTool,
    /// Mutable data directory the tool writes into.
    pub data_dir: PathBuf,
    /// Directory to prepend to the executable search path.
    pub path_entry: PathBuf,
}

/// Acquisition controller, generic over the store and transport seams.
pub struct Acquirer<'a, S, F> {
    store: &'a S,
    fetcher: &'a F,
    layout: Layout,
    options: AcquireOptions,
}

impl<'a, S: ToolStore, F: Fetcher> Acquirer<'a, S, F> {
    /// Create a controller.
    #[must_use]
    pub fn new(store: &'a S, fetcher: &'a F, layout: Layout, options: AcquireOptions) -> Self {
        Self {
            store,
            fetcher,
            layout,
            options,
        }
    }

    /// Acquire the tool: reuse the newest cached install or download,
    /// normalize, and commit a fresh one; then resolve the invocation
    /// path and data directory.
    ///
    /// # Errors
    ///
    /// Any failure on the download/extract/probe/commit path aborts the
    /// acquisition. The post-install smoke test is logged only.
    pub async fn acquire(&self) -> Result<Acquisition> {
        let (version, root_dir) = match self.lookup() {
            Some(cached) => cached,
            None => self.download_and_commit().await?,
        };

        let invocation_path = self.layout.invocation_path(&root_dir);
        verify_executable(&invocation_path)?;
        debug!(tool = %invocation_path.display(), root = %root_dir.display(), "Resolved tool");

        let data_dir = self.layout.data_dir(&root_dir)?;
        let path_entry = self.layout.path_entry(&root_dir);

        self.smoke_test(&invocation_path).await;

        Ok(Acquisition {
            tool: InstalledTool {
                root_dir,
                invocation_path,
                version,
            },
            data_dir,
            path_entry,
        })
    }

    /// Select the newest committed version, if any.
    fn lookup(&self) -> Option<(BuildVersion, PathBuf)> {
        let versions = self.store.find_all_versions(TOOL_NAME);
        let newest = version::newest(&versions)?;
        let dir = self.store.find(TOOL_NAME, &newest.to_string())?;
        info!(version = %newest, dir = %dir.display(), "Reusing cached install");
        Some((newest, dir))
    }

    /// Miss path: download, extract, normalize, probe, commit.
    async fn download_and_commit(&self) -> Result<(BuildVersion, PathBuf)> {
        let descriptor = archive::resolve(&self.layout.platform());

        let archive_path = self.options.scratch_dir.join(descriptor.filename);
        self.fetcher.fetch(&descriptor.url, &archive_path).await?;

        let unpack_dir = self.options.scratch_dir.join(TOOL_NAME);
        extract::extract_archive(&archive_path, descriptor.kind, &unpack_dir)?;

        self.layout.normalize(&unpack_dir)?;

        let real_binary = unpack_dir.join(self.layout.executable_name());
        let version = probe::probe_version(&real_binary, self.layout.platform()).await?;

        let root_dir = self
            .store
            .cache_dir(&unpack_dir, TOOL_NAME, &version.to_string())
            .map_err(|e| Error::cache(e.to_string()))?;
        info!(version = %version, dir = %root_dir.display(), "Committed fresh install");
        Ok((version, root_dir))
    }

    /// Post-install sanity run. The tool's own first run can
    /// legitimately exit non-zero, so failures are logged, never fatal.
    async fn smoke_test(&self, tool: &Path) {
        let ignore_exit = match self.options.smoke_tolerance {
            SmokeTolerance::Always => true,
            SmokeTolerance::WindowsOnly => self.layout.platform().os == Os::Windows,
        };
        let result = exec::run(
            tool,
            &["+help", "+quit"],
            ExecOptions {
                capture_stdout: false,
                ignore_exit,
                silent: true,
            },
        )
        .await;
        match result {
            Ok(_) => debug!("Smoke test passed"),
            Err(e) => warn!("Smoke test failed, install kept: {e}"),
        }
    }
}

/// Check the resolved invocation path is present and executable.
fn verify_executable(path: &Path) -> Result<()> {
    let Ok(metadata) = std::fs::metadata(path) else {
        return Err(Error::ToolNotExecutable(path.to_path_buf()));
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(Error::ToolNotExecutable(path.to_path_buf()));
        }
    }
    #[cfg(not(unix))]
    if !metadata.is_file() {
        return Err(Error::ToolNotExecutable(path.to_path_buf()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_executable_missing_path() {
        let err = verify_executable(Path::new("/nonexistent/steamcmd")).unwrap_err();
        assert!(matches!(err, Error::ToolNotExecutable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_executable_rejects_plain_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("steamcmd");
        std::fs::write(&file, b"x").unwrap();

        let err = verify_executable(&file).unwrap_err();
        assert!(matches!(err, Error::ToolNotExecutable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_verify_executable_accepts_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("steamcmd");
        std::fs::write(&file, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o755)).unwrap();

        verify_executable(&file).unwrap();
    }
}
