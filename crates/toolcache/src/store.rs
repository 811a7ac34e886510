//! Versioned tool store in the hosted runner's tool-cache layout.
//!
//! Structure:
//! ```text
//! <root>/
//! └── steamcmd/
//!     └── 1734112892.0.0/
//!         ├── x86_64/           # the committed install
//!         └── x86_64.complete   # commit marker
//! ```
//!
//! A version is visible to lookups only once its marker exists, so a
//! half-copied commit is never served. Committed directories are treated
//! as immutable.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::{Error, Result};

/// Versioned `(name, version)` → directory storage.
pub trait ToolStore {
    /// Resolve the directory of a committed version, if present.
    fn find(&self, name: &str, version: &str) -> Option<PathBuf>;

    /// List all committed version strings for a tool.
    fn find_all_versions(&self, name: &str) -> Vec<String>;

    /// Commit a directory into managed storage under `(name, version)`.
    ///
    /// Copies the source into the store and returns the managed path.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not a directory or the copy fails.
    fn cache_dir(&self, source: &Path, name: &str, version: &str) -> Result<PathBuf>;
}

/// Directory-backed [`ToolStore`].
#[derive(Debug, Clone)]
pub struct HostedToolStore {
    root: PathBuf,
    arch: String,
}

impl HostedToolStore {
    /// Create a store rooted at `root` for the given architecture label.
    #[must_use]
    pub fn new(root: PathBuf, arch: impl Into<String>) -> Self {
        Self {
            root,
            arch: arch.into(),
        }
    }

    /// Get the store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn version_dir(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(name).join(version).join(&self.arch)
    }

    fn marker_path(&self, name: &str, version: &str) -> PathBuf {
        self.root
            .join(name)
            .join(version)
            .join(format!("{}.complete", self.arch))
    }
}

impl ToolStore for HostedToolStore {
    fn find(&self, name: &str, version: &str) -> Option<PathBuf> {
        let dir = self.version_dir(name, version);
        if dir.is_dir() && self.marker_path(name, version).exists() {
            trace!(name, version, ?dir, "Tool cache hit");
            Some(dir)
        } else {
            trace!(name, version, "Tool cache miss");
            None
        }
    }

    fn find_all_versions(&self, name: &str) -> Vec<String> {
        let tool_root = self.root.join(name);
        let Ok(entries) = std::fs::read_dir(&tool_root) else {
            return Vec::new();
        };

        let mut versions: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|version| self.marker_path(name, version).exists())
            .collect();
        versions.sort();
        debug!(name, ?versions, "Found cached versions");
        versions
    }

    fn cache_dir(&self, source: &Path, name: &str, version: &str) -> Result<PathBuf> {
        if !source.is_dir() {
            return Err(Error::InvalidSource(source.to_path_buf()));
        }

        let dest = self.version_dir(name, version);
        copy_dir_all(source, &dest)?;
        // The marker is written last; lookups treat the version as absent
        // until it exists.
        std::fs::write(self.marker_path(name, version), b"")?;
        debug!(name, version, ?dest, "Committed tool to cache");
        Ok(dest)
    }
}

/// Recursively copy a directory. `std::fs::copy` preserves permission
/// bits, so executables stay executable across the commit.
fn copy_dir_all(source: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> HostedToolStore {
        HostedToolStore::new(temp.path().to_path_buf(), "x86_64")
    }

    fn seed_source(temp: &TempDir) -> PathBuf {
        let source = temp.path().join("scratch");
        std::fs::create_dir_all(source.join("linux32")).unwrap();
        std::fs::write(source.join("steamcmd.sh"), b"#!/bin/sh\n").unwrap();
        std::fs::write(source.join("linux32").join("steamcmd"), b"elf").unwrap();
        source
    }

    #[test]
    fn test_commit_and_find() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let source = seed_source(&temp);

        let dest = store.cache_dir(&source, "steamcmd", "100.0.0").unwrap();
        assert!(dest.ends_with("steamcmd/100.0.0/x86_64"));
        assert!(dest.join("steamcmd.sh").exists());
        assert!(dest.join("linux32").join("steamcmd").exists());

        assert_eq!(store.find("steamcmd", "100.0.0"), Some(dest));
        assert_eq!(store.find_all_versions("steamcmd"), vec!["100.0.0"]);
    }

    #[test]
    fn test_find_miss() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert_eq!(store.find("steamcmd", "1.0.0"), None);
        assert!(store.find_all_versions("steamcmd").is_empty());
    }

    #[test]
    fn test_uncommitted_version_invisible() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        // A version directory with no marker: an interrupted commit.
        std::fs::create_dir_all(temp.path().join("steamcmd/55.0.0/x86_64")).unwrap();

        assert_eq!(store.find("steamcmd", "55.0.0"), None);
        assert!(store.find_all_versions("steamcmd").is_empty());
    }

    #[test]
    fn test_find_all_versions_lists_committed_only() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let source = seed_source(&temp);

        store.cache_dir(&source, "steamcmd", "1.0.0").unwrap();
        store.cache_dir(&source, "steamcmd", "3.2.0").unwrap();
        std::fs::create_dir_all(temp.path().join("steamcmd/9.9.9/x86_64")).unwrap();

        assert_eq!(store.find_all_versions("steamcmd"), vec!["1.0.0", "3.2.0"]);
    }

    #[test]
    fn test_cache_dir_rejects_non_directory() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let file = temp.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let err = store.cache_dir(&file, "steamcmd", "1.0.0").unwrap_err();
        assert!(matches!(err, Error::InvalidSource(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_preserves_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let source = seed_source(&temp);
        let script = source.join("steamcmd.sh");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let dest = store.cache_dir(&source, "steamcmd", "7.0.0").unwrap();
        let mode = std::fs::metadata(dest.join("steamcmd.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
