//! Keyed file-set cache.
//!
//! Stores a small set of files under a cache key and restores them to
//! their original absolute paths. Lookup matches the primary key exactly,
//! then each restore key exactly, then restore keys by prefix, which is
//! the hosted cache service's matching order.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::Result;

/// Keyed file-set storage.
pub trait FileCache {
    /// Restore a file set, trying `primary_key` then `restore_keys`.
    ///
    /// Returns the matched key on a hit, `None` on a miss.
    ///
    /// # Errors
    ///
    /// Returns an error when the store itself fails; callers that treat
    /// caching as best-effort are expected to contain it.
    fn restore(
        &self,
        files: &[PathBuf],
        primary_key: &str,
        restore_keys: &[String],
    ) -> Result<Option<String>>;

    /// Save a file set under `key`.
    ///
    /// Returns a saved-entry id, or `None` when none of the files exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the store itself fails.
    fn save(&self, files: &[PathBuf], key: &str) -> Result<Option<u64>>;
}

/// Per-key record of where each saved file originally lived.
#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    key: String,
    entries: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestEntry {
    original: PathBuf,
    blob: String,
}

const MANIFEST_NAME: &str = "manifest.json";

/// Directory-backed [`FileCache`].
///
/// Layout: `<root>/<key>/manifest.json` plus `<root>/<key>/blobs/<n>`.
#[derive(Debug, Clone)]
pub struct DirFileCache {
    root: PathBuf,
}

impl DirFileCache {
    /// Create a cache rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Find the key directory matching the lookup order.
    fn match_key(&self, primary_key: &str, restore_keys: &[String]) -> Option<String> {
        let exact = |key: &str| self.root.join(key).join(MANIFEST_NAME).exists();

        if exact(primary_key) {
            return Some(primary_key.to_string());
        }
        for key in restore_keys {
            if exact(key) {
                return Some(key.clone());
            }
        }

        // Prefix scan, sorted for a deterministic pick.
        let mut names: Vec<String> = std::fs::read_dir(&self.root)
            .ok()?
            .filter_map(std::result::Result::ok)
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        for key in restore_keys {
            if let Some(name) = names.iter().find(|n| n.starts_with(key.as_str())) {
                if exact(name) {
                    return Some(name.clone());
                }
            }
        }
        None
    }
}

impl FileCache for DirFileCache {
    fn restore(
        &self,
        _files: &[PathBuf],
        primary_key: &str,
        restore_keys: &[String],
    ) -> Result<Option<String>> {
        let Some(matched) = self.match_key(primary_key, restore_keys) else {
            debug!(primary_key, "File cache miss");
            return Ok(None);
        };

        let key_dir = self.root.join(&matched);
        let manifest: Manifest =
            serde_json::from_slice(&std::fs::read(key_dir.join(MANIFEST_NAME))?)?;

        for entry in &manifest.entries {
            if let Some(parent) = entry.original.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(key_dir.join("blobs").join(&entry.blob), &entry.original)?;
        }
        debug!(primary_key, matched, "Restored file cache entry");
        Ok(Some(matched))
    }

    fn save(&self, files: &[PathBuf], key: &str) -> Result<Option<u64>> {
        let present: Vec<&PathBuf> = files.iter().filter(|f| f.exists()).collect();
        if present.is_empty() {
            debug!(key, "Nothing to save, no files exist");
            return Ok(None);
        }

        let key_dir = self.root.join(key);
        if key_dir.exists() {
            std::fs::remove_dir_all(&key_dir)?;
        }
        let blob_dir = key_dir.join("blobs");
        std::fs::create_dir_all(&blob_dir)?;

        let mut entries = Vec::with_capacity(present.len());
        for (index, original) in present.iter().enumerate() {
            let blob = index.to_string();
            std::fs::copy(original, blob_dir.join(&blob))?;
            entries.push(ManifestEntry {
                original: (*original).clone(),
                blob,
            });
        }

        let manifest = Manifest {
            key: key.to_string(),
            entries,
        };
        std::fs::write(
            key_dir.join(MANIFEST_NAME),
            serde_json::to_vec_pretty(&manifest)?,
        )?;

        let id = save_id(key);
        debug!(key, id, "Saved file cache entry");
        Ok(Some(id))
    }
}

/// Stable numeric id for a saved key. The hosted service hands out
/// incrementing ids; locally nothing depends on monotonicity, only on
/// the id being present and stable.
fn save_id(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
