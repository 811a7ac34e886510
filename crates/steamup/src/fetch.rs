//! Archive download.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use steamup_core::{Error, Result};
use tracing::{debug, info};

/// Transport seam for the acquisition controller.
///
/// The controller only ever needs "bytes of this URL at this path", so
/// tests substitute a stub and count calls.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` to `dest`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] when the transfer fails.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP [`Fetcher`] backed by a shared client.
pub struct HttpFetcher {
    client: Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a new HTTP fetcher.
    ///
    /// # Panics
    ///
    /// `Client::builder().build()` only fails when the TLS backend cannot
    /// initialize, which with default settings indicates a broken
    /// environment rather than a recoverable error.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("steamup")
                .build()
                .expect("Failed to create HTTP client - TLS backend initialization failed"),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        debug!(%url, dest = %dest.display(), "Downloading archive");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::download(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::download(url, format!("HTTP {}", response.status())));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| Error::download(url, e.to_string()))?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, &data)?;

        let sha256 = format!("{:x}", Sha256::digest(&data));
        info!(%url, bytes = data.len(), %sha256, "Downloaded archive");
        Ok(())
    }
}
