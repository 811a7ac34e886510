//! Archive resolution for the SteamCMD distribution point.
//!
//! Valve serves one archive per OS from a fixed CDN location with no
//! version parameter; the endpoint always carries the latest build.

use crate::platform::{Os, Platform};

/// Base URL of the distribution point.
const DOWNLOAD_BASE: &str = "https://steamcdn-a.akamaihd.net/client/installer";

/// Packaging format of a distribution archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Gzip-compressed tarball (Linux, macOS).
    TarGz,
    /// Zip archive (Windows).
    Zip,
}

/// Resolved download location for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    /// Full download URL.
    pub url: String,
    /// Archive file name as served by the CDN.
    pub filename: &'static str,
    /// How the archive is packaged.
    pub kind: ArchiveKind,
}

/// Map a platform to its distribution archive.
///
/// Pure function; platforms outside the supported set cannot be
/// represented by [`Platform`] and fail earlier, at detection.
#[must_use]
pub fn resolve(platform: &Platform) -> ArchiveDescriptor {
    let (filename, kind) = match platform.os {
        Os::Linux => ("steamcmd_linux.tar.gz", ArchiveKind::TarGz),
        Os::Macos => ("steamcmd_osx.tar.gz", ArchiveKind::TarGz),
        Os::Windows => ("steamcmd.zip", ArchiveKind::Zip),
    };
    ArchiveDescriptor {
        url: format!("{DOWNLOAD_BASE}/{filename}"),
        filename,
        kind,
    }
}
