//! Build versions synthesized from SteamCMD's startup banner.
//!
//! The tool publishes no version manifest; the only version signal is the
//! integer build number it prints on startup. That number becomes the major
//! component of a three-part version so the store's versioned-lookup
//! contract has something to order by.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Pattern matched against captured startup output.
static BANNER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"Steam Console Client \(c\) Valve Corporation - version (\d+)")
        .expect("banner pattern is a valid regex")
});

/// Three-part numeric version.
///
/// Ordering is the derived field-order comparison on numeric components,
/// not string ordering, so `10.0.0` sorts above `9.0.0`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BuildVersion {
    /// Major component (the SteamCMD build number).
    pub major: u64,
    /// Minor component, always zero for synthesized versions.
    pub minor: u64,
    /// Patch component, always zero for synthesized versions.
    pub patch: u64,
}

impl BuildVersion {
    /// Create a version from explicit components.
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Synthesize `<build>.0.0` from a banner build number.
    #[must_use]
    pub fn from_build_number(build: u64) -> Self {
        Self::new(build, 0, 0)
    }
}

impl std::fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for BuildVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('.');
        let mut next = || {
            parts
                .next()
                .and_then(|p| p.parse::<u64>().ok())
                .ok_or(Error::VersionParse)
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(Error::VersionParse);
        }
        Ok(version)
    }
}

/// Extract the build version from SteamCMD's startup banner.
///
/// # Errors
///
/// Returns [`Error::VersionParse`] when the banner pattern is absent.
pub fn parse_banner(output: &str) -> Result<BuildVersion> {
    let captures = BANNER.captures(output).ok_or(Error::VersionParse)?;
    let build = captures[1].parse::<u64>().map_err(|_| Error::VersionParse)?;
    Ok(BuildVersion::from_build_number(build))
}

/// Select the newest version among the store's version strings.
///
/// Strings that do not parse as versions (stray directories, markers) are
/// skipped rather than treated as errors.
#[must_use]
pub fn newest(versions: &[String]) -> Option<BuildVersion> {
    versions
        .iter()
        .filter_map(|v| v.parse::<BuildVersion>().ok())
        .max()
}
