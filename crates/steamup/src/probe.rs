//! Version probing via the tool's startup banner.
//!
//! SteamCMD ships no version manifest; the only way to learn what was
//! just unpacked is to run it and read the banner.

use std::path::Path;

use steamup_core::Result;
use steamup_core::platform::{Os, Platform};
use steamup_core::version::{self, BuildVersion};
use tracing::debug;

use crate::exec::{self, ExecOptions};

/// Run the tool with a no-op command and parse its version banner.
///
/// The binary must already be marked executable. The Windows build can
/// exit non-zero on `+quit` even when it printed the banner, so the exit
/// status is ignored there.
///
/// # Errors
///
/// Returns [`steamup_core::Error::VersionParse`] when the banner is
/// absent; execution failures surface as their own errors.
pub async fn probe_version(tool: &Path, platform: Platform) -> Result<BuildVersion> {
    let output = exec::run(
        tool,
        &["+quit"],
        ExecOptions {
            capture_stdout: true,
            ignore_exit: platform.os == Os::Windows,
            silent: true,
        },
    )
    .await?;

    let version = version::parse_banner(&output.stdout)?;
    debug!(%version, "Detected tool version");
    Ok(version)
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use steamup_core::Error;
    use steamup_core::platform::Arch;
    use tempfile::TempDir;

    fn fake_tool(temp: &TempDir, body: &str) -> PathBuf {
        let path = temp.path().join("steamcmd.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_probe_parses_banner() {
        let temp = TempDir::new().unwrap();
        let tool = fake_tool(
            &temp,
            "echo 'Steam Console Client (c) Valve Corporation - version 4242'",
        );

        let version = probe_version(&tool, Platform::new(Os::Linux, Arch::X86_64))
            .await
            .unwrap();
        assert_eq!(version.to_string(), "4242.0.0");
    }

    #[tokio::test]
    async fn test_probe_without_banner_fails() {
        let temp = TempDir::new().unwrap();
        let tool = fake_tool(&temp, "echo 'no banner today'");

        let err = probe_version(&tool, Platform::new(Os::Linux, Arch::X86_64))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VersionParse));
    }
}
