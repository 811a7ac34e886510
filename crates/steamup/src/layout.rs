//! Platform layout strategy.
//!
//! One strategy value is selected at startup and carried through the
//! acquisition controller, so the platform branching lives here instead
//! of being scattered through the orchestration.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use steamup_core::platform::{Os, Platform};
use steamup_core::{Error, Result, TOOL_NAME};
use tracing::debug;

/// Platform-specific install layout.
///
/// Knows where the real binary lives inside an unpacked archive, how to
/// normalize a fresh install into a stable shape, which path is the
/// canonical invocation path, and where the tool keeps its mutable data.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    platform: Platform,
}

impl Layout {
    /// Create the layout strategy for a platform.
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// The platform this layout was built for.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Name of the real binary inside the unpacked archive
    /// (`steamcmd.sh` / `steamcmd.exe`).
    #[must_use]
    pub fn executable_name(&self) -> String {
        format!("{TOOL_NAME}{}", self.platform.os.executable_suffix())
    }

    /// Canonical invocation path inside an install root.
    ///
    /// On Linux this is the synthesized `bin/steamcmd` wrapper; elsewhere
    /// the real binary itself.
    #[must_use]
    pub fn invocation_path(&self, root: &Path) -> PathBuf {
        match self.platform.os {
            Os::Linux => root.join("bin").join(TOOL_NAME),
            Os::Macos | Os::Windows => root.join(self.executable_name()),
        }
    }

    /// Directory to prepend to the executable search path.
    #[must_use]
    pub fn path_entry(&self, root: &Path) -> PathBuf {
        match self.platform.os {
            Os::Linux => root.join("bin"),
            Os::Macos | Os::Windows => root.to_path_buf(),
        }
    }

    /// Normalize a freshly-unpacked install.
    ///
    /// Marks the real binary executable on unix platforms. On Linux it
    /// also synthesizes a `bin/steamcmd` wrapper that re-invokes the real
    /// binary with forwarded arguments: the versioned install directory
    /// is not a stable name to put on a search path across cache
    /// restores, while the `bin/` convention is. The wrapper locates the
    /// binary relative to itself, so the directory can be committed to
    /// the cache and never rewritten.
    ///
    /// # Errors
    ///
    /// Any filesystem error here aborts the acquisition; an install whose
    /// binary cannot be made executable is unusable.
    pub fn normalize(&self, unpacked: &Path) -> Result<()> {
        #[cfg(unix)]
        if matches!(self.platform.os, Os::Linux | Os::Macos) {
            use std::os::unix::fs::PermissionsExt;
            let real = unpacked.join(self.executable_name());
            let mut perms = std::fs::metadata(&real)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&real, perms)?;
        }

        if self.platform.os == Os::Linux {
            let bin_dir = unpacked.join("bin");
            std::fs::create_dir_all(&bin_dir)?;

            let wrapper = bin_dir.join(TOOL_NAME);
            match std::fs::remove_file(&wrapper) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }

            let script = format!(
                "#!/bin/bash\nexec \"$(dirname \"$0\")/../{}\" \"$@\"\n",
                self.executable_name()
            );
            std::fs::write(&wrapper, script)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&wrapper, std::fs::Permissions::from_mode(0o755))?;
            }
            debug!(wrapper = %wrapper.display(), "Synthesized wrapper script");
        }

        Ok(())
    }

    /// Resolve the tool's mutable data directory, creating it if absent.
    ///
    /// Home-relative on Linux/macOS; on Windows the tool writes next to
    /// its own binary, so the install root doubles as the data directory.
    ///
    /// # Errors
    ///
    /// Absence is expected and handled by creating the directory; any
    /// other filesystem error is re-raised.
    pub fn data_dir(&self, root: &Path) -> Result<PathBuf> {
        let dir = match self.platform.os {
            Os::Linux => home_dir()?.join("Steam"),
            Os::Macos => home_dir()?
                .join("Library")
                .join("Application Support")
                .join("Steam"),
            Os::Windows => root.to_path_buf(),
        };

        match std::fs::metadata(&dir) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "Creating data directory");
                std::fs::create_dir_all(&dir)?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(dir)
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| Error::Io(std::io::Error::other("home directory is not available")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use steamup_core::platform::Arch;
    use tempfile::TempDir;

    fn layout(os: Os) -> Layout {
        Layout::new(Platform::new(os, Arch::X86_64))
    }

    #[test]
    fn test_executable_name() {
        assert_eq!(layout(Os::Linux).executable_name(), "steamcmd.sh");
        assert_eq!(layout(Os::Macos).executable_name(), "steamcmd.sh");
        assert_eq!(layout(Os::Windows).executable_name(), "steamcmd.exe");
    }

    #[test]
    fn test_invocation_path() {
        let root = Path::new("/cache/steamcmd/1.0.0/x86_64");
        assert_eq!(
            layout(Os::Linux).invocation_path(root),
            root.join("bin").join("steamcmd")
        );
        assert_eq!(
            layout(Os::Macos).invocation_path(root),
            root.join("steamcmd.sh")
        );
        assert_eq!(
            layout(Os::Windows).invocation_path(root),
            root.join("steamcmd.exe")
        );
    }

    #[test]
    fn test_path_entry() {
        let root = Path::new("/tool");
        assert_eq!(layout(Os::Linux).path_entry(root), root.join("bin"));
        assert_eq!(layout(Os::Windows).path_entry(root), root);
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_linux_synthesizes_wrapper() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("steamcmd.sh"), b"#!/bin/sh\n").unwrap();

        layout(Os::Linux).normalize(temp.path()).unwrap();

        let wrapper = temp.path().join("bin").join("steamcmd");
        assert!(wrapper.exists());
        let mode = std::fs::metadata(&wrapper).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);

        let body = std::fs::read_to_string(&wrapper).unwrap();
        assert!(body.contains("steamcmd.sh"));
        assert!(body.contains("\"$@\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_replaces_stale_wrapper() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("steamcmd.sh"), b"#!/bin/sh\n").unwrap();
        std::fs::create_dir_all(temp.path().join("bin")).unwrap();
        std::fs::write(temp.path().join("bin").join("steamcmd"), b"stale").unwrap();

        layout(Os::Linux).normalize(temp.path()).unwrap();

        let body = std::fs::read_to_string(temp.path().join("bin").join("steamcmd")).unwrap();
        assert!(body.starts_with("#!/bin/bash"));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_macos_has_no_wrapper() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("steamcmd.sh"), b"#!/bin/sh\n").unwrap();

        layout(Os::Macos).normalize(temp.path()).unwrap();
        assert!(!temp.path().join("bin").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_missing_binary_fails() {
        let temp = TempDir::new().unwrap();
        let err = layout(Os::Linux).normalize(temp.path()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_data_dir_windows_is_tool_root() {
        let temp = TempDir::new().unwrap();
        let dir = layout(Os::Windows).data_dir(temp.path()).unwrap();
        assert_eq!(dir, temp.path());
    }

    #[cfg(unix)]
    #[test]
    fn test_data_dir_created_when_absent() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("home");
        std::fs::create_dir_all(&home).unwrap();

        temp_env::with_var("HOME", Some(&home), || {
            let dir = layout(Os::Linux).data_dir(temp.path()).unwrap();
            assert_eq!(dir, home.join("Steam"));
            assert!(dir.is_dir());

            // Second resolution is a no-op on the existing directory.
            let again = layout(Os::Linux).data_dir(temp.path()).unwrap();
            assert_eq!(again, dir);
        });
    }
}
