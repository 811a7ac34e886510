//! End-to-end acquisition tests against a real directory store and a
//! stubbed transport, with a fake banner-printing tool packed into a
//! real tarball.

#![cfg(unix)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use steamup::acquire::{AcquireOptions, Acquirer, SmokeTolerance};
use steamup::fetch::Fetcher;
use steamup::layout::Layout;
use steamup_core::platform::{Arch, Os, Platform};
use steamup_core::{Error, Result, TOOL_NAME};
use steamup_toolcache::{HostedToolStore, ToolStore};
use tar::Builder;
use tempfile::TempDir;

const BANNER_SCRIPT: &str =
    "#!/bin/sh\necho 'Steam Console Client (c) Valve Corporation - version 1234'\nexit 0\n";

/// Build an in-memory tar.gz shaped like the Linux distribution archive.
fn tarball_with_script(script: &str) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    let files: [(&str, &[u8]); 2] = [
        ("steamcmd.sh", script.as_bytes()),
        ("linux32/steamcmd", b"elf"),
    ];
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_path(path).unwrap();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append(&header, content).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// Stub transport serving a canned archive and counting calls.
struct ArchiveFetcher {
    archive: Vec<u8>,
    calls: AtomicUsize,
}

impl ArchiveFetcher {
    fn new(archive: Vec<u8>) -> Self {
        Self {
            archive,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ArchiveFetcher {
    async fn fetch(&self, _url: &str, dest: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, &self.archive)?;
        Ok(())
    }
}

fn linux_platform() -> Platform {
    Platform::new(Os::Linux, Arch::X86_64)
}

fn options_in(temp: &TempDir) -> AcquireOptions {
    AcquireOptions {
        scratch_dir: temp.path().join("scratch"),
        smoke_tolerance: SmokeTolerance::Always,
    }
}

/// Commit a fake install under the given version, shaped like a
/// normalized Linux layout.
fn seed_version(store: &HostedToolStore, layout: Layout, staging: &Path, version: &str) {
    let source = staging.join(version);
    std::fs::create_dir_all(&source).unwrap();
    std::fs::write(
        source.join("steamcmd.sh"),
        format!("#!/bin/sh\necho 'cached {version}'\n"),
    )
    .unwrap();
    layout.normalize(&source).unwrap();
    store.cache_dir(&source, TOOL_NAME, version).unwrap();
}

#[tokio::test]
async fn test_cold_store_downloads_once_then_reuses() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    std::fs::create_dir_all(&home).unwrap();

    temp_env::async_with_vars([("HOME", Some(home.to_str().unwrap()))], async {
        let store = HostedToolStore::new(temp.path().join("toolcache"), "x86_64");
        let fetcher = ArchiveFetcher::new(tarball_with_script(BANNER_SCRIPT));
        let layout = Layout::new(linux_platform());

        let acquisition = Acquirer::new(&store, &fetcher, layout, options_in(&temp))
            .acquire()
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(acquisition.tool.version.to_string(), "1234.0.0");
        assert!(acquisition.tool.invocation_path.ends_with("bin/steamcmd"));
        assert!(
            acquisition
                .tool
                .invocation_path
                .starts_with(&acquisition.tool.root_dir)
        );
        assert_eq!(acquisition.path_entry, acquisition.tool.root_dir.join("bin"));

        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&acquisition.tool.invocation_path)
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o111, 0o111);
        }

        assert_eq!(acquisition.data_dir, home.join("Steam"));
        assert!(acquisition.data_dir.is_dir());
        assert_eq!(store.find_all_versions(TOOL_NAME), vec!["1234.0.0"]);

        // Warm second run: stat-only, no new transfer.
        let second = Acquirer::new(&store, &fetcher, layout, options_in(&temp))
            .acquire()
            .await
            .unwrap();
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(second.tool.root_dir, acquisition.tool.root_dir);
        assert_eq!(second.tool.version, acquisition.tool.version);
    })
    .await;
}

#[tokio::test]
async fn test_warm_store_selects_max_version_without_downloading() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    std::fs::create_dir_all(&home).unwrap();

    temp_env::async_with_vars([("HOME", Some(home.to_str().unwrap()))], async {
        let store = HostedToolStore::new(temp.path().join("toolcache"), "x86_64");
        let layout = Layout::new(linux_platform());
        let staging = temp.path().join("staging");
        for version in ["1.0.0", "3.2.0", "2.5.0"] {
            seed_version(&store, layout, &staging, version);
        }

        let fetcher = ArchiveFetcher::new(Vec::new());
        for _ in 0..2 {
            let acquisition = Acquirer::new(&store, &fetcher, layout, options_in(&temp))
                .acquire()
                .await
                .unwrap();
            assert_eq!(acquisition.tool.version.to_string(), "3.2.0");
            assert!(acquisition.tool.root_dir.ends_with("3.2.0/x86_64"));
        }
        assert_eq!(fetcher.calls(), 0);
    })
    .await;
}

#[tokio::test]
async fn test_version_selection_is_numeric_not_lexicographic() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    std::fs::create_dir_all(&home).unwrap();

    temp_env::async_with_vars([("HOME", Some(home.to_str().unwrap()))], async {
        let store = HostedToolStore::new(temp.path().join("toolcache"), "x86_64");
        let layout = Layout::new(linux_platform());
        let staging = temp.path().join("staging");
        for version in ["9.0.0", "10.0.0"] {
            seed_version(&store, layout, &staging, version);
        }

        let fetcher = ArchiveFetcher::new(Vec::new());
        let acquisition = Acquirer::new(&store, &fetcher, layout, options_in(&temp))
            .acquire()
            .await
            .unwrap();
        assert_eq!(acquisition.tool.version.to_string(), "10.0.0");
        assert_eq!(fetcher.calls(), 0);
    })
    .await;
}

#[tokio::test]
async fn test_missing_banner_aborts_without_commit() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    std::fs::create_dir_all(&home).unwrap();

    temp_env::async_with_vars([("HOME", Some(home.to_str().unwrap()))], async {
        let store = HostedToolStore::new(temp.path().join("toolcache"), "x86_64");
        let fetcher =
            ArchiveFetcher::new(tarball_with_script("#!/bin/sh\necho 'no banner here'\n"));
        let layout = Layout::new(linux_platform());

        let err = Acquirer::new(&store, &fetcher, layout, options_in(&temp))
            .acquire()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VersionParse));
        assert!(store.find_all_versions(TOOL_NAME).is_empty());
    })
    .await;
}

#[test]
fn test_wrapper_forwards_args_and_exit_code() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("steamcmd.sh"),
        "#!/bin/sh\necho \"args: $@\"\nexit 7\n",
    )
    .unwrap();

    Layout::new(linux_platform()).normalize(temp.path()).unwrap();

    let output = std::process::Command::new(temp.path().join("bin").join("steamcmd"))
        .args(["+login", "anonymous", "+quit"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(7));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("args: +login anonymous +quit"));
}
