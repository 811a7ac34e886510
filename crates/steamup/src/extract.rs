//! Archive extraction.
//!
//! The distribution point serves a gzip tarball on Linux/macOS and a zip
//! on Windows; both unpack into a flat tool directory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use steamup_core::archive::ArchiveKind;
use steamup_core::{Error, Result};
use tar::Archive;
use tracing::debug;

/// Unpack `archive` into `dest` according to its kind.
///
/// # Errors
///
/// Returns [`Error::Extract`] when unpacking fails or yields an empty
/// directory.
pub fn extract_archive(archive: &Path, kind: ArchiveKind, dest: &Path) -> Result<()> {
    debug!(archive = %archive.display(), dest = %dest.display(), ?kind, "Extracting");
    match kind {
        ArchiveKind::TarGz => extract_tar_gz(archive, dest)?,
        ArchiveKind::Zip => extract_zip(archive, dest)?,
    }

    // An archive that unpacked to nothing is as fatal as one that failed
    // to unpack.
    let produced = std::fs::read_dir(dest)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if !produced {
        return Err(Error::extract(
            archive.display().to_string(),
            "archive produced no files",
        ));
    }
    Ok(())
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let decoder = GzDecoder::new(file);
    let mut tarball = Archive::new(decoder);

    std::fs::create_dir_all(dest)?;
    tarball
        .unpack(dest)
        .map_err(|e| Error::extract(archive.display().to_string(), e.to_string()))
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| Error::extract(archive.display().to_string(), e.to_string()))?;

    std::fs::create_dir_all(dest)?;
    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| Error::extract(archive.display().to_string(), e.to_string()))?;

        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            std::fs::write(&outpath, &content)?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                let mut perms = std::fs::metadata(&outpath)?.permissions();
                perms.set_mode(mode);
                std::fs::set_permissions(&outpath, perms)?;
            }
        }
    }
    Ok(())
}
