//! Proto entry extraction from library archives

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Suffix selecting schema entries inside an archive
const PROTO_SUFFIX: &str = ".proto";

/// Extract every `.proto`-suffixed entry from `archive_path` into
/// `target_dir`, creating the directory if absent.
///
/// Pre-existing files at the same path are overwritten silently. Entry
/// paths are sanitized: an entry that would escape the target directory is
/// treated as a corrupt archive. Returns the files actually written, in
/// entry order. An archive with zero matching entries is not an error.
pub fn extract_proto_entries(archive_path: &Path, target_dir: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path).map_err(|e| Error::extraction(archive_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::extraction(archive_path, e))?;

    std::fs::create_dir_all(target_dir)?;

    let mut extracted = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::extraction(archive_path, e))?;

        if entry.is_dir() || !entry.name().ends_with(PROTO_SUFFIX) {
            continue;
        }

        // Reject entries with absolute or parent-escaping names
        let relative = entry.enclosed_name().ok_or_else(|| {
            Error::extraction(
                archive_path,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("entry escapes extraction directory: {}", entry.name()),
                ),
            )
        })?;

        let dest = target_dir.join(relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut out = File::create(&dest).map_err(|e| Error::extraction(archive_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| Error::extraction(archive_path, e))?;

        extracted.push(dest);
    }

    if extracted.is_empty() {
        debug!("No proto entries found in {}", archive_path.display());
    }

    Ok(extracted)
}
