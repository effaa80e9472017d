//! Schema file discovery

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Find every `.proto` file under the source directory, recursively.
///
/// The result is sorted lexicographically: schema files are self-contained
/// so compiler correctness does not depend on order, but the command line
/// and the cache fingerprint must be deterministic across runs.
pub fn find_proto_files(source_dir: &Path) -> Result<Vec<PathBuf>> {
    collect_files(source_dir, |path| {
        path.extension().and_then(|e| e.to_str()) == Some("proto")
    })
}

/// Collect files under `dir` matching `predicate`, recursively and sorted.
/// A missing directory yields an empty set.
pub fn collect_files<F>(dir: &Path, predicate: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| Error::Internal(format!("Failed to walk {}: {}", dir.display(), e)))?;
        if entry.file_type().is_file() && predicate(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
