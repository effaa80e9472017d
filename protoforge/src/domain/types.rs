//! Common domain types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result of unpacking proto dependencies from library archives
///
/// Pairs the extraction directory with the files extracted into it. Created
/// fresh each run; the directory contents act as the only persistent state
/// (re-extraction overwrites).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnpackedDependencies {
    /// Directory the entries were extracted into
    pub extract_dir: PathBuf,
    /// Files actually written, in extraction order
    pub files: Vec<PathBuf>,
}

impl UnpackedDependencies {
    /// An empty result for the given directory
    pub fn empty(extract_dir: impl Into<PathBuf>) -> Self {
        Self {
            extract_dir: extract_dir.into(),
            files: Vec::new(),
        }
    }
}

/// Result of a generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// All generated artifacts across every plugin output directory
    pub generated_files: Vec<PathBuf>,
    /// Whether the compiler actually ran, or the cached record was reused
    pub compiler_ran: bool,
}
