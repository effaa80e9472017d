//! Dependency unpacking service

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::domain::UnpackedDependencies;
use crate::error::Result;
use crate::infra::archive;

/// Unpacks proto dependencies bundled inside resolved library archives into
/// the configured extraction directory, producing a fresh include path
pub struct UnpackService {
    config: Arc<Config>,
}

impl UnpackService {
    /// Create a new unpack service
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Unpack the configured dependency archives
    pub async fn unpack(&self) -> Result<UnpackedDependencies> {
        self.unpack_archives(&self.config.dependency_archives, &self.config.extract_dir)
    }

    /// Unpack `.proto` entries from the given archives into `extract_dir`
    pub fn unpack_archives(
        &self,
        archives: &[PathBuf],
        extract_dir: &Path,
    ) -> Result<UnpackedDependencies> {
        std::fs::create_dir_all(extract_dir)?;

        let mut result = UnpackedDependencies::empty(extract_dir);
        for archive_path in archives {
            let files = archive::extract_proto_entries(archive_path, extract_dir)?;
            debug!(
                "Extracted {} proto entries from {}",
                files.len(),
                archive_path.display()
            );
            result.files.extend(files);
        }

        info!(
            "Unpacked {} proto files into {}",
            result.files.len(),
            extract_dir.display()
        );
        Ok(result)
    }
}
