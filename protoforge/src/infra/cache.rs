//! Persistent generation cache
//!
//! A small explicit key-value store: one JSON record per namespace under
//! the cache directory, mapping the last-seen input fingerprint to the
//! last-produced output file set. Only one build at a time may use a given
//! cache directory; concurrent builds against the same path are
//! unsupported.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Last-modified fingerprint of a single input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStamp {
    pub path: PathBuf,
    pub modified_at: DateTime<Utc>,
    pub size: u64,
}

impl FileStamp {
    /// Stamp a file from its current filesystem metadata
    pub fn for_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata.modified()?;

        Ok(Self {
            path: path.to_path_buf(),
            modified_at: DateTime::<Utc>::from(modified),
            size: metadata.len(),
        })
    }
}

/// Stamp a set of input files, preserving order
pub fn stamp_files(paths: &[PathBuf]) -> Result<Vec<FileStamp>> {
    paths.iter().map(|p| FileStamp::for_path(p)).collect()
}

/// One cache entry: the observed input set and the outputs it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub fingerprint: Vec<FileStamp>,
    pub outputs: Vec<PathBuf>,
    pub created_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Whether the recorded input set matches the current one and every
    /// recorded output still exists on disk
    pub fn is_fresh(&self, current: &[FileStamp]) -> bool {
        self.fingerprint == current && self.outputs.iter().all(|p| p.exists())
    }
}

/// File-backed store for generation cache records
pub struct GenerationCache {
    cache_dir: PathBuf,
}

impl GenerationCache {
    /// Create a store rooted at the given directory
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    fn record_path(&self, namespace: &str) -> PathBuf {
        self.cache_dir.join(format!("{namespace}.json"))
    }

    /// Load the record for a namespace. A missing record is `None`; an
    /// unparsable record is discarded with a warning so the next run
    /// rebuilds it.
    pub fn load(&self, namespace: &str) -> Result<Option<CacheRecord>> {
        let path = self.record_path(namespace);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Cache(format!("Failed to read {}: {}", path.display(), e))),
        };

        match serde_json::from_str(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("Discarding unreadable cache record {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Persist the record for a namespace, replacing any previous one
    pub fn store(&self, namespace: &str, record: &CacheRecord) -> Result<()> {
        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|e| Error::Cache(format!("Failed to create cache directory: {}", e)))?;

        let path = self.record_path(namespace);
        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, content)
            .map_err(|e| Error::Cache(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Remove the record for a namespace, if present
    pub fn invalidate(&self, namespace: &str) -> Result<()> {
        let path = self.record_path(namespace);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Cache(format!("Failed to remove {}: {}", path.display(), e))),
        }
    }
}
