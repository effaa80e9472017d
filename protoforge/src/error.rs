//! Error types for protoforge

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for protoforge
#[derive(Debug, Error)]
pub enum Error {
    // Dependency unpacking errors
    #[error("Failed to extract proto entries from archive {archive}: {source}")]
    ExtractionFailed {
        archive: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // Compiler invocation errors
    #[error("Failed to run schema compiler `{command}`: {source}")]
    CompilerInvocation {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema compiler exited with code {code}")]
    CompilerExit { code: i32 },

    // Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an extraction failure for the given archive
    pub fn extraction<E>(archive: impl Into<PathBuf>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::ExtractionFailed {
            archive: archive.into(),
            source: Box::new(source),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Cache(err.to_string())
    }
}
