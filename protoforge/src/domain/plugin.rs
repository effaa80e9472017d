//! Output plugin configuration for the schema compiler

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Predicate selecting which files under a plugin's output directory count
/// as generated sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratedFileFilter {
    /// Files with the given extension (without the leading dot)
    Extension { extension: String },
    /// Every file under the output directory
    Any,
}

impl GeneratedFileFilter {
    /// Filter matching files by extension
    pub fn extension(ext: impl Into<String>) -> Self {
        GeneratedFileFilter::Extension {
            extension: ext.into(),
        }
    }

    /// Check whether a path counts as a generated file
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            GeneratedFileFilter::Extension { extension } => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == extension)
                .unwrap_or(false),
            GeneratedFileFilter::Any => true,
        }
    }
}

/// A named output target for the schema compiler
///
/// Each plugin contributes a `--<name>_out=<dir>` argument and, when backed
/// by an external codegen binary, a `--plugin=protoc-gen-<name>=<exe>`
/// argument. Plugins are immutable configuration values constructed once per
/// build configuration; the filter has no silent default and must be chosen
/// by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocPlugin {
    /// Plugin/language identifier (e.g. "java", "grpc")
    pub name: String,
    /// Directory where generated files land
    pub output_dir: PathBuf,
    /// External codegen plugin binary, if not a built-in compiler target
    pub executable: Option<PathBuf>,
    /// Selects which files under `output_dir` count as generated
    pub filter: GeneratedFileFilter,
}

impl ProtocPlugin {
    /// Create a built-in compiler target
    pub fn new(
        name: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        filter: GeneratedFileFilter,
    ) -> Self {
        Self {
            name: name.into(),
            output_dir: output_dir.into(),
            executable: None,
            filter,
        }
    }

    /// Attach an external codegen plugin binary
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    /// Whether this target is served by the compiler itself rather than an
    /// external plugin binary
    pub fn is_builtin(&self) -> bool {
        self.executable.is_none()
    }
}
