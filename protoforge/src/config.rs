//! Build configuration
//!
//! The host build system's lazy setting graph is re-expressed as one
//! explicit struct: every directory and plugin is resolved up front by
//! [`Config::load`], and derived values (include paths, the automatic
//! runtime dependency) are plain methods instead of cross-referenced
//! settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{GeneratedFileFilter, ProtocPlugin};

/// Name of the built-in compiler target configured by default
pub const DEFAULT_TARGET_NAME: &str = "java";

/// Runtime library paired with the default built-in target
pub const DEFAULT_RUNTIME_NAME: &str = "protobuf-java";

/// Library dependency the host build should add alongside generated sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeDependency {
    pub name: String,
    pub version: String,
}

impl std::fmt::Display for RuntimeDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// Protoforge configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Schema compiler executable path or name (resolved on PATH)
    #[serde(default = "default_protoc_path")]
    pub protoc_path: String,

    /// Schema runtime version, used only to select the default library
    /// dependency version
    #[serde(default = "default_runtime_version")]
    pub runtime_version: String,

    /// Directory scanned recursively for `.proto` schema files
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Directory proto entries from dependency archives are extracted into
    #[serde(default = "default_extract_dir")]
    pub extract_dir: PathBuf,

    /// Compiled-output directory used by the default built-in target
    #[serde(default = "default_generated_dir")]
    pub generated_dir: PathBuf,

    /// Directory holding the persisted generation cache record
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Key of the cache record within the cache directory
    #[serde(default = "default_cache_namespace")]
    pub cache_namespace: String,

    /// Include paths passed to the compiler, in order. Empty means the
    /// derived default: source directory first, then the extraction
    /// directory, so local schemas shadow vendored ones.
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    /// Output plugins. Defaults to the single built-in target writing into
    /// `generated_dir`. Plugins are configured programmatically; the
    /// environment only overrides paths.
    #[serde(default)]
    pub plugins: Vec<ProtocPlugin>,

    /// Library archives whose `.proto` entries should be unpacked
    #[serde(default)]
    pub dependency_archives: Vec<PathBuf>,
}

fn default_protoc_path() -> String {
    "protoc".to_string()
}

fn default_runtime_version() -> String {
    "2.4.1".to_string()
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src/protobuf")
}

fn default_extract_dir() -> PathBuf {
    PathBuf::from("target/protobuf_external")
}

fn default_generated_dir() -> PathBuf {
    PathBuf::from("target/generated/protobuf")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("target/protoforge-cache")
}

fn default_cache_namespace() -> String {
    "protobuf".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        // Start with default config as base
        let mut config = Config::default();

        // Override with environment variables
        if let Ok(val) = std::env::var("PROTOFORGE_PROTOC") {
            config.protoc_path = val;
        }
        if let Ok(val) = std::env::var("PROTOFORGE_RUNTIME_VERSION") {
            config.runtime_version = val;
        }
        if let Ok(val) = std::env::var("PROTOFORGE_SOURCE_DIR") {
            config.source_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("PROTOFORGE_EXTRACT_DIR") {
            config.extract_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("PROTOFORGE_GENERATED_DIR") {
            config.generated_dir = PathBuf::from(val);
            // The default plugin writes into the compiled-output directory
            for plugin in &mut config.plugins {
                if plugin.name == DEFAULT_TARGET_NAME && plugin.is_builtin() {
                    plugin.output_dir = config.generated_dir.clone();
                }
            }
        }
        if let Ok(val) = std::env::var("PROTOFORGE_CACHE_DIR") {
            config.cache_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("PROTOFORGE_CACHE_NAMESPACE") {
            config.cache_namespace = val;
        }
        if let Ok(val) = std::env::var("PROTOFORGE_INCLUDE_PATHS") {
            config.include_paths = parse_path_list(&val);
        }
        if let Ok(val) = std::env::var("PROTOFORGE_ARCHIVES") {
            config.dependency_archives = parse_path_list(&val);
        }

        Ok(config)
    }

    /// Include paths in compiler order: the explicit list, or the derived
    /// default of source directory followed by the extraction directory
    pub fn resolved_include_paths(&self) -> Vec<PathBuf> {
        if self.include_paths.is_empty() {
            vec![self.source_dir.clone(), self.extract_dir.clone()]
        } else {
            self.include_paths.clone()
        }
    }

    /// Whether the default built-in target is still among the configured
    /// plugins
    pub fn default_target_active(&self) -> bool {
        self.plugins
            .iter()
            .any(|p| p.name == DEFAULT_TARGET_NAME && p.is_builtin())
    }

    /// The library dependency the host build should add automatically.
    /// Present exactly when the default built-in target is active;
    /// configuring only plugins backed by external executables suppresses
    /// it.
    pub fn runtime_dependency(&self) -> Option<RuntimeDependency> {
        if self.default_target_active() {
            Some(RuntimeDependency {
                name: DEFAULT_RUNTIME_NAME.to_string(),
                version: self.runtime_version.clone(),
            })
        } else {
            None
        }
    }
}

/// Parse a comma-separated list of paths
fn parse_path_list(val: &str) -> Vec<PathBuf> {
    val.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        let generated_dir = default_generated_dir();
        Self {
            protoc_path: default_protoc_path(),
            runtime_version: default_runtime_version(),
            source_dir: default_source_dir(),
            extract_dir: default_extract_dir(),
            generated_dir: generated_dir.clone(),
            cache_dir: default_cache_dir(),
            cache_namespace: default_cache_namespace(),
            include_paths: Vec::new(),
            plugins: vec![ProtocPlugin::new(
                DEFAULT_TARGET_NAME,
                generated_dir,
                GeneratedFileFilter::extension("java"),
            )],
            dependency_archives: Vec::new(),
        }
    }
}
