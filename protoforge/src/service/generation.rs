//! Cached generation service

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::GenerationOutcome;
use crate::error::{Error, Result};
use crate::infra::cache::{stamp_files, CacheRecord, GenerationCache};
use crate::infra::protoc::{build_args, ProtocInvocation, ProtocRunner};
use crate::service::discovery;

/// Runs the schema compiler behind an input-set fingerprint
///
/// Repeated builds skip recompilation when the `.proto` set under the
/// source directory is unchanged (same paths, same modification times, same
/// sizes) and every previously recorded output still exists. Changes to
/// files outside the source directory (an unpacked dependency schema, for
/// instance) do not trigger recompilation; only direct schema changes do.
pub struct GenerationService {
    config: Arc<Config>,
    cache: GenerationCache,
    runner: Arc<dyn ProtocRunner>,
}

impl GenerationService {
    /// Create a new generation service
    pub fn new(config: Arc<Config>, runner: Arc<dyn ProtocRunner>) -> Self {
        let cache = GenerationCache::new(config.cache_dir.clone());
        Self {
            config,
            cache,
            runner,
        }
    }

    /// Compile the current schema set, reusing the cached output set when
    /// no input changed
    pub async fn generate(&self) -> Result<GenerationOutcome> {
        let protos = discovery::find_proto_files(&self.config.source_dir)?;
        if protos.is_empty() {
            info!(
                "No schema files under {}; nothing to generate",
                self.config.source_dir.display()
            );
            return Ok(GenerationOutcome {
                generated_files: Vec::new(),
                compiler_ran: false,
            });
        }

        let current = stamp_files(&protos)?;
        let namespace = &self.config.cache_namespace;

        if let Some(record) = self.cache.load(namespace)? {
            if record.is_fresh(&current) {
                debug!(
                    "{} schema files unchanged; skipping compiler run",
                    current.len()
                );
                return Ok(GenerationOutcome {
                    generated_files: record.outputs,
                    compiler_ran: false,
                });
            }
        }

        let generated_files = match self.compile(&protos).await {
            Ok(files) => files,
            Err(e) => {
                // A failed run must not leave a record pointing at
                // incomplete outputs
                self.cache.invalidate(namespace)?;
                return Err(e);
            }
        };

        self.cache.store(
            namespace,
            &CacheRecord {
                fingerprint: current,
                outputs: generated_files.clone(),
                created_at: Utc::now(),
            },
        )?;

        Ok(GenerationOutcome {
            generated_files,
            compiler_ran: true,
        })
    }

    /// Run the compiler over the given schema files and collect the
    /// generated artifacts
    async fn compile(&self, protos: &[PathBuf]) -> Result<Vec<PathBuf>> {
        for plugin in &self.config.plugins {
            std::fs::create_dir_all(&plugin.output_dir)?;
        }

        let args = build_args(
            &self.config.resolved_include_paths(),
            &self.config.plugins,
            protos,
        )?;
        let invocation = ProtocInvocation {
            protoc: PathBuf::from(&self.config.protoc_path),
            args,
        };

        info!(
            "Compiling {} schema files with {}",
            protos.len(),
            self.config.protoc_path
        );

        let code = self.runner.run(invocation).await?;
        if code != 0 {
            return Err(Error::CompilerExit { code });
        }

        self.collect_outputs()
    }

    /// Union, over all plugins, of files under each plugin's output
    /// directory matching that plugin's filter: all generated artifacts,
    /// not merely files changed by this run
    fn collect_outputs(&self) -> Result<Vec<PathBuf>> {
        let mut outputs = Vec::new();
        for plugin in &self.config.plugins {
            let files =
                discovery::collect_files(&plugin.output_dir, |path| plugin.filter.matches(path))?;
            debug!(
                "Plugin {} produced {} files under {}",
                plugin.name,
                files.len(),
                plugin.output_dir.display()
            );
            outputs.extend(files);
        }

        outputs.sort();
        outputs.dedup();
        Ok(outputs)
    }
}
