//! Protoforge CLI
//!
//! Drives the full pipeline in dependency order: unpack proto dependencies
//! from library archives, then run the cached generation task over the
//! local schema files.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use protoforge::infra::protoc;
use protoforge::{Config, GenerationService, SystemProtocRunner, UnpackService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::load()?;
    let config = Arc::new(config);

    info!("Starting protoforge");
    info!("Source directory: {}", config.source_dir.display());

    match protoc::probe_version(Path::new(&config.protoc_path)).await {
        Ok(version) => info!("Schema compiler: {}", version),
        Err(e) => warn!("Could not probe {}: {}", config.protoc_path, e),
    }

    if let Some(dep) = config.runtime_dependency() {
        info!("Default target active; host build should add {}", dep);
    }

    let unpack_service = UnpackService::new(config.clone());
    let generation_service = GenerationService::new(config.clone(), Arc::new(SystemProtocRunner));

    let unpacked = unpack_service.unpack().await?;
    info!(
        "Include path ready: {} ({} vendored schemas)",
        unpacked.extract_dir.display(),
        unpacked.files.len()
    );

    let outcome = generation_service.generate().await?;
    if outcome.compiler_ran {
        info!("Generated {} source files", outcome.generated_files.len());
    } else {
        info!(
            "Schemas unchanged; reusing {} generated source files",
            outcome.generated_files.len()
        );
    }

    Ok(())
}
