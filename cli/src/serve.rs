use crate::config::KnotworkConfig;
use anyhow::{Context, Result};
use knotwork_http::{FilesystemRepository, KnotServer};
use knotwork_std::HtmlFragmentSplitter;
use std::path::Path;
use std::sync::Arc;

pub fn run_serve_command(config_path: &Path) -> Result<()> {
    let config = KnotworkConfig::load(config_path)?;
    let registry = config.build_registry()?;
    let server = KnotServer::new(
        &config.server,
        registry,
        Arc::new(FilesystemRepository::new(&config.repository.root)),
        Arc::new(HtmlFragmentSplitter),
    )
    .context("Failed to build the HTTP server")?;

    tracing::info!(
        config = %config_path.display(),
        routes = config.server.routes.len(),
        services = config.templating.engine.services.len(),
        "Starting Knotwork"
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    runtime.block_on(server.run())?;
    Ok(())
}
