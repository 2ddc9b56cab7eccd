//! Configuration validation

use crate::config::KnotworkConfig;
use anyhow::Result;
use knotwork_http::{FilesystemRepository, KnotServer};
use knotwork_runtime::KnotRegistry;
use knotwork_std::HtmlFragmentSplitter;
use std::path::Path;
use std::sync::Arc;

/// Load the configuration, compile every pattern and make sure each route
/// only points at registered knots.
pub fn run_check_command(config_path: &Path) -> Result<()> {
    println!("Checking Knotwork config at: {}", config_path.display());

    let config = KnotworkConfig::load(config_path)?;
    let problems = validate(&config)?;

    if problems.is_empty() {
        println!("  ✅ {} route(s), {} service(s)", config.server.routes.len(), config.templating.engine.services.len());
        println!();
        println!("✅ Check complete!");
        return Ok(());
    }

    for problem in &problems {
        println!("  ❌ {problem}");
    }
    anyhow::bail!("{} problem(s) found", problems.len())
}

/// Hard failures (bad patterns) are errors; everything else is reported as a
/// problem.
fn validate(config: &KnotworkConfig) -> Result<Vec<String>> {
    let registry = config.build_registry()?;
    KnotServer::new(
        &config.server,
        registry.clone(),
        Arc::new(FilesystemRepository::new(&config.repository.root)),
        Arc::new(HtmlFragmentSplitter),
    )?;

    let mut problems = unknown_addresses(config, &registry);
    if !config.repository.root.is_dir() {
        problems.push(format!(
            "repository root {} is not a directory",
            config.repository.root.display()
        ));
    }
    Ok(problems)
}

fn unknown_addresses(config: &KnotworkConfig, registry: &KnotRegistry) -> Vec<String> {
    let mut problems = Vec::new();
    for route in &config.server.routes {
        let reachable = std::iter::once(route.address.as_str()).chain(
            route
                .on_transition
                .values()
                .flat_map(|entry| entry.addresses()),
        );
        for address in reachable {
            if !registry.contains(address) {
                problems.push(format!(
                    "route {} {} reaches unknown knot '{address}'",
                    route.method, route.path
                ));
            }
        }
    }
    problems
}
