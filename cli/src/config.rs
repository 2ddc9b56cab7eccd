//! The `knotwork.toml` file and the knots it describes.

use anyhow::{Context, Result};
use knotwork_http::{RepositoryOptions, ServerConfig};
use knotwork_runtime::KnotRegistry;
use knotwork_std::{FragmentAssemblerKnot, UnprocessedStrategy};
use knotwork_template::{TemplateEngine, TemplateEngineConfig, TemplatingKnot};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

fn default_templating_address() -> String {
    "knotwork.knot.templating".to_string()
}

fn default_assembler_address() -> String {
    "knotwork.knot.assembler".to_string()
}

fn default_on_success() -> String {
    knotwork_template::knot::DEFAULT_ON_SUCCESS.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnotworkConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub repository: RepositoryOptions,
    #[serde(default)]
    pub templating: TemplatingOptions,
    #[serde(default)]
    pub assembler: AssemblerOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatingOptions {
    #[serde(default = "default_templating_address")]
    pub address: String,
    /// Transition returned after rendering. Empty ends the pipeline.
    #[serde(default = "default_on_success")]
    pub on_success: String,
    #[serde(flatten)]
    pub engine: TemplateEngineConfig,
}

impl Default for TemplatingOptions {
    fn default() -> Self {
        Self {
            address: default_templating_address(),
            on_success: default_on_success(),
            engine: TemplateEngineConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssemblerOptions {
    #[serde(default = "default_assembler_address")]
    pub address: String,
    #[serde(default)]
    pub strategy: UnprocessedStrategy,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            address: default_assembler_address(),
            strategy: UnprocessedStrategy::default(),
        }
    }
}

impl KnotworkConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Instantiate the stock knots under their configured addresses.
    pub fn build_registry(&self) -> Result<KnotRegistry> {
        let engine = TemplateEngine::from_config(&self.templating.engine)
            .context("Failed to build the template engine")?;
        let on_success = Some(self.templating.on_success.clone()).filter(|t| !t.is_empty());

        Ok(KnotRegistry::new()
            .register(
                self.templating.address.clone(),
                TemplatingKnot::new(Arc::new(engine)).with_on_success(on_success),
            )
            .register(
                self.assembler.address.clone(),
                FragmentAssemblerKnot::new(self.assembler.strategy),
            ))
    }
}
