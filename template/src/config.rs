use crate::service::ServiceConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_client_timeout_ms() -> u64 {
    10_000
}

/// Options for the HTTP client used to reach backend services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    #[serde(default = "default_client_timeout_ms")]
    pub timeout_ms: u64,
}

impl ClientOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: default_client_timeout_ms(),
        }
    }
}

/// Everything the template engine needs at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateEngineConfig {
    /// Ordered; the first entry whose path matches wins.
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    #[serde(default)]
    pub client: ClientOptions,
}
