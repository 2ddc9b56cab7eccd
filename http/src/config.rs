use knotwork_runtime::{DeliveryOptions, TransitionTable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_bind() -> String {
    "127.0.0.1:8092".to_string()
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub delivery: DeliveryOptions,
    /// Tried in order; the first route matching method and path handles the
    /// request.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            delivery: DeliveryOptions::default(),
            routes: Vec::new(),
        }
    }
}

/// Entry point of a knot pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_method")]
    pub method: String,
    /// Regular expression matched against the whole request path.
    pub path: String,
    /// Address of the first knot.
    pub address: String,
    #[serde(default)]
    pub on_transition: TransitionTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOptions {
    pub root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_with_nested_transitions() {
        let config: ServerConfig = toml::from_str(
            r#"
            bind = "0.0.0.0:9000"

            [delivery]
            timeout_ms = 1000

            [[routes]]
            path = "/content/.*"
            address = "knotwork.knot.templating"

            [routes.on_transition.next]
            address = "knotwork.knot.assembler"

            [[routes]]
            method = "POST"
            path = "/form/.*"
            address = "knotwork.knot.templating"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.delivery.timeout_ms, 1000);
        assert_eq!(config.routes[0].method, "GET");
        assert_eq!(
            config.routes[0].on_transition["next"].address,
            "knotwork.knot.assembler"
        );
        assert!(config.routes[1].on_transition.is_empty());
    }

    #[test]
    fn everything_has_a_default() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.bind, "127.0.0.1:8092");
        assert!(config.routes.is_empty());
    }
}
