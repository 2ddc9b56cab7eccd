use super::headers::AllowedHeadersFilter;
use crate::error::ConfigError;
use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Methods a service accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceCallMethod {
    #[default]
    Get,
    Post,
}

/// One backend service as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Regular expression matched against the whole service URI.
    pub path: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub method: ServiceCallMethod,
    #[serde(default)]
    pub allowed_request_headers: Vec<String>,
    /// Treat a non-2xx backend status as a failed call.
    #[serde(default)]
    pub require_success: bool,
}

/// A [`ServiceConfig`] with its patterns compiled.
#[derive(Debug, Clone)]
pub struct ServiceEntry {
    path: Regex,
    host: String,
    port: u16,
    method: ServiceCallMethod,
    allowed_headers: AllowedHeadersFilter,
    require_success: bool,
}

impl ServiceEntry {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let path = Regex::new(&format!("^(?:{})$", config.path)).map_err(|source| {
            ConfigError::Pattern {
                pattern: config.path.clone(),
                source,
            }
        })?;

        Ok(Self {
            path,
            host: config.host.clone(),
            port: config.port,
            method: config.method,
            allowed_headers: AllowedHeadersFilter::new(&config.allowed_request_headers)?,
            require_success: config.require_success,
        })
    }

    pub fn matches(&self, uri: &str) -> bool {
        self.path.is_match(uri)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn method(&self) -> ServiceCallMethod {
        self.method
    }

    pub fn allowed_headers(&self) -> &AllowedHeadersFilter {
        &self.allowed_headers
    }

    pub fn require_success(&self) -> bool {
        self.require_success
    }

    /// POST only when the service takes POST and the client posted;
    /// GET otherwise.
    pub fn method_for(&self, client_method: &Method) -> Method {
        if self.method == ServiceCallMethod::Post && client_method == Method::POST {
            Method::POST
        } else {
            Method::GET
        }
    }
}
