//! Backend services: which one answers a URI, and how it is called.

mod engine;
mod entry;
mod headers;
mod resolver;
mod scope;

pub use engine::{CallKey, PreparedCall, ServiceData, ServiceEngine};
pub use entry::{ServiceCallMethod, ServiceConfig, ServiceEntry};
pub use headers::AllowedHeadersFilter;
pub use resolver::ServiceResolver;
pub use scope::CallScope;

use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// No configured service path matches the URI.
    #[error("No service configured for '{uri}'")]
    NotFound { uri: String },
    #[error("Service call to '{uri}' failed: {source}")]
    BackendCall {
        uri: String,
        #[source]
        source: BackendFailure,
    },
}

impl ServiceError {
    pub(crate) fn backend(uri: &str, source: impl Into<BackendFailure>) -> Self {
        Self::BackendCall {
            uri: uri.to_string(),
            source: source.into(),
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            ServiceError::NotFound { uri } | ServiceError::BackendCall { uri, .. } => uri,
        }
    }
}

#[derive(Error, Debug)]
pub enum BackendFailure {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("response is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("response is not a JSON object")]
    NotAnObject,
    #[error("cannot encode form body: {0}")]
    FormEncoding(#[from] serde_urlencoded::ser::Error),
}
