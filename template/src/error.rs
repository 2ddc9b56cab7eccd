use crate::service::ServiceError;
use std::sync::Arc;
use thiserror::Error;

/// Raised while turning configuration into runtime objects.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Any failure that aborts the render of a page.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Shared because one failed backend call fails every fragment waiting on it.
    #[error(transparent)]
    Service(#[from] Arc<ServiceError>),
    #[error("Invalid snippet: {0}")]
    Snippet(String),
    #[error("Template rendering failed: {0}")]
    Render(#[from] Box<handlebars::RenderError>),
}

impl From<ServiceError> for TemplateError {
    fn from(error: ServiceError) -> Self {
        Self::Service(Arc::new(error))
    }
}

impl From<handlebars::RenderError> for TemplateError {
    fn from(error: handlebars::RenderError) -> Self {
        Self::Render(Box::new(error))
    }
}
