//! # Knotwork Template
//!
//! Turns snippet fragments into markup.
//!
//! For every snippet the engine reads the services it declares, resolves each
//! one against the configured [`ServiceEntry`] list, calls the backend once
//! per unique request and renders the snippet's Handlebars template against
//! the merged results. Raw fragments pass through untouched.

pub mod config;
pub mod engine;
pub mod error;
pub mod knot;
pub mod service;
pub mod snippet;

pub use config::{ClientOptions, TemplateEngineConfig};
pub use engine::TemplateEngine;
pub use error::{ConfigError, TemplateError};
pub use knot::TemplatingKnot;
pub use service::{
    AllowedHeadersFilter, BackendFailure, CallKey, CallScope, PreparedCall, ServiceCallMethod,
    ServiceConfig, ServiceData, ServiceEngine, ServiceEntry, ServiceError, ServiceResolver,
};
pub use snippet::{ServiceBinding, Snippet};
