//! # Knotwork HTTP
//!
//! Hyper 1.0 ingress for a knot pipeline.
//!
//! ```rust,ignore
//! let server = KnotServer::new(&config.server, registry, repository, splitter)?;
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod ingress;
pub mod repository;
pub mod request;
pub mod response;

pub use config::{RepositoryOptions, RouteConfig, ServerConfig};
pub use error::HttpError;
pub use ingress::KnotServer;
pub use repository::{FilesystemRepository, Repository, RepositoryError};

pub mod prelude {
    pub use crate::config::{RepositoryOptions, RouteConfig, ServerConfig};
    pub use crate::error::HttpError;
    pub use crate::ingress::KnotServer;
    pub use crate::repository::{FilesystemRepository, Repository};
}
