use crate::repository::RepositoryError;
use http::StatusCode;
use knotwork_runtime::RouterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Invalid route '{path}': {reason}")]
    InvalidRoute { path: String, reason: String },
    #[error("Cannot read request body: {0}")]
    Body(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Router(#[from] RouterError),
    #[error("Invalid bind address '{0}'")]
    InvalidAddress(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// Status sent to the client when this error ends a request.
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Body(_) => StatusCode::BAD_REQUEST,
            HttpError::Repository(RepositoryError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
