//! Where page templates come from.

use async_trait::async_trait;
use knotwork_core::ClientRequest;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

const INDEX_FILE: &str = "index.html";

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Path '{0}' escapes the repository root")]
    InvalidPath(String),
    #[error("Cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// The template for `request`, or `None` when there is none.
    async fn fetch(&self, request: &ClientRequest) -> Result<Option<String>, RepositoryError>;
}

/// Serves templates from a directory.
#[derive(Debug, Clone)]
pub struct FilesystemRepository {
    root: PathBuf,
}

impl FilesystemRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, request_path: &str) -> Result<PathBuf, RepositoryError> {
        let relative = Path::new(request_path.trim_start_matches('/'));
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => return Err(RepositoryError::InvalidPath(request_path.to_string())),
            }
        }
        if request_path.is_empty() || request_path.ends_with('/') {
            path.push(INDEX_FILE);
        }
        Ok(path)
    }
}

#[async_trait]
impl Repository for FilesystemRepository {
    async fn fetch(&self, request: &ClientRequest) -> Result<Option<String>, RepositoryError> {
        let mut path = self.resolve(&request.path)?;
        if tokio::fs::metadata(&path)
            .await
            .is_ok_and(|metadata| metadata.is_dir())
        {
            path.push(INDEX_FILE);
        }

        match tokio::fs::read_to_string(&path).await {
            Ok(template) => {
                tracing::debug!(path = %path.display(), "Template loaded");
                Ok(Some(template))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Template not found");
                Ok(None)
            }
            Err(source) => Err(RepositoryError::Read { path, source }),
        }
    }
}
