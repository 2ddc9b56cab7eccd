use crate::context::KnotContext;
use async_trait::async_trait;
use std::any::type_name;
use std::time::Duration;
use thiserror::Error;

pub type KnotResult = Result<KnotContext, KnotError>;

#[derive(Error, Debug)]
pub enum KnotError {
    #[error("Knot did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Internal knot error: {0}")]
    Internal(String),
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl KnotError {
    /// Wrap any error raised by the knot's own business logic.
    pub fn failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Failed(anyhow::Error::new(error))
    }
}

/// A content-processing stage.
///
/// Knots are addressed by name through the runtime registry; the router only
/// ever talks to them through this contract. A knot returns the context it
/// was given (possibly modified) and may set `transition` to pick the next
/// stage. Leaving it unset ends the pipeline.
#[async_trait]
pub trait Knot: Send + Sync + 'static {
    /// Human readable name used in spans and logs.
    fn label(&self) -> String {
        let full = type_name::<Self>();
        full.split("::").last().unwrap_or(full).to_string()
    }

    async fn process(&self, context: KnotContext) -> KnotResult;
}
