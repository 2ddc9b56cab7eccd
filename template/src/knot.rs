use crate::engine::TemplateEngine;
use async_trait::async_trait;
use knotwork_core::{Fragment, Knot, KnotContext, KnotError, KnotResult};
use std::sync::Arc;

pub const DEFAULT_ON_SUCCESS: &str = "next";

/// Renders snippet fragments and hands the page on.
///
/// Fragments are replaced by raw fragments holding the rendered output;
/// empty outputs are dropped.
#[derive(Debug, Clone)]
pub struct TemplatingKnot {
    engine: Arc<TemplateEngine>,
    on_success: Option<String>,
}

impl TemplatingKnot {
    pub fn new(engine: Arc<TemplateEngine>) -> Self {
        Self {
            engine,
            on_success: Some(DEFAULT_ON_SUCCESS.to_string()),
        }
    }

    /// `None` ends the pipeline after rendering.
    pub fn with_on_success(mut self, transition: Option<String>) -> Self {
        self.on_success = transition;
        self
    }
}

#[async_trait]
impl Knot for TemplatingKnot {
    async fn process(&self, mut context: KnotContext) -> KnotResult {
        let outputs = self
            .engine
            .process(&mut context)
            .await
            .map_err(KnotError::failed)?;

        context.fragments = outputs
            .into_iter()
            .filter_map(|output| Fragment::raw(output).ok())
            .collect();
        context.transition = self.on_success.clone();
        Ok(context)
    }
}
