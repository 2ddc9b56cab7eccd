use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use knotwork_core::{Fragment, Knot, KnotContext, KnotResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SCRIPT_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*<script\b[^>]*>(.*)</script\s*>\s*$").expect("wrapper pattern is valid")
});

/// What to emit for a snippet nobody rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnprocessedStrategy {
    /// Emit the snippet markup untouched.
    #[default]
    AsIs,
    /// Emit the body of the snippet's script tag.
    Unwrap,
    /// Emit nothing.
    Ignore,
}

impl UnprocessedStrategy {
    fn apply<'a>(&self, fragment: &'a Fragment) -> &'a str {
        if fragment.is_raw() {
            return fragment.content();
        }
        match self {
            UnprocessedStrategy::AsIs => fragment.content(),
            UnprocessedStrategy::Unwrap => SCRIPT_WRAPPER
                .captures(fragment.content())
                .and_then(|caps| caps.get(1))
                .map_or(fragment.content(), |body| body.as_str()),
            UnprocessedStrategy::Ignore => "",
        }
    }
}

/// Joins the fragments into the client response body.
///
/// Usually the last knot of a pipeline: it never sets a transition. A
/// context left without fragments, such as a page whose snippets all
/// rendered to nothing, assembles to an empty body.
#[derive(Debug, Clone, Default)]
pub struct FragmentAssemblerKnot {
    strategy: UnprocessedStrategy,
}

impl FragmentAssemblerKnot {
    pub fn new(strategy: UnprocessedStrategy) -> Self {
        Self { strategy }
    }

    pub fn assemble(&self, fragments: &[Fragment]) -> String {
        fragments
            .iter()
            .map(|fragment| self.strategy.apply(fragment))
            .collect()
    }
}

#[async_trait]
impl Knot for FragmentAssemblerKnot {
    async fn process(&self, mut context: KnotContext) -> KnotResult {
        let body = self.assemble(&context.fragments);
        tracing::debug!(bytes = body.len(), "Fragments assembled");

        let response = &mut context.client_response;
        response.status = StatusCode::OK;
        response.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        response.body = Bytes::from(body);
        context.transition = None;
        Ok(context)
    }
}
