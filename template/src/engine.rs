use crate::config::TemplateEngineConfig;
use crate::error::{ConfigError, TemplateError};
use crate::service::{CallScope, ServiceData, ServiceEngine, ServiceResolver};
use crate::snippet::{ServiceBinding, Snippet};
use futures_util::future::try_join_all;
use handlebars::Handlebars;
use knotwork_core::{ClientRequest, Fragment, KnotContext};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::Instrument;

/// Renders every fragment of a page.
pub struct TemplateEngine {
    resolver: ServiceResolver,
    services: ServiceEngine,
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new(resolver: ServiceResolver, services: ServiceEngine) -> Self {
        Self {
            resolver,
            services,
            handlebars: Handlebars::new(),
        }
    }

    pub fn from_config(config: &TemplateEngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            ServiceResolver::from_configs(&config.services)?,
            ServiceEngine::new(&config.client)?,
        ))
    }

    pub fn resolver(&self) -> &ServiceResolver {
        &self.resolver
    }

    /// The rendered page: every fragment output, in order.
    pub async fn render(&self, context: &mut KnotContext) -> Result<String, TemplateError> {
        Ok(self.process(context).await?.concat())
    }

    /// One output per fragment, in fragment order.
    ///
    /// Snippets are rendered concurrently. Identical service requests are
    /// issued once for the whole page. The first failure aborts the page.
    pub async fn process(&self, context: &mut KnotContext) -> Result<Vec<String>, TemplateError> {
        let scope = CallScope::new();
        let request = &context.client_request;
        let request_doc = request_document(request);

        let outputs = try_join_all(
            context
                .fragments
                .iter_mut()
                .enumerate()
                .map(|(index, fragment)| {
                    let span = tracing::debug_span!("Fragment", index, id = %fragment.id());
                    self.process_fragment(fragment, request, &request_doc, &scope)
                        .instrument(span)
                }),
        )
        .await?;

        tracing::debug!(
            fragments = outputs.len(),
            service_calls = scope.issued(),
            "Page rendered"
        );
        Ok(outputs)
    }

    async fn process_fragment(
        &self,
        fragment: &mut Fragment,
        request: &ClientRequest,
        request_doc: &Value,
        scope: &CallScope,
    ) -> Result<String, TemplateError> {
        if fragment.is_raw() {
            return Ok(fragment.content().to_string());
        }

        let snippet = Snippet::parse(fragment.content())?;
        let results = try_join_all(
            snippet
                .services()
                .iter()
                .map(|binding| self.fetch(binding, request, scope)),
        )
        .await?;

        let data = fragment.context_mut();
        data.insert("_request".to_string(), request_doc.clone());
        for (binding, result) in snippet.services().iter().zip(results) {
            match binding.namespace() {
                None => data.extend(result.iter().map(|(k, v)| (k.clone(), v.clone()))),
                Some(name) => {
                    data.insert(name.to_string(), Value::Object(ServiceData::clone(&result)));
                }
            }
        }

        Ok(self
            .handlebars
            .render_template(snippet.template(), fragment.context())?)
    }

    async fn fetch(
        &self,
        binding: &ServiceBinding,
        request: &ClientRequest,
        scope: &CallScope,
    ) -> Result<Arc<ServiceData>, TemplateError> {
        let uri = binding.resolve_uri(request);
        let entry = self.resolver.resolve(&uri)?;
        let call = self.services.prepare(&entry, &uri, request)?;
        Ok(scope.call(&self.services, call).await?)
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("services", &self.resolver.len())
            .finish()
    }
}

/// `_request` as seen by templates.
fn request_document(request: &ClientRequest) -> Value {
    fn pairs(values: &[(String, String)]) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in values {
            map.entry(key.clone())
                .or_insert_with(|| Value::String(value.clone()));
        }
        map
    }

    json!({
        "method": request.method.as_str(),
        "path": request.path,
        "params": pairs(&request.params),
        "form": pairs(&request.form_attributes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn engine() -> TemplateEngine {
        TemplateEngine::from_config(&TemplateEngineConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn raw_only_page_is_returned_verbatim() {
        let mut context = KnotContext::default().with_fragments(vec![
            Fragment::raw("<html>").unwrap(),
            Fragment::raw("</html>").unwrap(),
        ]);
        assert_eq!(engine().render(&mut context).await.unwrap(), "<html></html>");
    }

    #[tokio::test]
    async fn snippet_sees_the_request() {
        let request = ClientRequest::new(Method::GET, "/hello.html")
            .with_params(vec![("name".into(), "Ada".into()), ("name".into(), "Bob".into())]);
        let mut context = KnotContext::new(request).with_fragments(vec![
            Fragment::snippet(
                "_snippet",
                r#"<script type="text/x-handlebars-template">{{_request.path}}: {{_request.params.name}}</script>"#,
            )
            .unwrap(),
        ]);

        let page = engine().render(&mut context).await.unwrap();
        assert_eq!(page, "/hello.html: Ada");
        assert_eq!(context.fragments[0].context()["_request"]["method"], "GET");
    }

    #[tokio::test]
    async fn unresolvable_service_aborts_the_page() {
        let mut context = KnotContext::default().with_fragments(vec![
            Fragment::raw("<p>").unwrap(),
            Fragment::snippet("_snippet", r#"<script data-service="/nowhere">x</script>"#)
                .unwrap(),
        ]);

        let err = engine().render(&mut context).await.unwrap_err();
        assert!(matches!(
            err,
            TemplateError::Service(ref e) if matches!(**e, crate::ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn broken_template_is_a_render_error() {
        let mut context = KnotContext::default().with_fragments(vec![
            Fragment::snippet("_snippet", "{{#if}}").unwrap(),
        ]);
        assert!(matches!(
            engine().render(&mut context).await,
            Err(TemplateError::Render(_))
        ));
    }
}
