//! Snippet markup: the Handlebars template and the services it needs.
//!
//! ```html
//! <script data-service="/service/mock/first.json"
//!         data-service-labels="/service/labels?lang={param.lang}"
//!         type="text/x-handlebars-template">
//!   <h2>{{message}}</h2><p>{{labels.title}}</p>
//! </script>
//! ```

use crate::error::TemplateError;
use knotwork_core::ClientRequest;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use std::sync::LazyLock;

const SERVICE_ATTRIBUTE: &str = "data-service";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(param|header|uri)\.([^{}]+)\}").expect("placeholder pattern is valid")
});

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("script selector is valid"));

/// A service a snippet asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBinding {
    /// `None` merges the result into the root of the render context.
    namespace: Option<String>,
    uri: String,
}

impl ServiceBinding {
    pub fn new(namespace: Option<String>, uri: impl Into<String>) -> Self {
        Self {
            namespace,
            uri: uri.into(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The URI with `{param.*}`, `{header.*}` and `{uri.path}` filled in from
    /// the client request. Anything that cannot be resolved becomes empty.
    ///
    /// Parameter and header values are percent-encoded, so they cannot add
    /// query parameters or path segments to the backend call.
    pub fn resolve_uri(&self, request: &ClientRequest) -> String {
        PLACEHOLDER
            .replace_all(&self.uri, |caps: &Captures| {
                let name = &caps[2];
                let value = match &caps[1] {
                    "param" => request
                        .param(name)
                        .or_else(|| request.form_attribute(name)),
                    "header" => request
                        .headers
                        .get(name)
                        .and_then(|value| value.to_str().ok()),
                    "uri" if name == "path" => return request.path.clone(),
                    _ => None,
                };
                form_urlencoded::byte_serialize(value.unwrap_or_default().as_bytes()).collect()
            })
            .into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    template: String,
    services: Vec<ServiceBinding>,
}

impl Snippet {
    /// Reads the first `<script>` element of `content`. Without one, the
    /// whole content is the template and no service is called.
    pub fn parse(content: &str) -> Result<Self, TemplateError> {
        let document = Html::parse_fragment(content);
        let Some(script) = document.select(&SCRIPT).next() else {
            return Ok(Self {
                template: content.to_string(),
                services: Vec::new(),
            });
        };

        let mut services = Vec::new();
        for (name, value) in script.value().attrs() {
            let Some(rest) = name.strip_prefix(SERVICE_ATTRIBUTE) else {
                continue;
            };
            let namespace = match rest {
                "" => None,
                rest => match rest.strip_prefix('-') {
                    Some(namespace) if !namespace.is_empty() => Some(namespace.to_string()),
                    _ => {
                        return Err(TemplateError::Snippet(format!(
                            "unsupported service attribute '{name}'"
                        )));
                    }
                },
            };
            services.push(ServiceBinding::new(namespace, value));
        }
        // Unnamed first, then named in lexical order.
        services.sort_by(|a, b| {
            (a.namespace.is_some(), &a.namespace).cmp(&(b.namespace.is_some(), &b.namespace))
        });

        Ok(Self {
            template: script.text().collect(),
            services,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn services(&self) -> &[ServiceBinding] {
        &self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, Method};

    #[test]
    fn reads_template_and_services() {
        let snippet = Snippet::parse(
            r#"<script data-service-zeta="/z" data-service="/root" data-service-alpha="/a" type="text/x-handlebars-template"><p>{{message}}</p></script>"#,
        )
        .unwrap();

        assert_eq!(snippet.template(), "<p>{{message}}</p>");
        let order: Vec<_> = snippet.services().iter().map(|s| s.namespace()).collect();
        assert_eq!(order, vec![None, Some("alpha"), Some("zeta")]);
        assert_eq!(snippet.services()[0].uri(), "/root");
    }

    #[test]
    fn content_without_script_is_its_own_template() {
        let snippet = Snippet::parse("<div>{{static}}</div>").unwrap();
        assert_eq!(snippet.template(), "<div>{{static}}</div>");
        assert!(snippet.services().is_empty());
    }

    #[test]
    fn script_without_services_renders_statically() {
        let snippet =
            Snippet::parse(r#"<script type="text/x-handlebars-template">hi</script>"#).unwrap();
        assert_eq!(snippet.template(), "hi");
        assert!(snippet.services().is_empty());
    }

    #[test]
    fn dangling_service_prefix_is_rejected() {
        let err = Snippet::parse(r#"<script data-service-="/x">a</script>"#).unwrap_err();
        assert!(matches!(err, TemplateError::Snippet(_)));
    }

    #[test]
    fn placeholders_come_from_the_request() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user", HeaderValue::from_static("42"));
        let request = ClientRequest::new(Method::POST, "/products.html")
            .with_headers(headers)
            .with_params(vec![("lang".into(), "en".into())])
            .with_form_attributes(vec![("sku".into(), "A-1".into())]);

        let binding = ServiceBinding::new(
            None,
            "/service/{uri.path}?lang={param.lang}&sku={param.sku}&user={header.x-user}&x={param.missing}{uri.query}",
        );
        assert_eq!(
            binding.resolve_uri(&request),
            "/service//products.html?lang=en&sku=A-1&user=42&x="
        );
    }

    #[test]
    fn substituted_values_are_encoded() {
        let request = ClientRequest::new(Method::GET, "/p.html")
            .with_params(vec![("q".into(), "a&admin=1 /x".into())]);
        let binding = ServiceBinding::new(None, "/service/search?q={param.q}");
        assert_eq!(
            binding.resolve_uri(&request),
            "/service/search?q=a%26admin%3D1+%2Fx"
        );
    }

    #[test]
    fn plain_uris_are_untouched() {
        let binding = ServiceBinding::new(Some("a".into()), "/service/mock/first.json");
        assert_eq!(
            binding.resolve_uri(&ClientRequest::default()),
            "/service/mock/first.json"
        );
    }
}
