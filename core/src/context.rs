use crate::fragment::Fragment;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

/// The client request as received, seen by every knot.
#[derive(Debug, Clone, Default)]
pub struct ClientRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    /// Query parameters in the order they appeared.
    pub params: Vec<(String, String)>,
    /// Decoded `application/x-www-form-urlencoded` body, in insertion order.
    pub form_attributes: Vec<(String, String)>,
    pub body: Bytes,
}

impl ClientRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn with_form_attributes(mut self, form: Vec<(String, String)>) -> Self {
        self.form_attributes = form;
        self
    }

    /// First query parameter with the given name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First form attribute with the given name.
    pub fn form_attribute(&self, name: &str) -> Option<&str> {
        self.form_attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The response being built up by the knots.
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Default for ClientResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

/// The request-scoped value threaded through the knot pipeline.
///
/// Each knot receives the context by value and hands back the (possibly
/// modified) context. `transition` is the outcome of the most recent knot and
/// selects the next one.
#[derive(Debug, Clone, Default)]
pub struct KnotContext {
    pub fragments: Vec<Fragment>,
    pub client_request: ClientRequest,
    pub client_response: ClientResponse,
    pub transition: Option<String>,
}

impl KnotContext {
    pub fn new(client_request: ClientRequest) -> Self {
        Self {
            client_request,
            ..Default::default()
        }
    }

    pub fn with_fragments(mut self, fragments: Vec<Fragment>) -> Self {
        self.fragments = fragments;
        self
    }

    pub fn with_transition(mut self, transition: impl Into<String>) -> Self {
        self.transition = Some(transition.into());
        self
    }
}
