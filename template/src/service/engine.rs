use super::{BackendFailure, ServiceEntry, ServiceError};
use crate::config::ClientOptions;
use crate::error::ConfigError;
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use knotwork_core::ClientRequest;
use serde_json::{Map, Value, json};

/// JSON object returned by a backend, plus `_response.statusCode`.
pub type ServiceData = Map<String, Value>;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Everything needed to issue one backend request.
#[derive(Debug, Clone)]
pub struct PreparedCall {
    pub uri: String,
    pub host: String,
    pub port: u16,
    pub method: Method,
    /// Already filtered by the service's allowed headers.
    pub headers: HeaderMap,
    /// Url-encoded form attributes; only present for a POST with a form.
    pub body: Option<Bytes>,
    pub require_success: bool,
}

impl PreparedCall {
    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.uri)
    }

    /// Identity of the request for coalescing.
    pub fn key(&self) -> CallKey {
        let mut headers: Vec<(String, Vec<u8>)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect();
        headers.sort();

        CallKey {
            host: self.host.clone(),
            port: self.port,
            uri: self.uri.clone(),
            method: self.method.clone(),
            headers,
            body: self.body.clone(),
        }
    }
}

/// Two calls with equal keys would send byte-identical requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallKey {
    host: String,
    port: u16,
    uri: String,
    method: Method,
    headers: Vec<(String, Vec<u8>)>,
    body: Option<Bytes>,
}

/// Issues backend requests.
#[derive(Debug, Clone)]
pub struct ServiceEngine {
    client: reqwest::Client,
}

impl ServiceEngine {
    pub fn new(options: &ClientOptions) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn prepare(
        &self,
        entry: &ServiceEntry,
        uri: &str,
        request: &ClientRequest,
    ) -> Result<PreparedCall, ServiceError> {
        let method = entry.method_for(&request.method);
        let headers = entry.allowed_headers().filter(&request.headers);

        let body = if method == Method::POST && !request.form_attributes.is_empty() {
            let encoded = serde_urlencoded::to_string(&request.form_attributes)
                .map_err(|e| ServiceError::backend(uri, e))?;
            Some(Bytes::from(encoded))
        } else {
            None
        };

        Ok(PreparedCall {
            uri: uri.to_string(),
            host: entry.host().to_string(),
            port: entry.port(),
            method,
            headers,
            body,
            require_success: entry.require_success(),
        })
    }

    pub async fn execute(&self, call: &PreparedCall) -> Result<ServiceData, ServiceError> {
        let url = call.url();
        tracing::debug!(method = %call.method, %url, "Calling service");

        let mut headers = call.headers.clone();
        let mut builder = self.client.request(call.method.clone(), &url);
        if let Some(body) = &call.body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            builder = builder.body(body.clone());
        }
        let builder = builder.headers(headers);

        let response = builder
            .send()
            .await
            .map_err(|e| ServiceError::backend(&call.uri, e))?;
        let status = response.status();
        if call.require_success && !status.is_success() {
            return Err(ServiceError::backend(
                &call.uri,
                BackendFailure::Status(status),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::backend(&call.uri, e))?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| ServiceError::backend(&call.uri, e))?;
        let Value::Object(mut data) = value else {
            return Err(ServiceError::backend(
                &call.uri,
                BackendFailure::NotAnObject,
            ));
        };

        tracing::trace!(uri = %call.uri, %status, body = %String::from_utf8_lossy(&bytes), "Service responded");
        data.insert(
            "_response".to_string(),
            json!({ "statusCode": status.as_u16() }),
        );
        Ok(data)
    }

    /// [`prepare`](Self::prepare) then [`execute`](Self::execute), without
    /// coalescing.
    pub async fn call(
        &self,
        entry: &ServiceEntry,
        uri: &str,
        request: &ClientRequest,
    ) -> Result<ServiceData, ServiceError> {
        let call = self.prepare(entry, uri, request)?;
        self.execute(&call).await
    }
}
