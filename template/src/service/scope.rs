use super::{CallKey, PreparedCall, ServiceData, ServiceEngine, ServiceError};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

type SharedCall = Shared<BoxFuture<'static, Result<Arc<ServiceData>, Arc<ServiceError>>>>;

/// Coalesces identical backend calls made while rendering one page.
///
/// The first caller for a [`CallKey`] issues the request; everyone else with
/// the same key awaits the same result, including callers that arrive after
/// it completed. A scope lives for exactly one page request.
#[derive(Default)]
pub struct CallScope {
    calls: Mutex<HashMap<CallKey, SharedCall>>,
    issued: AtomicUsize,
}

impl CallScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn call(
        &self,
        engine: &ServiceEngine,
        call: PreparedCall,
    ) -> Result<Arc<ServiceData>, Arc<ServiceError>> {
        let shared = {
            let mut calls = self.calls.lock();
            calls
                .entry(call.key())
                .or_insert_with(|| {
                    self.issued.fetch_add(1, Ordering::Relaxed);
                    let engine = engine.clone();
                    async move {
                        engine
                            .execute(&call)
                            .await
                            .map(Arc::new)
                            .map_err(Arc::new)
                    }
                    .boxed()
                    .shared()
                })
                .clone()
        };
        shared.await
    }

    /// Distinct backend requests issued through this scope.
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for CallScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallScope")
            .field("issued", &self.issued())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientOptions;
    use crate::service::{ServiceCallMethod, ServiceConfig, ServiceEntry};
    use futures_util::future::join_all;
    use http::Method;
    use knotwork_core::ClientRequest;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(server: &MockServer) -> ServiceEntry {
        let address = server.address();
        ServiceEntry::from_config(&ServiceConfig {
            path: ".*".into(),
            host: address.ip().to_string(),
            port: address.port(),
            method: ServiceCallMethod::Get,
            allowed_request_headers: vec![],
            require_success: false,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn concurrent_identical_calls_share_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "n": 1 }))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let engine = ServiceEngine::new(&ClientOptions::default()).unwrap();
        let entry = entry(&server);
        let request = ClientRequest::new(Method::GET, "/");
        let scope = CallScope::new();

        let calls = (0..5).map(|_| {
            let call = engine.prepare(&entry, "/service/a", &request).unwrap();
            scope.call(&engine, call)
        });
        let results = join_all(calls).await;

        assert!(results.iter().all(|r| r.as_ref().is_ok_and(|d| d["n"] == 1)));
        assert_eq!(scope.issued(), 1);
    }

    #[tokio::test]
    async fn later_identical_call_reuses_completed_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(2)
            .mount(&server)
            .await;

        let engine = ServiceEngine::new(&ClientOptions::default()).unwrap();
        let entry = entry(&server);
        let request = ClientRequest::new(Method::GET, "/");
        let scope = CallScope::new();

        for uri in ["/service/a", "/service/a", "/service/b"] {
            let call = engine.prepare(&entry, uri, &request).unwrap();
            scope.call(&engine, call).await.unwrap();
        }
        assert_eq!(scope.issued(), 2);
    }

    #[tokio::test]
    async fn failures_are_shared_too() {
        let engine = ServiceEngine::new(&ClientOptions::default()).unwrap();
        let entry = ServiceEntry::from_config(&ServiceConfig {
            path: ".*".into(),
            host: "127.0.0.1".into(),
            port: 1,
            method: ServiceCallMethod::Get,
            allowed_request_headers: vec![],
            require_success: false,
        })
        .unwrap();
        let request = ClientRequest::new(Method::GET, "/");
        let scope = CallScope::new();

        let first = scope
            .call(&engine, engine.prepare(&entry, "/x", &request).unwrap())
            .await
            .unwrap_err();
        let second = scope
            .call(&engine, engine.prepare(&entry, "/x", &request).unwrap())
            .await
            .unwrap_err();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(scope.issued(), 1);
    }
}
