//! # KnotServer: HTTP Entry Point
//!
//! Matches an incoming request against the configured routes, loads its
//! template from the [`Repository`], splits it into fragments and runs the
//! knot pipeline that starts at the route's address. The final
//! [`ClientResponse`](knotwork_core::ClientResponse) becomes the HTTP
//! response.
//!
//! `KnotServer` is also a plain `tower::Service`, so it can be mounted in an
//! existing Tower stack instead of using [`KnotServer::run`].

use crate::config::{RouteConfig, ServerConfig};
use crate::error::HttpError;
use crate::repository::Repository;
use crate::request::client_request;
use crate::response::{HttpResponse, into_response, status_response};
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use http_body::Body;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use knotwork_core::{ClientRequest, KnotContext, Splitter};
use knotwork_runtime::{KnotRegistry, Termination, TransitionRouter, TransitionTable};
use regex::Regex;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::net::TcpListener;
use tower::Service;
use tracing::Instrument;

/// A [`RouteConfig`] ready for matching.
#[derive(Debug)]
struct Route {
    method: Method,
    path: Regex,
    address: String,
    on_transition: TransitionTable,
}

impl Route {
    fn compile(config: &RouteConfig) -> Result<Self, HttpError> {
        let invalid = |reason: String| HttpError::InvalidRoute {
            path: config.path.clone(),
            reason,
        };
        let method = Method::from_bytes(config.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| invalid(e.to_string()))?;
        let path = Regex::new(&format!("^(?:{})$", config.path)).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            method,
            path,
            address: config.address.clone(),
            on_transition: config.on_transition.clone(),
        })
    }

    fn matches(&self, request: &ClientRequest) -> bool {
        self.method == request.method && self.path.is_match(&request.path)
    }
}

struct Inner {
    bind: String,
    routes: Vec<Route>,
    router: TransitionRouter,
    repository: Arc<dyn Repository>,
    splitter: Arc<dyn Splitter>,
}

#[derive(Clone)]
pub struct KnotServer {
    inner: Arc<Inner>,
}

impl KnotServer {
    pub fn new(
        config: &ServerConfig,
        registry: KnotRegistry,
        repository: Arc<dyn Repository>,
        splitter: Arc<dyn Splitter>,
    ) -> Result<Self, HttpError> {
        let routes = config
            .routes
            .iter()
            .map(Route::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            inner: Arc::new(Inner {
                bind: config.bind.clone(),
                routes,
                router: TransitionRouter::new(registry, config.delivery),
                repository,
                splitter,
            }),
        })
    }

    pub fn router(&self) -> &TransitionRouter {
        &self.inner.router
    }

    /// Serve one request. Never fails: errors become 4xx/5xx responses.
    pub async fn handle<B>(&self, request: Request<B>) -> HttpResponse
    where
        B: Body<Data = Bytes> + Send,
        B::Error: std::fmt::Display,
    {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "HTTPRequest",
            knotwork.http.method = %request.method(),
            knotwork.http.path = %request.uri().path(),
            knotwork.http.request_id = %request_id
        );

        async move {
            match self.dispatch(request).await {
                Ok(response) => {
                    tracing::info!(status = %response.status(), "Request handled");
                    response
                }
                Err(e) => {
                    let status = e.status();
                    tracing::error!(error = %e, %status, "Request failed");
                    status_response(status)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn dispatch<B>(&self, request: Request<B>) -> Result<HttpResponse, HttpError>
    where
        B: Body<Data = Bytes> + Send,
        B::Error: std::fmt::Display,
    {
        let client = client_request(request).await?;

        let Some(route) = self.inner.routes.iter().find(|route| route.matches(&client)) else {
            tracing::debug!("No route matches the request");
            return Ok(status_response(StatusCode::NOT_FOUND));
        };
        let Some(template) = self.inner.repository.fetch(&client).await? else {
            return Ok(status_response(StatusCode::NOT_FOUND));
        };

        let fragments = self.inner.splitter.split(&template);
        tracing::debug!(fragments = fragments.len(), address = %route.address, "Routing request");

        let context = KnotContext::new(client).with_fragments(fragments);
        let routed = self
            .inner
            .router
            .route(context, &route.address, &route.on_transition)
            .await?;

        if let Termination::UnresolvedTransition {
            address,
            transition,
        } = &routed.termination
        {
            tracing::debug!(%address, %transition, hops = routed.hops, "Pipeline ended on an unmapped transition");
        }
        Ok(into_response(routed.context.client_response))
    }

    /// Bind the configured address and serve until the listener fails.
    pub async fn run(self) -> Result<(), HttpError> {
        let addr: SocketAddr = self
            .inner
            .bind
            .parse()
            .map_err(|_| HttpError::InvalidAddress(self.inner.bind.clone()))?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections accepted from `listener`.
    pub async fn serve(self, listener: TcpListener) -> Result<(), HttpError> {
        tracing::info!("Knotwork HTTP server listening on http://{}", listener.local_addr()?);

        loop {
            let (stream, peer) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let service = TowerToHyperService::new(self.clone());

            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::error!(%peer, "Error serving connection: {:?}", err);
                }
            });
        }
    }
}

impl std::fmt::Debug for KnotServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnotServer")
            .field("bind", &self.inner.bind)
            .field("routes", &self.inner.routes)
            .field("router", &self.inner.router)
            .finish()
    }
}

impl<B> Service<Request<B>> for KnotServer
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: std::fmt::Display,
{
    type Response = HttpResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let server = self.clone();
        Box::pin(async move { Ok(server.handle(request).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    #[test]
    fn route_matching_is_anchored_and_method_aware() {
        let route = Route::compile(&RouteConfig {
            method: "post".into(),
            path: "/form/.*".into(),
            address: "a".into(),
            on_transition: TransitionTable::new(),
        })
        .unwrap();

        assert!(route.matches(&ClientRequest::new(Method::POST, "/form/x.html")));
        assert!(!route.matches(&ClientRequest::new(Method::GET, "/form/x.html")));
        assert!(!route.matches(&ClientRequest::new(Method::POST, "/other/form/x.html")));
    }

    #[test]
    fn invalid_route_pattern_is_rejected() {
        let config = ServerConfig {
            routes: vec![RouteConfig {
                method: "GET".into(),
                path: "/broken/(".into(),
                address: "a".into(),
                on_transition: TransitionTable::new(),
            }],
            ..Default::default()
        };
        let err = KnotServer::new(
            &config,
            KnotRegistry::new(),
            Arc::new(crate::FilesystemRepository::new(".")),
            Arc::new(NoSplit),
        )
        .unwrap_err();
        assert!(matches!(err, HttpError::InvalidRoute { .. }));
    }

    struct NoSplit;

    impl Splitter for NoSplit {
        fn split(&self, _template: &str) -> Vec<knotwork_core::Fragment> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn unmatched_route_is_not_found() {
        let server = KnotServer::new(
            &ServerConfig::default(),
            KnotRegistry::new(),
            Arc::new(crate::FilesystemRepository::new(".")),
            Arc::new(NoSplit),
        )
        .unwrap();

        let request = Request::get("/anything").body(Full::new(Bytes::new())).unwrap();
        let response = server.handle(request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
