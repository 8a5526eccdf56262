//! Backend transport selection.
//!
//! A forwarded request reaches the backend over one of two channels:
//! a direct in-process dispatch when the backend's router lives in the
//! same process, or a network call to the configured origin. The channel
//! is selected once at startup; a failure on the chosen channel is a
//! backend failure, never a trigger to switch channels for that request
//! (switching could double-submit mutations).

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;
use url::Url;

use crate::error::{GatewayError, Result};

/// A channel that can deliver a request to the backend.
#[async_trait]
pub trait BackendTransport: Send + Sync {
    /// Channel name, for logs.
    fn name(&self) -> &'static str;

    /// Deliver the request and return the backend's response.
    async fn dispatch(&self, request: Request<Body>) -> Result<Response>;
}

/// Direct dispatch into a backend router living in this process.
///
/// No network hop, so DNS/TLS/connect failures cannot occur on this
/// channel; only backend-logic errors propagate, as ordinary responses.
pub struct InProcessTransport {
    router: Router,
}

impl InProcessTransport {
    /// Wrap an in-process backend router.
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl BackendTransport for InProcessTransport {
    fn name(&self) -> &'static str {
        "in-process"
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<Response> {
        match self.router.clone().oneshot(request).await {
            Ok(response) => Ok(response),
            Err(infallible) => match infallible {},
        }
    }
}

/// Network dispatch to the backend's configured origin.
pub struct NetworkTransport {
    client: reqwest::Client,
    origin: Url,
}

impl NetworkTransport {
    /// Build a client for the given backend origin.
    ///
    /// Redirects are not followed: 3xx responses belong to the browser,
    /// not the gateway. No total-request timeout is set; cancellation is
    /// driven by the inbound connection.
    pub fn new(origin: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| GatewayError::config_with_source("failed to build HTTP client", e))?;
        Ok(Self { client, origin })
    }
}

#[async_trait]
impl BackendTransport for NetworkTransport {
    fn name(&self) -> &'static str {
        "network"
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<Response> {
        let (parts, body) = request.into_parts();

        let mut url = self.origin.clone();
        url.set_path(parts.uri.path());
        url.set_query(parts.uri.query());

        let mut outbound = self
            .client
            .request(parts.method.clone(), url)
            .headers(parts.headers);

        // Streaming bodies are only engaged for methods that carry one.
        if parts.method != Method::GET && parts.method != Method::HEAD {
            outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = outbound
            .send()
            .await
            .map_err(|e| GatewayError::transport_with_source("backend request failed", e))?;

        let mut response = Response::builder().status(upstream.status());
        if let Some(headers) = response.headers_mut() {
            *headers = upstream.headers().clone();
        }
        response
            .body(Body::from_stream(upstream.bytes_stream()))
            .map_err(|e| GatewayError::internal_with_source("failed to assemble response", e))
    }
}

/// Registry for an embedded backend router, populated at most once per
/// process by embedding applications before the gateway starts.
static IN_PROCESS_BACKEND: OnceLock<Router> = OnceLock::new();

/// Register the in-process backend binding. Returns `false` when a
/// binding was already registered; the first registration wins.
pub fn register_in_process_backend(router: Router) -> bool {
    IN_PROCESS_BACKEND.set(router).is_ok()
}

/// Probe the in-process registry.
#[must_use]
pub fn in_process_backend() -> Option<Router> {
    IN_PROCESS_BACKEND.get().cloned()
}

/// Select the transport for the process lifetime.
///
/// The in-process binding always wins when available; otherwise every
/// request goes over the network with an identical response contract.
/// The caller never learns which channel was picked except through
/// `name()`, keeping the gateway transport-agnostic.
pub fn select_transport(
    origin: &Url,
    local: Option<Router>,
) -> Result<Arc<dyn BackendTransport>> {
    if let Some(router) = local.or_else(in_process_backend) {
        return Ok(Arc::new(InProcessTransport::new(router)));
    }
    Ok(Arc::new(NetworkTransport::new(origin.clone())?))
}
