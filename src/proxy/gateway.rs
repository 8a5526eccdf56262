//! The proxy gateway.
//!
//! Forwards a browser request to the backend over the selected
//! transport, rewrites `Set-Cookie` response headers so cross-origin
//! cookies are accepted, and translates transport failures into a
//! stable `502` response. Status codes and bodies pass through
//! untouched for any response the backend actually produced.

use axum::body::Body;
use axum::http::header::{
    CONNECTION, HOST, HeaderName, HeaderValue, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION,
    SET_COOKIE, TE, TRAILER, TRANSFER_ENCODING, UPGRADE,
};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::sync::Arc;

use super::cookie;
use super::transport::BackendTransport;
use crate::server::response;

/// Edge-facing headers injected so the backend can reconstruct the
/// public origin instead of seeing the gateway's internal one.
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Hop-by-hop headers that must not be forwarded.
const HOP_BY_HOP: [HeaderName; 7] = [
    CONNECTION,
    HeaderName::from_static("keep-alive"),
    PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION,
    TE,
    TRAILER,
    UPGRADE,
];

/// Stateless per-request forwarder.
pub struct ProxyGateway {
    transport: Arc<dyn BackendTransport>,
    forward_edge_headers: bool,
}

impl ProxyGateway {
    /// Create a gateway over the selected transport.
    #[must_use]
    pub fn new(transport: Arc<dyn BackendTransport>, forward_edge_headers: bool) -> Self {
        Self {
            transport,
            forward_edge_headers,
        }
    }

    /// Name of the selected transport channel, for logs.
    #[must_use]
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Forward a request and return the rewritten backend response.
    ///
    /// `tag` identifies the call site in logs when dispatch fails; the
    /// failure detail itself never reaches the client.
    pub async fn forward(&self, tag: &str, request: Request<Body>) -> Response {
        let request_id = uuid::Uuid::new_v4().simple().to_string();
        tracing::debug!(
            tag,
            request_id,
            method = %request.method(),
            path = request.uri().path(),
            "forwarding request"
        );
        let outbound = self.build_outbound(request);

        match self.transport.dispatch(outbound).await {
            Ok(response) => rewrite_set_cookie(response),
            Err(error) => {
                tracing::error!(
                    tag,
                    request_id,
                    transport = self.transport.name(),
                    error = ?error,
                    "backend dispatch failed"
                );
                response::error(StatusCode::BAD_GATEWAY, "BAD_GATEWAY", "backend request failed")
            }
        }
    }

    /// Copy method, path, query, and body verbatim; drop hop-by-hop
    /// headers and `Host`; inject the edge-facing forwarded headers.
    fn build_outbound(&self, request: Request<Body>) -> Request<Body> {
        let (mut parts, body) = request.into_parts();

        let edge_host = parts.headers.get(HOST).cloned();
        let edge_proto = parts
            .headers
            .get(&X_FORWARDED_PROTO)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("http"));

        for name in &HOP_BY_HOP {
            parts.headers.remove(name);
        }
        // The transport derives Host from the backend origin; TE codings
        // are renegotiated per hop.
        parts.headers.remove(HOST);
        parts.headers.remove(TRANSFER_ENCODING);

        if self.forward_edge_headers {
            if let Some(host) = edge_host {
                parts.headers.insert(X_FORWARDED_HOST, host);
            }
            parts.headers.insert(X_FORWARDED_PROTO, edge_proto);
        }

        Request::from_parts(parts, body)
    }
}

/// Strip the `Domain` attribute from every `Set-Cookie` header so the
/// browser assigns the cookies to the gateway's origin. Headers that do
/// not parse pass through verbatim; dropping a session-critical cookie
/// would be worse than forwarding it unrewritten.
fn rewrite_set_cookie(response: Response) -> Response {
    let (mut parts, body) = response.into_parts();

    let originals: Vec<HeaderValue> = parts.headers.get_all(SET_COOKIE).iter().cloned().collect();
    if originals.is_empty() {
        return Response::from_parts(parts, body);
    }

    parts.headers.remove(SET_COOKIE);
    for original in originals {
        let rewritten = match original.to_str() {
            Ok(raw) => match cookie::strip_domain_attribute(raw) {
                Ok(stripped) => {
                    HeaderValue::from_str(&stripped).unwrap_or_else(|_| original.clone())
                }
                Err(error) => {
                    tracing::debug!(error = %error, "passing unparseable set-cookie through");
                    original.clone()
                }
            },
            Err(_) => original.clone(),
        };
        parts.headers.append(SET_COOKIE, rewritten);
    }

    Response::from_parts(parts, body)
}
