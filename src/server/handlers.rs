//! Request handlers for the gateway's own endpoints.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::auth::PublicKeySet;

/// Body of a successful token issuance.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed bearer token.
    pub token: String,
}

/// `GET /api/auth/token`
///
/// Exchanges a valid session cookie for a bearer token. Requests
/// without a resolvable session get a bodyless `401` so clients can
/// distinguish "sign in first" from gateway failures.
pub async fn issue_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());

    let Some(session) = state.resolver.resolve(cookie_header).await else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    match state
        .issuer
        .issue(Some(&session), &state.config.token.audience)
    {
        Ok(token) => Json(TokenResponse { token }).into_response(),
        Err(error) => {
            tracing::error!(error = %error, "token issuance failed");
            error.into_response()
        }
    }
}

/// `GET /api/auth/jwks`
///
/// Publishes the key set verifiers resolve `kid`s against.
pub async fn public_key_set(State(state): State<AppState>) -> Json<PublicKeySet> {
    Json(state.key_store.public_key_set())
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Wildcard handler for all proxied prefixes, any method.
pub async fn proxy_backend(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.gateway.forward("proxy", request).await
}
