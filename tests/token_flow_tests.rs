//! # Token issuance flow tests
//!
//! Exercise the session-to-token bridge through the HTTP surface: the
//! token endpoint, the published key set, and key rotation.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::Router;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tower::ServiceExt;

use session_gateway::auth::{BearerClaims, PublicKeySet, Session};
use session_gateway::proxy::InProcessTransport;
use session_gateway::server::{AppContext, AppState, create_router};
use session_gateway::testing::{
    RETIRED_KID, RETIRED_PRIVATE_PEM, StaticSessionProvider, TEST_KID, retired_key_config,
    test_config, test_session,
};

/// Gateway wired with a fixed session answer and a no-op backend.
fn gateway(session: Option<Session>) -> Router {
    gateway_with_config(session, test_config())
}

fn gateway_with_config(session: Option<Session>, config: session_gateway::AppConfig) -> Router {
    let context = AppContext::new(
        config,
        Arc::new(StaticSessionProvider(session)),
        Arc::new(InProcessTransport::new(Router::new())),
    )
    .expect("test context must wire");
    create_router(AppState::new(Arc::new(context)))
}

async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, Option<T>) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, "session=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).ok())
}

#[tokio::test]
async fn no_session_yields_401_without_a_token() {
    let app = gateway(None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn issued_token_verifies_against_published_key_set() {
    let (status, body) =
        get_json::<serde_json::Value>(gateway(Some(test_session())), "/api/auth/token").await;
    assert_eq!(status, StatusCode::OK);
    let token = body.unwrap()["token"].as_str().unwrap().to_string();

    let (status, key_set) =
        get_json::<PublicKeySet>(gateway(Some(test_session())), "/api/auth/jwks").await;
    assert_eq!(status, StatusCode::OK);
    let key_set = key_set.unwrap();

    let kid = jsonwebtoken::decode_header(&token).unwrap().kid.unwrap();
    assert_eq!(kid, TEST_KID);
    let entry = key_set.find(&kid).expect("kid must resolve in the key set");

    let key = DecodingKey::from_rsa_pem(entry.public_key_pem.as_bytes()).unwrap();
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&["docstore"]);
    validation.set_issuer(&["http://localhost:3000"]);
    let claims = decode::<BearerClaims>(&token, &key, &validation)
        .unwrap()
        .claims;

    assert_eq!(claims.sub, "user-1");
    assert_eq!(claims.email, "ada@example.com");
    assert_eq!(claims.name, "Ada Lovelace");
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn rotated_out_key_stays_verifiable() {
    let mut config = test_config();
    config.token.retired_keys.push(retired_key_config());

    // A token minted before rotation, signed with the retired key.
    let now = chrono::Utc::now().timestamp();
    let old_claims = BearerClaims {
        sub: "user-1".to_string(),
        iss: "http://localhost:3000".to_string(),
        aud: "docstore".to_string(),
        iat: now,
        exp: now + 3600,
        email: "ada@example.com".to_string(),
        name: "Ada Lovelace".to_string(),
    };
    let mut old_header = Header::new(Algorithm::RS256);
    old_header.kid = Some(RETIRED_KID.to_string());
    let old_key = EncodingKey::from_rsa_pem(RETIRED_PRIVATE_PEM.as_bytes()).unwrap();
    let old_token = encode(&old_header, &old_claims, &old_key).unwrap();

    let (_, key_set) = get_json::<PublicKeySet>(
        gateway_with_config(Some(test_session()), config),
        "/api/auth/jwks",
    )
    .await;
    let key_set = key_set.unwrap();
    assert_eq!(key_set.keys.len(), 2);

    let entry = key_set
        .find(RETIRED_KID)
        .expect("retired kid must stay published");
    let key = DecodingKey::from_rsa_pem(entry.public_key_pem.as_bytes()).unwrap();
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&["docstore"]);
    decode::<BearerClaims>(&old_token, &key, &validation).unwrap();
}

#[tokio::test]
async fn health_endpoint_answers_ok() {
    let (status, body) = get_json::<serde_json::Value>(gateway(None), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["status"], "ok");
}

#[tokio::test]
async fn token_endpoint_rejects_non_get() {
    let app = gateway(Some(test_session()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn other_auth_paths_are_proxied_not_handled() {
    let app = gateway(Some(test_session()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/get-session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Forwarded into the empty in-process backend, which has no routes.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
