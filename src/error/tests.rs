//! Error system tests.

use super::*;
use axum::http::StatusCode;

#[test]
fn status_code_mapping() {
    let (status, code) = GatewayError::unauthorized("no session").to_http_response_parts();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code, "UNAUTHORIZED");

    let (status, code) = GatewayError::transport("connection refused").to_http_response_parts();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(code, "BAD_GATEWAY");

    let (status, _) = GatewayError::config("missing signing key").to_http_response_parts();
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn context_preserves_inner_status() {
    let err: Result<()> = Err(GatewayError::transport("dial failed"));
    let err = err.context("forwarding /api/v1/todos").unwrap_err();

    assert!(matches!(err, GatewayError::Context { .. }));
    assert_eq!(err.to_string(), "forwarding /api/v1/todos");
    let (status, _) = err.to_http_response_parts();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[test]
fn category_classification() {
    assert_eq!(
        GatewayError::unauthorized("x").category(),
        ErrorCategory::Client
    );
    assert_eq!(
        GatewayError::transport("x").category(),
        ErrorCategory::Server
    );
    assert_eq!(GatewayError::config("x").category(), ErrorCategory::Server);
}

#[test]
fn io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: GatewayError = io_err.into();

    assert!(matches!(err, GatewayError::Io { .. }));
    assert!(err.to_string().contains("io error"));
}

#[test]
fn toml_error_conversion() {
    let toml_err = toml::from_str::<toml::Value>("not [ valid").unwrap_err();
    let err: GatewayError = toml_err.into();

    assert!(matches!(err, GatewayError::Config { .. }));
}

#[test]
fn error_macros() {
    let err = crate::auth_error!("no session cookie");
    assert!(matches!(err, GatewayError::Unauthorized { .. }));

    let err = crate::transport_error!("dispatch to {} failed", "backend.internal");
    assert!(err.to_string().contains("backend.internal"));
}
