//! Standard JSON error envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Machine-readable error information.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

/// Standard error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorInfo,
    pub timestamp: DateTime<Utc>,
}

/// Build an error response with an explicit status and code.
pub fn error(status: StatusCode, code: &str, message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorInfo {
            code: code.to_string(),
            message: message.to_string(),
        },
        timestamp: Utc::now(),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = self.to_http_response_parts();
        // Transport details describe internal topology; clients get the
        // generic message only.
        let message = match &self {
            Self::Transport { .. } => "backend request failed".to_string(),
            other => other.to_string(),
        };
        error(status, code, &message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transport_error_renders_generic_body() {
        let err = GatewayError::transport_with_source(
            "dial tcp 10.0.0.7:4001",
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error.code, "BAD_GATEWAY");
        assert_eq!(body.error.message, "backend request failed");
        assert!(!body.success);
    }
}
