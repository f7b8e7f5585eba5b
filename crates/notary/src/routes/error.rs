//! HTTP mapping for proof code errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use proofcode_common::ProofCodeError;

/// Error returned by handlers; renders as `{ "kind", "message" }`
#[derive(Debug)]
pub struct ApiError(pub ProofCodeError);

impl From<ProofCodeError> for ApiError {
    fn from(err: ProofCodeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Client errors are already visible in the request trace
        if status.is_server_error() {
            tracing::error!(
                error = %self.0,
                kind = self.0.kind(),
                retryable = self.0.is_retryable(),
                "Request failed"
            );
        }

        let body = serde_json::json!({
            "kind": self.0.kind(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
