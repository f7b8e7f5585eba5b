//! Caller identity injected by the identity gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use proofcode_common::ProofCodeError;
use proofcode_common::constants::headers::X_SUBJECT_ID;

use super::error::ApiError;

/// Verified subject identifier from the `X-Subject-Id` header.
///
/// Requests without the header, or with a blank value, are rejected with
/// 401 before any handler runs.
#[derive(Debug, Clone)]
pub struct Caller {
    pub subject_id: String,
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let subject_id = parts
            .headers
            .get(X_SUBJECT_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        async move {
            let subject_id = subject_id.ok_or(ApiError(ProofCodeError::Unauthenticated))?;
            Ok(Self { subject_id })
        }
    }
}
