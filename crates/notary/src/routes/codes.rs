//! Proof code issue and verify endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use proofcode_common::{IssuedCode, ProofCode, ProofCodeError, VerifyOutcome};
use serde_json::Value;

use super::error::ApiError;
use super::identity::Caller;
use crate::codes::submitted_code;
use crate::state::AppState;
use crate::store::CodeStore;

/// Issue a new proof code
pub async fn issue_code(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<IssuedCode>, ApiError> {
    let issued = state.issuer.issue(&state.store, &caller.subject_id).await?;
    Ok(Json(issued))
}

/// Verify and consume a proof code
///
/// Body: `{ "code": "482" }`. A missing, non-string or too-short code
/// is a 400; an unknown or used code is a 200 with `success: false`.
pub async fn verify_code(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerifyOutcome>, ApiError> {
    let Json(payload) =
        payload.map_err(|e| ProofCodeError::InvalidArgument(e.body_text()))?;
    let code = submitted_code(&payload)?;

    let outcome = state
        .verifier
        .verify(&state.store, &caller.subject_id, code)
        .await?;
    Ok(Json(outcome))
}

/// Look up a single record (operator inspection)
pub async fn get_code(
    State(state): State<AppState>,
    caller: Caller,
    Path(code): Path<String>,
) -> Result<Json<ProofCode>, ApiError> {
    tracing::debug!(code = %code, subject_id = %caller.subject_id, "Looking up proof code");

    let record = state
        .store
        .get(&code)
        .await?
        .ok_or_else(|| ProofCodeError::NotFound(format!("proof code {}", code)))?;
    Ok(Json(record))
}
