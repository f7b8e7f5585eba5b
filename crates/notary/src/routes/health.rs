//! Health check endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use proofcode_common::MetricsSnapshot;
use serde::Serialize;

use crate::state::AppState;
use crate::store::CodeStore;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the server running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadyResponse {
    status: &'static str,
    store: &'static str,
}

/// Readiness check (is the record store reachable?)
pub async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, StatusCode> {
    if state.store.ping().await {
        Ok(Json(ReadyResponse {
            status: "ready",
            store: state.store.backend().as_str(),
        }))
    } else {
        tracing::warn!(store = state.store.backend().as_str(), "Store unreachable");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[derive(Serialize)]
pub struct MetricsResponse {
    node_id: String,
    store: &'static str,
    uptime_secs: u64,
    #[serde(flatten)]
    counters: MetricsSnapshot,
}

/// Metrics endpoint (for monitoring)
pub async fn metrics(
    State(state): State<AppState>,
) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        node_id: state.node_id.clone(),
        store: state.store.backend().as_str(),
        uptime_secs: state.uptime_secs(),
        counters: state.stats.snapshot(),
    })
}
