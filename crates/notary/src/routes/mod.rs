//! HTTP route handlers for Notary.

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod codes;
mod error;
mod health;
mod identity;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.http.request_timeout_secs);
    let cors = if state.config.http.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/metrics", get(health::metrics))

        // Proof codes
        .route("/codes", post(codes::issue_code))
        .route("/codes/verify", post(codes::verify_code))

        // Operator inspection
        .nest("/admin", admin_routes())

        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())

        // Add shared state
        .with_state(state)
}

/// Admin routes (record inspection)
fn admin_routes() -> Router<AppState> {
    Router::new().route("/codes/{code}", get(codes::get_code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::{MemoryStore, Store};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_app() -> (Router, MemoryStore) {
        let store = MemoryStore::new();
        let state = AppState::with_store(AppConfig::default(), Store::Memory(store.clone()));
        (create_router(state), store)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn issue_request(subject: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/codes");
        if let Some(subject) = subject {
            builder = builder.header("x-subject-id", subject);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn verify_request(subject: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/codes/verify")
            .header("content-type", "application/json");
        if let Some(subject) = subject {
            builder = builder.header("x-subject-id", subject);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_ready_with_memory_store() {
        let (app, _) = test_app();
        let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["store"], "memory");
    }

    #[tokio::test]
    async fn test_issue_verify_verify_scenario() {
        let (app, _) = test_app();

        let (status, issued) = send(&app, issue_request(Some("teacher-1"))).await;
        assert_eq!(status, StatusCode::OK);
        let code = issued["code"].as_str().unwrap().to_string();

        let (status, first) =
            send(&app, verify_request(Some("student-1"), json!({ "code": code }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, json!({ "success": true, "message": "confirmation succeeded" }));

        let (status, second) =
            send(&app, verify_request(Some("student-1"), json!({ "code": code }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            second,
            json!({ "success": false, "message": "code invalid or already used" })
        );

        let request = Request::builder()
            .uri(format!("/admin/codes/{}", code))
            .header("x-subject-id", "teacher-1")
            .body(Body::empty())
            .unwrap();
        let (status, record) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["status"], "used");
        assert_eq!(record["issued_by"], "teacher-1");
        assert_eq!(record["used_by"], "student-1");
    }

    #[tokio::test]
    async fn test_unauthenticated_calls_touch_nothing() {
        let (app, store) = test_app();

        let (status, json) = send(&app, issue_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["kind"], "UNAUTHENTICATED");

        let (status, _) = send(&app, verify_request(None, json!({ "code": "482" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_malformed_codes_are_invalid_arguments() {
        let (app, store) = test_app();

        for body in [json!({ "code": "" }), json!({ "code": 12 }), json!({ "code": "12" }), json!({})] {
            let (status, json) = send(&app, verify_request(Some("student-1"), body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["kind"], "INVALID_ARGUMENT");
        }

        let request = Request::builder()
            .method("POST")
            .uri("/codes/verify")
            .header("x-subject-id", "student-1")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_code_is_soft_failure() {
        let (app, store) = test_app();
        let (status, json) =
            send(&app, verify_request(Some("student-1"), json!({ "code": "000" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_admin_lookup_missing_code() {
        let (app, _) = test_app();
        let request = Request::builder()
            .uri("/admin/codes/99999")
            .header("x-subject-id", "operator")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["kind"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_metrics_count_operations() {
        let (app, _) = test_app();
        send(&app, issue_request(Some("teacher-1"))).await;
        send(&app, verify_request(Some("student-1"), json!({ "code": "000" }))).await;

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["codes_issued"], 1);
        assert_eq!(json["redemptions_rejected"], 1);
        assert_eq!(json["store"], "memory");
    }
}
