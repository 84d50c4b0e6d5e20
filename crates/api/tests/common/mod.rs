//! Shared helpers for API integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use coverdrive_api::config::ServerConfig;
use coverdrive_api::routes;
use coverdrive_api::state::AppState;
use coverdrive_pipeline::engine::AnalysisEngine;
use coverdrive_pipeline::store::InMemoryJobStore;

/// Build the app router over a fresh in-memory store, as `main` does but
/// without the network-facing middleware.
pub fn build_test_app() -> Router {
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".into()],
        request_timeout_secs: 30,
        upload_dir: std::env::temp_dir().join("coverdrive-api-tests"),
        max_upload_mb: 8,
        // No estimator in tests; jobs that get as far as pose detection
        // fail with DetectionUnavailable, which is fine for these tests.
        pose_command: String::new(),
    };

    let engine = AnalysisEngine::new(InMemoryJobStore::new());
    let state = AppState {
        engine,
        config: Arc::new(config),
    };

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state)
}

/// One-shot GET against the app.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
