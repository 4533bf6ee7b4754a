//! Health and metrics handlers.

use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse, Json};

use crate::http::responses::MessageResponse;
use crate::state::AppState;

/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Smoke-test endpoint used by the web front-end.
pub async fn api_test() -> Json<MessageResponse> {
    Json(MessageResponse::new("This is test"))
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = crate::metrics::collect_metrics(&state).await;
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
