//! HTTP server for the control plane.
//!
//! Provides endpoints for:
//! - Agent registration and lookup (`/api/register`, `/api/agents`)
//! - Task assignment (`/api/assign-task/:id`)
//! - Spreadsheet distribution (`/api/distribute`)
//! - Health check (`/health`, `/api/test`)
//! - Prometheus metrics (`/metrics`)

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::state::AppState;

pub mod error;
mod handlers;
pub mod responses;

pub use error::ApiError;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>, config: &Config) -> Router {
    Router::new()
        // Agent routes
        .route("/api/register", post(handlers::register_agent))
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/:id", get(handlers::get_agent))
        .route("/api/assign-task/:id", post(handlers::assign_tasks))
        // Upload route
        .route(
            "/api/distribute",
            post(handlers::distribute).layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
        // Observability routes
        .route("/api/test", get(handlers::api_test))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.cors_origin.as_deref()))
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(e)) => {
            warn!(error = %e, "Invalid CORS origin, allowing any origin");
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    }
}
