//! Server-side upload and distribution.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use tracing::{debug, info};

use agentdesk_pipeline::{CommitReport, Pipeline, PipelineError};

use crate::http::error::ApiError;
use crate::state::AppState;

/// Distribute an uploaded spreadsheet across all registered agents.
///
/// The request body is the raw file and `Content-Type` is its declared type.
pub async fn distribute(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CommitReport>, ApiError> {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    info!(mime = %mime, bytes = body.len(), "Distribute requested");

    let mut pipeline = Pipeline::new();
    let result = pipeline
        .distribute_file(&*state, &body, mime, |fraction| {
            debug!(progress = fraction, "Distribution progress");
        })
        .await;

    {
        let mut stats = state.distributions.write().await;
        match &result {
            Ok(_) => stats.completed += 1,
            Err(PipelineError::Commit(_)) => stats.partial += 1,
            Err(_) => stats.rejected += 1,
        }
    }

    Ok(Json(result?))
}
