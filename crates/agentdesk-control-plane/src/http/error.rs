//! HTTP error type and its JSON rendering.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use agentdesk_core::CoreError;
use agentdesk_pipeline::{CommitReport, IngestError, PipelineError, RowIssue};

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Upload rejected because rows are missing required fields.
    #[error("{message}")]
    InvalidRows {
        message: String,
        issues: Vec<RowIssue>,
    },

    /// Nothing to distribute, or nobody to distribute to.
    #[error("{0}")]
    Unprocessable(String),

    /// The directory failed mid-distribution.
    #[error("{0}")]
    PartialCommit(Box<CommitReport>),

    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidRows { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PartialCommit(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = %status, error = %self, "Request failed");
        }

        let message = self.to_string();
        let body = match self {
            Self::InvalidRows { issues, .. } => json!({ "message": message, "issues": issues }),
            Self::PartialCommit(report) => json!({ "message": message, "report": report }),
            _ => json!({ "message": message }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AgentNotFound(_) => Self::NotFound("User not found".to_string()),
            CoreError::AgentExists(_) => Self::BadRequest("User already exists".to_string()),
            CoreError::InvalidInput(message) => Self::BadRequest(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Ingest(err) => {
                let message = err.to_string();
                match err {
                    IngestError::UnsupportedFileType(_) => Self::UnsupportedMediaType(message),
                    IngestError::Malformed { .. } => Self::BadRequest(message),
                    IngestError::Validation { issues } => Self::InvalidRows { message, issues },
                }
            }
            PipelineError::Planning(err) => Self::Unprocessable(err.to_string()),
            PipelineError::Directory(err) => Self::Unavailable(err.to_string()),
            PipelineError::Commit(report) => Self::PartialCommit(report),
        }
    }
}
