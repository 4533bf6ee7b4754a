//! Status enums for the upload pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the upload-and-distribute pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    /// No file loaded.
    #[default]
    Idle,
    /// File received, not yet parsed.
    FileLoaded,
    /// File parsed and every row validated.
    Validated,
    /// Buckets are being committed to agents.
    Distributing,
    /// Every bucket was committed.
    Completed,
    /// A commit aborted partway. Records are kept for a retry.
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FileLoaded => "file loaded",
            Self::Validated => "validated",
            Self::Distributing => "distributing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
