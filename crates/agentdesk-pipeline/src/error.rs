//! Pipeline error types, one enum per stage.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::commit::CommitReport;

/// A spreadsheet field the ingestor requires on every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequiredField {
    FirstName,
    Phone,
    Notes,
}

impl RequiredField {
    /// All required fields, in header order.
    pub const ALL: [RequiredField; 3] = [Self::FirstName, Self::Phone, Self::Notes];

    /// The exact header text this field is read from.
    pub fn header(&self) -> &'static str {
        match self {
            Self::FirstName => "FirstName",
            Self::Phone => "Phone",
            Self::Notes => "Notes",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One row that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// 1-based row number as shown in a spreadsheet (header is row 1).
    pub row: usize,
    pub missing: Vec<RequiredField>,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.missing.iter().map(RequiredField::header).collect();
        write!(f, "row {}: missing {}", self.row, fields.join(", "))
    }
}

/// Errors raised while turning an uploaded file into lead records.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Declared MIME type is not CSV, XLS or XLSX.
    #[error("Unsupported file type '{0}': only .csv, .xls, .xlsx files are allowed")]
    UnsupportedFileType(String),

    /// The bytes could not be read as the declared format.
    #[error("Malformed {format} file: {reason}")]
    Malformed {
        format: &'static str,
        reason: String,
    },

    /// At least one row is missing a required field. Nothing is imported.
    #[error("Error need valid required fields: {}", summarize(.issues))]
    Validation { issues: Vec<RowIssue> },
}

fn summarize(issues: &[RowIssue]) -> String {
    const SHOWN: usize = 5;
    let mut parts: Vec<String> = issues.iter().take(SHOWN).map(ToString::to_string).collect();
    if issues.len() > SHOWN {
        parts.push(format!("and {} more", issues.len() - SHOWN));
    }
    parts.join("; ")
}

/// Preconditions the planner refuses to work without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum PlanningError {
    #[error("No agents available to receive tasks")]
    NoWorkers,

    #[error("Nothing to distribute: no records loaded")]
    NoRecords,
}

/// Errors reported by an agent directory.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DirectoryError {
    /// The agent no longer exists.
    #[error("agent not found: {0}")]
    NotFound(String),

    /// The directory could not be reached or timed out.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    /// The directory answered but refused the request.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Top-level error for one pipeline operation. The variant names the stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    /// The agent snapshot could not be fetched.
    #[error("Error fetching agents: {0}")]
    Directory(DirectoryError),

    /// The committer aborted. The report says how far it got.
    #[error("{0}")]
    Commit(Box<CommitReport>),
}
