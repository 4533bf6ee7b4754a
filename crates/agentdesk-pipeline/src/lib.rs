//! AgentDesk lead distribution pipeline.
//!
//! An uploaded spreadsheet flows through four stages:
//!
//! 1. [`ingest`] parses and validates the file into lead records.
//! 2. [`plan`] splits the records round-robin across an agent snapshot.
//! 3. [`commit`] appends each agent's bucket through an [`AgentDirectory`],
//!    one agent at a time, stopping at the first failure.
//! 4. [`Pipeline`] drives the three and tracks the upload's state.

pub mod commit;
pub mod directory;
pub mod error;
pub mod ingest;
pub mod orchestrator;
pub mod plan;

#[cfg(test)]
pub(crate) mod testing;

pub use commit::{commit, CommitFailure, CommitReport};
pub use directory::AgentDirectory;
pub use error::{DirectoryError, IngestError, PipelineError, PlanningError, RequiredField, RowIssue};
pub use ingest::FileKind;
pub use orchestrator::Pipeline;
pub use plan::{plan, Bucket, Plan};
