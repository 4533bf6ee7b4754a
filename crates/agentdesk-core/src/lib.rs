//! AgentDesk Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Spreadsheet formats
//! - Runtime specifics
//!
//! Agents, their task lists, and the lead records that feed them live here.

pub mod agent;
pub mod error;
pub mod ids;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use agent::{Agent, AgentProfile, AgentRegistration};
pub use error::CoreError;
pub use ids::{AgentId, BatchId};
pub use status::PipelineState;
pub use task::{LeadRecord, TaskAssignment};
