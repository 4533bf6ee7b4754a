//! Core domain errors.

use thiserror::Error;

/// Core domain errors for AgentDesk.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Agent not found.
    #[error("User not found: {0}")]
    AgentNotFound(String),

    /// An agent with the same email is already registered.
    #[error("User already exists: {0}")]
    AgentExists(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
