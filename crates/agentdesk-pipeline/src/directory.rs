//! The agent directory seam between the pipeline and whatever stores agents.

use async_trait::async_trait;

use agentdesk_core::{Agent, AgentId, TaskAssignment};

use crate::error::DirectoryError;

/// Store that owns agents and their task lists.
///
/// The pipeline reads one snapshot per distribution and then appends to
/// individual agents. Implementations must return agents in a stable order;
/// round-robin assignment follows it exactly.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// List every agent that can receive tasks, in a stable order.
    async fn list_agents(&self) -> Result<Vec<Agent>, DirectoryError>;

    /// Append tasks after the agent's existing ones. Never replaces.
    async fn append_tasks(
        &self,
        agent_id: &AgentId,
        tasks: &[TaskAssignment],
    ) -> Result<(), DirectoryError>;
}
