//! Shared application state.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use agentdesk_core::{Agent, AgentId, AgentRegistration, CoreError, TaskAssignment};
use agentdesk_pipeline::{AgentDirectory, DirectoryError};

/// Counters for server-side distributions, by outcome.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DistributionStats {
    pub completed: u64,
    pub partial: u64,
    pub rejected: u64,
}

/// Shared application state.
pub struct AppState {
    /// Registered agents in registration order.
    pub agents: RwLock<Vec<Agent>>,

    /// Outcomes of `/api/distribute` calls.
    pub distributions: RwLock<DistributionStats>,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register an agent, enforcing unique emails.
    pub async fn register_agent(&self, registration: AgentRegistration) -> Result<Agent, CoreError> {
        let registration = registration.normalize()?;

        let mut agents = self.agents.write().await;
        if agents.iter().any(|a| a.email == registration.email) {
            return Err(CoreError::AgentExists(registration.email));
        }

        let agent = Agent::register(registration);
        info!(agent_id = %agent.id, email = %agent.email, "Agent registered");
        agents.push(agent.clone());
        Ok(agent)
    }

    /// All agents, oldest registration first.
    pub async fn agents_snapshot(&self) -> Vec<Agent> {
        self.agents.read().await.clone()
    }

    /// Look up one agent.
    pub async fn agent(&self, agent_id: &AgentId) -> Option<Agent> {
        self.agents
            .read()
            .await
            .iter()
            .find(|a| &a.id == agent_id)
            .cloned()
    }

    /// Append tasks to an agent and return the updated agent.
    pub async fn assign_tasks(
        &self,
        agent_id: &AgentId,
        tasks: Vec<TaskAssignment>,
    ) -> Result<Agent, CoreError> {
        let mut agents = self.agents.write().await;
        let agent = agents
            .iter_mut()
            .find(|a| &a.id == agent_id)
            .ok_or_else(|| CoreError::AgentNotFound(agent_id.to_string()))?;

        let count = tasks.len();
        agent.append_tasks(tasks);
        info!(agent_id = %agent_id, tasks = count, total = agent.tasks.len(), "Tasks assigned");
        Ok(agent.clone())
    }

    /// Get the number of registered agents.
    pub async fn agent_count(&self) -> usize {
        self.agents.read().await.len()
    }

    /// Get the number of tasks assigned across all agents.
    pub async fn task_count(&self) -> usize {
        self.agents.read().await.iter().map(|a| a.tasks.len()).sum()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            agents: RwLock::new(Vec::new()),
            distributions: RwLock::new(DistributionStats::default()),
        }
    }
}

#[async_trait]
impl AgentDirectory for AppState {
    async fn list_agents(&self) -> Result<Vec<Agent>, DirectoryError> {
        Ok(self.agents_snapshot().await)
    }

    async fn append_tasks(
        &self,
        agent_id: &AgentId,
        tasks: &[TaskAssignment],
    ) -> Result<(), DirectoryError> {
        self.assign_tasks(agent_id, tasks.to_vec())
            .await
            .map(|_| ())
            .map_err(|e| match e {
                CoreError::AgentNotFound(id) => DirectoryError::NotFound(id),
                other => DirectoryError::Rejected {
                    status: 400,
                    message: other.to_string(),
                },
            })
    }
}
