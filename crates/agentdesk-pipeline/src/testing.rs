//! In-memory agent directory for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use agentdesk_core::{Agent, AgentId, AgentRegistration, TaskAssignment};

use crate::directory::AgentDirectory;
use crate::error::DirectoryError;

#[derive(Default)]
struct Inner {
    agents: Vec<Agent>,
    /// Remaining forced failures per agent.
    failures: HashMap<AgentId, usize>,
    append_calls: Vec<AgentId>,
    list_calls: usize,
    list_error: Option<DirectoryError>,
}

/// Fake directory with agents `agent-1..=agent-n`, named `Agent 1..=Agent n`.
pub(crate) struct FakeDirectory {
    inner: Mutex<Inner>,
}

impl FakeDirectory {
    pub(crate) fn with_agents(n: usize) -> Self {
        let agents = (1..=n)
            .map(|i| {
                Agent::register(AgentRegistration::new(
                    format!("Agent {i}"),
                    format!("agent{i}@example.com"),
                    format!("555000{i}"),
                ))
                .with_id(AgentId::new(format!("agent-{i}")))
            })
            .collect();

        Self {
            inner: Mutex::new(Inner {
                agents,
                ..Inner::default()
            }),
        }
    }

    pub(crate) async fn list(&self) -> Vec<Agent> {
        self.inner.lock().await.agents.clone()
    }

    /// Make the next `times` appends to `agent_id` fail.
    pub(crate) async fn fail_appends_to(&self, agent_id: &str, times: usize) {
        self.inner
            .lock()
            .await
            .failures
            .insert(AgentId::new(agent_id), times);
    }

    pub(crate) async fn fail_listing(&self, error: DirectoryError) {
        self.inner.lock().await.list_error = Some(error);
    }

    pub(crate) async fn remove_all_agents(&self) {
        self.inner.lock().await.agents.clear();
    }

    pub(crate) async fn task_counts(&self) -> Vec<usize> {
        let inner = self.inner.lock().await;
        inner.agents.iter().map(|a| a.tasks.len()).collect()
    }

    pub(crate) async fn tasks_of(&self, agent_id: &str) -> Vec<TaskAssignment> {
        let inner = self.inner.lock().await;
        inner
            .agents
            .iter()
            .find(|a| a.id.as_str() == agent_id)
            .map(|a| a.tasks.clone())
            .unwrap_or_default()
    }

    pub(crate) async fn append_calls(&self) -> Vec<AgentId> {
        self.inner.lock().await.append_calls.clone()
    }

    pub(crate) async fn list_calls(&self) -> usize {
        self.inner.lock().await.list_calls
    }
}

#[async_trait]
impl AgentDirectory for FakeDirectory {
    async fn list_agents(&self) -> Result<Vec<Agent>, DirectoryError> {
        let mut inner = self.inner.lock().await;
        inner.list_calls += 1;
        match &inner.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(inner.agents.clone()),
        }
    }

    async fn append_tasks(
        &self,
        agent_id: &AgentId,
        tasks: &[TaskAssignment],
    ) -> Result<(), DirectoryError> {
        let mut inner = self.inner.lock().await;
        inner.append_calls.push(agent_id.clone());

        if let Some(remaining) = inner.failures.get_mut(agent_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DirectoryError::Unavailable("connection reset".to_string()));
            }
        }

        let agent = inner
            .agents
            .iter_mut()
            .find(|a| &a.id == agent_id)
            .ok_or_else(|| DirectoryError::NotFound(agent_id.to_string()))?;
        agent.append_tasks(tasks.iter().cloned());
        Ok(())
    }
}
