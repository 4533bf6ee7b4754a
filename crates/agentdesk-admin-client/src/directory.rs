//! Remote agent directory backed by the control plane.

use async_trait::async_trait;

use agentdesk_core::{Agent, AgentId, TaskAssignment};
use agentdesk_pipeline::{AgentDirectory, DirectoryError};

use crate::error::ClientError;
use crate::http::HttpClient;

impl From<ClientError> for DirectoryError {
    fn from(err: ClientError) -> Self {
        if err.is_unreachable() {
            return DirectoryError::Unavailable(err.to_string());
        }

        match err {
            ClientError::NotFound(message) => DirectoryError::NotFound(message),
            ClientError::Api { status, message } => DirectoryError::Rejected { status, message },
            other => DirectoryError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl AgentDirectory for HttpClient {
    async fn list_agents(&self) -> Result<Vec<Agent>, DirectoryError> {
        Ok(HttpClient::list_agents(self).await?)
    }

    async fn append_tasks(
        &self,
        agent_id: &AgentId,
        tasks: &[TaskAssignment],
    ) -> Result<(), DirectoryError> {
        match self.assign_tasks(agent_id, tasks).await {
            Ok(_) => Ok(()),
            Err(ClientError::NotFound(_)) => Err(DirectoryError::NotFound(agent_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
