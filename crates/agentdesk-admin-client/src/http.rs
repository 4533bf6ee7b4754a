//! HTTP client for REST endpoints.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use agentdesk_core::{Agent, AgentId, AgentProfile, AgentRegistration, TaskAssignment};

use crate::error::ClientError;

/// Error body returned by the control plane.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Response of the assign-task endpoint.
#[derive(Deserialize)]
struct AssignTasksBody {
    user: Agent,
}

/// HTTP client for REST API endpoints.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client whose requests fail after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the control plane is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "Checking health");

        let response = self.inner.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    /// Get JSON from an endpoint.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET request");

        let response = self.inner.get(&url).send().await?;
        decode(response, path).await
    }

    /// POST a JSON body and decode the JSON answer.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST request");

        let response = self.inner.post(&url).json(body).send().await?;
        decode(response, path).await
    }

    /// List all agents in registration order.
    pub async fn list_agents(&self) -> Result<Vec<Agent>, ClientError> {
        self.get_json("/api/agents").await
    }

    /// Fetch one agent with its tasks.
    pub async fn get_agent(&self, agent_id: &AgentId) -> Result<AgentProfile, ClientError> {
        self.get_json(&format!("/api/agents/{}", agent_id)).await
    }

    /// Register a new agent.
    pub async fn register_agent(
        &self,
        registration: &AgentRegistration,
    ) -> Result<Agent, ClientError> {
        self.post_json("/api/register", registration).await
    }

    /// Append tasks to an agent and return the updated agent.
    pub async fn assign_tasks(
        &self,
        agent_id: &AgentId,
        tasks: &[TaskAssignment],
    ) -> Result<Agent, ClientError> {
        let body: AssignTasksBody = self
            .post_json(&format!("/api/assign-task/{}", agent_id), tasks)
            .await?;
        Ok(body.user)
    }
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text);

        return Err(if status == StatusCode::NOT_FOUND {
            ClientError::NotFound(if message.is_empty() {
                path.to_string()
            } else {
                message
            })
        } else {
            ClientError::Api {
                status: status.as_u16(),
                message,
            }
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Serialization(e.to_string()))
}

/// Pull `message` out of a JSON error body, or fall back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
