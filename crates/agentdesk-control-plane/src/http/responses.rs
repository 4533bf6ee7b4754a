//! HTTP request and response types.

use serde::{Deserialize, Serialize};

use agentdesk_core::Agent;

/// Plain `{ "message": ... }` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response for a successful task append.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignTasksResponse {
    pub message: String,
    pub user: Agent,
}
