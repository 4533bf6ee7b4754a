//! Agent registration, lookup and task assignment handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use agentdesk_core::{AgentId, AgentProfile, AgentRegistration, TaskAssignment};

use crate::http::error::ApiError;
use crate::http::responses::AssignTasksResponse;
use crate::state::AppState;

/// Register a new agent.
pub async fn register_agent(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AgentRegistration>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let agent = state.register_agent(req).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// List all agents in registration order.
pub async fn list_agents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.agents_snapshot().await)
}

/// Fetch one agent with its task list.
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AgentProfile>, ApiError> {
    state
        .agent(&AgentId::new(id))
        .await
        .map(|agent| Json(agent.profile()))
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Append a JSON array of tasks to an agent.
pub async fn assign_tasks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AssignTasksResponse>, ApiError> {
    let Json(body) = payload?;
    if !body.is_array() {
        return Err(ApiError::BadRequest("Tasks should be an array".to_string()));
    }

    let tasks: Vec<TaskAssignment> = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid task: {}", e)))?;

    let user = state.assign_tasks(&AgentId::new(id), tasks).await?;
    Ok(Json(AssignTasksResponse {
        message: "Tasks assigned".to_string(),
        user,
    }))
}
