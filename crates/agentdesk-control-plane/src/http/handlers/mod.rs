//! HTTP request handlers.

mod agents;
mod distribute;
mod health;

pub use agents::{assign_tasks, get_agent, list_agents, register_agent};
pub use distribute::distribute;
pub use health::{api_test, health_check, metrics_handler};
