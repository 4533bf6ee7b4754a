//! AgentDesk Control Plane Library
//!
//! Agent registry, task assignment and server-side spreadsheet
//! distribution behind an HTTP API.

pub mod config;
pub mod http;
pub mod metrics;
pub mod state;

pub use config::{Args, Config};
pub use state::AppState;
