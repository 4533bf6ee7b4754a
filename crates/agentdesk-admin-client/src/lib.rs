//! Admin client library for AgentDesk.
//!
//! Provides an HTTP client for the control plane REST API. The client also
//! implements [`agentdesk_pipeline::AgentDirectory`], so a distribution can
//! run locally against a remote agent registry.

mod directory;
pub mod error;
pub mod http;

pub use error::ClientError;
pub use http::HttpClient;
