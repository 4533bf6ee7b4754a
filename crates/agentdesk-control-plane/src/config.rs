//! Control plane configuration.

use clap::Parser;

/// Largest upload accepted by the distribute endpoint.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Command line arguments for the server binary.
#[derive(Parser, Debug)]
#[command(name = "agentdesk-control-plane", about = "AgentDesk control plane server")]
pub struct Args {
    /// HTTP server bind address
    #[arg(long, env = "AGENTDESK_HTTP_ADDR", default_value = "0.0.0.0:5000")]
    pub http_addr: String,

    /// Allowed CORS origin (any origin when unset)
    #[arg(long, env = "AGENTDESK_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Maximum upload size in bytes for /api/distribute
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

/// Control plane configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub http_bind_addr: String,

    /// Single allowed CORS origin, or `None` for any.
    pub cors_origin: Option<String>,

    /// Upload size limit for the distribute endpoint.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_bind_addr: "0.0.0.0:5000".to_string(),
            cors_origin: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            http_bind_addr: args.http_addr,
            cors_origin: args.cors_origin,
            max_upload_bytes: args.max_upload_bytes,
        }
    }
}
