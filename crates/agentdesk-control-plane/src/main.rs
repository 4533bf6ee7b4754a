//! AgentDesk Control Plane Server

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use agentdesk_control_plane::{http, AppState, Args, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("agentdesk_control_plane=info,agentdesk_pipeline=info,tower_http=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Load config
    let config = Config::from(Args::parse());
    let http_addr: SocketAddr = config.http_bind_addr.parse()?;

    // Create shared state
    let state = AppState::new();

    info!(
        http_addr = %http_addr,
        max_upload_bytes = config.max_upload_bytes,
        cors_origin = config.cors_origin.as_deref().unwrap_or("*"),
        "Starting AgentDesk control plane"
    );

    // Create HTTP router
    let router = http::create_router(state, &config);

    let listener = TcpListener::bind(http_addr).await?;
    info!("HTTP server listening on {}", http_addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!(error = %e, "HTTP server error");
        return Err(e.into());
    }

    Ok(())
}
