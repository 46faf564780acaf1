//! parrot-frontend — browser-facing relay for the gateway
//!
//! Serves the embedded chat UI and two JSON endpoints: `POST /call`
//! (invoke a tool or agent through the relay) and `GET /agents` (list the
//! gateway's active agents).

pub mod assets;
pub mod routes;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;

use parrot_core::Config;
use routes::AppState;

/// Bind and serve until shutdown
pub async fn serve(config: &Config) -> Result<()> {
    let addr: SocketAddr = config
        .frontend
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.frontend.bind))?;

    let app = routes::router(AppState::from_config(config));

    info!("Chat frontend listening on http://{}", addr);
    info!("Relaying to gateway at {}", config.gateway.rpc_url());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
