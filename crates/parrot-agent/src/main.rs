//! parrot-agent — demonstration tool agent on STDIO
//!
//! Exposes `ping`, `echo`, and (when a backend is configured) `chat` over
//! newline-delimited JSON-RPC 2.0, for registration behind an MCP-style
//! gateway.
//!
//! Usage:
//!   parrot-agent
//!
//! Environment:
//!   CHAT_API_URL   text-generation endpoint; enables the `chat` tool
//!   CHAT_API_KEY   bearer credential for that endpoint
//!   CHAT_MODEL_ID  model identifier (optional)

mod model;
mod protocol;
mod server;
mod tools;

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::model::{ChatModel, HttpChatModel};
use crate::server::AgentServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("parrot-agent v{} starting", env!("CARGO_PKG_VERSION"));

    let chat_model: Option<Arc<dyn ChatModel>> = match HttpChatModel::from_env()? {
        Some(model) => Some(Arc::new(model)),
        None => {
            warn!("CHAT_API_URL not set; the 'chat' tool will not be available");
            None
        }
    };

    let server = AgentServer::new(tools::build_registry(chat_model));
    server.serve_stdio().await
}
