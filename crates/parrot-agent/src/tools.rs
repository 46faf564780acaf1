//! The demonstration tools this agent exposes

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use parrot_core::{ToolHandler, ToolRegistry};

use crate::model::ChatModel;

/// Liveness check; takes nothing, returns "pong"
pub struct PingTool;

#[async_trait]
impl ToolHandler for PingTool {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Liveness check. Returns 'pong'."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _input: Value) -> Result<String> {
        Ok("pong".to_string())
    }
}

/// Returns its input verbatim
pub struct EchoTool;

#[async_trait]
impl ToolHandler for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the given text back unchanged."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Text to echo back" }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let text = input
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing 'text' parameter"))?;
        debug!("echo: {:?}", text);
        Ok(text.to_string())
    }
}

/// Forwards a query to the configured chat backend
pub struct ChatTool {
    model: Arc<dyn ChatModel>,
}

impl ChatTool {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ToolHandler for ChatTool {
    fn name(&self) -> &str {
        "chat"
    }

    fn description(&self) -> &str {
        "Answer a free-form query using the configured language model."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The user's question" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing 'query' parameter"))?;
        debug!("chat: {:?}", query);
        self.model.generate(query).await
    }
}

/// Registry with ping and echo always present, plus chat when a backend
/// is configured
pub fn build_registry(model: Option<Arc<dyn ChatModel>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(PingTool));
    registry.register(Arc::new(EchoTool));
    if let Some(model) = model {
        registry.register(Arc::new(ChatTool::new(model)));
    }
    registry
}
