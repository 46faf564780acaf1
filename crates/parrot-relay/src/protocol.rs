//! Gateway RPC envelope construction
//!
//! The gateway speaks JSON-RPC 2.0. The relay never batches, so the request
//! id is the constant 1; correlation happens per HTTP round-trip.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

pub const JSONRPC_VERSION: &str = "2.0";
pub const RELAY_REQUEST_ID: u64 = 1;

/// Suffix routing an agent-addressed call to that agent's chat capability
const CHAT_SUFFIX: &str = "/chat";

/// Addressing mode for a single invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A fixed tool; its name is the RPC method
    Tool(String),
    /// A selectable agent; the method is the agent name plus `/chat`
    Agent(String),
}

impl Target {
    /// Derive the RPC method name for this target
    pub fn method(&self) -> String {
        match self {
            Target::Tool(name) => normalize_tool(name),
            Target::Agent(name) => format!("{}{}", normalize_tool(name), CHAT_SUFFIX),
        }
    }

    /// The raw tool or agent identifier
    pub fn name(&self) -> &str {
        match self {
            Target::Tool(name) | Target::Agent(name) => name,
        }
    }
}

/// Flatten a tool identifier into the gateway's method namespace, which
/// disallows path separators. Idempotent.
pub fn normalize_tool(name: &str) -> String {
    name.replace('/', "-")
}

/// Pick the single parameter key for a method name.
///
/// Exact-match overrides from configuration win; otherwise chat-like
/// methods take `"query"` and everything else takes `"text"`. The
/// substring rule is a fixed, documented heuristic — the gateway publishes
/// no schema for this, so deployments with differing tools use the
/// override table.
pub fn param_key_for(method: &str, overrides: &HashMap<String, String>) -> String {
    if let Some(key) = overrides.get(method) {
        return key.clone();
    }
    if method.contains("chat") {
        "query".to_string()
    } else {
        "text".to_string()
    }
}

/// The JSON-RPC request body sent to the gateway
#[derive(Debug, Clone, Serialize)]
pub struct RpcEnvelope {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcEnvelope {
    /// Build the envelope for a target and prompt. Exactly one parameter is
    /// sent, keyed per [`param_key_for`].
    pub fn build(target: &Target, prompt: &str, overrides: &HashMap<String, String>) -> Self {
        let method = target.method();
        let key = param_key_for(&method, overrides);
        let mut params = serde_json::Map::new();
        params.insert(key, Value::String(prompt.to_string()));
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: RELAY_REQUEST_ID,
            method,
            params: Value::Object(params),
        }
    }
}
