//! Relay client — one-shot, stateless gateway invocations
//!
//! Each call mints a fresh bearer token, POSTs a single JSON-RPC envelope,
//! and extracts reply text. No retries, no session affinity, no caching.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use parrot_core::{CommandTokenIssuer, Config, RelayError, TokenIssuer};

use crate::extract::extract_reply;
use crate::protocol::{RpcEnvelope, Target};

/// Immutable relay settings, fixed at construction and shared read-only
/// across concurrent invocations
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Full URL of the gateway's JSON-RPC endpoint
    pub rpc_url: String,
    /// Full URL of the gateway's registered-servers listing
    pub servers_url: String,
    /// Upper bound for a single round-trip
    pub timeout: Duration,
    /// Exact-match method → parameter-key overrides
    pub param_key_overrides: HashMap<String, String>,
}

impl From<&Config> for RelayOptions {
    fn from(config: &Config) -> Self {
        Self {
            rpc_url: config.gateway.rpc_url(),
            servers_url: config.gateway.servers_url(),
            timeout: Duration::from_secs(config.relay.timeout_secs),
            param_key_overrides: config.relay.param_keys.clone(),
        }
    }
}

/// One gateway-registered agent, as surfaced to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
}

/// Entry in the gateway's `/servers` listing
#[derive(Debug, Deserialize)]
struct ServerEntry {
    name: String,
    #[serde(default, rename = "isActive")]
    is_active: bool,
}

/// Client for the tool-invocation relay protocol
#[derive(Clone)]
pub struct RelayClient {
    http: Client,
    options: RelayOptions,
    issuer: Arc<dyn TokenIssuer>,
}

impl RelayClient {
    pub fn new(options: RelayOptions, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self {
            http: Client::builder()
                .timeout(options.timeout)
                .build()
                .expect("failed to build HTTP client"),
            options,
            issuer,
        }
    }

    /// Build a client from configuration, minting tokens via the external
    /// issuer command
    pub fn from_config(config: &Config) -> Self {
        let issuer = Arc::new(CommandTokenIssuer::new(config.token.clone()));
        Self::new(RelayOptions::from(config), issuer)
    }

    /// Invoke a target with a prompt and return the extracted reply text.
    ///
    /// An RPC-level `error` object comes back as `Ok` text; only
    /// credential, HTTP-status, and transport failures are `Err`.
    pub async fn invoke(&self, target: &Target, prompt: &str) -> Result<String, RelayError> {
        let envelope = RpcEnvelope::build(target, prompt, &self.options.param_key_overrides);
        info!("Invoking {} | prompt: {}", envelope.method, prompt);

        // Mint before any network I/O; a credential failure must prevent
        // the HTTP call entirely.
        let token = self.issuer.mint().await?;

        // Bearer only. Adding basic-auth credentials alongside would
        // overwrite the Authorization header: at most one scheme per
        // request.
        let response = self
            .http
            .post(&self.options.rpc_url)
            .bearer_auth(token.as_str())
            .json(&envelope)
            .send()
            .await
            .map_err(|e| transport_error("could not reach gateway", &e))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            error!("Gateway error body: {}", body);
            return Err(RelayError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| transport_error("invalid response from gateway", &e))?;
        debug!("Raw gateway JSON: {}", body);

        let text = extract_reply(&body);
        info!("Reply: {}", text);
        Ok(text)
    }

    /// List the gateway's active agents
    pub async fn list_agents(&self) -> Result<Vec<AgentInfo>, RelayError> {
        let token = self.issuer.mint().await?;

        let response = self
            .http
            .get(&self.options.servers_url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| transport_error("could not reach gateway", &e))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        let servers: Vec<ServerEntry> = response
            .json()
            .await
            .map_err(|e| transport_error("invalid response from gateway", &e))?;

        let agents: Vec<AgentInfo> = servers
            .into_iter()
            .filter(|s| s.is_active)
            .map(|s| AgentInfo { name: s.name })
            .collect();
        info!("Found {} active agents", agents.len());
        Ok(agents)
    }
}

fn transport_error(what: &str, cause: &reqwest::Error) -> RelayError {
    RelayError::Transport(format!("{}: {}", what, cause))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parrot_core::{BearerToken, StaticTokenIssuer};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn options_for(base: &str) -> RelayOptions {
        RelayOptions {
            rpc_url: format!("{}/rpc", base),
            servers_url: format!("{}/servers", base),
            timeout: Duration::from_millis(500),
            param_key_overrides: HashMap::new(),
        }
    }

    fn static_client(base: &str) -> RelayClient {
        RelayClient::new(options_for(base), Arc::new(StaticTokenIssuer::new("tok")))
    }

    struct FailingIssuer;

    #[async_trait::async_trait]
    impl TokenIssuer for FailingIssuer {
        async fn mint(&self) -> Result<BearerToken, RelayError> {
            Err(RelayError::Credential("stub issuer always fails".into()))
        }
    }

    #[tokio::test]
    async fn test_invoke_connection_refused_is_transport() {
        let client = static_client("http://127.0.0.1:1");
        let err = client
            .invoke(&Target::Tool("ping".into()), "")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RelayError::Transport(_)));
        assert!(err.to_string().contains("could not reach gateway"));
    }

    #[tokio::test]
    async fn test_list_agents_connection_refused_is_transport() {
        let client = static_client("http://127.0.0.1:1");
        let err = client.list_agents().await.err().unwrap();
        assert!(matches!(err, RelayError::Transport(_)));
    }

    #[tokio::test]
    async fn test_credential_failure_prevents_http_call() {
        // A listener that records whether anything ever connected
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connected = Arc::new(AtomicBool::new(false));
        let flag = connected.clone();
        tokio::spawn(async move {
            if listener.accept().await.is_ok() {
                flag.store(true, Ordering::SeqCst);
            }
        });

        let client = RelayClient::new(
            options_for(&format!("http://{}", addr)),
            Arc::new(FailingIssuer),
        );
        let err = client
            .invoke(&Target::Agent("watsonx-agent".into()), "hi")
            .await
            .err()
            .unwrap();
        assert!(err.is_credential());

        // Give any stray connection a moment to land before asserting
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!connected.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_unresponsive_gateway_times_out_as_transport() {
        // Accepts the connection but never writes a byte
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _conn = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = static_client(&format!("http://{}", addr));
        // The client timeout is 500ms; the invocation must fail well within
        // the outer bound rather than hang.
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            client.invoke(&Target::Tool("slow".into()), "hi"),
        )
        .await
        .expect("invocation did not honor its timeout");
        assert!(matches!(result, Err(RelayError::Transport(_))));
    }

    #[tokio::test]
    async fn test_options_from_config() {
        let config = Config::default();
        let options = RelayOptions::from(&config);
        assert_eq!(options.rpc_url, "http://localhost:4444/rpc");
        assert_eq!(options.servers_url, "http://localhost:4444/servers");
        assert_eq!(options.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_server_entry_parses_gateway_shape() {
        let entries: Vec<ServerEntry> = serde_json::from_str(
            r#"[{"name": "watsonx-agent", "isActive": true},
                {"name": "stale-agent", "isActive": false},
                {"name": "no-flag-agent"}]"#,
        )
        .unwrap();
        let active: Vec<&ServerEntry> = entries.iter().filter(|e| e.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "watsonx-agent");
    }
}
