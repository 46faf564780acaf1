//! Configuration — loaded once at startup, immutable afterwards
//!
//! Settings come from an optional TOML file (`$PARROT_CONFIG`, falling back
//! to `<config dir>/parrot/parrot.toml`) with environment-variable
//! overrides on top. Every field has a documented default so the relay runs
//! against a local gateway with no configuration at all.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Top-level configuration for the parrot workspace
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub token: TokenConfig,
    pub relay: RelayConfig,
    pub frontend: FrontendConfig,
}

/// Where the gateway lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the gateway (env: `GATEWAY_URL`)
    pub url: String,
    /// Path of the JSON-RPC endpoint, appended to the base URL
    pub rpc_path: String,
    /// SQLite database file behind the gateway (env: `MCP_DB_PATH`)
    pub db_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:4444".to_string(),
            rpc_path: "/rpc".to_string(),
            db_path: "mcp.db".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Full URL of the JSON-RPC endpoint
    pub fn rpc_url(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.rpc_path)
    }

    /// Full URL of the registered-servers listing
    pub fn servers_url(&self) -> String {
        format!("{}/servers", self.url.trim_end_matches('/'))
    }
}

/// Parameters for minting short-lived bearer tokens.
///
/// The basic-auth credentials are handed to the external issuer only; they
/// are never sent to the gateway directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Username passed to the issuer (env: `BASIC_AUTH_USER`)
    pub username: String,
    /// Password paired with the username (env: `BASIC_AUTH_PASS` or
    /// `BASIC_AUTH_PASSWORD`)
    pub password: String,
    /// Shared signing secret (env: `JWT_SECRET_KEY`)
    pub secret: String,
    /// Declared token lifetime in seconds
    pub expiry_secs: u64,
    /// Program that mints the token
    pub command: String,
    /// Leading arguments for the issuer command
    pub args: Vec<String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "adminpw".to_string(),
            secret: "my-test-key".to_string(),
            expiry_secs: 60,
            command: "python3".to_string(),
            args: vec![
                "-m".to_string(),
                "mcpgateway.utils.create_jwt_token".to_string(),
            ],
        }
    }
}

/// How `/call` requests address the gateway
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallMode {
    /// The request names a tool directly; the tool name is the RPC method
    Tool,
    /// The request names an agent; routed to the agent's chat capability
    #[default]
    Agent,
}

/// Relay behavior knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub mode: CallMode,
    /// Upper bound for a single gateway round-trip, generous because tools
    /// may be model-backed
    pub timeout_secs: u64,
    /// Exact-match method → parameter-key overrides, consulted before the
    /// built-in heuristic
    pub param_keys: HashMap<String, String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            mode: CallMode::Agent,
            timeout_secs: 60,
            param_keys: HashMap::new(),
        }
    }
}

/// Browser-facing frontend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Listen address (env: `PARROT_BIND`)
    pub bind: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration: TOML file if present, then env overrides,
    /// then validation.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.is_file() => {
                debug!("Loading config from {}", path.display());
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Self::parse(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document into a Config
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PARROT_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("parrot").join("parrot.toml"))
    }

    /// Overlay environment-style overrides. Takes a lookup function so the
    /// override logic is testable without touching process state.
    pub fn apply_overrides<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = get("GATEWAY_URL") {
            self.gateway.url = url;
        }
        if let Some(path) = get("MCP_DB_PATH") {
            self.gateway.db_path = path;
        }
        if let Some(user) = get("BASIC_AUTH_USER") {
            self.token.username = user;
        }
        // Both spellings appear in gateway deployments
        if let Some(pass) = get("BASIC_AUTH_PASS").or_else(|| get("BASIC_AUTH_PASSWORD")) {
            self.token.password = pass;
        }
        if let Some(secret) = get("JWT_SECRET_KEY") {
            self.token.secret = secret;
        }
        if let Some(bind) = get("PARROT_BIND") {
            self.frontend.bind = bind;
        }
    }

    /// Reject configurations that cannot possibly work
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.gateway.url)
            .with_context(|| format!("Invalid gateway URL '{}'", self.gateway.url))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.gateway.url, "http://localhost:4444");
        assert_eq!(config.gateway.rpc_url(), "http://localhost:4444/rpc");
        assert_eq!(config.token.username, "admin");
        assert_eq!(config.token.expiry_secs, 60);
        assert_eq!(config.relay.mode, CallMode::Agent);
        assert_eq!(config.relay.timeout_secs, 60);
        assert_eq!(config.frontend.bind, "0.0.0.0:8000");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = Config::parse(
            r#"
            [gateway]
            url = "http://gw.internal:4444/"

            [relay]
            mode = "tool"
            "#,
        )
        .unwrap();
        assert_eq!(config.relay.mode, CallMode::Tool);
        // Trailing slash must not produce a double slash
        assert_eq!(config.gateway.rpc_url(), "http://gw.internal:4444/rpc");
        assert_eq!(config.gateway.servers_url(), "http://gw.internal:4444/servers");
        // Unspecified sections keep their defaults
        assert_eq!(config.token.secret, "my-test-key");
    }

    #[test]
    fn test_parse_param_key_overrides() {
        let config = Config::parse(
            r#"
            [relay.param_keys]
            "legacy-chat" = "text"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.relay.param_keys.get("legacy-chat").map(String::as_str),
            Some("text")
        );
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        let vars: HashMap<&str, &str> = [
            ("GATEWAY_URL", "http://10.0.0.5:4444"),
            ("BASIC_AUTH_PASSWORD", "hunter2"),
            ("JWT_SECRET_KEY", "prod-secret"),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.gateway.url, "http://10.0.0.5:4444");
        assert_eq!(config.token.password, "hunter2");
        assert_eq!(config.token.secret, "prod-secret");
        // Untouched fields keep defaults
        assert_eq!(config.token.username, "admin");
    }

    #[test]
    fn test_override_pass_precedes_password() {
        let mut config = Config::default();
        let vars: HashMap<&str, &str> =
            [("BASIC_AUTH_PASS", "short"), ("BASIC_AUTH_PASSWORD", "long")]
                .into_iter()
                .collect();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.token.password, "short");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.gateway.url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
