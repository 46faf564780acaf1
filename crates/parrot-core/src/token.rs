//! Bearer-token issuing — a fresh short-lived token per call
//!
//! Tokens are minted by an external utility (the gateway ships one) that
//! prints a single-line token on stdout. They are cheap to mint and expire
//! within a minute, so the relay never caches or reuses them.

use async_trait::async_trait;
use std::fmt;
use tokio::process::Command;
use tracing::debug;

use crate::config::TokenConfig;
use crate::error::RelayError;

/// An opaque bearer credential. Debug output redacts the value so tokens
/// never leak into logs.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Capability to mint a bearer token. Injectable so tests can substitute a
/// stub without spawning a process.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn mint(&self) -> Result<BearerToken, RelayError>;
}

/// Issues tokens by invoking the external gateway token utility
pub struct CommandTokenIssuer {
    config: TokenConfig,
}

impl CommandTokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TokenIssuer for CommandTokenIssuer {
    async fn mint(&self) -> Result<BearerToken, RelayError> {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .arg("--username")
            .arg(&self.config.username)
            .arg("--secret")
            .arg(&self.config.secret)
            .arg("--exp")
            .arg(self.config.expiry_secs.to_string());

        debug!("Minting token via '{}'", self.config.command);

        let output = cmd.output().await.map_err(|e| {
            RelayError::Credential(format!(
                "failed to run token issuer '{}': {}",
                self.config.command, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RelayError::Credential(format!(
                "token issuer exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(RelayError::Credential(
                "token issuer produced an empty token".to_string(),
            ));
        }

        Ok(BearerToken::new(token))
    }
}

/// Hands out a fixed token. For tests and deployments with a pre-minted
/// long-lived credential.
pub struct StaticTokenIssuer {
    token: BearerToken,
}

impl StaticTokenIssuer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: BearerToken::new(token),
        }
    }
}

#[async_trait]
impl TokenIssuer for StaticTokenIssuer {
    async fn mint(&self) -> Result<BearerToken, RelayError> {
        Ok(self.token.clone())
    }
}
