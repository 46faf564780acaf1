//! Relay error taxonomy
//!
//! Three failure classes, kept distinguishable so callers can map them onto
//! different HTTP statuses. An RPC-level `error` object from the gateway is
//! NOT one of these — it is rendered as reply text by the extraction layer.

use thiserror::Error;

/// Failures a relay invocation can surface
#[derive(Debug, Error)]
pub enum RelayError {
    /// Could not obtain a usable bearer token. Raised before any network
    /// call is attempted.
    #[error("credential error: {0}")]
    Credential(String),

    /// The gateway was reachable but answered with an HTTP error status.
    #[error("gateway returned HTTP {status}: {body}")]
    Gateway { status: u16, body: String },

    /// The gateway was unreachable, timed out, or returned a body that is
    /// not valid JSON.
    #[error("transport error: {0}")]
    Transport(String),
}

impl RelayError {
    /// True when the failure happened before the HTTP request was sent
    pub fn is_credential(&self) -> bool {
        matches!(self, Self::Credential(_))
    }
}
