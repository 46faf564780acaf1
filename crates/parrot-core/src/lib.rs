//! parrot-core — shared foundation for the parrot relay
//!
//! Immutable configuration, the relay error taxonomy, bearer-token issuing,
//! and the tool registry used by the STDIO agent server.

pub mod config;
pub mod error;
pub mod token;
pub mod tools;

pub use config::{CallMode, Config, FrontendConfig, GatewayConfig, RelayConfig, TokenConfig};
pub use error::RelayError;
pub use token::{BearerToken, CommandTokenIssuer, StaticTokenIssuer, TokenIssuer};
pub use tools::{ToolDefinition, ToolHandler, ToolRegistry};
