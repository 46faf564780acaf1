//! HTTP routes — `/call`, `/agents`, and the embedded UI
//!
//! Callers distinguish success from failure by HTTP status: a successful
//! relay call always yields `{"result": ...}`, failures yield
//! `{"detail": ...}` with a status from the relay error taxonomy.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use parrot_core::{CallMode, Config, RelayError};
use parrot_relay::{RelayClient, Target};

use crate::assets;

/// Shared, immutable per-process state
#[derive(Clone)]
pub struct AppState {
    pub relay: RelayClient,
    pub mode: CallMode,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            relay: RelayClient::from_config(config),
            mode: config.relay.mode,
        }
    }
}

/// Build the frontend router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(assets::index))
        .route("/static/{*path}", get(assets::static_asset))
        .route("/call", post(call_tool))
        .route("/agents", get(list_agents))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CallArgs {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct CallRequest {
    pub tool: String,
    pub args: CallArgs,
}

#[derive(Debug, Serialize)]
pub struct CallResponse {
    pub result: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
        .into_response()
}

/// Map a relay failure onto an HTTP status + detail body
fn relay_error_response(err: RelayError) -> Response {
    warn!("Relay call failed: {}", err);
    match err {
        RelayError::Credential(_) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to mint an authentication token for the gateway.",
        ),
        RelayError::Gateway { status, body } => error_response(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            format!("Gateway error: {}", body),
        ),
        RelayError::Transport(cause) => error_response(
            StatusCode::BAD_GATEWAY,
            format!("Could not reach gateway: {}", cause),
        ),
    }
}

/// POST /call — relay a prompt to a tool or agent
async fn call_tool(State(state): State<AppState>, Json(req): Json<CallRequest>) -> Response {
    if req.tool.trim().is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "'tool' must not be empty",
        );
    }

    let target = match state.mode {
        CallMode::Tool => Target::Tool(req.tool.clone()),
        CallMode::Agent => Target::Agent(req.tool.clone()),
    };
    info!("/call {} | prompt: {}", req.tool, req.args.prompt);

    match state.relay.invoke(&target, &req.args.prompt).await {
        Ok(result) => Json(CallResponse { result }).into_response(),
        Err(err) => relay_error_response(err),
    }
}

/// GET /agents — active agents registered with the gateway
async fn list_agents(State(state): State<AppState>) -> Response {
    match state.relay.list_agents().await {
        Ok(agents) => Json(agents).into_response(),
        Err(err) => relay_error_response(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use parrot_core::{BearerToken, StaticTokenIssuer, TokenIssuer};
    use parrot_relay::RelayOptions;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FailingIssuer;

    #[async_trait::async_trait]
    impl TokenIssuer for FailingIssuer {
        async fn mint(&self) -> Result<BearerToken, RelayError> {
            Err(RelayError::Credential("stub".into()))
        }
    }

    fn test_state(issuer: Arc<dyn TokenIssuer>) -> AppState {
        let options = RelayOptions {
            // Nothing listens here; transport failures are immediate
            rpc_url: "http://127.0.0.1:1/rpc".to_string(),
            servers_url: "http://127.0.0.1:1/servers".to_string(),
            timeout: Duration::from_millis(500),
            param_key_overrides: HashMap::new(),
        };
        AppState {
            relay: RelayClient::new(options, issuer),
            mode: CallMode::Agent,
        }
    }

    fn call_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/call")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_call_empty_tool_is_unprocessable() {
        let app = router(test_state(Arc::new(StaticTokenIssuer::new("tok"))));
        let response = app
            .oneshot(call_request(r#"{"tool": "  ", "args": {"prompt": "hi"}}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_call_credential_failure_is_500() {
        let app = router(test_state(Arc::new(FailingIssuer)));
        let response = app
            .oneshot(call_request(
                r#"{"tool": "watsonx-agent", "args": {"prompt": "hi"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .contains("authentication token")
        );
    }

    #[tokio::test]
    async fn test_call_unreachable_gateway_is_502() {
        let app = router(test_state(Arc::new(StaticTokenIssuer::new("tok"))));
        let response = app
            .oneshot(call_request(
                r#"{"tool": "watsonx-agent", "args": {"prompt": "hi"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .contains("Could not reach gateway")
        );
    }

    #[tokio::test]
    async fn test_call_missing_prompt_defaults_to_empty() {
        // `prompt` may be empty; the request must not be rejected for it
        let app = router(test_state(Arc::new(FailingIssuer)));
        let response = app
            .oneshot(call_request(r#"{"tool": "t", "args": {}}"#))
            .await
            .unwrap();
        // Fails at the credential stage, not at validation
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_agents_unreachable_gateway_is_502() {
        let app = router(test_state(Arc::new(StaticTokenIssuer::new("tok"))));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/agents")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_index_served() {
        let app = router(test_state(Arc::new(StaticTokenIssuer::new("tok"))));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_static_asset_is_404() {
        let app = router(test_state(Arc::new(StaticTokenIssuer::new("tok"))));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/static/missing.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_gateway_error_keeps_upstream_status() {
        let response = relay_error_response(RelayError::Gateway {
            status: 401,
            body: "unauthorized".into(),
        });
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_gateway_error_with_bogus_status_falls_back() {
        let response = relay_error_response(RelayError::Gateway {
            status: 99,
            body: "weird".into(),
        });
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
