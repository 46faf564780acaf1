//! Chat backend — the external prompt-to-text function behind the `chat` tool
//!
//! The inference service is a black box: it takes a prompt, it returns
//! generated text. Anything beyond that (model choice, decoding, quotas)
//! belongs to the service.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Prompt in, text out
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Chat backend speaking to an HTTP text-generation endpoint
pub struct HttpChatModel {
    http: Client,
    url: String,
    api_key: String,
    model_id: String,
}

impl HttpChatModel {
    pub fn new(url: String, api_key: String, model_id: String) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("failed to build HTTP client"),
            url,
            api_key,
            model_id,
        }
    }

    /// Build from the environment. Returns `None` when `CHAT_API_URL` is
    /// unset, so the agent can run without a chat backend at all.
    pub fn from_env() -> Result<Option<Self>> {
        let url = match std::env::var("CHAT_API_URL") {
            Ok(url) => url,
            Err(_) => return Ok(None),
        };
        let api_key = std::env::var("CHAT_API_KEY")
            .context("CHAT_API_URL is set but CHAT_API_KEY is not")?;
        let model_id = std::env::var("CHAT_MODEL_ID")
            .unwrap_or_else(|_| "ibm/granite-3-3-8b-instruct".to_string());
        Ok(Some(Self::new(url, api_key, model_id)))
    }
}

#[async_trait]
impl ChatModel for HttpChatModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Generating text with {}", self.model_id);

        let payload = serde_json::json!({
            "model_id": self.model_id,
            "input": prompt,
            "parameters": {
                "decoding_method": "greedy",
                "max_new_tokens": 200,
            },
        });

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to reach inference endpoint {}", self.url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Inference endpoint returned HTTP {}",
                response.status()
            ));
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse inference response")?;

        let text = body
            .get("results")
            .and_then(|r| r.as_array())
            .and_then(|r| r.first())
            .and_then(|r| r.get("generated_text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| anyhow!("No generated_text in inference response"))?;

        Ok(text.trim().to_string())
    }
}
