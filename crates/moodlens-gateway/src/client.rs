//! AI gateway client
//!
//! Thin client over an OpenAI-compatible `/chat/completions` endpoint, authenticated
//! with a bearer credential that only ever lives server-side.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::chat::{ChatMessage, ChatRequest, ChatResponse};

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("AI gateway API key is not configured")]
    MissingApiKey,
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("API returned no message content")]
    EmptyResponse,
}

#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL, without the trailing `/chat/completions`
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: Arc<String>,
    api_key: Option<Arc<String>>,
    model: Arc<String>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("MoodLens/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: Arc::new(config.base_url.trim_end_matches('/').to_string()),
            api_key: config.api_key.filter(|k| !k.is_empty()).map(Arc::new),
            model: Arc::new(config.model),
        })
    }

    /// Whether a bearer credential is available for outbound calls
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send a chat-completion request and return the first choice's content.
    ///
    /// Any non-success status is returned as [`GatewayError::Api`] with the raw body
    /// so the caller can log it; nothing is retried.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_ref().ok_or(GatewayError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            "Chat completion request to {} ({} messages, model {})",
            url,
            messages.len(),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.as_str())
            .json(&ChatRequest {
                model: &self.model,
                messages,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("AI gateway error {}: {}", status, error_text);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: ChatResponse = response.json().await?;
        body.first_content()
            .map(str::to_string)
            .ok_or(GatewayError::EmptyResponse)
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}
