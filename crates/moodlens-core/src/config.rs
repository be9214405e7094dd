use anyhow::{Context, Result};
use moodlens_gateway::{GatewayConfig, DEFAULT_GATEWAY_URL, DEFAULT_MODEL};
use std::time::Duration;

use crate::client;
use crate::server::DEFAULT_MAX_BODY_BYTES;
use crate::session::Resilience;

#[derive(Debug, Clone)]
pub struct Config {
    pub ai_gateway_url: String,
    /// Server-side only; checked per request
    pub ai_gateway_api_key: Option<String>,
    pub ai_gateway_model: String,
    pub ai_gateway_timeout: Duration,

    pub http_port: u16,
    pub http_max_body_bytes: usize,

    // Client-side config
    pub orchestrator_url: String,
    pub orchestrator_anon_key: Option<String>,
    pub resilience: Resilience,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            ai_gateway_url: std::env::var("AI_GATEWAY_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            ai_gateway_api_key: std::env::var("AI_GATEWAY_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            ai_gateway_model: std::env::var("AI_GATEWAY_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ai_gateway_timeout: Duration::from_secs(
                std::env::var("AI_GATEWAY_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("AI_GATEWAY_TIMEOUT_SECS must be a number of seconds")?,
            ),

            http_port: std::env::var("HTTP_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("HTTP_PORT must be a valid port number")?,
            http_max_body_bytes: std::env::var("HTTP_MAX_BODY_BYTES")
                .map(|s| s.parse())
                .unwrap_or(Ok(DEFAULT_MAX_BODY_BYTES))
                .context("HTTP_MAX_BODY_BYTES must be a number of bytes")?,

            orchestrator_url: std::env::var("ORCHESTRATOR_URL")
                .unwrap_or_else(|_| "http://localhost:3000/analyze-emotion".to_string()),
            orchestrator_anon_key: std::env::var("ORCHESTRATOR_ANON_KEY").ok(),
            resilience: std::env::var("MOODLENS_RESILIENCE")
                .map(|s| s.parse())
                .unwrap_or(Ok(Resilience::RetryPrompt))
                .context("MOODLENS_RESILIENCE must be 'retry' or 'fallback'")?,
        })
    }

    /// How long a caller should wait for the orchestrator's two back-to-back gateway calls
    pub fn client_timeout(&self) -> Duration {
        client::timeout_for_gateway(self.ai_gateway_timeout)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.ai_gateway_url.clone(),
            api_key: self.ai_gateway_api_key.clone(),
            model: self.ai_gateway_model.clone(),
            timeout: self.ai_gateway_timeout,
        }
    }
}
