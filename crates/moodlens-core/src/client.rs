//! HTTP client for a remote orchestrator endpoint

use moodlens_gateway::GatewayConfig;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::analysis::AnalysisResult;
use crate::capture::{self, CaptureError, ImagePayload};
use crate::error::ErrorBody;

/// Slack on top of the orchestrator's own gateway timeouts
const TIMEOUT_MARGIN: Duration = Duration::from_secs(15);

/// Client timeout covering both sequential gateway calls plus a margin
pub fn timeout_for_gateway(gateway_timeout: Duration) -> Duration {
    gateway_timeout * 2 + TIMEOUT_MARGIN
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Orchestrator error: {status} - {message}")]
    Orchestrator { status: u16, message: String },
}

#[derive(Clone)]
pub struct AnalysisClient {
    client: reqwest::Client,
    endpoint: Arc<String>,
    anon_key: Option<Arc<String>>,
}

impl AnalysisClient {
    /// Client sized for an orchestrator running the default gateway timeout
    pub fn new(endpoint: impl Into<String>, anon_key: Option<String>) -> Result<Self, ClientError> {
        Self::with_timeout(
            endpoint,
            anon_key,
            timeout_for_gateway(GatewayConfig::default().timeout),
        )
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        anon_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: Arc::new(endpoint.into()),
            anon_key: anon_key.filter(|k| !k.is_empty()).map(Arc::new),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post a payload to the orchestrator and decode its answer
    pub async fn analyze(&self, payload: &ImagePayload) -> Result<AnalysisResult, ClientError> {
        debug!("Invoking orchestrator at {}", self.endpoint);

        let mut request = self
            .client
            .post(self.endpoint.as_str())
            .json(&serde_json::json!({ "imageData": payload.as_data_uri() }));

        if let Some(key) = &self.anon_key {
            request = request
                .header("apikey", key.as_str())
                .bearer_auth(key.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            warn!("Orchestrator returned {}: {}", status, message);
            return Err(ClientError::Orchestrator {
                status: status.as_u16(),
                message,
            });
        }

        let result: AnalysisResult = response.json().await?;
        info!("Analysis complete: {}", result.emotion);
        Ok(result)
    }

    /// Upload path: validate and encode the file, then analyze it.
    ///
    /// Input errors return before any request is made.
    pub async fn analyze_file(&self, path: &Path) -> Result<AnalysisResult, ClientError> {
        let payload = capture::from_file(path).await?;
        self.analyze(&payload).await
    }
}

impl std::fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisClient")
            .field("endpoint", &self.endpoint)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
