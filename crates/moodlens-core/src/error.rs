//! Orchestrator error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Why an analysis request produced no result.
///
/// Messages are safe to show to end users; upstream detail is only logged.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Image data is required")]
    MissingImage,
    #[error("Invalid image data: {0}")]
    InvalidImage(String),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("AI_GATEWAY_API_KEY is not configured")]
    MissingCredential,
    #[error("Failed to analyze emotion")]
    ClassificationFailed,
    #[error("Failed to generate suggestion")]
    GenerationFailed,
}

impl AnalysisError {
    /// Rejected before any upstream call was attempted
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::MissingImage | AnalysisError::InvalidImage(_) | AnalysisError::InvalidBody(_)
        )
    }
}

/// Failure body returned by the orchestrator endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        if self.is_input_error() {
            warn!("Rejected analyze-emotion request: {}", self);
        } else {
            error!("Error in analyze-emotion handler: {}", self);
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = AnalysisError::GenerationFailed.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.error, "Failed to generate suggestion");
    }

    #[test]
    fn test_taxonomy() {
        assert!(AnalysisError::MissingImage.is_input_error());
        assert!(AnalysisError::InvalidBody("eof".to_string()).is_input_error());
        assert!(!AnalysisError::MissingCredential.is_input_error());
        assert!(!AnalysisError::ClassificationFailed.is_input_error());
    }
}
