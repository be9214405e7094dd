//! Emotion/Suggestion Orchestrator
//!
//! Classifies the mood in a photo with a vision-capable model, then asks the same
//! gateway for a suggestion (a song or a short poem) tailored to that mood. The two
//! calls run back to back; a request either yields both answers or fails.

use moodlens_gateway::{ChatMessage, GatewayClient, GatewayError};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::analysis::AnalysisResult;
use crate::capture::{CaptureError, ImagePayload};
use crate::emotion::{select_template, EmotionLabel};
use crate::error::AnalysisError;

/// Instruction for the classification call; the model must answer with one label
pub const CLASSIFICATION_PROMPT: &str = "Analise esta foto e identifique a emoção principal da pessoa. \
    Responda APENAS com uma palavra entre: feliz, triste, neutro, ansioso, entusiasmado, cansado, reflexivo. \
    Seja preciso e conciso.";

/// System message framing the generation call
pub const SUGGESTION_SYSTEM_PROMPT: &str =
    "Você é um assistente criativo que gera sugestões personalizadas para melhorar o humor das pessoas.";

#[derive(Debug, Clone)]
pub struct Orchestrator {
    gateway: Arc<GatewayClient>,
}

impl Orchestrator {
    pub fn new(gateway: GatewayClient) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }

    /// Run the full pipeline for a raw `imageData` field.
    pub async fn analyze(&self, image_data: Option<&str>) -> Result<AnalysisResult, AnalysisError> {
        let payload = validate_payload(image_data)?;
        self.analyze_payload(&payload).await
    }

    /// Run the pipeline for an already validated payload.
    pub async fn analyze_payload(
        &self,
        payload: &ImagePayload,
    ) -> Result<AnalysisResult, AnalysisError> {
        if !self.gateway.is_configured() {
            return Err(AnalysisError::MissingCredential);
        }

        info!("Analyzing emotion from image ({})...", payload.mime_type());
        let emotion = self.classify(payload).await?;
        info!("Detected emotion: {}", emotion);

        let suggestion = self.suggest(&emotion).await?;
        info!("Generated suggestion successfully ({} chars)", suggestion.len());

        Ok(AnalysisResult::new(emotion, suggestion))
    }

    async fn classify(&self, payload: &ImagePayload) -> Result<EmotionLabel, AnalysisError> {
        let messages = [ChatMessage::user_with_image(
            CLASSIFICATION_PROMPT,
            payload.as_data_uri(),
        )];

        let raw = self
            .gateway
            .complete(&messages)
            .await
            .map_err(|e| upstream_failure("Emotion analysis", e, AnalysisError::ClassificationFailed))?;

        let label = EmotionLabel::normalize(&raw);
        if !label.is_known() {
            warn!("Unrecognized emotion label '{}', using the neutral template", label);
        }
        Ok(label)
    }

    async fn suggest(&self, emotion: &EmotionLabel) -> Result<String, AnalysisError> {
        let prompt = select_template(emotion);
        debug!("Suggestion prompt for '{}': {}", emotion, prompt);

        let messages = [
            ChatMessage::system(SUGGESTION_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];

        self.gateway
            .complete(&messages)
            .await
            .map_err(|e| upstream_failure("Suggestion generation", e, AnalysisError::GenerationFailed))
    }
}

fn validate_payload(image_data: Option<&str>) -> Result<ImagePayload, AnalysisError> {
    let image_data = image_data
        .filter(|s| !s.trim().is_empty())
        .ok_or(AnalysisError::MissingImage)?;
    ImagePayload::parse(image_data).map_err(|e| match e {
        CaptureError::NotAnImage(mime) => AnalysisError::InvalidImage(format!("unsupported type {}", mime)),
        other => AnalysisError::InvalidImage(other.to_string()),
    })
}

/// Log the upstream detail and collapse it into the stage's generic error
fn upstream_failure(stage: &str, err: GatewayError, generic: AnalysisError) -> AnalysisError {
    match err {
        GatewayError::MissingApiKey => AnalysisError::MissingCredential,
        GatewayError::Api { status, message } => {
            error!("{} error: {} {}", stage, status, message);
            generic
        }
        other => {
            error!("{} error: {}", stage, other);
            generic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::Emotion;
    use moodlens_gateway::{GatewayConfig, DEFAULT_MODEL};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    fn orchestrator(server: &MockServer, api_key: Option<&str>) -> Orchestrator {
        Orchestrator::new(
            GatewayClient::new(GatewayConfig {
                base_url: server.uri(),
                api_key: api_key.map(str::to_string),
                ..Default::default()
            })
            .unwrap(),
        )
    }

    fn model_field() -> String {
        format!(r#""model":"{}""#, DEFAULT_MODEL)
    }

    async fn mount_classification(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains(model_field()))
            .and(body_string_contains("image_url"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    async fn mount_generation(server: &MockServer, expected_prompt: &str, response: ResponseTemplate, calls: u64) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains(model_field()))
            .and(body_string_contains(r#""role":"system""#))
            .and(body_string_contains(expected_prompt))
            .respond_with(response)
            .expect(calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_two_stage_pipeline() {
        let server = MockServer::start().await;
        mount_classification(&server, completion("  Feliz\n")).await;
        mount_generation(
            &server,
            Emotion::Feliz.suggestion_prompt(),
            completion("**Ótima energia!** [Happy Song - Artist](https://youtube.com/watch?v=abc)"),
            1,
        )
        .await;

        let result = orchestrator(&server, Some("key"))
            .analyze(Some(IMAGE))
            .await
            .unwrap();

        assert_eq!(result.emotion.as_str(), "feliz");
        assert_eq!(
            result.suggestion,
            "**Ótima energia!** [Happy Song - Artist](https://youtube.com/watch?v=abc)"
        );
    }

    #[tokio::test]
    async fn test_unknown_label_uses_neutral_template() {
        let server = MockServer::start().await;
        mount_classification(&server, completion("Surpreso")).await;
        mount_generation(&server, Emotion::Neutro.suggestion_prompt(), completion("Um poema."), 1).await;

        let result = orchestrator(&server, Some("key"))
            .analyze(Some(IMAGE))
            .await
            .unwrap();

        assert_eq!(result.emotion.as_str(), "surpreso");
        assert_eq!(result.suggestion, "Um poema.");
    }

    #[tokio::test]
    async fn test_classification_failure_skips_generation() {
        let server = MockServer::start().await;
        mount_classification(&server, ResponseTemplate::new(500).set_body_string("boom")).await;
        mount_generation(&server, "", completion("unused"), 0).await;

        let err = orchestrator(&server, Some("key"))
            .analyze(Some(IMAGE))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::ClassificationFailed));
        assert!(!err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_generation_failure_yields_no_result() {
        let server = MockServer::start().await;
        mount_classification(&server, completion("triste")).await;
        mount_generation(
            &server,
            Emotion::Triste.suggestion_prompt(),
            ResponseTemplate::new(402).set_body_string("payment required"),
            1,
        )
        .await;

        let err = orchestrator(&server, Some("key"))
            .analyze(Some(IMAGE))
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::GenerationFailed));
    }

    #[tokio::test]
    async fn test_missing_image_is_rejected_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("feliz"))
            .expect(0)
            .mount(&server)
            .await;

        let orchestrator = orchestrator(&server, Some("key"));
        assert!(matches!(
            orchestrator.analyze(None).await,
            Err(AnalysisError::MissingImage)
        ));
        assert!(matches!(
            orchestrator.analyze(Some("   ")).await,
            Err(AnalysisError::MissingImage)
        ));
        assert!(matches!(
            orchestrator.analyze(Some("data:text/plain;base64,aGk=")).await,
            Err(AnalysisError::InvalidImage(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("feliz"))
            .expect(0)
            .mount(&server)
            .await;

        let err = orchestrator(&server, None)
            .analyze(Some(IMAGE))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCredential));
    }

    #[tokio::test]
    async fn test_success_status_without_content_fails() {
        let server = MockServer::start().await;
        mount_classification(
            &server,
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
        )
        .await;

        let err = orchestrator(&server, Some("key"))
            .analyze(Some(IMAGE))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ClassificationFailed));
    }
}
