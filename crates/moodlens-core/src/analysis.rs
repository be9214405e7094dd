use serde::{Deserialize, Serialize};

use crate::emotion::{Emotion, EmotionLabel};

/// Message substituted when the orchestrator is unreachable and the caller opted into
/// the offline fallback
pub const OFFLINE_SUGGESTION: &str = "Não foi possível analisar sua foto agora, mas que tal uma pausa? \
    Respire fundo, ouça uma música que você ama e lembre-se: **todo momento é uma nova chance**.";

/// Combined output of the classification and generation calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub emotion: EmotionLabel,
    /// Raw generated text, markdown-flavored
    pub suggestion: String,
}

impl AnalysisResult {
    pub fn new(emotion: EmotionLabel, suggestion: impl Into<String>) -> Self {
        Self {
            emotion,
            suggestion: suggestion.into(),
        }
    }

    /// Canned result used when no analysis could be obtained
    pub fn offline_fallback() -> Self {
        Self::new(Emotion::Neutro.into(), OFFLINE_SUGGESTION)
    }
}
