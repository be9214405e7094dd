//! Emotion labels and their static lookups
//!
//! The classifier answers with a free-form token. It is kept verbatim (trimmed and
//! lowercased) as an [`EmotionLabel`]; lookups go through [`EmotionLabel::emotion`] and
//! fall back in exactly one place per table when the token is outside the known set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Glyph shown for labels outside the known set
pub const DEFAULT_GLYPH: &str = "🙂";
/// Gradient shown for labels outside the known set
pub const DEFAULT_GRADIENT: &str = "from-primary to-secondary";

/// The closed set of moods the classifier is asked to choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Feliz,
    Triste,
    Neutro,
    Ansioso,
    Entusiasmado,
    Cansado,
    Reflexivo,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Feliz,
        Emotion::Triste,
        Emotion::Neutro,
        Emotion::Ansioso,
        Emotion::Entusiasmado,
        Emotion::Cansado,
        Emotion::Reflexivo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Feliz => "feliz",
            Emotion::Triste => "triste",
            Emotion::Neutro => "neutro",
            Emotion::Ansioso => "ansioso",
            Emotion::Entusiasmado => "entusiasmado",
            Emotion::Cansado => "cansado",
            Emotion::Reflexivo => "reflexivo",
        }
    }

    /// Exact match against a normalized token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == token)
    }

    /// Instruction sent as the user message of the generation call
    pub fn suggestion_prompt(&self) -> &'static str {
        match self {
            Emotion::Feliz => "A pessoa está feliz! Sugira uma música animada e alegre OU escreva um pequeno poema celebrando esse momento de felicidade. Seja criativo e positivo!",
            Emotion::Triste => "A pessoa está triste. Sugira uma música reconfortante e calma OU escreva um poema inspirador que traga esperança e conforto. Seja empático e gentil.",
            Emotion::Neutro => "A pessoa está com emoção neutra. Sugira uma música agradável e relaxante OU escreva um poema curto sobre apreciar os pequenos momentos. Seja tranquilo e positivo.",
            Emotion::Ansioso => "A pessoa parece ansiosa. Sugira uma música calma e meditativa OU escreva um poema sobre respirar fundo e encontrar paz interior. Seja reconfortante.",
            Emotion::Entusiasmado => "A pessoa está entusiasmada! Sugira uma música energética e motivadora OU escreva um poema sobre perseguir sonhos e aproveitar a energia. Seja empolgante!",
            Emotion::Cansado => "A pessoa parece cansada. Sugira uma música suave e relaxante OU escreva um poema sobre descanso e renovação. Seja gentil e reconfortante.",
            Emotion::Reflexivo => "A pessoa parece reflexiva. Sugira uma música contemplativa OU escreva um poema sobre introspecção e crescimento pessoal. Seja profundo mas esperançoso.",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Emotion::Feliz => "😊",
            Emotion::Triste => "😢",
            Emotion::Neutro => "😐",
            Emotion::Ansioso => "😰",
            Emotion::Entusiasmado => "🤩",
            Emotion::Cansado => "😴",
            Emotion::Reflexivo => "🤔",
        }
    }

    pub fn gradient(&self) -> &'static str {
        match self {
            Emotion::Feliz => "from-yellow-400 to-orange-400",
            Emotion::Triste => "from-blue-400 to-blue-600",
            Emotion::Neutro => "from-gray-400 to-gray-500",
            Emotion::Ansioso => "from-red-400 to-orange-500",
            Emotion::Entusiasmado => "from-green-400 to-emerald-500",
            Emotion::Cansado => "from-indigo-400 to-purple-500",
            Emotion::Reflexivo => "from-purple-400 to-pink-500",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classifier answer, normalized but not validated.
///
/// Tokens outside the closed set are carried through untouched so the caller still
/// sees what the model said.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionLabel(String);

impl EmotionLabel {
    /// Trim and lowercase a raw model answer
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn emotion(&self) -> Option<Emotion> {
        Emotion::from_token(&self.0)
    }

    pub fn is_known(&self) -> bool {
        self.emotion().is_some()
    }
}

impl From<Emotion> for EmotionLabel {
    fn from(emotion: Emotion) -> Self {
        Self(emotion.as_str().to_string())
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pick the generation prompt for a label; anything unrecognized gets the neutral one.
pub fn select_template(label: &EmotionLabel) -> &'static str {
    label
        .emotion()
        .unwrap_or(Emotion::Neutro)
        .suggestion_prompt()
}

/// Glyph and gradient for a label, with the generic defaults for unknown tokens
pub fn display_for(label: &EmotionLabel) -> (&'static str, &'static str) {
    match label.emotion() {
        Some(emotion) => (emotion.glyph(), emotion.gradient()),
        None => (DEFAULT_GLYPH, DEFAULT_GRADIENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        let label = EmotionLabel::normalize("  Feliz\n");
        assert_eq!(label.as_str(), "feliz");
        assert_eq!(label.emotion(), Some(Emotion::Feliz));
    }

    #[test]
    fn test_unknown_label_kept_verbatim() {
        let label = EmotionLabel::normalize("Confuso.");
        assert_eq!(label.as_str(), "confuso.");
        assert!(!label.is_known());
    }

    #[test]
    fn test_select_template_known_labels() {
        for emotion in Emotion::ALL {
            let label = EmotionLabel::from(emotion);
            assert_eq!(select_template(&label), emotion.suggestion_prompt());
        }
    }

    #[test]
    fn test_select_template_unknown_falls_back_to_neutro() {
        for raw in ["desconhecido", "", "feliz!", "happy"] {
            let label = EmotionLabel::normalize(raw);
            assert_eq!(select_template(&label), Emotion::Neutro.suggestion_prompt());
        }
    }

    #[test]
    fn test_templates_are_distinct() {
        let mut prompts: Vec<_> = Emotion::ALL.iter().map(|e| e.suggestion_prompt()).collect();
        prompts.sort();
        prompts.dedup();
        assert_eq!(prompts.len(), Emotion::ALL.len());
    }

    #[test]
    fn test_display_for_unknown_uses_defaults() {
        let (glyph, gradient) = display_for(&EmotionLabel::normalize("desconhecido"));
        assert_eq!(glyph, DEFAULT_GLYPH);
        assert_eq!(gradient, DEFAULT_GRADIENT);
    }

    #[test]
    fn test_display_for_known() {
        let (glyph, gradient) = display_for(&EmotionLabel::from(Emotion::Triste));
        assert_eq!(glyph, "😢");
        assert_eq!(gradient, "from-blue-400 to-blue-600");
    }

    #[test]
    fn test_label_serializes_as_plain_string() {
        let json = serde_json::to_string(&EmotionLabel::normalize("Cansado")).unwrap();
        assert_eq!(json, "\"cansado\"");
    }
}
