//! Image acquisition: uploaded files and encoded camera frames
//!
//! Both paths end in the same [`ImagePayload`], a `data:` URI the orchestrator can embed
//! directly in the classification request.

use anyhow::Context;
use base64::Engine;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::camera::DeviceError;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Selecione um arquivo de imagem válido (recebido: {0}).")]
    NotAnImage(String),
    #[error("Imagem inválida: {0}")]
    InvalidDataUri(String),
    #[error("Não foi possível ler o arquivo: {0}")]
    Read(String),
    #[error("Falha ao codificar a imagem: {0}")]
    Encode(String),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

impl CaptureError {
    /// Whether this failure came from the caller's input rather than a device
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CaptureError::NotAnImage(_) | CaptureError::InvalidDataUri(_) | CaptureError::Read(_)
        )
    }
}

/// A still image encoded as `data:<mime>;base64,<body>`
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    data_uri: String,
    mime_len: usize,
}

impl ImagePayload {
    /// Encode raw image bytes under the given MIME type
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, CaptureError> {
        if !is_image_type(mime_type) {
            return Err(CaptureError::NotAnImage(mime_type.to_string()));
        }
        let body = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Self {
            data_uri: format!("data:{};base64,{}", mime_type, body),
            mime_len: mime_type.len(),
        })
    }

    /// Validate an already-encoded data URI
    pub fn parse(data_uri: &str) -> Result<Self, CaptureError> {
        let rest = data_uri
            .strip_prefix("data:")
            .ok_or_else(|| CaptureError::InvalidDataUri("missing data: prefix".to_string()))?;
        let (mime_type, body) = rest
            .split_once(";base64,")
            .ok_or_else(|| CaptureError::InvalidDataUri("expected base64 encoding".to_string()))?;
        if !is_image_type(mime_type) {
            return Err(CaptureError::NotAnImage(mime_type.to_string()));
        }
        if body.is_empty() {
            return Err(CaptureError::InvalidDataUri("empty image body".to_string()));
        }
        Ok(Self {
            data_uri: data_uri.to_string(),
            mime_len: mime_type.len(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.data_uri["data:".len().."data:".len() + self.mime_len]
    }

    pub fn as_data_uri(&self) -> &str {
        &self.data_uri
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type())
            .field("len", &self.data_uri.len())
            .finish()
    }
}

/// Declared content type must be `image/*`
pub fn is_image_type(content_type: &str) -> bool {
    content_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
        && content_type.len() > 6
}

/// Accept an uploaded file given its bytes and declared content type
pub fn from_upload(bytes: &[u8], content_type: &str) -> Result<ImagePayload, CaptureError> {
    if !is_image_type(content_type) {
        return Err(CaptureError::NotAnImage(content_type.to_string()));
    }
    debug!("Encoding uploaded {} ({} bytes)", content_type, bytes.len());
    ImagePayload::from_bytes(bytes, content_type)
}

/// Read a file from disk, using its extension as the declared content type.
///
/// The type check runs before the file is read.
pub async fn from_file(path: &Path) -> Result<ImagePayload, CaptureError> {
    let content_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream");
    if !is_image_type(content_type) {
        return Err(CaptureError::NotAnImage(content_type.to_string()));
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image file: {}", path.display()))
        .map_err(|e| CaptureError::Read(format!("{:#}", e)))?;

    info!(
        "Loaded image {} ({}, {} bytes)",
        path.display(),
        content_type,
        bytes.len()
    );
    from_upload(&bytes, content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_upload_builds_data_uri() {
        let payload = from_upload(b"abc", "image/png").unwrap();
        assert_eq!(payload.as_data_uri(), "data:image/png;base64,YWJj");
        assert_eq!(payload.mime_type(), "image/png");
    }

    #[test]
    fn test_from_upload_rejects_non_image() {
        let err = from_upload(b"%PDF", "application/pdf").unwrap_err();
        assert!(matches!(err, CaptureError::NotAnImage(ref t) if t == "application/pdf"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_is_image_type() {
        assert!(is_image_type("image/jpeg"));
        assert!(is_image_type("IMAGE/PNG"));
        assert!(!is_image_type("image/"));
        assert!(!is_image_type("text/plain"));
        assert!(!is_image_type(""));
    }

    #[test]
    fn test_parse_data_uri() {
        let payload = ImagePayload::parse("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(payload.mime_type(), "image/jpeg");

        assert!(matches!(
            ImagePayload::parse("https://example.com/a.jpg"),
            Err(CaptureError::InvalidDataUri(_))
        ));
        assert!(matches!(
            ImagePayload::parse("data:text/plain;base64,aGk="),
            Err(CaptureError::NotAnImage(_))
        ));
        assert!(matches!(
            ImagePayload::parse("data:image/png;base64,"),
            Err(CaptureError::InvalidDataUri(_))
        ));
    }

    #[tokio::test]
    async fn test_from_file_rejects_by_extension_before_reading() {
        // The file does not exist: the type check must fail first
        let err = from_file(Path::new("/nonexistent/notes.txt")).await.unwrap_err();
        assert!(matches!(err, CaptureError::NotAnImage(_)));
    }

    #[tokio::test]
    async fn test_from_file_reads_image() {
        let path = std::env::temp_dir().join(format!("moodlens-{}.png", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"\x89PNG").await.unwrap();

        let payload = from_file(&path).await.unwrap();
        assert_eq!(payload.mime_type(), "image/png");
        assert!(payload.as_data_uri().starts_with("data:image/png;base64,"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_from_file_missing_image() {
        let err = from_file(Path::new("/nonexistent/face.jpg")).await.unwrap_err();
        assert!(matches!(err, CaptureError::Read(_)));
    }
}
