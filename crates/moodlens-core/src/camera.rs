//! Live camera capture
//!
//! Device access sits behind [`CameraDevice`] so a platform backend can be plugged in.
//! A [`CameraSession`] owns the open stream: capturing consumes the session and stops
//! every track, and dropping the session stops them on any other path.

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;
use tracing::{debug, info, warn};

use crate::capture::{CaptureError, ImagePayload};

/// JPEG quality for captured frames (0.8 on a 0..1 scale)
pub const JPEG_QUALITY: u8 = 80;

/// Device failures, each with a message that points the user at the upload path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Permissão da câmera negada. Libere o acesso nas configurações do navegador ou envie uma foto do seu dispositivo.")]
    PermissionDenied,
    #[error("Nenhuma câmera encontrada. Conecte uma câmera ou envie uma foto do seu dispositivo.")]
    NotFound,
    #[error("A câmera está sendo usada por outro aplicativo. Feche-o e tente novamente, ou envie uma foto.")]
    Busy,
    #[error("Este ambiente não suporta acesso à câmera. Envie uma foto do seu dispositivo.")]
    Unsupported,
    #[error("Não foi possível capturar a imagem da câmera: {0}. Tente novamente ou envie uma foto.")]
    Frame(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
    pub width: u32,
    pub height: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            width: 640,
            height: 480,
        }
    }
}

/// A raw RGB8 frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// An open video stream; `stop` releases every track and must be idempotent
pub trait VideoStream: Send {
    fn grab_frame(&mut self) -> Result<Frame, DeviceError>;
    fn stop(&mut self);
}

/// A video input device that can be opened on user request
pub trait CameraDevice: Send + Sync {
    fn open(&self, constraints: &VideoConstraints) -> Result<Box<dyn VideoStream>, DeviceError>;
}

/// Backend used where no platform camera is available
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

impl CameraDevice for NoCamera {
    fn open(&self, _constraints: &VideoConstraints) -> Result<Box<dyn VideoStream>, DeviceError> {
        Err(DeviceError::Unsupported)
    }
}

/// Exclusive owner of an open camera stream
pub struct CameraSession {
    stream: Option<Box<dyn VideoStream>>,
}

impl CameraSession {
    pub fn open(
        device: &dyn CameraDevice,
        constraints: &VideoConstraints,
    ) -> Result<Self, DeviceError> {
        let stream = device.open(constraints).map_err(|e| {
            warn!("Error accessing camera: {:?}", e);
            e
        })?;
        info!(
            "Camera opened ({}x{}, {:?})",
            constraints.width, constraints.height, constraints.facing_mode
        );
        Ok(Self {
            stream: Some(stream),
        })
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Grab the current frame, release the device, then encode.
    pub fn capture(mut self) -> Result<ImagePayload, CaptureError> {
        let frame = match self.stream.as_mut() {
            Some(stream) => stream.grab_frame(),
            None => Err(DeviceError::Frame("stream already released".to_string())),
        };
        self.release();
        encode_frame(&frame?)
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("Camera stream stopped");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Open the device, capture one frame and release it
pub fn capture_live(
    device: &dyn CameraDevice,
    constraints: &VideoConstraints,
) -> Result<ImagePayload, CaptureError> {
    CameraSession::open(device, constraints)?.capture()
}

/// Encode an RGB frame as a JPEG data URI
pub fn encode_frame(frame: &Frame) -> Result<ImagePayload, CaptureError> {
    let expected = frame.width as usize * frame.height as usize * 3;
    if frame.width == 0 || frame.height == 0 || frame.rgb.len() != expected {
        return Err(CaptureError::Encode(format!(
            "frame {}x{} has {} bytes, expected {}",
            frame.width,
            frame.height,
            frame.rgb.len(),
            expected
        )));
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(&frame.rgb, frame.width, frame.height, ColorType::Rgb8)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    ImagePayload::from_bytes(&jpeg, "image/jpeg")
}
