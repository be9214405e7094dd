//! MoodLens Core Library
//!
//! Photo in, mood and suggestion out: image acquisition, the two-stage orchestrator,
//! its HTTP surface, and the renderer for its results.

pub mod analysis;
pub mod camera;
pub mod capture;
pub mod client;
pub mod config;
pub mod emotion;
pub mod error;
pub mod orchestrator;
pub mod render;
pub mod server;
pub mod session;

// Re-export key types for convenience
pub use analysis::AnalysisResult;
pub use capture::ImagePayload;
pub use config::Config;
pub use emotion::{Emotion, EmotionLabel};
pub use error::AnalysisError;
pub use orchestrator::Orchestrator;
pub use server::{create_router, AppState};
