//! Caller-side analysis session
//!
//! One capture, one analysis at a time. A session refuses new work while an analysis is
//! in flight and, on failure, either surfaces a retry prompt or substitutes the offline
//! fallback depending on its [`Resilience`].

use async_trait::async_trait;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

use crate::analysis::AnalysisResult;
use crate::camera::{self, CameraDevice, VideoConstraints};
use crate::capture::{self, CaptureError, ImagePayload};
use crate::client::AnalysisClient;
use crate::orchestrator::Orchestrator;

/// Shown when an analysis fails and no fallback is configured
pub const RETRY_MESSAGE: &str = "Erro ao analisar a emoção. Tente novamente.";

/// Anything that can turn a payload into a result: the remote endpoint or an in-process
/// orchestrator
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, payload: &ImagePayload) -> anyhow::Result<AnalysisResult>;
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(&self, payload: &ImagePayload) -> anyhow::Result<AnalysisResult> {
        Ok(AnalysisClient::analyze(self, payload).await?)
    }
}

#[async_trait]
impl Analyzer for Orchestrator {
    async fn analyze(&self, payload: &ImagePayload) -> anyhow::Result<AnalysisResult> {
        Ok(self.analyze_payload(payload).await?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resilience {
    /// Report the failure and let the user try again
    #[default]
    RetryPrompt,
    /// Show the canned neutral suggestion instead of an error
    OfflineFallback,
}

impl FromStr for Resilience {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retry" | "retry-prompt" => Ok(Resilience::RetryPrompt),
            "fallback" | "offline" | "offline-fallback" => Ok(Resilience::OfflineFallback),
            other => anyhow::bail!("unknown resilience level: {}", other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Uma análise já está em andamento.")]
    Busy,
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("Erro ao analisar a emoção. Tente novamente.")]
    AnalysisFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub result: AnalysisResult,
    /// True when the offline fallback replaced a failed analysis
    pub fallback: bool,
}

pub struct MoodSession<A> {
    analyzer: A,
    resilience: Resilience,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the analysis ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: Analyzer> MoodSession<A> {
    pub fn new(analyzer: A, resilience: Resilience) -> Self {
        Self {
            analyzer,
            resilience,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlight<'_>, SessionError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::Busy)?;
        Ok(InFlight(&self.in_flight))
    }

    /// Analyze an already captured payload
    pub async fn submit(&self, payload: ImagePayload) -> Result<Outcome, SessionError> {
        let _guard = self.begin()?;
        self.run(&payload).await
    }

    /// Upload path: the file is validated before anything is sent
    pub async fn submit_file(&self, path: &std::path::Path) -> Result<Outcome, SessionError> {
        let _guard = self.begin()?;
        let payload = capture::from_file(path).await.map_err(log_capture_error)?;
        self.run(&payload).await
    }

    /// Live path: capture one frame, release the camera, then analyze
    pub async fn submit_camera(
        &self,
        device: &dyn CameraDevice,
        constraints: &VideoConstraints,
    ) -> Result<Outcome, SessionError> {
        let _guard = self.begin()?;
        let payload = camera::capture_live(device, constraints).map_err(log_capture_error)?;
        self.run(&payload).await
    }

    async fn run(&self, payload: &ImagePayload) -> Result<Outcome, SessionError> {
        match self.analyzer.analyze(payload).await {
            Ok(result) => {
                info!("Analysis finished: {}", result.emotion);
                Ok(Outcome {
                    result,
                    fallback: false,
                })
            }
            Err(e) => {
                error!("Error analyzing emotion: {:#}", e);
                match self.resilience {
                    Resilience::RetryPrompt => Err(SessionError::AnalysisFailed),
                    Resilience::OfflineFallback => {
                        warn!("Using offline fallback suggestion");
                        Ok(Outcome {
                            result: AnalysisResult::offline_fallback(),
                            fallback: true,
                        })
                    }
                }
            }
        }
    }
}

/// Bad input is the user's to fix; anything else is logged as a failure
fn log_capture_error(err: CaptureError) -> SessionError {
    if err.is_input_error() {
        warn!("Capture rejected: {}", err);
    } else {
        error!("Capture failed: {}", err);
    }
    SessionError::Capture(err)
}
