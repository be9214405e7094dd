//! HTTP surface of the orchestrator.

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderName, HeaderValue, Method, Request, Response};
use axum::middleware::{self, Next};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::error::AnalysisError;
use crate::orchestrator::Orchestrator;

/// Request body cap; base64 inflates a photo by a third, so this fits ~15 MB originals
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "imageData", default)]
    pub image_data: Option<String>,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint - returns 200 OK when the service is running
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn analyze_emotion(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AnalysisError> {
    let Json(request) = body.map_err(|e| AnalysisError::InvalidBody(e.body_text()))?;
    let result = state
        .orchestrator
        .analyze(request.image_data.as_deref())
        .await?;
    Ok(Json(result))
}

/// Permissive CORS, preflight answered with 200
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Tag each request with an id, reusing the caller's `X-Request-ID` when present
async fn request_id(request: Request<Body>, next: Next) -> Response<Body> {
    let id = request
        .headers()
        .get("X-Request-ID")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", request_id = %id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert("X-Request-ID", value);
    }
    response
}

pub fn create_router(state: AppState) -> Router {
    let function_routes = Router::new()
        .route("/analyze-emotion", post(analyze_emotion))
        .route("/functions/v1/analyze-emotion", post(analyze_emotion));

    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        .merge(function_routes)
        .route("/health", get(health_check))
        .layer(body_limit)
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!(
        "Orchestrator listening on port {} (body limit {} bytes)",
        port, state.max_body_bytes
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;
    Ok(())
}
