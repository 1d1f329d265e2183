//! Health check handler.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use reel_media::{check_ffmpeg, check_ffprobe};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    /// Whether ffmpeg and ffprobe were found on PATH
    pub encoder_available: bool,
    pub moods: Vec<String>,
}

/// Liveness probe; reports a degraded status when the encoder is missing.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let encoder_available = check_ffmpeg().is_ok() && check_ffprobe().is_ok();
    Json(HealthResponse {
        status: if encoder_available { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        encoder_available,
        moods: state.orchestrator.catalog().moods().map(str::to_string).collect(),
    })
}
