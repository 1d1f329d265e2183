//! Render handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use reel_models::{BatchSummary, RenderRequest, RenderResult};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_batch_size;
use crate::state::AppState;

/// Body of `POST /render/batch`.
#[derive(Debug, Deserialize)]
pub struct BatchRenderRequest {
    pub requests: Vec<RenderRequest>,
    /// Defaults to the worker's host cap
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

/// Render one request synchronously.
///
/// 400 when the request cannot be rendered at all (bad fields, unknown mood),
/// otherwise the job runs and its result comes back with 200 or 500.
pub async fn render(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RenderResult>)> {
    let Json(request) = payload?;
    state.orchestrator.check_request(&request)?;

    let result = state.orchestrator.render(&request).await;
    let status = if result.succeeded {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(result)))
}

/// Render many requests under a concurrency cap; failures stay per job.
pub async fn render_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchRenderRequest>, JsonRejection>,
) -> ApiResult<Json<BatchSummary>> {
    let Json(batch) = payload?;
    if batch.requests.is_empty() {
        return Err(ApiError::bad_request("batch contains no requests"));
    }
    if batch.requests.len() > state.config.max_batch_size {
        return Err(ApiError::bad_request(format!(
            "batch of {} exceeds the limit of {}",
            batch.requests.len(),
            state.config.max_batch_size
        )));
    }
    if batch.max_concurrency == Some(0) {
        return Err(ApiError::bad_request("max_concurrency must be at least 1"));
    }

    let host_cap = state.orchestrator.config().max_concurrency;
    let max_concurrency = batch.max_concurrency.unwrap_or(host_cap);
    info!(jobs = batch.requests.len(), max_concurrency, "batch render requested");
    record_batch_size(batch.requests.len());

    let summary = reel_worker::render_batch(state.orchestrator.clone(), batch.requests, max_concurrency, host_cap).await;
    Ok(Json(summary))
}
