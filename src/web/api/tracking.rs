use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use crate::tracker::{BatchTrigger, StopReport, TrackerMode, TrackerStatus};
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::server::AppState;

/// Per-session overrides of the configured tracking options.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct StartRequest {
    pub heading_offset_deg: Option<f64>,
    pub update_interval_ms: Option<u64>,
    pub auto_process: Option<bool>,
    pub batch: Option<BatchTrigger>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct StopRequest {
    pub process_remaining: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StopResponse {
    pub mode: TrackerMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<StopReport>,
}

#[utoipa::path(
    post,
    path = "/api/tracking/start",
    request_body = StartRequest,
    responses(
        (status = 200, description = "Tracking started", body = TrackerMode),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Batching without a backend", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn start(
    State(state): State<AppState>,
    request: Option<Json<StartRequest>>,
) -> ApiResult<Json<TrackerMode>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let config = &state.config;

    let mut options = config.tracking_options();
    if let Some(offset) = request.heading_offset_deg {
        options.heading_offset_deg = offset;
    }
    if let Some(ms) = request.update_interval_ms {
        options.update_interval = Duration::from_millis(ms);
    }
    if let Some(auto) = request.auto_process {
        options.auto_process = auto;
    }
    if request.batch.is_some() {
        options.batch = request.batch;
    }

    let source = config.position_source()?;
    let range = config.swath_range()?;

    let mut tracker = state.tracker.lock().await;
    let mode = tracker
        .start(source, config.sar.clone(), range, options)
        .await?;
    Ok(Json(mode))
}

#[utoipa::path(
    post,
    path = "/api/tracking/stop",
    request_body = StopRequest,
    responses(
        (status = 200, description = "Tracking stopped", body = StopResponse)
    ),
    tag = "tracking"
)]
pub async fn stop(
    State(state): State<AppState>,
    request: Option<Json<StopRequest>>,
) -> ApiResult<Json<StopResponse>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let (final_batch, mode) = {
        let mut tracker = state.tracker.lock().await;
        let final_batch = tracker.halt(request.process_remaining).await;
        (final_batch, tracker.status().mode)
    };
    // The simulator call runs without holding the tracker.
    let report = final_batch.submit().await;
    let handed_off = report.pulses_handed_off > 0 || report.error.is_some();
    Ok(Json(StopResponse {
        mode,
        batch: handed_off.then_some(report),
    }))
}

#[utoipa::path(
    get,
    path = "/api/tracking/status",
    responses(
        (status = 200, description = "Tracker status", body = TrackerStatus)
    ),
    tag = "tracking"
)]
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<TrackerStatus>> {
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.status()))
}
