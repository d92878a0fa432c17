use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::orbit::{propagate, OrbitSample};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PositionQuery {
    /// Seconds since the configured epoch
    #[serde(default)]
    pub elapsed_seconds: f64,
}

#[utoipa::path(
    get,
    path = "/api/orbit/position",
    params(
        ("elapsed_seconds" = Option<f64>, Query, description = "Seconds since epoch (default 0)")
    ),
    responses(
        (status = 200, description = "Propagated position", body = OrbitSample),
        (status = 400, description = "Orbit is not Kepler-driven", body = ErrorResponse)
    ),
    tag = "orbit"
)]
pub async fn position(
    State(state): State<AppState>,
    Query(query): Query<PositionQuery>,
) -> ApiResult<Json<OrbitSample>> {
    if !query.elapsed_seconds.is_finite() {
        return Err(ApiError::Validation("elapsed_seconds must be finite".into()));
    }
    let source = state
        .config
        .kepler_source()
        .ok_or_else(|| ApiError::Validation("orbit source is not kepler".into()))?;
    Ok(Json(propagate(source.elements(), query.elapsed_seconds)))
}
