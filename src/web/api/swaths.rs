use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::swath::{
    GroupId, PathKind, PathPoint, SwathCorners, SwathGeometry, SwathGroup, SwathId,
    SwathInstance, SwathMode,
};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListSwathsQuery {
    pub mode: Option<SwathMode>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SwathCountResponse {
    pub total: usize,
    pub max_swaths: usize,
    pub by_mode: BTreeMap<String, usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PathRequest {
    pub kind: PathKind,
    pub points: Vec<PathPoint>,
}

#[utoipa::path(
    get,
    path = "/api/swaths",
    params(
        ("mode" = Option<String>, Query, description = "Only swaths created in this mode")
    ),
    responses(
        (status = 200, description = "Live swaths, oldest first", body = Vec<SwathInstance>)
    ),
    tag = "swaths"
)]
pub async fn list_swaths(
    State(state): State<AppState>,
    Query(query): Query<ListSwathsQuery>,
) -> ApiResult<Json<Vec<SwathInstance>>> {
    let tracker = state.tracker.lock().await;
    let swaths = tracker.with_catalog(|catalog| {
        let registry = catalog.registry();
        let selected = match query.mode {
            Some(mode) => registry.by_mode(mode),
            None => registry.all(),
        };
        selected.into_iter().cloned().collect()
    });
    Ok(Json(swaths))
}

#[utoipa::path(
    get,
    path = "/api/swaths/count",
    responses(
        (status = 200, description = "Swath population", body = SwathCountResponse)
    ),
    tag = "swaths"
)]
pub async fn count_swaths(State(state): State<AppState>) -> ApiResult<Json<SwathCountResponse>> {
    let tracker = state.tracker.lock().await;
    let response = tracker.with_catalog(|catalog| {
        let registry = catalog.registry();
        SwathCountResponse {
            total: registry.count(),
            max_swaths: registry.max_swaths(),
            by_mode: SwathMode::ALL
                .iter()
                .map(|mode| (mode.to_string(), registry.count_by_mode(*mode)))
                .filter(|(_, n)| *n > 0)
                .collect(),
        }
    });
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/swaths/static",
    request_body = SwathGeometry,
    responses(
        (status = 200, description = "Swath created", body = SwathInstance),
        (status = 400, description = "Invalid geometry", body = ErrorResponse)
    ),
    tag = "swaths"
)]
pub async fn add_static(
    State(state): State<AppState>,
    Json(geometry): Json<SwathGeometry>,
) -> ApiResult<Json<SwathInstance>> {
    let tracker = state.tracker.lock().await;
    let swath = tracker.with_catalog(|catalog| catalog.add_static(geometry, Utc::now()))?;
    Ok(Json(swath))
}

#[utoipa::path(
    post,
    path = "/api/swaths/custom",
    request_body = SwathCorners,
    responses(
        (status = 200, description = "Swath created", body = SwathInstance),
        (status = 400, description = "Invalid corners", body = ErrorResponse)
    ),
    tag = "swaths"
)]
pub async fn add_custom(
    State(state): State<AppState>,
    Json(corners): Json<SwathCorners>,
) -> ApiResult<Json<SwathInstance>> {
    let tracker = state.tracker.lock().await;
    let swath = tracker.with_catalog(|catalog| catalog.add_custom(corners, Utc::now()))?;
    Ok(Json(swath))
}

#[utoipa::path(
    post,
    path = "/api/swaths/path",
    request_body = PathRequest,
    responses(
        (status = 200, description = "One swath per point", body = Vec<SwathId>),
        (status = 400, description = "Invalid path", body = ErrorResponse)
    ),
    tag = "swaths"
)]
pub async fn add_path(
    State(state): State<AppState>,
    Json(request): Json<PathRequest>,
) -> ApiResult<Json<Vec<SwathId>>> {
    let range = state.config.swath_range()?;
    let tracker = state.tracker.lock().await;
    let ids = tracker.with_catalog(|catalog| {
        catalog.add_path(request.kind, &request.points, &range, Utc::now())
    })?;
    Ok(Json(ids))
}

#[utoipa::path(
    post,
    path = "/api/swaths/backend/{simulation_id}",
    params(
        ("simulation_id" = String, Path, description = "Simulation ID on the echo backend")
    ),
    responses(
        (status = 200, description = "Imported swaths", body = Vec<SwathId>),
        (status = 409, description = "No backend configured", body = ErrorResponse),
        (status = 502, description = "Backend request failed", body = ErrorResponse)
    ),
    tag = "swaths"
)]
pub async fn import_backend_swaths(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> ApiResult<Json<Vec<SwathId>>> {
    let simulator = state
        .simulator
        .as_ref()
        .ok_or(ApiError::Conflict("backend_not_configured"))?;
    let geometries = simulator.fetch_swaths(&simulation_id).await?;
    log::info!(
        "imported {} swaths from simulation {}",
        geometries.len(),
        simulation_id
    );

    let tracker = state.tracker.lock().await;
    let ids = tracker.with_catalog(|catalog| catalog.add_backend(geometries, Utc::now()))?;
    Ok(Json(ids))
}

#[utoipa::path(
    delete,
    path = "/api/swaths/{id}",
    params(
        ("id" = String, Path, description = "Swath ID")
    ),
    responses(
        (status = 200, description = "Swath removed", body = SwathInstance),
        (status = 404, description = "Swath not found", body = ErrorResponse)
    ),
    tag = "swaths"
)]
pub async fn remove_swath(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SwathInstance>> {
    let id = SwathId::from(id);
    let tracker = state.tracker.lock().await;
    let swath = tracker.with_catalog(|catalog| catalog.remove_swath(&id))?;
    Ok(Json(swath))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    responses(
        (status = 200, description = "Groups, newest first", body = Vec<SwathGroup>)
    ),
    tag = "groups"
)]
pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Json<Vec<SwathGroup>>> {
    let tracker = state.tracker.lock().await;
    let groups =
        tracker.with_catalog(|catalog| catalog.groups().groups().into_iter().cloned().collect());
    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}/swaths",
    params(
        ("id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Members still in the registry", body = Vec<SwathInstance>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    tag = "groups"
)]
pub async fn group_swaths(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<SwathInstance>>> {
    let id = GroupId::from(id);
    let tracker = state.tracker.lock().await;
    tracker
        .with_catalog(|catalog| {
            catalog.groups().get(&id)?;
            Some(catalog.registry().by_group(&id).into_iter().cloned().collect())
        })
        .map(Json)
        .ok_or(ApiError::NotFound("group_not_found"))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{id}",
    params(
        ("id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group and its swaths removed", body = SwathGroup),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 409, description = "Group of the running tracking session", body = ErrorResponse)
    ),
    tag = "groups"
)]
pub async fn remove_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SwathGroup>> {
    let id = GroupId::from(id);
    let tracker = state.tracker.lock().await;
    let group = tracker.with_catalog(|catalog| catalog.remove_group(&id))?;
    Ok(Json(group))
}
