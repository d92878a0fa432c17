use axum::{routing::delete, routing::get, routing::post, Router};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::backend::HttpEchoBackend;
use crate::config::Config;
use crate::tracker::{Tracker, TrackerEvent};

use super::api::orbit as orbit_handlers;
use super::api::swaths as swath_handlers;
use super::api::tracking as tracking_handlers;
use super::api_doc::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tracker: Arc<Mutex<Tracker>>,
    pub simulator: Option<HttpEchoBackend>,
}

impl AppState {
    pub fn new(config: Config) -> (Self, mpsc::UnboundedReceiver<TrackerEvent>) {
        let (tracker, events) =
            Tracker::new(config.tracking.max_swaths, config.echo_backend());
        let state = AppState {
            simulator: config.http_backend(),
            config: Arc::new(config),
            tracker: Arc::new(Mutex::new(tracker)),
        };
        (state, events)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Tracking
        .route("/api/tracking/start", post(tracking_handlers::start))
        .route("/api/tracking/stop", post(tracking_handlers::stop))
        .route("/api/tracking/status", get(tracking_handlers::status))
        // Swaths
        .route("/api/swaths", get(swath_handlers::list_swaths))
        .route("/api/swaths/count", get(swath_handlers::count_swaths))
        .route("/api/swaths/static", post(swath_handlers::add_static))
        .route("/api/swaths/custom", post(swath_handlers::add_custom))
        .route("/api/swaths/path", post(swath_handlers::add_path))
        .route(
            "/api/swaths/backend/{simulation_id}",
            post(swath_handlers::import_backend_swaths),
        )
        .route("/api/swaths/{id}", delete(swath_handlers::remove_swath))
        // Groups
        .route("/api/groups", get(swath_handlers::list_groups))
        .route("/api/groups/{id}/swaths", get(swath_handlers::group_swaths))
        .route("/api/groups/{id}", delete(swath_handlers::remove_group))
        // Orbit
        .route("/api/orbit/position", get(orbit_handlers::position))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Drains tracker events into the log until the tracker is dropped.
pub async fn log_events(mut events: mpsc::UnboundedReceiver<TrackerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            TrackerEvent::SwathAdded(swath) => log::debug!("swath {} added", swath.id),
            TrackerEvent::SwathsRemoved(ids) => log::debug!("{} swaths removed", ids.len()),
            TrackerEvent::PulseAdded { pulse_id, swath_id } => {
                log::debug!("pulse {} for {}", pulse_id, swath_id)
            }
            TrackerEvent::BatchProcessed {
                pulses, response, ..
            } => log::info!(
                "batch of {} pulses simulated, shape {:?}",
                pulses,
                response.shape
            ),
            TrackerEvent::BatchFailed { pulses, error, .. } => {
                log::warn!("batch of {} pulses failed: {}", pulses, error)
            }
            TrackerEvent::AutoStopped { session } => {
                log::info!("session {} auto-stopped", session)
            }
        }
    }
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let (state, events) = AppState::new(config);
    tokio::spawn(log_events(events));

    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
