use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::orbit::PositionQuery;
use super::api::swaths::{ListSwathsQuery, PathRequest, SwathCountResponse};
use super::api::tracking::{StartRequest, StopRequest, StopResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::tracking::start,
        super::api::tracking::stop,
        super::api::tracking::status,
        super::api::swaths::list_swaths,
        super::api::swaths::count_swaths,
        super::api::swaths::add_static,
        super::api::swaths::add_custom,
        super::api::swaths::add_path,
        super::api::swaths::import_backend_swaths,
        super::api::swaths::remove_swath,
        super::api::swaths::list_groups,
        super::api::swaths::group_swaths,
        super::api::swaths::remove_group,
        super::api::orbit::position,
    ),
    components(
        schemas(
            ErrorResponse,
            StartRequest,
            StopRequest,
            StopResponse,
            ListSwathsQuery,
            SwathCountResponse,
            PathRequest,
            PositionQuery,
            crate::tracker::TrackerMode,
            crate::tracker::TrackerStatus,
            crate::tracker::StopReport,
            crate::tracker::BatchTrigger,
            crate::swath::SwathInstance,
            crate::swath::SwathGeometry,
            crate::swath::SwathCorners,
            crate::swath::SwathGroup,
            crate::swath::SwathMode,
            crate::swath::PathKind,
            crate::swath::PathPoint,
            crate::orbit::OrbitSample,
            crate::pulse::SatelliteState,
            crate::backend::EchoResponse,
        )
    ),
    info(
        title = "Swath-O-Mat API",
        description = "Realtime SAR swath tracking and footprint catalog",
        version = "0.1.0"
    ),
    tags(
        (name = "tracking", description = "Realtime tracking sessions"),
        (name = "swaths", description = "Swath footprints"),
        (name = "groups", description = "Swath groups"),
        (name = "orbit", description = "Orbit propagation")
    )
)]
pub struct ApiDoc;
