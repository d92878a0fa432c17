use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

use crate::geo::GeodeticPosition;
use crate::radar::SwathRange;

/// How a swath came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SwathMode {
    Static,
    RealtimeTracking,
    PredictedPath,
    Historical,
    BackendApi,
    CustomGeometry,
}

impl SwathMode {
    pub const ALL: [SwathMode; 6] = [
        SwathMode::Static,
        SwathMode::RealtimeTracking,
        SwathMode::PredictedPath,
        SwathMode::Historical,
        SwathMode::BackendApi,
        SwathMode::CustomGeometry,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SwathId(String);

impl SwathId {
    pub(crate) fn new(seq: u64, created_at: DateTime<Utc>) -> Self {
        Self(format!("swath-{}-{}", seq, created_at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SwathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SwathId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub(crate) fn new(seq: u64, created_at: DateTime<Utc>) -> Self {
        Self(format!("group-{}-{}", seq, created_at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GroupId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Footprint parameters. Ranges are ground distances in metres from the
/// sub-satellite point; `far_range = near_range + swath_width` is the caller's
/// responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SwathGeometry {
    pub center_lat: f64,
    pub center_lon: f64,
    /// Degrees clockwise from north
    pub heading: f64,
    pub near_range: f64,
    pub far_range: f64,
    pub swath_width: f64,
    pub azimuth_length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satellite_altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_angle: Option<f64>,
}

impl SwathGeometry {
    pub fn at(position: &GeodeticPosition, heading: f64, range: &SwathRange) -> Self {
        Self {
            center_lat: position.latitude_deg,
            center_lon: position.longitude_deg,
            heading,
            near_range: range.near_range,
            far_range: range.far_range,
            swath_width: range.swath_width,
            azimuth_length: range.azimuth_length,
            satellite_altitude: Some(position.altitude_m),
            look_angle: None,
        }
    }
}

/// Corner coordinates as `[longitude, latitude]` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SwathCorners {
    #[schema(value_type = Vec<f64>)]
    pub top_left: [f64; 2],
    #[schema(value_type = Vec<f64>)]
    pub top_right: [f64; 2],
    #[schema(value_type = Vec<f64>)]
    pub bottom_right: [f64; 2],
    #[schema(value_type = Vec<f64>)]
    pub bottom_left: [f64; 2],
}

impl SwathCorners {
    pub fn as_array(&self) -> [[f64; 2]; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// One stored footprint. Never mutated once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SwathInstance {
    pub id: SwathId,
    pub mode: SwathMode,
    pub geometry: SwathGeometry,
    pub corners: SwathCorners,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) seq: u64,
}
