use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    compute_corners, GroupId, GroupTracker, SwathCorners, SwathError, SwathGeometry, SwathGroup,
    SwathId, SwathInstance, SwathListener, SwathMode, SwathRegistry,
};
use crate::radar::SwathRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Predicted,
    Historical,
}

impl PathKind {
    fn mode(self) -> SwathMode {
        match self {
            PathKind::Predicted => SwathMode::PredictedPath,
            PathKind::Historical => SwathMode::Historical,
        }
    }
}

/// One sample of a future or past ground track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PathPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub heading: f64,
}

/// Registry plus groups: every way a swath can be created.
pub struct SwathCatalog {
    registry: SwathRegistry,
    groups: GroupTracker,
}

impl SwathCatalog {
    pub fn new(max_swaths: usize, listener: Box<dyn SwathListener>) -> Self {
        Self {
            registry: SwathRegistry::new(max_swaths, listener),
            groups: GroupTracker::new(),
        }
    }

    pub fn registry(&self) -> &SwathRegistry {
        &self.registry
    }

    pub fn groups(&self) -> &GroupTracker {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut GroupTracker {
        &mut self.groups
    }

    /// One footprint in its own closed group.
    pub fn add_static(
        &mut self,
        geometry: SwathGeometry,
        now: DateTime<Utc>,
    ) -> Result<SwathInstance, SwathError> {
        let corners = compute_corners(&geometry)?;
        let group = self.groups.create_group(SwathMode::Static, None, now);
        let instance = self.insert_member(SwathMode::Static, geometry, corners, &group, now)?;
        self.groups.end_group(&group, now)?;
        Ok(instance)
    }

    /// A footprint per track point, all in one closed group.
    pub fn add_path(
        &mut self,
        kind: PathKind,
        points: &[PathPoint],
        range: &SwathRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<SwathId>, SwathError> {
        let footprints = points
            .iter()
            .map(|p| {
                let geometry = SwathGeometry {
                    center_lat: p.latitude,
                    center_lon: p.longitude,
                    heading: p.heading,
                    near_range: range.near_range,
                    far_range: range.far_range,
                    swath_width: range.swath_width,
                    azimuth_length: range.azimuth_length,
                    satellite_altitude: Some(p.altitude),
                    look_angle: None,
                };
                compute_corners(&geometry).map(|c| (geometry, c))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.add_batch(kind.mode(), footprints, now)
    }

    /// Geometries returned by the simulation backend.
    pub fn add_backend(
        &mut self,
        geometries: Vec<SwathGeometry>,
        now: DateTime<Utc>,
    ) -> Result<Vec<SwathId>, SwathError> {
        let footprints = geometries
            .into_iter()
            .map(|g| compute_corners(&g).map(|c| (g, c)))
            .collect::<Result<Vec<_>, _>>()?;

        self.add_batch(SwathMode::BackendApi, footprints, now)
    }

    /// Caller-supplied corners. The stored geometry only carries the
    /// midpoint of the top-left/bottom-right diagonal.
    pub fn add_custom(
        &mut self,
        corners: SwathCorners,
        now: DateTime<Utc>,
    ) -> Result<SwathInstance, SwathError> {
        if corners.as_array().iter().flatten().any(|v| !v.is_finite()) {
            return Err(SwathError::NonFinite);
        }
        let geometry = SwathGeometry {
            center_lat: (corners.top_left[1] + corners.bottom_right[1]) / 2.0,
            center_lon: (corners.top_left[0] + corners.bottom_right[0]) / 2.0,
            heading: 0.0,
            near_range: 0.0,
            far_range: 0.0,
            swath_width: 0.0,
            azimuth_length: 0.0,
            satellite_altitude: None,
            look_angle: None,
        };
        let group = self
            .groups
            .create_group(SwathMode::CustomGeometry, None, now);
        let instance =
            self.insert_member(SwathMode::CustomGeometry, geometry, corners, &group, now)?;
        self.groups.end_group(&group, now)?;
        Ok(instance)
    }

    /// One realtime tick's footprint in the open tracking group.
    pub fn add_tracked(
        &mut self,
        group: &GroupId,
        geometry: SwathGeometry,
        now: DateTime<Utc>,
    ) -> Result<SwathInstance, SwathError> {
        let corners = compute_corners(&geometry)?;
        self.insert_member(SwathMode::RealtimeTracking, geometry, corners, group, now)
    }

    /// Removes one swath and its group membership.
    pub fn remove_swath(&mut self, id: &SwathId) -> Result<SwathInstance, SwathError> {
        let swath = self
            .registry
            .remove(id)
            .ok_or_else(|| SwathError::SwathNotFound(id.clone()))?;
        self.groups.forget_swaths(std::slice::from_ref(id));
        Ok(swath)
    }

    /// Drops the group and every member still in the registry. The open
    /// realtime group belongs to the running session and is refused.
    pub fn remove_group(&mut self, group_id: &GroupId) -> Result<SwathGroup, SwathError> {
        if self.groups.current_realtime_group() == Some(group_id) {
            return Err(SwathError::GroupInUse(group_id.clone()));
        }
        let group = self.groups.remove_group(group_id)?;
        let removed = self.registry.remove_many(&group.swath_ids);
        log::info!("removed group {} with {} swaths", group_id, removed);
        Ok(group)
    }

    fn add_batch(
        &mut self,
        mode: SwathMode,
        footprints: Vec<(SwathGeometry, SwathCorners)>,
        now: DateTime<Utc>,
    ) -> Result<Vec<SwathId>, SwathError> {
        if footprints.is_empty() {
            return Ok(Vec::new());
        }
        let group = self.groups.create_group(mode, None, now);
        let mut ids = Vec::with_capacity(footprints.len());
        for (geometry, corners) in footprints {
            ids.push(self.insert_member(mode, geometry, corners, &group, now)?.id);
        }
        self.groups.end_group(&group, now)?;
        log::info!("created {} {} swaths in {}", ids.len(), mode, group);
        Ok(ids)
    }

    fn insert_member(
        &mut self,
        mode: SwathMode,
        geometry: SwathGeometry,
        corners: SwathCorners,
        group: &GroupId,
        now: DateTime<Utc>,
    ) -> Result<SwathInstance, SwathError> {
        self.groups.ensure_open(group)?;
        let (instance, evicted) =
            self.registry
                .insert(mode, geometry, corners, Some(group.clone()), now);
        self.groups.add_swath_to_group(group, &instance.id)?;
        let dropped = self.groups.forget_swaths(&evicted);
        if !dropped.is_empty() {
            log::debug!("dropped {} groups emptied by eviction", dropped.len());
        }
        Ok(instance)
    }
}
