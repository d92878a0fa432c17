use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::geo::GeodeticPosition;
use crate::swath::{SwathGeometry, SwathId};

/// Snapshot of the satellite at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SatelliteState {
    pub geodetic: GeodeticPosition,
    /// ECEF position (m)
    #[schema(value_type = Vec<f64>)]
    pub position: [f64; 3],
    /// ECEF velocity (m/s)
    #[schema(value_type = Vec<f64>)]
    pub velocity: [f64; 3],
    /// Degrees in [0, 360)
    pub heading: f64,
    pub timestamp: DateTime<Utc>,
}

impl SatelliteState {
    /// Unit vector from the satellite toward the Earth centre.
    pub fn nadir(&self) -> [f64; 3] {
        let [x, y, z] = self.position;
        let norm = (x * x + y * y + z * z).sqrt();
        if norm == 0.0 {
            return [0.0, 0.0, -1.0];
        }
        [-x / norm, -y / norm, -z / norm]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pulse {
    /// Arrival order, never reused.
    pub id: u64,
    pub swath_id: SwathId,
    pub geometry: SwathGeometry,
    pub state: SatelliteState,
}

/// Oldest pulses at extraction time plus their merged footprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PulseBatch {
    pub pulses: Vec<Pulse>,
    pub merged: Option<SwathGeometry>,
}

impl PulseBatch {
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }
}
