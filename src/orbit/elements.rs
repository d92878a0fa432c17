use serde::{Deserialize, Serialize};

use super::OrbitError;

/// WGS-84 equatorial radius (km)
pub const EARTH_RADIUS_KM: f64 = 6378.137;
/// Earth gravitational parameter (km^3/s^2)
pub const GM_KM3_S2: f64 = 3.986004418e5;

/// Angular position along the orbit at epoch, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anomaly {
    Mean(f64),
    True(f64),
}

/// Classical Keplerian elements. Angles in degrees, semi-major axis in km.
///
/// Only constructible through [OrbitalElements::new] (or deserialisation, which
/// goes through the same checks), so a value in hand is always propagatable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawElements", into = "RawElements")]
pub struct OrbitalElements {
    semi_major_axis_km: f64,
    eccentricity: f64,
    inclination_deg: f64,
    raan_deg: f64,
    argument_of_perigee_deg: f64,
    anomaly: Anomaly,
}

impl OrbitalElements {
    pub fn new(
        semi_major_axis_km: f64,
        eccentricity: f64,
        inclination_deg: f64,
        raan_deg: f64,
        argument_of_perigee_deg: f64,
        anomaly: Anomaly,
    ) -> Result<Self, OrbitError> {
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitError::InvalidEccentricity(eccentricity));
        }
        if semi_major_axis_km.is_nan() || semi_major_axis_km <= EARTH_RADIUS_KM {
            return Err(OrbitError::SemiMajorAxisBelowEarth(semi_major_axis_km));
        }
        if eccentricity > 0.9 {
            log::warn!(
                "eccentricity {} is extreme, Kepler solutions may not converge",
                eccentricity
            );
        }

        Ok(Self {
            semi_major_axis_km,
            eccentricity,
            inclination_deg,
            raan_deg,
            argument_of_perigee_deg,
            anomaly,
        })
    }

    pub fn semi_major_axis_km(&self) -> f64 {
        self.semi_major_axis_km
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn inclination_deg(&self) -> f64 {
        self.inclination_deg
    }

    pub fn raan_deg(&self) -> f64 {
        self.raan_deg
    }

    pub fn argument_of_perigee_deg(&self) -> f64 {
        self.argument_of_perigee_deg
    }

    pub fn anomaly(&self) -> Anomaly {
        self.anomaly
    }

    /// Mean motion (rad/s)
    pub fn mean_motion(&self) -> f64 {
        (GM_KM3_S2 / self.semi_major_axis_km.powi(3)).sqrt()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawElements {
    semi_major_axis_km: f64,
    eccentricity: f64,
    inclination_deg: f64,
    raan_deg: f64,
    argument_of_perigee_deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mean_anomaly_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    true_anomaly_deg: Option<f64>,
}

impl TryFrom<RawElements> for OrbitalElements {
    type Error = OrbitError;

    fn try_from(raw: RawElements) -> Result<Self, Self::Error> {
        let anomaly = match (raw.mean_anomaly_deg, raw.true_anomaly_deg) {
            (Some(m), None) => Anomaly::Mean(m),
            (None, Some(v)) => Anomaly::True(v),
            _ => return Err(OrbitError::AnomalyRequired),
        };
        OrbitalElements::new(
            raw.semi_major_axis_km,
            raw.eccentricity,
            raw.inclination_deg,
            raw.raan_deg,
            raw.argument_of_perigee_deg,
            anomaly,
        )
    }
}

impl From<OrbitalElements> for RawElements {
    fn from(elements: OrbitalElements) -> Self {
        let (mean_anomaly_deg, true_anomaly_deg) = match elements.anomaly {
            Anomaly::Mean(m) => (Some(m), None),
            Anomaly::True(v) => (None, Some(v)),
        };
        RawElements {
            semi_major_axis_km: elements.semi_major_axis_km,
            eccentricity: elements.eccentricity,
            inclination_deg: elements.inclination_deg,
            raan_deg: elements.raan_deg,
            argument_of_perigee_deg: elements.argument_of_perigee_deg,
            mean_anomaly_deg,
            true_anomaly_deg,
        }
    }
}
