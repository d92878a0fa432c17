use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements};

use super::parsing::parse_tle_lines;
use super::{propagate, OrbitError, OrbitalElements};
use crate::geo::{ecef_to_geodetic, initial_bearing, GeodeticPosition};

/// How far ahead (seconds) the default heading looks along the track.
pub const HEADING_LOOKAHEAD_SECS: i64 = 10;

/// Anything that can say where the satellite is at a given instant.
pub trait PositionSource: Send + Sync {
    fn position_at(&self, t: DateTime<Utc>) -> Option<GeodeticPosition>;

    /// Ground-track heading in degrees [0, 360).
    fn heading_at(&self, t: DateTime<Utc>) -> Option<f64> {
        let here = self.position_at(t)?;
        let ahead = self.position_at(t + Duration::seconds(HEADING_LOOKAHEAD_SECS))?;
        Some(initial_bearing(&here, &ahead))
    }

    /// ECEF velocity (m/s) by a one second finite difference.
    fn velocity_at(&self, t: DateTime<Utc>) -> Option<[f64; 3]> {
        let step = Duration::seconds(1);
        let here = self.position_at(t)?.to_ecef();
        let (from, to) = match self.position_at(t + step) {
            Some(next) => (here, next.to_ecef()),
            None => (self.position_at(t - step)?.to_ecef(), here),
        };
        Some([to[0] - from[0], to[1] - from[1], to[2] - from[2]])
    }
}

/// Two-body propagation of fixed elements from `epoch`.
#[derive(Debug, Clone)]
pub struct KeplerSource {
    elements: OrbitalElements,
    epoch: DateTime<Utc>,
}

impl KeplerSource {
    pub fn new(elements: OrbitalElements, epoch: DateTime<Utc>) -> Self {
        Self { elements, epoch }
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn elapsed_seconds(&self, t: DateTime<Utc>) -> f64 {
        (t - self.epoch).num_milliseconds() as f64 / 1000.0
    }
}

impl PositionSource for KeplerSource {
    fn position_at(&self, t: DateTime<Utc>) -> Option<GeodeticPosition> {
        Some(propagate(&self.elements, self.elapsed_seconds(t)).geodetic)
    }
}

/// SGP4 propagation of a two- or three-line element set.
pub struct TleSource {
    name: Option<String>,
    elements: Elements,
    constants: Constants,
}

impl TleSource {
    pub fn from_tle(tle: &str) -> Result<Self, OrbitError> {
        let (name, line1, line2) = parse_tle_lines(tle)?;
        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())?;
        let constants = Constants::from_elements(&elements)?;
        Ok(Self {
            name,
            elements,
            constants,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// ECEF position in metres.
    pub fn ecef_at(&self, t: DateTime<Utc>) -> Result<[f64; 3], OrbitError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&t.naive_utc())
            .map_err(|e| OrbitError::Propagation(e.to_string()))?;
        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| OrbitError::Propagation(e.to_string()))?;

        let gmst = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&t.naive_utc()));
        let km = teme_to_ecef(prediction.position, gmst);
        Ok([km[0] * 1000.0, km[1] * 1000.0, km[2] * 1000.0])
    }
}

impl PositionSource for TleSource {
    fn position_at(&self, t: DateTime<Utc>) -> Option<GeodeticPosition> {
        match self.ecef_at(t) {
            Ok(ecef) => Some(ecef_to_geodetic(ecef)),
            Err(err) => {
                log::debug!("sgp4 propagation failed at {}: {}", t, err);
                None
            }
        }
    }
}

fn teme_to_ecef(pos: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst.sin_cos();
    [
        pos[0] * cos_g + pos[1] * sin_g,
        -pos[0] * sin_g + pos[1] * cos_g,
        pos[2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::Anomaly;
    use chrono::TimeZone;

    const ISS: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn polar() -> KeplerSource {
        let elements =
            OrbitalElements::new(6970.1, 0.0001, 90.0, 0.0, 0.0, Anomaly::Mean(0.0)).unwrap();
        KeplerSource::new(elements, epoch())
    }

    #[test]
    fn kepler_source_matches_propagator() {
        let source = polar();
        let t = epoch() + Duration::seconds(120);
        let expected = propagate(source.elements(), 120.0).geodetic;
        assert_eq!(source.position_at(t), Some(expected));
    }

    #[test]
    fn ascending_polar_orbit_heads_roughly_north() {
        let heading = polar().heading_at(epoch()).unwrap();
        // Earth rotation drags the track a little west of due north.
        assert!(heading > 350.0 || heading < 10.0, "heading {heading}");
    }

    #[test]
    fn velocity_is_orbital_speed() {
        let v = polar().velocity_at(epoch()).unwrap();
        let speed = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert!((7_000.0..8_000.0).contains(&speed), "speed {speed}");
    }

    struct Window {
        inner: KeplerSource,
        until: DateTime<Utc>,
    }

    impl PositionSource for Window {
        fn position_at(&self, t: DateTime<Utc>) -> Option<GeodeticPosition> {
            (t <= self.until).then(|| self.inner.position_at(t)).flatten()
        }
    }

    #[test]
    fn velocity_falls_back_to_backward_difference() {
        let source = Window {
            inner: polar(),
            until: epoch(),
        };
        assert!(source.velocity_at(epoch()).is_some());
        assert!(source.heading_at(epoch()).is_none());
        assert!(source.position_at(epoch() + Duration::seconds(1)).is_none());
    }

    #[test]
    fn tle_source_is_in_low_earth_orbit() {
        let source = TleSource::from_tle(ISS).unwrap();
        assert_eq!(source.name(), Some("ISS (ZARYA)"));
        let t = Utc.with_ymd_and_hms(2020, 7, 13, 0, 0, 0).unwrap();
        let position = source.position_at(t).unwrap();
        assert!(
            (300_000.0..500_000.0).contains(&position.altitude_m),
            "altitude {}",
            position.altitude_m
        );
        assert!(position.latitude_deg.abs() <= 52.0);
        assert!(source.heading_at(t).is_some());
    }

    #[test]
    fn tle_source_rejects_garbage() {
        assert!(TleSource::from_tle("not a tle").is_err());
    }
}
