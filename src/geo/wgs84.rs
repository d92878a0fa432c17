use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// WGS-84 semi-major axis (m)
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 first eccentricity squared
pub const WGS84_E2: f64 = 0.00669437999014;
/// Spherical Earth radius used by the flat-Earth footprint approximations (m)
pub const EARTH_RADIUS_M: f64 = WGS84_A;

const LATITUDE_ITERATIONS: usize = 8;
const POLAR_AXIS_EPSILON_M: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeodeticPosition {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    /// Ellipsoidal height
    pub altitude_m: f64,
}

impl GeodeticPosition {
    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn to_ecef(&self) -> [f64; 3] {
        geodetic_to_ecef(self.latitude_deg, self.longitude_deg, self.altitude_m)
    }
}

pub fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, height_m: f64) -> [f64; 3] {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let sin_lon = lon.sin();
    let cos_lon = lon.cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let x = (n + height_m) * cos_lat * cos_lon;
    let y = (n + height_m) * cos_lat * sin_lon;
    let z = (n * (1.0 - WGS84_E2) + height_m) * sin_lat;
    [x, y, z]
}

/// Inverse of [geodetic_to_ecef], refining latitude by fixed-point iteration.
pub fn ecef_to_geodetic(ecef: [f64; 3]) -> GeodeticPosition {
    let [x, y, z] = ecef;
    let p = (x * x + y * y).sqrt();

    // On the polar axis longitude is undefined and p / cos(lat) degenerates.
    if p < POLAR_AXIS_EPSILON_M {
        let b = WGS84_A * (1.0 - WGS84_E2).sqrt();
        return GeodeticPosition {
            longitude_deg: 0.0,
            latitude_deg: if z < 0.0 { -90.0 } else { 90.0 },
            altitude_m: z.abs() - b,
        };
    }

    let lon = y.atan2(x);
    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    for _ in 0..LATITUDE_ITERATIONS {
        let sin_lat = lat.sin();
        let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let h = p / lat.cos() - n;
        lat = z.atan2(p * (1.0 - WGS84_E2 * (n / (n + h))));
    }

    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let h = p / lat.cos() - n;

    GeodeticPosition {
        longitude_deg: lon.to_degrees(),
        latitude_deg: lat.to_degrees(),
        altitude_m: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0, 0.0)]
    #[case(37.5, 127.0, 592_000.0)]
    #[case(-89.0, -180.0, -100.0)]
    #[case(89.0, 180.0, 50_000.0)]
    #[case(-33.9, 18.4, 1_200.0)]
    fn round_trip_cases(#[case] lat: f64, #[case] lon: f64, #[case] height: f64) {
        let back = ecef_to_geodetic(geodetic_to_ecef(lat, lon, height));
        assert!((back.latitude_deg - lat).abs() < 1e-6, "lat {}", back.latitude_deg);
        assert!((back.altitude_m - height).abs() < 0.01, "height {}", back.altitude_m);
        let dlon = (back.longitude_deg - lon).rem_euclid(360.0);
        assert!(dlon < 1e-6 || 360.0 - dlon < 1e-6, "lon {}", back.longitude_deg);
    }

    #[test]
    fn round_trip_grid() {
        let mut lat = -89.0;
        while lat <= 89.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                for height in [-100.0, 0.0, 12_345.0, 50_000.0] {
                    let back = ecef_to_geodetic(geodetic_to_ecef(lat, lon, height));
                    assert!((back.latitude_deg - lat).abs() < 1e-6);
                    assert!((back.altitude_m - height).abs() < 0.01);
                    let dlon = (back.longitude_deg - lon).rem_euclid(360.0);
                    assert!(dlon < 1e-6 || 360.0 - dlon < 1e-6);
                }
                lon += 22.5;
            }
            lat += 8.9;
        }
    }

    #[test]
    fn poles_do_not_divide_by_zero() {
        let north = ecef_to_geodetic([0.0, 0.0, 6_400_000.0]);
        assert_eq!(north.latitude_deg, 90.0);
        assert_eq!(north.longitude_deg, 0.0);
        assert!(north.altitude_m.is_finite());

        let south = ecef_to_geodetic(geodetic_to_ecef(-90.0, 0.0, 1000.0));
        assert!((south.latitude_deg + 90.0).abs() < 1e-6);
        assert!((south.altitude_m - 1000.0).abs() < 0.01);

        let centre = ecef_to_geodetic([0.0, 0.0, 0.0]);
        assert!(centre.altitude_m.is_finite());
    }

    #[test]
    fn equator_prime_meridian() {
        let ecef = geodetic_to_ecef(0.0, 0.0, 0.0);
        assert!((ecef[0] - WGS84_A).abs() < 1e-6);
        assert!(ecef[1].abs() < 1e-6);
        assert!(ecef[2].abs() < 1e-6);
    }
}
