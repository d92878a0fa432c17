use super::{SwathCorners, SwathError, SwathGeometry};
use crate::geo::EARTH_RADIUS_M;

/// Four ground corners of the illuminated patch.
///
/// Flat-Earth small-angle offsets from the centre: range edges lie along the
/// cross-track axis (heading + 90 deg), azimuth edges half the azimuth length
/// either side along track. Good for extents that are small next to the
/// Earth's radius, not geodesically exact.
pub fn compute_corners(geometry: &SwathGeometry) -> Result<SwathCorners, SwathError> {
    let values = [
        geometry.center_lat,
        geometry.center_lon,
        geometry.heading,
        geometry.near_range,
        geometry.far_range,
        geometry.azimuth_length,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SwathError::NonFinite);
    }
    if geometry.far_range <= geometry.near_range {
        return Err(SwathError::InvalidRange {
            near: geometry.near_range,
            far: geometry.far_range,
        });
    }

    let heading = geometry.heading.to_radians();
    let cross_track = heading + std::f64::consts::FRAC_PI_2;
    let lat0 = geometry.center_lat.to_radians();
    let lon0 = geometry.center_lon.to_radians();
    let lon_scale = lat0.cos();

    let near = geometry.near_range / EARTH_RADIUS_M;
    let far = geometry.far_range / EARTH_RADIUS_M;
    let half_az = geometry.azimuth_length / 2.0 / EARTH_RADIUS_M;

    let corner = |range: f64, azimuth: f64| -> [f64; 2] {
        let lat = lat0 + range * cross_track.cos() + azimuth * heading.cos();
        let lon = lon0 + (range * cross_track.sin() + azimuth * heading.sin()) / lon_scale;
        [lon.to_degrees(), lat.to_degrees()]
    };

    Ok(SwathCorners {
        top_left: corner(near, -half_az),
        top_right: corner(near, half_az),
        bottom_right: corner(far, half_az),
        bottom_left: corner(far, -half_az),
    })
}

/// Great-circle angle in degrees between two `[lon, lat]` points.
pub fn angular_distance_deg(a: [f64; 2], b: [f64; 2]) -> f64 {
    let (lat1, lat2) = (a[1].to_radians(), b[1].to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b[0] - a[0]).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    (2.0 * h.sqrt().min(1.0).asin()).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn korea() -> SwathGeometry {
        SwathGeometry {
            center_lat: 37.5,
            center_lon: 127.0,
            heading: 0.0,
            near_range: 200_000.0,
            far_range: 600_000.0,
            swath_width: 400_000.0,
            azimuth_length: 50_000.0,
            satellite_altitude: None,
            look_angle: None,
        }
    }

    #[test]
    fn near_corners_are_closer_than_far_corners() {
        let geometry = korea();
        let corners = compute_corners(&geometry).unwrap();

        let all = corners.as_array();
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_ne!(all[i], all[j], "corners {i} and {j} coincide");
            }
        }

        let centre = [geometry.center_lon, geometry.center_lat];
        let near = [corners.top_left, corners.top_right].map(|c| angular_distance_deg(centre, c));
        let far =
            [corners.bottom_right, corners.bottom_left].map(|c| angular_distance_deg(centre, c));
        for n in near {
            for f in far {
                assert!(n < f, "near {n} vs far {f}");
            }
        }
    }

    #[test]
    fn heading_north_looks_east() {
        let corners = compute_corners(&korea()).unwrap();
        // Cross-track is east: all corners east of centre, azimuth splits north/south.
        for [lon, _] in corners.as_array() {
            assert!(lon > 127.0);
        }
        assert!(corners.top_right[1] > 37.5);
        assert!(corners.top_left[1] < 37.5);
        assert!((corners.top_left[1] - corners.bottom_left[1]).abs() < 1e-12);
    }

    #[test]
    fn rejects_inverted_or_empty_range() {
        let mut geometry = korea();
        geometry.far_range = geometry.near_range;
        assert_eq!(
            compute_corners(&geometry),
            Err(SwathError::InvalidRange {
                near: 200_000.0,
                far: 200_000.0
            })
        );

        geometry.far_range = 100_000.0;
        assert!(matches!(
            compute_corners(&geometry),
            Err(SwathError::InvalidRange { .. })
        ));

        let mut geometry = korea();
        geometry.center_lat = f64::NAN;
        assert_eq!(compute_corners(&geometry), Err(SwathError::NonFinite));
    }

    #[test]
    fn heading_east_looks_south() {
        let mut geometry = korea();
        geometry.heading = 90.0;
        let corners = compute_corners(&geometry).unwrap();
        for [_, lat] in corners.as_array() {
            assert!(lat < 37.5);
        }
    }
}
