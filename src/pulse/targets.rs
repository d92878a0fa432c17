use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::geo::{ecef_to_geodetic, geodetic_to_ecef, EARTH_RADIUS_M};
use crate::radar::{SarConfig, SPEED_OF_LIGHT_M_S};
use crate::swath::SwathGeometry;

/// Point scatterer handed to the echo simulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Target {
    /// ECEF (m)
    #[schema(value_type = Vec<f64>)]
    pub position: [f64; 3],
    pub reflectivity: f64,
    pub phase: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TargetGridOptions {
    pub range_resolution: f64,
    pub azimuth_resolution: f64,
    pub reflectivity: f64,
}

impl Default for TargetGridOptions {
    fn default() -> Self {
        Self {
            range_resolution: 1000.0,
            azimuth_resolution: 1000.0,
            reflectivity: 100.0,
        }
    }
}

/// Lays a regular range/azimuth grid of targets over `geometry`.
///
/// With a satellite ECEF position and a config that has a sampling window,
/// the grid is centred on the point whose echo arrives mid-window, straight
/// below the satellite. Otherwise it is centred on the swath centre at zero
/// height.
pub fn targets_for(
    geometry: &SwathGeometry,
    options: &TargetGridOptions,
    window: Option<([f64; 3], &SarConfig)>,
) -> Vec<Target> {
    let (center_lat, center_lon, height) = match window {
        Some((satellite, config)) if config.swst > 0.0 && config.swl > 0.0 => {
            let centre = window_centre(satellite, config);
            (centre.latitude_deg, centre.longitude_deg, centre.altitude_m)
        }
        _ => (geometry.center_lat, geometry.center_lon, 0.0),
    };

    let num_range = grid_count(geometry.swath_width, options.range_resolution);
    let num_azimuth = grid_count(geometry.azimuth_length, options.azimuth_resolution);

    let heading = geometry.heading.to_radians();
    let cross_track = heading + std::f64::consts::FRAC_PI_2;
    let lat0 = center_lat.to_radians();
    let lon0 = center_lon.to_radians();

    let mut targets = Vec::with_capacity(num_range * num_azimuth);
    for r in 0..num_range {
        for a in 0..num_azimuth {
            let range_off = centred(r, num_range) * options.range_resolution / EARTH_RADIUS_M;
            let az_off = centred(a, num_azimuth) * options.azimuth_resolution / EARTH_RADIUS_M;

            let lat = lat0 + range_off * cross_track.cos() + az_off * heading.cos();
            let lon =
                lon0 + (range_off * cross_track.sin() + az_off * heading.sin()) / lat0.cos();

            targets.push(Target {
                position: geodetic_to_ecef(lat.to_degrees(), lon.to_degrees(), height),
                reflectivity: options.reflectivity,
                phase: 0.0,
            });
        }
    }
    targets
}

fn window_centre(satellite: [f64; 3], config: &SarConfig) -> crate::geo::GeodeticPosition {
    let [x, y, z] = satellite;
    let norm = (x * x + y * y + z * z).sqrt();
    let delay = config.swst + config.swl / 2.0;
    let distance = delay * SPEED_OF_LIGHT_M_S / 2.0;
    let scale = if norm > 0.0 { distance / norm } else { 0.0 };
    ecef_to_geodetic([x - x * scale, y - y * scale, z - z * scale])
}

fn grid_count(extent: f64, resolution: f64) -> usize {
    if resolution > 0.0 && extent.is_finite() && extent > 0.0 {
        ((extent / resolution).floor() as usize).max(1)
    } else {
        1
    }
}

fn centred(index: usize, count: usize) -> f64 {
    index as f64 - (count as f64 - 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::WGS84_A;

    fn geometry() -> SwathGeometry {
        SwathGeometry {
            center_lat: 0.0,
            center_lon: 0.0,
            heading: 0.0,
            near_range: 350_000.0,
            far_range: 355_000.0,
            swath_width: 5_000.0,
            azimuth_length: 3_500.0,
            satellite_altitude: Some(561_000.0),
            look_angle: None,
        }
    }

    #[test]
    fn grid_dimensions_and_defaults() {
        let targets = targets_for(&geometry(), &TargetGridOptions::default(), None);
        assert_eq!(targets.len(), 5 * 3);
        assert!(targets.iter().all(|t| t.reflectivity == 100.0 && t.phase == 0.0));
    }

    #[test]
    fn grid_is_centred_on_swath() {
        let targets = targets_for(&geometry(), &TargetGridOptions::default(), None);
        let mean_y = targets.iter().map(|t| t.position[1]).sum::<f64>() / targets.len() as f64;
        let mean_z = targets.iter().map(|t| t.position[2]).sum::<f64>() / targets.len() as f64;
        assert!(mean_y.abs() < 1e-6);
        assert!(mean_z.abs() < 1e-6);
        for t in &targets {
            let norm = t.position.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - WGS84_A).abs() < 1_000.0);
        }
    }

    #[test]
    fn tiny_swath_still_yields_one_target() {
        let mut g = geometry();
        g.swath_width = 10.0;
        g.azimuth_length = 0.0;
        let targets = targets_for(&g, &TargetGridOptions::default(), None);
        assert_eq!(targets.len(), 1);
        assert!((targets[0].position[0] - WGS84_A).abs() < 1e-6);
    }

    #[test]
    fn sampling_window_places_grid_below_satellite() {
        let config = SarConfig::c5();
        let satellite = [WGS84_A + 561_000.0, 0.0, 0.0];
        let targets = targets_for(
            &geometry(),
            &TargetGridOptions {
                range_resolution: 10_000.0,
                azimuth_resolution: 10_000.0,
                reflectivity: 1.0,
            },
            Some((satellite, &config)),
        );
        assert_eq!(targets.len(), 1);

        let expected = (config.swst + config.swl / 2.0) * SPEED_OF_LIGHT_M_S / 2.0;
        let t = targets[0].position;
        let distance = ((satellite[0] - t[0]).powi(2) + t[1].powi(2) + t[2].powi(2)).sqrt();
        assert!((distance - expected).abs() < 1e-3, "distance {distance}");
    }

    #[test]
    fn window_ignored_without_sampling_parameters() {
        let mut config = SarConfig::c5();
        config.swst = 0.0;
        let satellite = [WGS84_A + 561_000.0, 0.0, 0.0];
        let with = targets_for(&geometry(), &TargetGridOptions::default(), Some((satellite, &config)));
        let without = targets_for(&geometry(), &TargetGridOptions::default(), None);
        assert_eq!(with, without);
    }
}
