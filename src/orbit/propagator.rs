use std::f64::consts::TAU;

use serde::Serialize;
use utoipa::ToSchema;

use super::kepler::{eccentric_to_true, solve_kepler, true_to_mean};
use super::{Anomaly, OrbitalElements, GM_KM3_S2};
use crate::geo::{ecef_to_geodetic, GeodeticPosition};

/// Simplified Earth rotation: one revolution per 1440 minutes.
pub const EARTH_ROTATION_DEG_PER_MIN: f64 = 360.0 / 1440.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct OrbitSample {
    pub elapsed_seconds: f64,
    pub geodetic: GeodeticPosition,
    #[schema(value_type = Vec<f64>)]
    pub eci_m: [f64; 3],
    #[schema(value_type = Vec<f64>)]
    pub ecef_m: [f64; 3],
    pub true_anomaly_deg: f64,
    /// Whether the Kepler solve met its tolerance
    pub converged: bool,
}

/// Propagates `elements` by `elapsed_seconds` and returns the geodetic position.
///
/// Pure function of its inputs: no wall clock, no cached state.
pub fn propagate(elements: &OrbitalElements, elapsed_seconds: f64) -> OrbitSample {
    let a = elements.semi_major_axis_km();
    let e = elements.eccentricity();
    let n = (GM_KM3_S2 / (a * a * a)).sqrt();

    let mean_at_epoch = match elements.anomaly() {
        Anomaly::Mean(m) => m.to_radians(),
        Anomaly::True(nu) => true_to_mean(nu.to_radians(), e),
    };
    let mean_anomaly = mean_at_epoch + n * elapsed_seconds;

    let solution = solve_kepler(mean_anomaly, e);
    let nu = eccentric_to_true(solution.eccentric_anomaly, e);

    let r = a * (1.0 - e * e) / (1.0 + e * nu.cos());
    let x_pf = r * nu.cos();
    let y_pf = r * nu.sin();

    let eci_km = perifocal_to_eci(
        x_pf,
        y_pf,
        elements.inclination_deg().to_radians(),
        elements.raan_deg().to_radians(),
        elements.argument_of_perigee_deg().to_radians(),
    );
    let eci_m = [eci_km[0] * 1000.0, eci_km[1] * 1000.0, eci_km[2] * 1000.0];

    let rotation_deg = EARTH_ROTATION_DEG_PER_MIN * (elapsed_seconds / 60.0);
    let ecef_m = eci_to_ecef(eci_m, rotation_deg.to_radians().rem_euclid(TAU));

    OrbitSample {
        elapsed_seconds,
        geodetic: ecef_to_geodetic(ecef_m),
        eci_m,
        ecef_m,
        true_anomaly_deg: nu.to_degrees().rem_euclid(360.0),
        converged: solution.converged,
    }
}

/// T = 2pi * sqrt(a^3 / GM)
pub fn orbital_period_seconds(semi_major_axis_km: f64) -> f64 {
    TAU * (semi_major_axis_km.powi(3) / GM_KM3_S2).sqrt()
}

/// Samples [0, duration] inclusive every `step_seconds`.
pub fn ground_track(
    elements: &OrbitalElements,
    duration_seconds: f64,
    step_seconds: f64,
) -> Vec<OrbitSample> {
    if step_seconds <= 0.0 || duration_seconds < 0.0 {
        return Vec::new();
    }
    let steps = (duration_seconds / step_seconds).floor() as usize;
    (0..=steps)
        .map(|i| propagate(elements, i as f64 * step_seconds))
        .collect()
}

// 3-1-3 rotation R3(-raan) R1(-i) R3(-argp) applied to the in-plane position
fn perifocal_to_eci(x: f64, y: f64, incl: f64, raan: f64, argp: f64) -> [f64; 3] {
    let (sin_o, cos_o) = raan.sin_cos();
    let (sin_i, cos_i) = incl.sin_cos();
    let (sin_w, cos_w) = argp.sin_cos();

    [
        (cos_o * cos_w - sin_o * sin_w * cos_i) * x + (-cos_o * sin_w - sin_o * cos_w * cos_i) * y,
        (sin_o * cos_w + cos_o * sin_w * cos_i) * x + (-sin_o * sin_w + cos_o * cos_w * cos_i) * y,
        (sin_w * sin_i) * x + (cos_w * sin_i) * y,
    ]
}

fn eci_to_ecef(eci: [f64; 3], rotation_rad: f64) -> [f64; 3] {
    let (sin_r, cos_r) = rotation_rad.sin_cos();
    [
        eci[0] * cos_r + eci[1] * sin_r,
        -eci[0] * sin_r + eci[1] * cos_r,
        eci[2],
    ]
}
