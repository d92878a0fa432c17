use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{RadarError, SarConfig};
use crate::geo::EARTH_RADIUS_M;

pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;
pub const DEFAULT_LOOK_ANGLE_DEG: f64 = 30.0;

/// Which slant-range model turns the sampling window into ground ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeModel {
    /// Ambiguity-rank corrected window, needs a PRF.
    Ranked {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        look_angle_deg: Option<f64>,
    },
    /// Window start/end taken as direct round-trip times.
    Legacy,
}

impl Default for RangeModel {
    fn default() -> Self {
        RangeModel::Ranked {
            look_angle_deg: None,
        }
    }
}

impl RangeModel {
    pub fn requires_prf(&self) -> bool {
        matches!(self, RangeModel::Ranked { .. })
    }
}

/// Ground distances (m) derived from the radar timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SwathRange {
    pub near_range: f64,
    pub far_range: f64,
    pub swath_width: f64,
    pub azimuth_length: f64,
}

/// Range ambiguity rank: ceil((2h / cos(look) / c - swst) * prf), floored at 0.
pub fn estimate_rank(swst: f64, prf: f64, orbit_height: f64, look_angle_deg: f64) -> u32 {
    let min_range = orbit_height / look_angle_deg.to_radians().cos();
    let min_time = 2.0 * min_range / SPEED_OF_LIGHT_M_S;
    let rank = ((min_time - swst) * prf).ceil();
    if rank.is_nan() || rank < 0.0 {
        0
    } else {
        rank as u32
    }
}

/// Slant range to ground arc distance over a spherical Earth.
///
/// When the slant range does not reach past the satellite radius the law of
/// cosines is meaningless for a sampling-window time; a flat-Earth Pythagorean
/// estimate is used instead, and if even that is impossible the slant range is
/// returned unchanged.
pub fn slant_to_ground_range(slant_range: f64, orbit_height: f64) -> f64 {
    let satellite_radius = EARTH_RADIUS_M + orbit_height;

    if slant_range <= satellite_radius {
        let ground_sq = slant_range * slant_range - orbit_height * orbit_height;
        if ground_sq > 0.0 {
            log::warn!(
                "slant range {:.0} m is within the satellite radius, using flat-Earth ground range",
                slant_range
            );
            return ground_sq.sqrt();
        }
        log::warn!(
            "slant range {:.0} m is below orbit height {:.0} m, using slant range directly",
            slant_range,
            orbit_height
        );
        return slant_range;
    }

    let cos_angle = (EARTH_RADIUS_M * EARTH_RADIUS_M + satellite_radius * satellite_radius
        - slant_range * slant_range)
        / (2.0 * EARTH_RADIUS_M * satellite_radius);
    EARTH_RADIUS_M * cos_angle.clamp(-1.0, 1.0).acos()
}

/// Half-power azimuth footprint: h * tan(lambda / antenna_width) * 2.
pub fn azimuth_length(orbit_height: f64, carrier_frequency: f64, antenna_width: f64) -> f64 {
    let wavelength = SPEED_OF_LIGHT_M_S / carrier_frequency;
    orbit_height * (wavelength / antenna_width).tan() * 2.0
}

/// Validates `config` for `model` and derives the swath range parameters.
pub fn compute_swath_range(config: &SarConfig, model: RangeModel) -> Result<SwathRange, RadarError> {
    config.validate(model.requires_prf())?;

    let (near_slant, far_slant) = match model {
        RangeModel::Ranked { look_angle_deg } => {
            let look = look_angle_deg
                .or(config.el_angle.filter(|a| *a != 0.0))
                .unwrap_or(DEFAULT_LOOK_ANGLE_DEG);
            let rank = estimate_rank(config.swst, config.prf, config.orbit_height, look);
            let rank_time = f64::from(rank) / config.prf;
            (
                0.5 * SPEED_OF_LIGHT_M_S * (rank_time + config.swst),
                0.5 * SPEED_OF_LIGHT_M_S * (rank_time + config.swst + config.swl - config.taup),
            )
        }
        RangeModel::Legacy => (
            config.swst * SPEED_OF_LIGHT_M_S / 2.0,
            (config.swst + config.swl) * SPEED_OF_LIGHT_M_S / 2.0,
        ),
    };

    let near_range = slant_to_ground_range(near_slant, config.orbit_height);
    let far_range = slant_to_ground_range(far_slant, config.orbit_height);

    let range = SwathRange {
        near_range,
        far_range,
        swath_width: far_range - near_range,
        azimuth_length: azimuth_length(config.orbit_height, config.fc, config.antenna_width),
    };
    range.validate()?;
    Ok(range)
}

impl SwathRange {
    /// Far range must lie beyond near range, both finite.
    pub fn validate(&self) -> Result<(), RadarError> {
        let finite = self.near_range.is_finite() && self.far_range.is_finite();
        if !finite || self.far_range <= self.near_range {
            return Err(RadarError::InvalidRange {
                near: self.near_range,
                far: self.far_range,
            });
        }
        Ok(())
    }
}

/// Pulses covering `seconds` at `prf`.
pub fn batch_size_for(prf: f64, seconds: f64) -> usize {
    let n = (prf * seconds).floor();
    if n.is_nan() || n < 0.0 {
        0
    } else {
        n as usize
    }
}

/// Time spanned by `pulses` at `prf`; zero without a PRF.
pub fn batch_duration(prf: f64, pulses: usize) -> f64 {
    if prf <= 0.0 {
        return 0.0;
    }
    pulses as f64 / prf
}
