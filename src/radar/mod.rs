mod config;
mod error;
mod range;

pub use config::SarConfig;
pub use error::RadarError;
pub use range::{
    azimuth_length, batch_duration, batch_size_for, compute_swath_range, estimate_rank,
    slant_to_ground_range, RangeModel, SwathRange, DEFAULT_LOOK_ANGLE_DEG, SPEED_OF_LIGHT_M_S,
};
