mod elements;
mod error;
mod kepler;
pub mod parsing;
mod propagator;
mod source;

pub use elements::{Anomaly, OrbitalElements, EARTH_RADIUS_KM, GM_KM3_S2};
pub use error::OrbitError;
pub use kepler::{eccentric_to_true, solve_kepler, true_to_mean, KeplerSolution};
pub use propagator::{
    ground_track, orbital_period_seconds, propagate, OrbitSample, EARTH_ROTATION_DEG_PER_MIN,
};
pub use source::{KeplerSource, PositionSource, TleSource, HEADING_LOOKAHEAD_SECS};
