mod heading;
mod wgs84;

pub use heading::{initial_bearing, normalize_heading};
pub use wgs84::{
    ecef_to_geodetic, geodetic_to_ecef, GeodeticPosition, EARTH_RADIUS_M, WGS84_A, WGS84_E2,
};
