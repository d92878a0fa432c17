pub mod error;
pub mod orbit;
pub mod swaths;
pub mod tracking;
