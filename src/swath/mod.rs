mod catalog;
mod error;
mod footprint;
mod group;
mod registry;
mod types;

pub use catalog::{PathKind, PathPoint, SwathCatalog};
pub use error::SwathError;
pub use footprint::{angular_distance_deg, compute_corners};
pub use group::{GroupTracker, SwathGroup};
pub use registry::{NoopListener, SwathListener, SwathRegistry};
pub use types::{GroupId, SwathCorners, SwathGeometry, SwathId, SwathInstance, SwathMode};
