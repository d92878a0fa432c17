mod error;
mod tracker;
mod types;

pub use error::TrackerError;
pub use tracker::{FinalBatch, Tracker};
pub use types::{
    BatchTrigger, SessionId, StopReport, TrackerEvent, TrackerMode, TrackerStatus,
    TrackingOptions, AUTO_PROCESS_THRESHOLD, DEFAULT_UPDATE_INTERVAL,
};
