mod accumulator;
mod targets;
mod types;

pub use accumulator::PulseBatchAccumulator;
pub use targets::{targets_for, Target, TargetGridOptions};
pub use types::{Pulse, PulseBatch, SatelliteState};
