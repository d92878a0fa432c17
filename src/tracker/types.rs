use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::EchoResponse;
use crate::pulse::{SatelliteState, TargetGridOptions};
use crate::radar::batch_size_for;
use crate::swath::{GroupId, SwathId, SwathInstance};

pub type SessionId = Uuid;

/// Pulses at which auto-processing hands everything off and stops.
pub const AUTO_PROCESS_THRESHOLD: usize = 100;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(200);

/// When a periodic batch is handed off while tracking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum BatchTrigger {
    /// Every `n` pulses.
    Count(usize),
    /// Every `seconds` worth of pulses at the configured PRF.
    Time(f64),
}

impl BatchTrigger {
    pub fn batch_size(&self, prf: f64) -> usize {
        match *self {
            BatchTrigger::Count(n) => n,
            BatchTrigger::Time(seconds) => batch_size_for(prf, seconds),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingOptions {
    pub heading_offset_deg: f64,
    pub update_interval: Duration,
    pub auto_process: bool,
    pub batch: Option<BatchTrigger>,
    pub target_grid: TargetGridOptions,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self {
            heading_offset_deg: 0.0,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            auto_process: false,
            batch: None,
            target_grid: TargetGridOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub enum TrackerMode {
    Idle,
    Tracking {
        session: Uuid,
        group: GroupId,
        started: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TrackerStatus {
    pub mode: TrackerMode,
    pub pulse_count: usize,
    pub swath_count: usize,
    pub batches_processed: u64,
    pub batches_failed: u64,
    pub hand_off_in_flight: bool,
    pub last_state: Option<SatelliteState>,
}

/// What `stop` did with the pulses left in the queue.
#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
pub struct StopReport {
    pub pulses_handed_off: usize,
    pub pulses_dropped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<EchoResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TrackerEvent {
    SwathAdded(SwathInstance),
    SwathsRemoved(Vec<SwathId>),
    PulseAdded {
        pulse_id: u64,
        swath_id: SwathId,
    },
    BatchProcessed {
        session: SessionId,
        pulses: usize,
        response: EchoResponse,
    },
    BatchFailed {
        session: SessionId,
        pulses: usize,
        error: String,
    },
    AutoStopped {
        session: SessionId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_trigger_yaml() {
        let count: BatchTrigger = serde_yaml::from_str("mode: count\nvalue: 100").unwrap();
        assert_eq!(count, BatchTrigger::Count(100));
        let time: BatchTrigger = serde_yaml::from_str("mode: time\nvalue: 0.02").unwrap();
        assert_eq!(time, BatchTrigger::Time(0.02));
        assert_eq!(time.batch_size(5000.0), 100);
    }
}
