use std::collections::VecDeque;

use super::{Pulse, PulseBatch, SatelliteState};
use crate::geo::EARTH_RADIUS_M;
use crate::radar::batch_size_for;
use crate::swath::{SwathGeometry, SwathId};

/// FIFO of pulses awaiting hand-off to the echo simulator.
#[derive(Debug)]
pub struct PulseBatchAccumulator {
    pulses: VecDeque<Pulse>,
    next_id: u64,
}

impl Default for PulseBatchAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseBatchAccumulator {
    pub fn new() -> Self {
        Self {
            pulses: VecDeque::new(),
            next_id: 1,
        }
    }

    pub fn add_pulse(
        &mut self,
        swath_id: SwathId,
        geometry: SwathGeometry,
        state: SatelliteState,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.pulses.push_back(Pulse {
            id,
            swath_id,
            geometry,
            state,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pulse> {
        self.pulses.iter()
    }

    pub fn is_batch_ready(&self, batch_size: usize) -> bool {
        self.pulses.len() >= batch_size
    }

    /// Time mode: ready once the queue spans `seconds` worth of pulses at `prf`.
    pub fn is_batch_ready_by_time(&self, prf: f64, seconds: f64) -> bool {
        self.is_batch_ready(batch_size_for(prf, seconds))
    }

    /// Copies of the oldest `min(n, len)` pulses; the queue is untouched.
    pub fn get_pulse_batch(&self, n: usize) -> Vec<Pulse> {
        self.pulses.iter().take(n).cloned().collect()
    }

    /// Drops the oldest `n` pulses, returning how many were removed.
    pub fn clear_batch(&mut self, n: usize) -> usize {
        let n = n.min(self.pulses.len());
        self.pulses.drain(..n);
        n
    }

    /// Removes the oldest `min(n, len)` pulses and merges their footprints.
    pub fn take_batch(&mut self, n: usize) -> PulseBatch {
        let merged = self.merged_geometry(n);
        let n = n.min(self.pulses.len());
        PulseBatch {
            pulses: self.pulses.drain(..n).collect(),
            merged,
        }
    }

    /// A footprint covering the oldest `n` pulses.
    pub fn merged_geometry(&self, n: usize) -> Option<SwathGeometry> {
        let batch: Vec<&SwathGeometry> = self.pulses.iter().take(n).map(|p| &p.geometry).collect();
        merge(&batch)
    }

    pub fn clear_pulses(&mut self) {
        self.pulses.clear();
    }
}

fn merge(batch: &[&SwathGeometry]) -> Option<SwathGeometry> {
    let first = *batch.first()?;
    let last = *batch.last()?;
    let count = batch.len() as f64;

    let near_range = batch.iter().map(|g| g.near_range).fold(f64::INFINITY, f64::min);
    let far_range = batch
        .iter()
        .map(|g| g.far_range)
        .fold(f64::NEG_INFINITY, f64::max);
    let center_lat = batch.iter().map(|g| g.center_lat).sum::<f64>() / count;
    let center_lon = batch.iter().map(|g| g.center_lon).sum::<f64>() / count;
    let mean_azimuth = batch.iter().map(|g| g.azimuth_length).sum::<f64>() / count;

    // Along-track extent covered between the first and last centres.
    let d_lat = (last.center_lat - first.center_lat).to_radians();
    let d_lon = (last.center_lon - first.center_lon).to_radians();
    let mid_lat = ((first.center_lat + last.center_lat) / 2.0).to_radians();
    let north = d_lat * EARTH_RADIUS_M;
    let east = d_lon * EARTH_RADIUS_M * mid_lat.cos();
    let travelled = (north * north + east * east).sqrt();

    Some(SwathGeometry {
        center_lat,
        center_lon,
        heading: first.heading,
        near_range,
        far_range,
        swath_width: far_range - near_range,
        azimuth_length: travelled + mean_azimuth,
        satellite_altitude: first.satellite_altitude,
        look_angle: first.look_angle,
    })
}
