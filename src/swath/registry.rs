use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{GroupId, SwathCorners, SwathGeometry, SwathId, SwathInstance, SwathMode};

/// Observer for registry changes, fixed at construction.
pub trait SwathListener: Send + Sync {
    fn swath_added(&self, swath: &SwathInstance);
    fn swaths_removed(&self, ids: &[SwathId]);
}

pub struct NoopListener;

impl SwathListener for NoopListener {
    fn swath_added(&self, _swath: &SwathInstance) {}
    fn swaths_removed(&self, _ids: &[SwathId]) {}
}

/// Owns every live swath and caps the population oldest-first.
pub struct SwathRegistry {
    swaths: HashMap<SwathId, SwathInstance>,
    next_seq: u64,
    max_swaths: usize,
    listener: Box<dyn SwathListener>,
}

impl SwathRegistry {
    pub fn new(max_swaths: usize, listener: Box<dyn SwathListener>) -> Self {
        Self {
            swaths: HashMap::new(),
            next_seq: 1,
            max_swaths,
            listener,
        }
    }

    pub fn max_swaths(&self) -> usize {
        self.max_swaths
    }

    /// Returns the ids evicted by the new limit.
    pub fn set_max_swaths(&mut self, max_swaths: usize) -> Vec<SwathId> {
        self.max_swaths = max_swaths;
        self.enforce_max()
    }

    /// Stores a new instance and evicts the oldest ones if over capacity.
    /// The evicted ids come back alongside the instance.
    pub fn insert(
        &mut self,
        mode: SwathMode,
        geometry: SwathGeometry,
        corners: SwathCorners,
        group_id: Option<GroupId>,
        created_at: DateTime<Utc>,
    ) -> (SwathInstance, Vec<SwathId>) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let instance = SwathInstance {
            id: SwathId::new(seq, created_at),
            mode,
            geometry,
            corners,
            group_id,
            created_at,
            seq,
        };
        self.swaths.insert(instance.id.clone(), instance.clone());
        self.listener.swath_added(&instance);
        let evicted = self.enforce_max();
        (instance, evicted)
    }

    pub fn get(&self, id: &SwathId) -> Option<&SwathInstance> {
        self.swaths.get(id)
    }

    pub fn remove(&mut self, id: &SwathId) -> Option<SwathInstance> {
        let removed = self.swaths.remove(id)?;
        self.listener.swaths_removed(std::slice::from_ref(id));
        Some(removed)
    }

    /// Removes several ids at once, reporting only those that existed.
    pub fn remove_many<'a>(&mut self, ids: impl IntoIterator<Item = &'a SwathId>) -> usize {
        let removed: Vec<SwathId> = ids
            .into_iter()
            .filter_map(|id| self.swaths.remove(id).map(|s| s.id))
            .collect();
        if !removed.is_empty() {
            self.listener.swaths_removed(&removed);
        }
        removed.len()
    }

    pub fn clear(&mut self) {
        let ids: Vec<SwathId> = self.swaths.drain().map(|(id, _)| id).collect();
        if !ids.is_empty() {
            self.listener.swaths_removed(&ids);
        }
    }

    pub fn clear_mode(&mut self, mode: SwathMode) {
        let ids: Vec<SwathId> = self
            .swaths
            .values()
            .filter(|s| s.mode == mode)
            .map(|s| s.id.clone())
            .collect();
        self.remove_many(&ids);
    }

    pub fn count(&self) -> usize {
        self.swaths.len()
    }

    pub fn count_by_mode(&self, mode: SwathMode) -> usize {
        self.swaths.values().filter(|s| s.mode == mode).count()
    }

    /// Snapshot, oldest first.
    pub fn all(&self) -> Vec<&SwathInstance> {
        let mut all: Vec<&SwathInstance> = self.swaths.values().collect();
        all.sort_by(|a, b| oldest_first(a, b));
        all
    }

    pub fn by_mode(&self, mode: SwathMode) -> Vec<&SwathInstance> {
        self.all().into_iter().filter(|s| s.mode == mode).collect()
    }

    pub fn by_group(&self, group_id: &GroupId) -> Vec<&SwathInstance> {
        self.all()
            .into_iter()
            .filter(|s| s.group_id.as_ref() == Some(group_id))
            .collect()
    }

    fn enforce_max(&mut self) -> Vec<SwathId> {
        if self.swaths.len() <= self.max_swaths {
            return Vec::new();
        }
        let excess = self.swaths.len() - self.max_swaths;
        let evicted: Vec<SwathId> = self
            .all()
            .into_iter()
            .take(excess)
            .map(|s| s.id.clone())
            .collect();
        for id in &evicted {
            self.swaths.remove(id);
        }
        log::info!(
            "swath limit {} exceeded, evicted {} oldest",
            self.max_swaths,
            evicted.len()
        );
        self.listener.swaths_removed(&evicted);
        evicted
    }
}

fn oldest_first(a: &SwathInstance, b: &SwathInstance) -> std::cmp::Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.seq.cmp(&b.seq))
}
