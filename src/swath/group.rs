use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{GroupId, SwathError, SwathId, SwathMode};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SwathGroup {
    pub id: GroupId,
    pub name: String,
    pub mode: SwathMode,
    /// Live members in insertion order.
    pub swath_ids: Vec<SwathId>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    seq: u64,
}

impl SwathGroup {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Tags swaths produced by one logical operation.
#[derive(Debug, Default)]
pub struct GroupTracker {
    groups: HashMap<GroupId, SwathGroup>,
    next_seq: u64,
    realtime: Option<GroupId>,
}

impl GroupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_group(
        &mut self,
        mode: SwathMode,
        name: Option<String>,
        now: DateTime<Utc>,
    ) -> GroupId {
        self.next_seq += 1;
        let seq = self.next_seq;
        let id = GroupId::new(seq, now);
        let name = name.unwrap_or_else(|| format!("{} ({})", mode, now.format("%H:%M:%S")));
        self.groups.insert(
            id.clone(),
            SwathGroup {
                id: id.clone(),
                name,
                mode,
                swath_ids: Vec::new(),
                created_at: now,
                ended_at: None,
                seq,
            },
        );
        id
    }

    /// Fails on unknown or closed groups; re-adding a member is a no-op.
    pub fn add_swath_to_group(
        &mut self,
        group_id: &GroupId,
        swath_id: &SwathId,
    ) -> Result<(), SwathError> {
        let group = self.open_group_mut(group_id)?;
        if !group.swath_ids.contains(swath_id) {
            group.swath_ids.push(swath_id.clone());
        }
        Ok(())
    }

    /// Checks that `group_id` exists and still accepts members.
    pub fn ensure_open(&self, group_id: &GroupId) -> Result<(), SwathError> {
        match self.groups.get(group_id) {
            None => Err(SwathError::GroupNotFound(group_id.clone())),
            Some(group) if !group.is_open() => Err(SwathError::GroupClosed(group_id.clone())),
            Some(_) => Ok(()),
        }
    }

    /// Closes the group. Closing twice keeps the first end time.
    pub fn end_group(&mut self, group_id: &GroupId, now: DateTime<Utc>) -> Result<(), SwathError> {
        let group = self
            .groups
            .get_mut(group_id)
            .ok_or_else(|| SwathError::GroupNotFound(group_id.clone()))?;
        if group.ended_at.is_none() {
            group.ended_at = Some(now);
        }
        if self.realtime.as_ref() == Some(group_id) {
            self.realtime = None;
        }
        Ok(())
    }

    /// Opens the realtime group, or returns the one already open.
    pub fn start_realtime_group(&mut self, now: DateTime<Utc>) -> GroupId {
        if let Some(id) = &self.realtime {
            return id.clone();
        }
        let id = self.create_group(SwathMode::RealtimeTracking, None, now);
        self.realtime = Some(id.clone());
        id
    }

    pub fn end_realtime_group(&mut self, now: DateTime<Utc>) -> Option<GroupId> {
        let id = self.realtime.take()?;
        if let Some(group) = self.groups.get_mut(&id) {
            group.ended_at.get_or_insert(now);
        }
        Some(id)
    }

    pub fn current_realtime_group(&self) -> Option<&GroupId> {
        self.realtime.as_ref()
    }

    /// Forgets the group and returns it so the caller can drop its members.
    pub fn remove_group(&mut self, group_id: &GroupId) -> Result<SwathGroup, SwathError> {
        let group = self
            .groups
            .remove(group_id)
            .ok_or_else(|| SwathError::GroupNotFound(group_id.clone()))?;
        if self.realtime.as_ref() == Some(group_id) {
            self.realtime = None;
        }
        Ok(group)
    }

    /// Drops `ids` from every membership. Closed groups left empty are
    /// removed; open ones stay until they are ended.
    pub fn forget_swaths(&mut self, ids: &[SwathId]) -> Vec<GroupId> {
        if ids.is_empty() {
            return Vec::new();
        }
        for group in self.groups.values_mut() {
            group.swath_ids.retain(|id| !ids.contains(id));
        }
        let emptied: Vec<GroupId> = self
            .groups
            .values()
            .filter(|g| !g.is_open() && g.swath_ids.is_empty())
            .map(|g| g.id.clone())
            .collect();
        for id in &emptied {
            self.groups.remove(id);
        }
        emptied
    }

    pub fn get(&self, group_id: &GroupId) -> Option<&SwathGroup> {
        self.groups.get(group_id)
    }

    /// Newest first.
    pub fn groups(&self) -> Vec<&SwathGroup> {
        let mut groups: Vec<&SwathGroup> = self.groups.values().collect();
        groups.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn open_group_mut(&mut self, group_id: &GroupId) -> Result<&mut SwathGroup, SwathError> {
        let group = self
            .groups
            .get_mut(group_id)
            .ok_or_else(|| SwathError::GroupNotFound(group_id.clone()))?;
        if !group.is_open() {
            return Err(SwathError::GroupClosed(group_id.clone()));
        }
        Ok(group)
    }
}
