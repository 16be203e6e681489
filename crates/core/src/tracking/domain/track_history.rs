use std::collections::VecDeque;

use crate::shared::bounding_box::BoundingBox;

/// One frame's outcome: the region that was chosen or tracked, or
/// `None` when the frame produced no region.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackRecord {
    pub frame_index: usize,
    pub region: Option<BoundingBox>,
}

/// Bounded, append-only log of recent per-frame outcomes.
///
/// Owned by the orchestrator and handed out read-only, so overlay
/// drawing or other diagnostics consume it without sharing mutable
/// state. Appending evicts the oldest record once full and never fails.
#[derive(Debug)]
pub struct TrackHistory {
    records: VecDeque<TrackRecord>,
    capacity: usize,
}

impl TrackHistory {
    /// A capacity of zero disables recording entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, record: TrackRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn latest(&self) -> Option<&TrackRecord> {
        self.records.back()
    }

    /// Records in arrival order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TrackRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
