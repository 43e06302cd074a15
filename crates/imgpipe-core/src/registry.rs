//! In-memory image registry.
//!
//! The registry is the single owner of every `ImageRecord` for the process
//! lifetime. Records are kept in insertion order and never removed. All
//! access goes through one mutex, so each operation observes a consistent
//! snapshot; callers only ever receive clones.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::{ImageId, ImageRecord, ImageStatus, StatusCounts};

#[derive(Debug, Default)]
pub struct ImageRegistry {
    records: Mutex<Vec<ImageRecord>>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `seed` already registered, in the given order.
    pub fn with_seed(seed: Vec<ImageRecord>) -> Self {
        Self {
            records: Mutex::new(seed),
        }
    }

    // Critical sections never leave the Vec half-updated, so a poisoned lock
    // still guards valid data.
    fn lock(&self) -> MutexGuard<'_, Vec<ImageRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `record` as-is (duplicate or odd ids included).
    /// Returns the new collection length.
    pub fn create(&self, record: ImageRecord) -> usize {
        let mut g = self.lock();
        g.push(record);
        g.len()
    }

    /// Records whose status equals `status`, in insertion order.
    pub fn list_by_status(&self, status: &ImageStatus) -> Vec<ImageRecord> {
        self.lock()
            .iter()
            .filter(|r| &r.status == status)
            .cloned()
            .collect()
    }

    /// Set `status` on every record with `id`. Returns whether any matched.
    pub fn transition(&self, id: ImageId, status: ImageStatus) -> bool {
        let mut g = self.lock();
        Self::transition_locked(&mut g, id, status)
    }

    pub fn count_by_status(&self) -> StatusCounts {
        StatusCounts::tally(self.lock().iter())
    }

    /// `create` followed by `count_by_status` without releasing the lock in
    /// between, so the counts always include the new record.
    pub fn create_and_count(&self, record: ImageRecord) -> StatusCounts {
        let mut g = self.lock();
        g.push(record);
        StatusCounts::tally(g.iter())
    }

    /// `transition` followed by `count_by_status` under one lock.
    pub fn transition_and_count(&self, id: ImageId, status: ImageStatus) -> (bool, StatusCounts) {
        let mut g = self.lock();
        let found = Self::transition_locked(&mut g, id, status);
        (found, StatusCounts::tally(g.iter()))
    }

    fn transition_locked(records: &mut [ImageRecord], id: ImageId, status: ImageStatus) -> bool {
        let mut found = false;
        for r in records.iter_mut().filter(|r| r.id == id) {
            r.status = status.clone();
            found = true;
        }
        if !found {
            tracing::debug!(id, "transition matched no image");
        }
        found
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clone of the whole collection in insertion order.
    pub fn snapshot(&self) -> Vec<ImageRecord> {
        self.lock().clone()
    }
}
