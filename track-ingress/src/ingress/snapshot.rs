//! Latest-snapshot cache
//!
//! Holds the most recent decoded member list as minimal position tuples.
//! Written by the receive loop on every successful decode, read on demand by
//! late subscribers. Readers get an `Arc` to an immutable list, so a writer
//! swapping in a new list never tears what a reader holds.

use crate::types::{SnapshotEntry, TrackMember};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handle to the latest member snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotCell {
    inner: Arc<RwLock<Arc<[SnapshotEntry]>>>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with the given member list
    pub fn store(&self, members: &[TrackMember]) {
        let entries: Arc<[SnapshotEntry]> = members.iter().map(SnapshotEntry::from).collect();
        *self.inner.write() = entries;
    }

    /// Latest member list (empty until the first successful decode)
    pub fn latest(&self) -> Arc<[SnapshotEntry]> {
        Arc::clone(&self.inner.read())
    }
}
