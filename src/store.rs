//! Shared holder for the most recent snapshot.

use std::sync::Arc;

use parking_lot::RwLock;
use postfix_queue_types::Snapshot;

/// The latest complete [`Snapshot`], shared between the sampler and the
/// scrape path.
///
/// Snapshots are immutable once published. Publishing swaps the `Arc` under
/// a write lock held only for the pointer store, and readers clone the
/// `Arc` under a read lock, so a reader always sees one whole pass and
/// never waits on a filesystem walk.
///
/// Cloning the store yields another handle to the same slot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    latest: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    /// Create a store holding the all-zero snapshot.
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::empty())
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            latest: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        *self.latest.write() = snapshot;
    }

    /// Current snapshot. The returned value stays valid even if a newer one
    /// is published while the caller holds it.
    pub fn load(&self) -> Arc<Snapshot> {
        self.latest.read().clone()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
