//! Snapshot - the result of one full sampling pass over the spool.

use crate::{QueueSample, TrackedQueue};

/// A point-in-time measurement of every tracked queue.
///
/// All six samples and the collection duration come from the same pass.
/// Snapshots are never patched after construction; a new pass produces a
/// new value that replaces the old one wholesale.
///
/// # Example
///
/// ```rust
/// use postfix_queue_types::{Snapshot, TrackedQueue};
///
/// let snapshot = Snapshot::empty();
/// assert!(snapshot.iter().all(|s| s.count == 0));
/// assert_eq!(snapshot.iter().count(), TrackedQueue::COUNT);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// One sample per queue, indexed by [`TrackedQueue::index`].
    samples: [QueueSample; TrackedQueue::COUNT],

    /// Wall-clock duration of the pass that produced this snapshot.
    pub collection_seconds: f64,

    /// Unix timestamp in milliseconds when the pass finished. Zero for
    /// the initial empty snapshot.
    pub taken_at_ms: u64,
}

impl Snapshot {
    /// The all-zero snapshot served before the first pass completes.
    pub fn empty() -> Self {
        Self {
            samples: TrackedQueue::ALL.map(QueueSample::empty),
            collection_seconds: 0.0,
            taken_at_ms: 0,
        }
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Sample for a specific queue.
    pub fn get(&self, queue: TrackedQueue) -> &QueueSample {
        &self.samples[queue.index()]
    }

    /// Iterate over all samples in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = &QueueSample> {
        self.samples.iter()
    }

    /// Messages across all queues.
    pub fn total_count(&self) -> u64 {
        self.samples.iter().map(|s| s.count).sum()
    }

    /// Bytes across all queues.
    pub fn total_size_bytes(&self) -> u64 {
        self.samples.iter().map(|s| s.size_bytes).sum()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builder for constructing `Snapshot` instances.
///
/// Queues that are never set are recorded as empty.
#[derive(Debug)]
pub struct SnapshotBuilder {
    samples: [QueueSample; TrackedQueue::COUNT],
    collection_seconds: f64,
    taken_at_ms: Option<u64>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            samples: TrackedQueue::ALL.map(QueueSample::empty),
            collection_seconds: 0.0,
            taken_at_ms: None,
        }
    }

    /// Record the measurement for one queue.
    pub fn queue(mut self, queue: TrackedQueue, count: u64, size_bytes: u64) -> Self {
        self.samples[queue.index()] = QueueSample::new(queue, count, size_bytes);
        self
    }

    /// Record a pre-built sample.
    pub fn sample(mut self, sample: QueueSample) -> Self {
        self.samples[sample.queue.index()] = sample;
        self
    }

    /// Set the duration of the pass.
    pub fn collection_seconds(mut self, seconds: f64) -> Self {
        self.collection_seconds = seconds;
        self
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn taken_at_ms(mut self, ts: u64) -> Self {
        self.taken_at_ms = Some(ts);
        self
    }

    /// Build the snapshot, stamping it with the current time unless a
    /// timestamp was given.
    pub fn build(self) -> Snapshot {
        Snapshot {
            samples: self.samples,
            collection_seconds: self.collection_seconds,
            taken_at_ms: self.taken_at_ms.unwrap_or_else(current_timestamp_ms),
        }
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_all_zero() {
        let snapshot = Snapshot::empty();
        assert_eq!(snapshot.total_count(), 0);
        assert_eq!(snapshot.total_size_bytes(), 0);
        assert_eq!(snapshot.collection_seconds, 0.0);
        assert_eq!(snapshot.taken_at_ms, 0);
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn samples_keep_queue_identity() {
        let snapshot = Snapshot::empty();
        let queues: Vec<_> = snapshot.iter().map(|s| s.queue).collect();
        assert_eq!(queues, TrackedQueue::ALL.to_vec());
    }

    #[test]
    fn builder_sets_only_given_queues() {
        let snapshot = Snapshot::builder()
            .taken_at_ms(1703160000000)
            .queue(TrackedQueue::Incoming, 4, 1024)
            .sample(QueueSample::new(TrackedQueue::Defer, 2, 10))
            .collection_seconds(1.5)
            .build();

        assert_eq!(snapshot.get(TrackedQueue::Incoming).count, 4);
        assert_eq!(snapshot.get(TrackedQueue::Incoming).size_bytes, 1024);
        assert_eq!(snapshot.get(TrackedQueue::Defer).count, 2);
        assert!(snapshot.get(TrackedQueue::Active).is_empty());
        assert_eq!(snapshot.total_count(), 6);
        assert_eq!(snapshot.total_size_bytes(), 1034);
        assert_eq!(snapshot.collection_seconds, 1.5);
        assert_eq!(snapshot.taken_at_ms, 1703160000000);
    }

    #[test]
    fn builder_stamps_current_time() {
        let snapshot = Snapshot::builder().build();
        assert!(snapshot.taken_at_ms > 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let snapshot = Snapshot::builder()
            .taken_at_ms(1703160000000)
            .queue(TrackedQueue::Hold, 1, 3)
            .build();

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"hold\""));
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot, parsed);
    }
}
