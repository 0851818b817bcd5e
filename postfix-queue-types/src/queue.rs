//! The fixed set of spool queues and the measurement taken for each.

use std::fmt;
use std::str::FromStr;

/// One of the six Postfix queue directories under the spool root.
///
/// The set is fixed; queues are always reported in the order of
/// [`TrackedQueue::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrackedQueue {
    Maildrop,
    Hold,
    Incoming,
    Active,
    Defer,
    Deferred,
}

impl TrackedQueue {
    /// Number of tracked queues.
    pub const COUNT: usize = 6;

    /// Every tracked queue, in reporting order.
    pub const ALL: [TrackedQueue; Self::COUNT] = [
        TrackedQueue::Maildrop,
        TrackedQueue::Hold,
        TrackedQueue::Incoming,
        TrackedQueue::Active,
        TrackedQueue::Defer,
        TrackedQueue::Deferred,
    ];

    /// Subdirectory name under the spool root.
    pub const fn dir_name(self) -> &'static str {
        match self {
            TrackedQueue::Maildrop => "maildrop",
            TrackedQueue::Hold => "hold",
            TrackedQueue::Incoming => "incoming",
            TrackedQueue::Active => "active",
            TrackedQueue::Defer => "defer",
            TrackedQueue::Deferred => "deferred",
        }
    }

    /// Position of this queue in [`TrackedQueue::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name of the gauge carrying the message count for this queue.
    pub const fn count_metric(self) -> &'static str {
        match self {
            TrackedQueue::Maildrop => "postfix_maildrop_queue_count",
            TrackedQueue::Hold => "postfix_hold_queue_count",
            TrackedQueue::Incoming => "postfix_incoming_queue_count",
            TrackedQueue::Active => "postfix_active_queue_count",
            TrackedQueue::Defer => "postfix_defer_queue_count",
            TrackedQueue::Deferred => "postfix_deferred_queue_count",
        }
    }

    /// Name of the gauge carrying the total byte size for this queue.
    pub const fn size_metric(self) -> &'static str {
        match self {
            TrackedQueue::Maildrop => "postfix_maildrop_queue_size",
            TrackedQueue::Hold => "postfix_hold_queue_size",
            TrackedQueue::Incoming => "postfix_incoming_queue_size",
            TrackedQueue::Active => "postfix_active_queue_size",
            TrackedQueue::Defer => "postfix_defer_queue_size",
            TrackedQueue::Deferred => "postfix_deferred_queue_size",
        }
    }
}

impl fmt::Display for TrackedQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Error returned when parsing a queue name that is not tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQueue(pub String);

impl fmt::Display for UnknownQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown postfix queue: {:?}", self.0)
    }
}

impl std::error::Error for UnknownQueue {}

impl FromStr for TrackedQueue {
    type Err = UnknownQueue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackedQueue::ALL
            .into_iter()
            .find(|q| q.dir_name() == s)
            .ok_or_else(|| UnknownQueue(s.to_string()))
    }
}

/// Measurement of a single queue taken during one sampling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueSample {
    /// Which queue was measured.
    pub queue: TrackedQueue,

    /// Number of non-directory entries found under the queue directory.
    pub count: u64,

    /// Sum of the byte lengths of those entries.
    pub size_bytes: u64,
}

impl QueueSample {
    pub fn new(queue: TrackedQueue, count: u64, size_bytes: u64) -> Self {
        Self {
            queue,
            count,
            size_bytes,
        }
    }

    /// A zero sample, used before the first pass and for unreadable queues.
    pub fn empty(queue: TrackedQueue) -> Self {
        Self::new(queue, 0, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.size_bytes == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, queue) in TrackedQueue::ALL.iter().enumerate() {
            assert_eq!(queue.index(), i);
        }
    }

    #[test]
    fn metric_names_follow_dir_names() {
        for queue in TrackedQueue::ALL {
            assert_eq!(
                queue.count_metric(),
                format!("postfix_{}_queue_count", queue.dir_name())
            );
            assert_eq!(
                queue.size_metric(),
                format!("postfix_{}_queue_size", queue.dir_name())
            );
        }
    }

    #[test]
    fn parse_queue_names() {
        assert_eq!("defer".parse::<TrackedQueue>(), Ok(TrackedQueue::Defer));
        assert_eq!(
            "deferred".parse::<TrackedQueue>(),
            Ok(TrackedQueue::Deferred)
        );
        assert_eq!(
            "corrupt".parse::<TrackedQueue>(),
            Err(UnknownQueue("corrupt".to_string()))
        );
    }

    #[test]
    fn display_uses_dir_name() {
        assert_eq!(TrackedQueue::Maildrop.to_string(), "maildrop");
    }

    #[test]
    fn empty_sample() {
        let sample = QueueSample::empty(TrackedQueue::Hold);
        assert!(sample.is_empty());
        assert!(!QueueSample::new(TrackedQueue::Hold, 1, 0).is_empty());
    }
}
