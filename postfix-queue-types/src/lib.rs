//! # postfix-queue-types
//!
//! Core types describing a point-in-time measurement of a Postfix spool.
//!
//! A spool is split into six queues (maildrop, hold, incoming, active,
//! defer, deferred). Each sampling pass produces one [`QueueSample`] per
//! queue, and the six samples together with the duration of the pass form
//! a [`Snapshot`].
//!
//! ## Features
//!
//! - `serde`: Serialize/Deserialize derives for all types
//!
//! ## Example
//!
//! ```rust
//! use postfix_queue_types::{Snapshot, TrackedQueue};
//!
//! let snapshot = Snapshot::builder()
//!     .queue(TrackedQueue::Active, 12, 48_000)
//!     .queue(TrackedQueue::Deferred, 3, 9_100)
//!     .collection_seconds(0.25)
//!     .build();
//!
//! assert_eq!(snapshot.get(TrackedQueue::Active).count, 12);
//! // Queues not set explicitly are empty
//! assert_eq!(snapshot.get(TrackedQueue::Hold).count, 0);
//! assert_eq!(snapshot.total_count(), 15);
//! ```

mod queue;
mod snapshot;

pub use queue::*;
pub use snapshot::*;
