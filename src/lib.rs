//! # postfix-exporter
//!
//! Prometheus exporter for the size of Postfix mail queues.
//!
//! A background sampler periodically walks the spool directories, counts
//! the queued messages and sums their sizes, and publishes the result as a
//! single snapshot. Scrapes read that snapshot without touching the
//! filesystem.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │   interval tick                              GET /metrics     │
//! │        │                                          │           │
//! │        ▼                                          ▼           │
//! │  ┌──────────┐   ┌──────────┐   ┌───────────────┐  ┌────────┐  │
//! │  │ sampler  │──▶│ scanner  │   │   collector   │◀─│ server │  │
//! │  └────┬─────┘   └──────────┘   └───────▲───────┘  └────────┘  │
//! │       │ publish                        │ load                 │
//! │       ▼                                │                      │
//! │  ┌─────────────────────────────────────┴──┐                   │
//! │  │           store (latest snapshot)      │                   │
//! │  └────────────────────────────────────────┘                   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`scanner`]**: recursive walk of one queue directory
//! - **[`sampler`]**: runs the scanner for all six queues on a fixed interval
//! - **[`store`]**: holds the latest complete snapshot
//! - **[`collector`]**: turns the snapshot into the fourteen gauges
//! - **[`prometheus`]**: text exposition format and the HTTP endpoint
//!
//! ## Usage
//!
//! ```bash
//! postfix-exporter --spool.path /var/spool/postfix --telemetry.addr :9706
//!
//! # Sample once and dump the snapshot as JSON
//! postfix-exporter --export queues.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use postfix_exporter::{QueueCollector, Sampler, SnapshotStore};
//!
//! let store = SnapshotStore::new();
//! let sampler = Sampler::new("/var/spool/postfix", store.clone());
//! sampler.tick();
//!
//! let collector = QueueCollector::new(store);
//! for sample in collector.collect() {
//!     println!("{} {}", sample.desc.name, sample.value);
//! }
//! ```

pub mod cli;
pub mod collector;
pub mod error;
pub mod export;
pub mod logging;
pub mod prometheus;
pub mod sampler;
pub mod scanner;
pub mod settings;
pub mod store;

pub use collector::{GaugeSample, MetricDesc, QueueCollector};
pub use error::{ExporterError, Result};
pub use prometheus::MetricsServer;
pub use sampler::{Sampler, SamplerHandle};
pub use settings::Settings;
pub use store::SnapshotStore;

// Re-export types for convenience
pub use postfix_queue_types::{QueueSample, Snapshot, TrackedQueue};
