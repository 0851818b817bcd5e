//! Scrape-time view of the snapshot store.
//!
//! The collector never walks the filesystem. Each scrape reads whatever
//! snapshot the sampler published last and reports it as gauges.

use std::time::Instant;

use postfix_queue_types::TrackedQueue;

use crate::store::SnapshotStore;

/// Name and help text of one exported gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
}

/// One value produced by a scrape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeSample {
    pub desc: MetricDesc,
    pub value: f64,
}

/// Per-queue descriptors: (queue, count gauge, size gauge).
const QUEUE_METRICS: [(TrackedQueue, MetricDesc, MetricDesc); TrackedQueue::COUNT] = [
    queue_metrics(
        TrackedQueue::Maildrop,
        "Number of messages in maildrop queue",
        "Total size of messages in maildrop queue",
    ),
    queue_metrics(
        TrackedQueue::Hold,
        "Number of messages in hold queue",
        "Total size of messages in hold queue",
    ),
    queue_metrics(
        TrackedQueue::Incoming,
        "Number of messages in incoming queue",
        "Total size of messages in incoming queue",
    ),
    queue_metrics(
        TrackedQueue::Active,
        "Number of messages in active queue",
        "Total size of messages in active queue",
    ),
    queue_metrics(
        TrackedQueue::Defer,
        "Number of messages in defer queue",
        "Total size of messages in defer queue",
    ),
    queue_metrics(
        TrackedQueue::Deferred,
        "Number of messages in deferred queue",
        "Total size of messages in deferred queue",
    ),
];

pub const COLLECTION_TIME: MetricDesc = MetricDesc {
    name: "postfix_metric_collection_time",
    help: "Time it took for a collection thread to collect postfix metrics",
};

pub const SCRAPE_TIME: MetricDesc = MetricDesc {
    name: "postfix_metric_scrape_time",
    help: "Time it took for prometheus to scrape postfix metrics",
};

/// Total number of exported gauges.
pub const METRIC_COUNT: usize = TrackedQueue::COUNT * 2 + 2;

const fn queue_metrics(
    queue: TrackedQueue,
    count_help: &'static str,
    size_help: &'static str,
) -> (TrackedQueue, MetricDesc, MetricDesc) {
    (
        queue,
        MetricDesc {
            name: queue.count_metric(),
            help: count_help,
        },
        MetricDesc {
            name: queue.size_metric(),
            help: size_help,
        },
    )
}

/// Exposes the latest snapshot as the fourteen postfix gauges.
#[derive(Debug, Clone)]
pub struct QueueCollector {
    store: SnapshotStore,
}

impl QueueCollector {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    /// Every metric this collector can emit, in emission order.
    ///
    /// Independent of the snapshot contents.
    pub fn describe(&self) -> Vec<MetricDesc> {
        let mut descs = Vec::with_capacity(METRIC_COUNT);
        for (_, count, size) in QUEUE_METRICS {
            descs.push(count);
            descs.push(size);
        }
        descs.push(COLLECTION_TIME);
        descs.push(SCRAPE_TIME);
        descs
    }

    /// Read the current snapshot and produce one sample per metric.
    ///
    /// The last sample is the time spent inside this call.
    pub fn collect(&self) -> Vec<GaugeSample> {
        let started = Instant::now();
        let snapshot = self.store.load();

        let mut samples = Vec::with_capacity(METRIC_COUNT);
        for (queue, count, size) in QUEUE_METRICS {
            let sample = snapshot.get(queue);
            samples.push(GaugeSample {
                desc: count,
                value: sample.count as f64,
            });
            samples.push(GaugeSample {
                desc: size,
                value: sample.size_bytes as f64,
            });
        }
        samples.push(GaugeSample {
            desc: COLLECTION_TIME,
            value: snapshot.collection_seconds,
        });
        samples.push(GaugeSample {
            desc: SCRAPE_TIME,
            value: started.elapsed().as_secs_f64(),
        });

        samples
    }
}
