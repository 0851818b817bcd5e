//! Periodic sampling of the spool into the snapshot store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use postfix_queue_types::{Snapshot, TrackedQueue};

use crate::scanner;
use crate::store::SnapshotStore;

/// Default time between sampling passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Walks every tracked queue on a fixed interval and publishes the result.
///
/// The sampler is the only writer of its [`SnapshotStore`].
///
/// # Example
///
/// ```rust,no_run
/// use postfix_exporter::{Sampler, SnapshotStore};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let store = SnapshotStore::new();
///     let sampler = Sampler::builder("/var/spool/postfix", store.clone())
///         .interval(Duration::from_secs(30))
///         .build();
///
///     let handle = sampler.start();
///     // ... serve `store` to scrapers ...
///     handle.stop();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Sampler {
    spool_path: PathBuf,
    store: SnapshotStore,
    interval: Duration,
}

impl Sampler {
    /// Create a sampler with the default 15 second interval.
    pub fn new(spool_path: impl Into<PathBuf>, store: SnapshotStore) -> Self {
        Self::builder(spool_path, store).build()
    }

    pub fn builder(spool_path: impl Into<PathBuf>, store: SnapshotStore) -> SamplerBuilder {
        SamplerBuilder {
            spool_path: spool_path.into(),
            store,
            interval: None,
        }
    }

    pub fn spool_path(&self) -> &Path {
        &self.spool_path
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Walk every queue once and return the resulting snapshot without
    /// publishing it.
    ///
    /// Queues are scanned in [`TrackedQueue::ALL`] order. An unreadable
    /// queue reads as empty and does not affect the others.
    pub fn sample(&self) -> Snapshot {
        let started = Instant::now();

        let mut builder = Snapshot::builder();
        for queue in TrackedQueue::ALL {
            builder = builder.sample(scanner::scan_queue(&self.spool_path, queue));
        }

        builder
            .collection_seconds(started.elapsed().as_secs_f64())
            .build()
    }

    /// Run one full pass and publish it to the store.
    pub fn tick(&self) {
        tracing::debug!(spool = %self.spool_path.display(), "Collection triggered");
        let snapshot = self.sample();
        tracing::debug!(
            messages = snapshot.total_count(),
            bytes = snapshot.total_size_bytes(),
            seconds = snapshot.collection_seconds,
            "Collection ended"
        );
        self.store.publish(snapshot);
    }

    /// Start periodic sampling on the current tokio runtime.
    ///
    /// The first pass runs immediately. Each pass runs on the blocking
    /// thread pool; a pass that overruns the interval is followed directly
    /// by the ticks it missed.
    ///
    /// Returns a handle that can be used to stop the loop.
    pub fn start(self) -> SamplerHandle {
        use tokio::sync::watch;

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let sampler = Arc::new(self);

        let task = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(sampler.interval);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let pass = sampler.clone();
                        if let Err(e) = tokio::task::spawn_blocking(move || pass.tick()).await {
                            tracing::error!(error = %e, "Sampling pass panicked");
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("Sampler stopped");
        });

        SamplerHandle { stop_tx, task }
    }
}

/// Builder for configuring a [`Sampler`].
#[derive(Debug)]
pub struct SamplerBuilder {
    spool_path: PathBuf,
    store: SnapshotStore,
    interval: Option<Duration>,
}

impl SamplerBuilder {
    /// Set the sampling interval.
    ///
    /// Defaults to 15 seconds if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn build(self) -> Sampler {
        Sampler {
            spool_path: self.spool_path,
            store: self.store,
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
        }
    }
}

/// Handle for controlling the background sampling loop.
///
/// Dropping the handle also stops the loop, since the stop channel closes.
#[derive(Debug)]
pub struct SamplerHandle {
    stop_tx: tokio::sync::watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl SamplerHandle {
    /// Ask the loop to stop after the pass in progress, if any.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn spool_with(files: &[(&str, &[u8])]) -> TempDir {
        let root = TempDir::new().unwrap();
        for queue in TrackedQueue::ALL {
            fs::create_dir(root.path().join(queue.dir_name())).unwrap();
        }
        for (rel, bytes) in files {
            let path = root.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, bytes).unwrap();
        }
        root
    }

    #[test]
    fn default_interval_is_fifteen_seconds() {
        let sampler = Sampler::new("/var/spool/postfix", SnapshotStore::new());
        assert_eq!(sampler.interval(), Duration::from_secs(15));
        assert_eq!(sampler.spool_path(), Path::new("/var/spool/postfix"));
    }

    #[test]
    fn builder_sets_interval() {
        let sampler = Sampler::builder("/spool", SnapshotStore::new())
            .interval(Duration::from_secs(60))
            .build();
        assert_eq!(sampler.interval(), Duration::from_secs(60));
    }

    #[test]
    fn sample_measures_each_queue() {
        let spool = spool_with(&[
            ("active/A/1", b"abc"),
            ("active/B/2", b"de"),
            ("deferred/0/x", b"0123456789"),
            ("maildrop/m", b""),
        ]);
        let sampler = Sampler::new(spool.path(), SnapshotStore::new());

        let snapshot = sampler.sample();
        assert_eq!(snapshot.get(TrackedQueue::Active).count, 2);
        assert_eq!(snapshot.get(TrackedQueue::Active).size_bytes, 5);
        assert_eq!(snapshot.get(TrackedQueue::Deferred).count, 1);
        assert_eq!(snapshot.get(TrackedQueue::Deferred).size_bytes, 10);
        assert_eq!(snapshot.get(TrackedQueue::Maildrop).count, 1);
        assert!(snapshot.get(TrackedQueue::Hold).is_empty());
        assert!(snapshot.collection_seconds >= 0.0);
        assert!(snapshot.taken_at_ms > 0);
    }

    #[test]
    fn missing_queue_does_not_affect_others() {
        let spool = spool_with(&[("incoming/msg", b"1234")]);
        fs::remove_dir(spool.path().join("hold")).unwrap();

        let snapshot = Sampler::new(spool.path(), SnapshotStore::new()).sample();
        assert!(snapshot.get(TrackedQueue::Hold).is_empty());
        assert_eq!(snapshot.get(TrackedQueue::Incoming).count, 1);
    }

    #[test]
    fn missing_spool_root_yields_all_zero() {
        let snapshot = Sampler::new("/nonexistent/postfix/spool", SnapshotStore::new()).sample();
        assert_eq!(snapshot.total_count(), 0);
        assert_eq!(snapshot.total_size_bytes(), 0);
    }

    #[test]
    fn tick_publishes_to_store() {
        let spool = spool_with(&[("hold/h1", b"xx")]);
        let store = SnapshotStore::new();
        let sampler = Sampler::new(spool.path(), store.clone());

        sampler.tick();
        assert_eq!(store.load().get(TrackedQueue::Hold).count, 1);

        fs::write(spool.path().join("hold/h2"), b"yyy").unwrap();
        sampler.tick();
        let snapshot = store.load();
        assert_eq!(snapshot.get(TrackedQueue::Hold).count, 2);
        assert_eq!(snapshot.get(TrackedQueue::Hold).size_bytes, 5);
    }

    #[tokio::test]
    async fn started_sampler_publishes_and_stops() {
        let spool = spool_with(&[("defer/d", b"payload")]);
        let store = SnapshotStore::new();
        let handle = Sampler::builder(spool.path(), store.clone())
            .interval(Duration::from_millis(20))
            .build()
            .start();

        let published = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if store.load().get(TrackedQueue::Defer).count == 1 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(published.is_ok(), "sampler never published a snapshot");

        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("sampler did not stop");
    }
}
