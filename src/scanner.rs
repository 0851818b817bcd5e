//! Spool directory walker.
//!
//! Counts the messages in one queue directory and sums their sizes. Queue
//! files are treated as opaque; only directory structure and file lengths
//! are inspected.

use std::fs;
use std::path::{Path, PathBuf};

use postfix_queue_types::{QueueSample, TrackedQueue};

/// Totals produced by walking a directory tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanTotals {
    /// Number of non-directory entries.
    pub count: u64,
    /// Sum of their lengths in bytes.
    pub size_bytes: u64,
}

impl ScanTotals {
    fn add(&mut self, len: u64) {
        self.count += 1;
        self.size_bytes += len;
    }
}

/// Walk `root/queue_dir` and total up every entry that is not a directory.
///
/// Never fails. An unreadable entry anywhere below the root is logged at
/// debug level and skipped; an unreadable root is logged at warn level and
/// yields zero totals. Symbolic links are not followed and count as
/// entries of their own.
///
/// Passing an empty `queue_dir` scans `root` itself.
pub fn scan(root: impl AsRef<Path>, queue_dir: &str) -> ScanTotals {
    let base = if queue_dir.is_empty() {
        root.as_ref().to_path_buf()
    } else {
        root.as_ref().join(queue_dir)
    };

    let mut totals = ScanTotals::default();

    let metadata = match fs::symlink_metadata(&base) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(
                path = %base.display(),
                error = %e,
                "Queue directory is not accessible"
            );
            return totals;
        }
    };

    if !metadata.is_dir() {
        totals.add(metadata.len());
        return totals;
    }

    let mut pending: Vec<PathBuf> = vec![base.clone()];

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if dir == base => {
                tracing::warn!(
                    path = %base.display(),
                    error = %e,
                    "Queue directory is not accessible"
                );
                return totals;
            }
            Err(e) => {
                tracing::debug!(
                    path = %dir.display(),
                    error = %e,
                    "Failed to read directory"
                );
                continue;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(
                        path = %dir.display(),
                        error = %e,
                        "Failed to read directory entry"
                    );
                    continue;
                }
            };

            // DirEntry::metadata does not traverse symlinks
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(
                        path = %entry.path().display(),
                        error = %e,
                        "Failed to stat entry"
                    );
                    continue;
                }
            };

            if metadata.is_dir() {
                pending.push(entry.path());
            } else {
                totals.add(metadata.len());
            }
        }
    }

    totals
}

/// Measure a single tracked queue under the spool root.
pub fn scan_queue(spool_root: impl AsRef<Path>, queue: TrackedQueue) -> QueueSample {
    let totals = scan(spool_root, queue.dir_name());
    tracing::trace!(
        queue = %queue,
        count = totals.count,
        size_bytes = totals.size_bytes,
        "Scanned queue"
    );
    QueueSample::new(queue, totals.count, totals.size_bytes)
}
