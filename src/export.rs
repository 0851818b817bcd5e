//! One-shot snapshot export.

use std::fs;
use std::path::Path;

use postfix_queue_types::Snapshot;

use crate::error::Result;
use crate::sampler::Sampler;

/// Run a single sampling pass and write the snapshot to `path` as pretty
/// JSON. Returns the snapshot that was written.
pub fn export_to_file(sampler: &Sampler, path: &Path) -> Result<Snapshot> {
    let snapshot = sampler.sample();
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, json)?;

    tracing::info!(
        path = %path.display(),
        messages = snapshot.total_count(),
        "Exported snapshot"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SnapshotStore;
    use postfix_queue_types::TrackedQueue;
    use tempfile::TempDir;

    #[test]
    fn writes_readable_json() {
        let spool = TempDir::new().unwrap();
        fs::create_dir_all(spool.path().join("active/F")).unwrap();
        fs::write(spool.path().join("active/F/msg"), b"subject").unwrap();

        let out = TempDir::new().unwrap();
        let path = out.path().join("snapshot.json");
        let sampler = Sampler::new(spool.path(), SnapshotStore::new());

        let written = export_to_file(&sampler, &path).unwrap();
        assert_eq!(written.get(TrackedQueue::Active).count, 1);

        let parsed: Snapshot = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.get(TrackedQueue::Active), written.get(TrackedQueue::Active));
        assert_eq!(parsed.taken_at_ms, written.taken_at_ms);
        assert!((parsed.collection_seconds - written.collection_seconds).abs() < 1e-9);
    }

    #[test]
    fn export_does_not_touch_store() {
        let spool = TempDir::new().unwrap();
        fs::create_dir(spool.path().join("hold")).unwrap();
        fs::write(spool.path().join("hold/h"), b"x").unwrap();

        let out = TempDir::new().unwrap();
        let store = SnapshotStore::new();
        let sampler = Sampler::new(spool.path(), store.clone());

        export_to_file(&sampler, &out.path().join("s.json")).unwrap();
        assert_eq!(store.load().get(TrackedQueue::Hold).count, 0);
    }

    #[test]
    fn unwritable_destination_is_an_error() {
        let sampler = Sampler::new("/nonexistent/spool", SnapshotStore::new());
        assert!(export_to_file(&sampler, Path::new("/nonexistent/dir/out.json")).is_err());
    }
}
