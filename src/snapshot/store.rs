//! On-disk snapshot store.
//!
//! The snapshot is a single JSON document that wholly replaces its
//! predecessor. Writes go to a temporary file in the destination directory
//! and are renamed into place, so a crashed or cancelled run can never
//! leave a half-written snapshot behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use super::Snapshot;

/// Snapshot store error types.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("reading snapshot: {0}")]
    Read(#[source] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("writing snapshot: {0}")]
    Write(#[source] std::io::Error),
}

/// Store owning the snapshot file path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previously persisted snapshot. `Ok(None)` means no
    /// snapshot exists yet; a snapshot that cannot be read or does not
    /// match the schema is an error for the caller to downgrade.
    pub fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SnapshotError::Read(e)),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// Atomically replace the persisted snapshot.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(SnapshotError::Write)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(SnapshotError::Write)?;
        let body = serde_json::to_vec_pretty(snapshot)?;
        tmp.write_all(&body).map_err(SnapshotError::Write)?;
        tmp.as_file().sync_all().map_err(SnapshotError::Write)?;
        tmp.persist(&self.path)
            .map_err(|e| SnapshotError::Write(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Verdict;
    use crate::snapshot::{GlobalPoint, ServiceReport};
    use chrono::{TimeZone, Utc};

    fn sample() -> Snapshot {
        Snapshot {
            last_updated: "1404/01/01 14:00".to_string(),
            generated_at: Utc.with_ymd_and_hms(2025, 3, 21, 10, 30, 0).unwrap(),
            fleet_score: 75.0,
            services: vec![ServiceReport {
                id: "central".to_string(),
                name: "Central".to_string(),
                url: "https://example.com/panel".to_string(),
                color: "#C7A46C".to_string(),
                status: Verdict::Active,
                weight: 1.0,
                uptime_percent: 87.5,
                renewal_date: "1404/12/21".to_string(),
                days_remaining: Some(356),
                renewal_error: None,
                history: vec![Verdict::Active, Verdict::Degraded, Verdict::Active],
            }],
            global_history: vec![GlobalPoint { at: "1404/01/01 14:00".to_string(), score: 75.0 }],
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("status.json"));

        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.fleet_score, 75.0);
        assert_eq!(loaded.services.len(), 1);
        assert_eq!(loaded.services[0].history.len(), 3);
        assert_eq!(loaded.services[0].status, Verdict::Active);
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("status.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn garbage_snapshot_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(&path, "not json at all {").unwrap();

        let store = SnapshotStore::new(&path);
        assert!(matches!(store.load(), Err(SnapshotError::Malformed(_))));
    }

    #[test]
    fn wrong_shape_is_malformed_not_coerced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        // Valid JSON, wrong schema (history holds an unknown verdict).
        std::fs::write(
            &path,
            r#"{"last_updated":"x","generated_at":"2025-03-21T10:30:00Z","fleet_score":1.0,
                "services":[{"id":"a","name":"a","url":"u","color":"c","status":"sideways",
                "weight":1.0,"uptime_percent":0.0,"renewal_date":"unlimited",
                "days_remaining":null,"history":[]}],"global_history":[]}"#,
        )
        .unwrap();

        let store = SnapshotStore::new(&path);
        assert!(matches!(store.load(), Err(SnapshotError::Malformed(_))));
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("status.json"));

        store.save(&sample()).unwrap();
        let mut next = sample();
        next.fleet_score = 50.0;
        store.save(&next).unwrap();

        assert_eq!(store.load().unwrap().unwrap().fleet_score, 50.0);
        // No stray temp files left behind.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/data/status.json"));
        store.save(&sample()).unwrap();
        assert!(store.load().unwrap().is_some());
    }
}
