//! Snapshot store — the current metadata record and its archived history.
//!
//! The current record is the only durable state consulted by change
//! detection. Superseded records are archived once under
//! `<snapshot_dir>/meta.<checksum>.json` and never touched again.
//!
//! [`SnapshotStore`] is injected wherever it is used; [`FsSnapshotStore`] is
//! the filesystem implementation.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use nrtk_core::types::MetadataRecord;

use crate::entity::HistoricalSnapshot;
use crate::error::{io_err, SyncError};
use crate::writer::{Publisher, WriteResult};

/// Outcome of archiving a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// A new archive was written (or would be, in dry-run mode).
    Archived(WriteResult),
    /// An archive for this checksum already exists; left untouched.
    AlreadyArchived { path: PathBuf },
}

/// Load/archive/save contract for metadata records.
pub trait SnapshotStore {
    /// The current record, or `None` on first run.
    fn load_current(&self) -> Result<Option<MetadataRecord>, SyncError>;

    /// Persist `record` under its own checksum. Never overwrites.
    fn archive(&self, record: &MetadataRecord) -> Result<ArchiveOutcome, SyncError>;

    /// Overwrite the current record unconditionally.
    fn save_current(&self, record: &MetadataRecord) -> Result<WriteResult, SyncError>;
}

/// An archived record found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub checksum: String,
    pub path: PathBuf,
    pub archived_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Filesystem store
// ---------------------------------------------------------------------------

/// Filesystem [`SnapshotStore`]; all writes go through a [`Publisher`].
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    publisher: Publisher,
}

impl FsSnapshotStore {
    pub fn new(publisher: Publisher) -> Self {
        Self { publisher }
    }

    /// Archived records, oldest first.
    pub fn history(&self) -> Result<Vec<SnapshotEntry>, SyncError> {
        let dir = &self.publisher.layout().snapshot_dir;
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(io_err(dir, e)),
        };

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_err(dir, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let Some(checksum) = name
                .strip_prefix("meta.")
                .and_then(|rest| rest.strip_suffix(".json"))
            else {
                continue;
            };
            let archived_at = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Utc>::from);
            snapshots.push(SnapshotEntry {
                checksum: checksum.to_string(),
                path: entry.path(),
                archived_at,
            });
        }
        snapshots.sort_by(|a, b| {
            a.archived_at
                .cmp(&b.archived_at)
                .then_with(|| a.checksum.cmp(&b.checksum))
        });
        Ok(snapshots)
    }

    /// Read an archived record by checksum.
    pub fn load_archived(&self, checksum: &str) -> Result<Option<MetadataRecord>, SyncError> {
        read_record(self.publisher.layout().snapshot_path(checksum))
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn load_current(&self) -> Result<Option<MetadataRecord>, SyncError> {
        let path = self.publisher.layout().meta_path.clone();
        tracing::debug!("reading metadata from {}", path.display());
        read_record(path)
    }

    fn archive(&self, record: &MetadataRecord) -> Result<ArchiveOutcome, SyncError> {
        let snapshot = HistoricalSnapshot(record);
        let path = self.publisher.resolve(&snapshot);
        if path.exists() {
            tracing::debug!("already archived: {}", path.display());
            return Ok(ArchiveOutcome::AlreadyArchived { path });
        }
        tracing::info!("archiving metadata {}", record.checksum);
        Ok(ArchiveOutcome::Archived(self.publisher.publish(&snapshot)?))
    }

    fn save_current(&self, record: &MetadataRecord) -> Result<WriteResult, SyncError> {
        self.publisher.publish(record)
    }
}

fn read_record(path: PathBuf) -> Result<Option<MetadataRecord>, SyncError> {
    let contents = match std::fs::read(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(path, e)),
    };
    serde_json::from_slice(&contents)
        .map(Some)
        .map_err(|source| SyncError::Metadata { path, source })
}
