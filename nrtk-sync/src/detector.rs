//! Change detection: publish or skip.
//!
//! Decision precedence:
//! 1. `FirstRun` (no current record)
//! 2. `LoadFailed` (record unreadable; republish rather than halt)
//! 3. `Changed` (stored checksum differs)
//! 4. `Forced` (checksums match, force requested)
//! 5. `Unchanged` (skip)

use std::fmt;

use nrtk_core::types::MetadataRecord;

use crate::snapshot::SnapshotStore;

/// Why a decision was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishReason {
    FirstRun,
    LoadFailed { error: String },
    Changed,
    Forced,
    Unchanged,
}

impl fmt::Display for PublishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishReason::FirstRun => write!(f, "no previous metadata"),
            PublishReason::LoadFailed { error } => write!(f, "metadata unreadable ({error})"),
            PublishReason::Changed => write!(f, "content changed"),
            PublishReason::Forced => write!(f, "forced"),
            PublishReason::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Result of [`should_publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub publish: bool,
    pub reason: PublishReason,
    /// The current record as loaded, if any.
    pub previous: Option<MetadataRecord>,
}

impl Decision {
    /// The record about to be superseded: present only when publishing over a
    /// record with a different checksum.
    pub fn outgoing(&self, fresh_checksum: &str) -> Option<&MetadataRecord> {
        if !self.publish {
            return None;
        }
        self.previous
            .as_ref()
            .filter(|previous| previous.checksum != fresh_checksum)
    }
}

/// Compare `fresh_checksum` against the stored current record.
///
/// Load errors never propagate: they yield a publish decision.
pub fn should_publish(store: &dyn SnapshotStore, fresh_checksum: &str, force: bool) -> Decision {
    let previous = match store.load_current() {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Decision {
                publish: true,
                reason: PublishReason::FirstRun,
                previous: None,
            }
        }
        Err(err) => {
            tracing::warn!("treating metadata as stale: {err}");
            return Decision {
                publish: true,
                reason: PublishReason::LoadFailed {
                    error: err.to_string(),
                },
                previous: None,
            };
        }
    };

    let reason = if previous.checksum != fresh_checksum {
        tracing::info!("metadata update detected");
        PublishReason::Changed
    } else if force {
        PublishReason::Forced
    } else {
        PublishReason::Unchanged
    };

    Decision {
        publish: reason != PublishReason::Unchanged,
        reason,
        previous: Some(previous),
    }
}
