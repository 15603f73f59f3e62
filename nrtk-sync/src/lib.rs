//! # nrtk-sync
//!
//! Change-gated publishing of a content feed onto the filesystem.
//!
//! Call [`pipeline::run`] with raw feed bytes: the payload is fingerprinted,
//! compared with the current metadata record, and only on a change (or when
//! forced) every story, the error page, the sitemap and the metadata record
//! are rewritten. The outgoing metadata is archived under its own checksum.

pub mod detector;
pub mod diff;
pub mod entity;
pub mod error;
pub mod fingerprint;
pub mod lock;
pub mod pipeline;
pub mod snapshot;
pub mod writer;

pub use detector::{should_publish, Decision, PublishReason};
pub use entity::{ArtifactKind, ErrorPage, HistoricalSnapshot, Publishable, Sitemap};
pub use error::SyncError;
pub use fingerprint::{fingerprint, Fingerprint};
pub use pipeline::{SyncOptions, SyncReport, SyncStatus, Syncer};
pub use snapshot::{ArchiveOutcome, FsSnapshotStore, SnapshotStore};
pub use writer::{PublishFailure, Publisher, WriteResult};
