//! Sync pipeline: parse → fingerprint → detect → publish.
//!
//! Fatal: malformed payload, directory setup, lock contention.
//! Non-fatal: unreadable metadata (republish), any single artifact write
//! (collected in [`SyncReport::failures`]).

use nrtk_core::{
    types::{MetadataRecord, Payload},
    Layout,
};
use nrtk_renderer::Renderer;

use crate::detector::{should_publish, PublishReason};
use crate::entity::{ArtifactKind, ErrorPage, Publishable, Sitemap};
use crate::error::{io_err, SyncError};
use crate::fingerprint::fingerprint;
use crate::lock::SyncLock;
use crate::snapshot::{ArchiveOutcome, FsSnapshotStore, SnapshotStore};
use crate::writer::{PublishFailure, Publisher, WriteResult};

/// Options for a single sync attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub force: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Published,
    Skipped,
}

/// Outcome of one sync attempt.
#[derive(Debug)]
pub struct SyncReport {
    pub site_name: String,
    pub story_count: usize,
    pub checksum: String,
    pub status: SyncStatus,
    pub reason: PublishReason,
    pub archived: Option<ArchiveOutcome>,
    pub writes: Vec<WriteResult>,
    pub failures: Vec<PublishFailure>,
}

impl SyncReport {
    /// Published (or skipped) without any artifact failing.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Syncer
// ---------------------------------------------------------------------------

/// Runs sync attempts against an injected [`SnapshotStore`].
pub struct Syncer<S> {
    publisher: Publisher,
    store: S,
    renderer: Renderer,
}

impl Syncer<FsSnapshotStore> {
    /// Filesystem-backed syncer; honours user templates in `<app_dir>/templates`.
    pub fn from_layout(layout: Layout, dry_run: bool) -> Result<Self, SyncError> {
        let publisher = Publisher::new(layout).with_dry_run(dry_run);
        let renderer = Renderer::with_user_templates(&publisher.layout().template_dir())?;
        let store = FsSnapshotStore::new(publisher.clone());
        Ok(Self::new(publisher, store, renderer))
    }
}

impl<S: SnapshotStore> Syncer<S> {
    pub fn new(publisher: Publisher, store: S, renderer: Renderer) -> Self {
        Self {
            publisher,
            store,
            renderer,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Run one sync attempt over raw feed bytes.
    pub fn sync(&self, raw: &[u8], force: bool) -> Result<SyncReport, SyncError> {
        let payload = Payload::from_slice(raw).map_err(SyncError::Parse)?;

        if !self.publisher.is_dry_run() {
            ensure_dirs(self.publisher.layout())?;
        }

        let fp = fingerprint(raw);
        let decision = should_publish(&self.store, &fp.checksum, force);

        let mut report = SyncReport {
            site_name: payload.site_name.clone(),
            story_count: payload.stories.len(),
            checksum: fp.checksum.clone(),
            status: SyncStatus::Skipped,
            reason: decision.reason.clone(),
            archived: None,
            writes: Vec::new(),
            failures: Vec::new(),
        };

        if !decision.publish {
            tracing::info!("nothing to update");
            return Ok(report);
        }

        tracing::info!(
            "sync content for {} with {} stories ({}, force={force})",
            payload.site_name,
            payload.stories.len(),
            decision.reason,
        );
        report.status = SyncStatus::Published;

        let layout = self.publisher.layout();
        let record = MetadataRecord::from_payload(&payload, fp.checksum.clone(), fp.computed_at);

        // The current record is only replaced once its archive exists.
        let mut archive_pending = None;
        if let Some(outgoing) = decision.outgoing(&fp.checksum) {
            match self.store.archive(outgoing) {
                Ok(outcome) => report.archived = Some(outcome),
                Err(error) => {
                    report.failures.push(failure(
                        ArtifactKind::Snapshot,
                        layout.snapshot_path(&outgoing.checksum),
                        error,
                    ));
                    archive_pending = Some(outgoing.checksum.clone());
                }
            }
        }

        let saved = match archive_pending {
            Some(checksum) => Err(SyncError::ArchivePending { checksum }),
            None => self.store.save_current(&record),
        };
        match saved {
            Ok(write) => report.writes.push(write),
            Err(error) => report.failures.push(failure(
                ArtifactKind::Metadata,
                layout.meta_path.clone(),
                error,
            )),
        }

        let error_page = ErrorPage::new(&payload.error_page);
        let sitemap = match self.renderer.render_sitemap(&payload.stories) {
            Ok(xml) => Some(Sitemap { xml }),
            Err(error) => {
                report.failures.push(failure(
                    ArtifactKind::Sitemap,
                    layout.sitemap_path(),
                    error.into(),
                ));
                None
            }
        };

        let mut entities: Vec<&dyn Publishable> = Vec::with_capacity(payload.stories.len() + 2);
        entities.extend(payload.stories.iter().map(|s| s as &dyn Publishable));
        entities.push(&error_page);
        if let Some(sitemap) = &sitemap {
            entities.push(sitemap);
        }

        let batch = self.publisher.publish_all(entities);
        report.writes.extend(batch.writes);
        report.failures.extend(batch.failures);

        if !report.failures.is_empty() {
            tracing::warn!(
                "{} artifact(s) failed to publish for {}",
                report.failures.len(),
                report.site_name
            );
        }
        Ok(report)
    }
}

fn failure(kind: ArtifactKind, path: std::path::PathBuf, error: SyncError) -> PublishFailure {
    tracing::error!("failed to publish {kind} {}: {error}", path.display());
    PublishFailure { kind, path, error }
}

fn ensure_dirs(layout: &Layout) -> Result<(), SyncError> {
    for dir in layout.required_dirs() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run one locked sync attempt against the filesystem layout.
///
/// This is the canonical entrypoint for both the one-shot CLI and the
/// repeat scheduler. Dry runs take no lock.
pub fn run(layout: &Layout, raw: &[u8], options: SyncOptions) -> Result<SyncReport, SyncError> {
    let _lock = if options.dry_run {
        None
    } else {
        Some(SyncLock::acquire(&layout.lock_path())?)
    };
    Syncer::from_layout(layout.clone(), options.dry_run)?.sync(raw, options.force)
}
