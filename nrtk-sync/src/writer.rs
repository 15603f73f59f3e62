//! Publisher: writes any [`Publishable`] to its resolved path.
//!
//! ## `publish` protocol
//!
//! 1. Validate the entity.
//! 2. Resolve its output path against the [`Layout`].
//! 3. Render its bytes.
//! 4. Write to `<path>.nrtk.tmp`.
//! 5. Rename to the final path (atomic replace on POSIX).
//!
//! Parent directories are never created here; a missing parent is an error
//! for that entity alone. No retries, no rollback of other entities.

use std::path::{Path, PathBuf};

use nrtk_core::Layout;

use crate::entity::{ArtifactKind, Publishable};
use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written.
    Written { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// A publish that failed; the remaining entities were still attempted.
#[derive(Debug)]
pub struct PublishFailure {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub error: SyncError,
}

/// Results of publishing a batch of entities.
#[derive(Debug, Default)]
pub struct PublishBatch {
    pub writes: Vec<WriteResult>,
    pub failures: Vec<PublishFailure>,
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Writes entities under a fixed [`Layout`].
#[derive(Debug, Clone)]
pub struct Publisher {
    layout: Layout,
    dry_run: bool,
}

impl Publisher {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            dry_run: false,
        }
    }

    /// Report what would be written without touching the filesystem.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Resolved output path of `entity`.
    pub fn resolve(&self, entity: &dyn Publishable) -> PathBuf {
        entity.output_path(&self.layout)
    }

    /// Write a single entity, overwriting whatever is at its path.
    pub fn publish(&self, entity: &dyn Publishable) -> Result<WriteResult, SyncError> {
        entity.validate()?;
        let path = self.resolve(entity);
        let content = entity.content()?;

        if self.dry_run {
            tracing::info!("[dry-run] would write: {}", path.display());
            return Ok(WriteResult::WouldWrite { path });
        }

        let tmp = tmp_path(&path);
        atomic_write_with_tmp(&path, &content, &tmp)?;
        tracing::info!("wrote: {}", path.display());
        Ok(WriteResult::Written { path })
    }

    /// Publish every entity, collecting failures instead of stopping at the first.
    pub fn publish_all<'a, I>(&self, entities: I) -> PublishBatch
    where
        I: IntoIterator<Item = &'a dyn Publishable>,
    {
        let mut batch = PublishBatch::default();
        for entity in entities {
            match self.publish(entity) {
                Ok(result) => batch.writes.push(result),
                Err(error) => {
                    let path = self.resolve(entity);
                    tracing::error!("failed to publish {} {}: {error}", entity.kind(), path.display());
                    batch.failures.push(PublishFailure {
                        kind: entity.kind(),
                        path,
                        error,
                    });
                }
            }
        }
        batch
    }
}

// ---------------------------------------------------------------------------
// atomic write
// ---------------------------------------------------------------------------

fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.nrtk.tmp", path.display()))
}

fn atomic_write_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), SyncError> {
    if let Err(e) = std::fs::write(tmp, content) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ErrorPage, Sitemap};
    use nrtk_core::types::ContentItem;
    use std::fs;
    use tempfile::TempDir;

    fn layout_in(tmp: &TempDir) -> Layout {
        let layout = Layout::new(tmp.path());
        fs::create_dir_all(&layout.content_dir).unwrap();
        layout
    }

    fn story(anchor: &str, body: &str) -> ContentItem {
        ContentItem {
            uid: anchor.into(),
            anchor: anchor.into(),
            content: body.into(),
            ..Default::default()
        }
    }

    #[test]
    fn publish_writes_content_verbatim() {
        let tmp = TempDir::new().unwrap();
        let publisher = Publisher::new(layout_in(&tmp));
        let result = publisher.publish(&story("about", "<p>hi</p>")).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(result.path()).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn publish_overwrites_longer_existing_file() {
        let tmp = TempDir::new().unwrap();
        let publisher = Publisher::new(layout_in(&tmp));
        let path = publisher.resolve(&ErrorPage::new(""));
        fs::write(&path, "a much longer previous error page").unwrap();
        publisher.publish(&ErrorPage::new("short")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let publisher = Publisher::new(layout_in(&tmp));
        let result = publisher.publish(&Sitemap { xml: "<x/>".into() }).unwrap();
        assert!(!tmp_path(result.path()).exists(), ".nrtk.tmp must be cleaned up");
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let publisher = Publisher::new(layout_in(&tmp)).with_dry_run(true);
        let result = publisher.publish(&story("nope", "content")).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!result.path().exists(), "dry-run must not create files");
    }

    #[test]
    fn missing_parent_is_an_error_tagged_with_path() {
        let tmp = TempDir::new().unwrap();
        let publisher = Publisher::new(Layout::new(tmp.path().join("absent")));
        let err = publisher.publish(&story("a", "x")).unwrap_err();
        match err {
            SyncError::Io { path, .. } => assert!(path.ends_with("www/a.html")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn rename_onto_directory_fails_and_cleans_tmp() {
        let tmp = TempDir::new().unwrap();
        let layout = layout_in(&tmp);
        let blocked = layout.content_path("blocked");
        fs::create_dir_all(&blocked).unwrap();

        let publisher = Publisher::new(layout);
        let err = publisher.publish(&story("blocked", "x")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
        assert!(blocked.is_dir(), "directory must be left alone");
        assert!(!tmp_path(&blocked).exists(), ".nrtk.tmp should be cleaned up");
    }

    #[test]
    fn publish_all_continues_past_failures() {
        let tmp = TempDir::new().unwrap();
        let layout = layout_in(&tmp);
        fs::create_dir_all(layout.content_path("b")).unwrap();
        let publisher = Publisher::new(layout);

        let a = story("a", "A");
        let b = story("b", "B");
        let c = story("c", "C");
        let bad = story("../c", "escape");
        let entities: Vec<&dyn Publishable> = vec![&a, &b, &bad, &c];
        let batch = publisher.publish_all(entities);

        assert_eq!(batch.writes.len(), 2);
        assert_eq!(batch.failures.len(), 2);
        assert!(batch.failures.iter().all(|f| f.kind == ArtifactKind::Story));
        assert!(matches!(batch.failures[1].error, SyncError::InvalidAnchor { .. }));
        assert_eq!(
            fs::read_to_string(publisher.layout().content_path("c")).unwrap(),
            "C"
        );
    }
}
