//! The [`Publishable`] capability and every artifact type that implements it.
//!
//! | Entity                 | Output path                               | Content              |
//! |------------------------|-------------------------------------------|----------------------|
//! | [`ContentItem`]        | `<content_dir>/<anchor><extension>`       | `content` verbatim   |
//! | [`ErrorPage`]          | `<content_dir>/error<extension>`          | `error_page` verbatim|
//! | [`Sitemap`]            | `<content_dir>/sitemap.xml`               | rendered XML         |
//! | [`MetadataRecord`]     | `<meta_path>`                             | pretty JSON          |
//! | [`HistoricalSnapshot`] | `<snapshot_dir>/meta.<checksum>.json`     | pretty JSON          |

use std::fmt;
use std::path::PathBuf;

use nrtk_core::{
    types::{ContentItem, MetadataRecord},
    Layout,
};

use crate::error::SyncError;

/// Which kind of artifact a [`Publishable`] is. Used for reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Story,
    ErrorPage,
    Sitemap,
    Metadata,
    Snapshot,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Story => write!(f, "story"),
            ArtifactKind::ErrorPage => write!(f, "error page"),
            ArtifactKind::Sitemap => write!(f, "sitemap"),
            ArtifactKind::Metadata => write!(f, "metadata"),
            ArtifactKind::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Anything that can be written to a single file.
///
/// Both methods are pure: the path depends only on the entity and the
/// [`Layout`], the bytes only on the entity.
pub trait Publishable {
    fn kind(&self) -> ArtifactKind;

    fn output_path(&self, layout: &Layout) -> PathBuf;

    fn content(&self) -> Result<Vec<u8>, SyncError>;

    /// Reject entities whose fields cannot produce a safe path.
    fn validate(&self) -> Result<(), SyncError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stories
// ---------------------------------------------------------------------------

impl Publishable for ContentItem {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Story
    }

    fn output_path(&self, layout: &Layout) -> PathBuf {
        layout.content_path(&self.anchor)
    }

    fn content(&self) -> Result<Vec<u8>, SyncError> {
        Ok(self.content.as_bytes().to_vec())
    }

    fn validate(&self) -> Result<(), SyncError> {
        let anchor = self.anchor.as_str();
        let unusable = anchor.is_empty()
            || anchor == "."
            || anchor == ".."
            || anchor.contains(['/', '\\', '\0']);
        if unusable {
            return Err(SyncError::InvalidAnchor {
                uid: self.uid.clone(),
                anchor: self.anchor.clone(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error page
// ---------------------------------------------------------------------------

/// The site's error page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPage<'a> {
    pub body: &'a str,
}

impl<'a> ErrorPage<'a> {
    pub fn new(body: &'a str) -> Self {
        Self { body }
    }
}

impl Publishable for ErrorPage<'_> {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::ErrorPage
    }

    fn output_path(&self, layout: &Layout) -> PathBuf {
        layout.error_page_path()
    }

    fn content(&self) -> Result<Vec<u8>, SyncError> {
        Ok(self.body.as_bytes().to_vec())
    }
}

// ---------------------------------------------------------------------------
// Sitemap
// ---------------------------------------------------------------------------

/// A rendered sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sitemap {
    pub xml: String,
}

impl Publishable for Sitemap {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Sitemap
    }

    fn output_path(&self, layout: &Layout) -> PathBuf {
        layout.sitemap_path()
    }

    fn content(&self) -> Result<Vec<u8>, SyncError> {
        Ok(self.xml.as_bytes().to_vec())
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

impl Publishable for MetadataRecord {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Metadata
    }

    fn output_path(&self, layout: &Layout) -> PathBuf {
        layout.meta_path.clone()
    }

    fn content(&self) -> Result<Vec<u8>, SyncError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// A superseded metadata record, addressed by its own checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricalSnapshot<'a>(pub &'a MetadataRecord);

impl Publishable for HistoricalSnapshot<'_> {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Snapshot
    }

    fn output_path(&self, layout: &Layout) -> PathBuf {
        layout.snapshot_path(&self.0.checksum)
    }

    fn content(&self) -> Result<Vec<u8>, SyncError> {
        self.0.content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(checksum: &str) -> MetadataRecord {
        MetadataRecord {
            title: "T".into(),
            entity: "E".into(),
            homepage_url: "https://h".into(),
            stories: vec![],
            checksum: checksum.into(),
            updated_at: Utc::now(),
        }
    }

    fn story(anchor: &str) -> ContentItem {
        ContentItem {
            uid: "u1".into(),
            anchor: anchor.into(),
            content: "<p>body</p>".into(),
            ..Default::default()
        }
    }

    #[test]
    fn story_path_and_bytes() {
        let layout = Layout::new("/app");
        let s = story("about");
        assert_eq!(s.output_path(&layout), PathBuf::from("/app/www/about.html"));
        assert_eq!(s.content().unwrap(), b"<p>body</p>");
        assert_eq!(s.kind(), ArtifactKind::Story);
    }

    #[test]
    fn error_page_and_sitemap_paths() {
        let layout = Layout::new("/app");
        assert_eq!(
            ErrorPage::new("x").output_path(&layout),
            PathBuf::from("/app/www/error.html")
        );
        let sitemap = Sitemap { xml: "<urlset/>".into() };
        assert_eq!(
            sitemap.output_path(&layout),
            PathBuf::from("/app/www/sitemap.xml")
        );
        assert_eq!(sitemap.content().unwrap(), b"<urlset/>");
    }

    #[test]
    fn current_and_historical_paths_differ() {
        let layout = Layout::new("/app");
        let r = record("abc");
        assert_eq!(r.output_path(&layout), PathBuf::from("/app/meta.json"));
        assert_eq!(
            HistoricalSnapshot(&r).output_path(&layout),
            PathBuf::from("/app/snapshot/meta.abc.json")
        );
        assert_eq!(HistoricalSnapshot(&r).content().unwrap(), r.content().unwrap());
    }

    #[test]
    fn metadata_content_is_json_record() {
        let r = record("abc");
        let back: MetadataRecord = serde_json::from_slice(&r.content().unwrap()).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn anchors_that_escape_the_content_dir_are_rejected() {
        for bad in ["", ".", "..", "../etc/passwd", "a/b", "a\\b"] {
            assert!(
                matches!(story(bad).validate(), Err(SyncError::InvalidAnchor { .. })),
                "anchor {bad:?} should be rejected"
            );
        }
        assert!(story("index").validate().is_ok());
        assert!(story("2024-news.item").validate().is_ok());
    }
}
