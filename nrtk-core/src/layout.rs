//! Output layout: where every artifact lands on disk.
//!
//! ```text
//! <app_dir>/
//!   meta.json                  current metadata record
//!   sync.lock                  held while a sync runs
//!   templates/                 optional user template overrides
//!   snapshot/
//!     meta.<checksum>.json     superseded metadata records
//!   www/
//!     <anchor><extension>      one file per story
//!     error<extension>
//!     sitemap.xml
//! ```
//!
//! All helpers are pure: no I/O.

use std::path::{Path, PathBuf};

pub const DEFAULT_APP_DIR: &str = ".nrtk";
pub const DEFAULT_EXTENSION: &str = ".html";
pub const CONTENT_DIR: &str = "www";
pub const SNAPSHOT_DIR: &str = "snapshot";
pub const META_FILE: &str = "meta.json";
pub const LOCK_FILE: &str = "sync.lock";
pub const TEMPLATE_DIR: &str = "templates";
pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ERROR_PAGE_STEM: &str = "error";

/// Resolved output locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub app_dir: PathBuf,
    pub content_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    pub meta_path: PathBuf,
    /// Appended verbatim to story anchors, e.g. `.html`.
    pub extension: String,
}

impl Layout {
    /// Default layout rooted at `app_dir`.
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        let app_dir = app_dir.into();
        Self {
            content_dir: app_dir.join(CONTENT_DIR),
            snapshot_dir: app_dir.join(SNAPSHOT_DIR),
            meta_path: app_dir.join(META_FILE),
            extension: DEFAULT_EXTENSION.to_string(),
            app_dir,
        }
    }

    /// `<content_dir>/<stem><extension>`
    pub fn content_path(&self, stem: &str) -> PathBuf {
        self.content_dir.join(format!("{stem}{}", self.extension))
    }

    /// `<content_dir>/error<extension>`
    pub fn error_page_path(&self) -> PathBuf {
        self.content_path(ERROR_PAGE_STEM)
    }

    /// `<content_dir>/sitemap.xml`
    pub fn sitemap_path(&self) -> PathBuf {
        self.content_dir.join(SITEMAP_FILE)
    }

    /// `<snapshot_dir>/meta.<checksum>.json`
    pub fn snapshot_path(&self, checksum: &str) -> PathBuf {
        self.snapshot_dir.join(format!("meta.{checksum}.json"))
    }

    /// `<app_dir>/sync.lock`
    pub fn lock_path(&self) -> PathBuf {
        self.app_dir.join(LOCK_FILE)
    }

    /// `<app_dir>/templates`
    pub fn template_dir(&self) -> PathBuf {
        self.app_dir.join(TEMPLATE_DIR)
    }

    /// Directories that must exist before anything is published.
    pub fn required_dirs(&self) -> Vec<&Path> {
        let mut dirs = vec![self.content_dir.as_path(), self.snapshot_dir.as_path()];
        if let Some(parent) = self.meta_path.parent() {
            if !parent.as_os_str().is_empty() {
                dirs.push(parent);
            }
        }
        dirs
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(DEFAULT_APP_DIR)
    }
}
