//! Dry-run unified diff support for `nrtk-sync diff`.
//!
//! Compares what a publish would write for every content artifact (stories,
//! error page, sitemap) with what is on disk. Metadata is left out: its
//! timestamp differs on every run.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use nrtk_core::{types::Payload, Layout};
use nrtk_renderer::Renderer;

use crate::entity::{ErrorPage, Publishable, Sitemap};
use crate::error::{io_err, SyncError};

/// A single artifact diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diff every content artifact of `raw` against the output tree. No files are written.
pub fn diff_payload(raw: &[u8], layout: &Layout) -> Result<Vec<FileDiff>, SyncError> {
    let payload = Payload::from_slice(raw).map_err(SyncError::Parse)?;
    let renderer = Renderer::with_user_templates(&layout.template_dir())?;
    let sitemap = Sitemap {
        xml: renderer.render_sitemap(&payload.stories)?,
    };
    let error_page = ErrorPage::new(&payload.error_page);

    let mut entities: Vec<&dyn Publishable> = payload
        .stories
        .iter()
        .map(|s| s as &dyn Publishable)
        .collect();
    entities.push(&error_page);
    entities.push(&sitemap);

    let mut diffs = Vec::new();
    for entity in entities {
        // Same rule as a publish: an unusable anchor affects only its own story.
        if let Err(err) = entity.validate() {
            tracing::warn!("skipping {} in diff: {err}", entity.kind());
            continue;
        }
        let path = entity.output_path(layout);
        let rendered = String::from_utf8_lossy(&entity.content()?).into_owned();
        let existing = read_existing_or_empty(&path)?;
        if existing == rendered {
            continue;
        }

        let relative = path
            .strip_prefix(&layout.content_dir)
            .unwrap_or(path.as_path());
        let old_header = format!("a/{}", relative.display());
        let new_header = format!("b/{}", relative.display());
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path,
            unified_diff: unified,
        });
    }
    Ok(diffs)
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read(path) {
        Ok(content) => Ok(String::from_utf8_lossy(&content).into_owned()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}
