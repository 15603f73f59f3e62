//! Sitemap context — serializable rendering payload built from feed stories.

use serde::{Deserialize, Serialize};

use nrtk_core::types::ContentItem;

use crate::error::RenderError;

/// Priority of the landing page entry.
pub const LANDING_PRIORITY: &str = "1.0";
/// Priority of every other entry.
pub const DEFAULT_PRIORITY: &str = "0.8";

/// Length of `YYYY-MM-DDTHH:MM:SS`.
const SECOND_PRECISION_LEN: usize = 19;
const UTC_SUFFIX: &str = "+00:00";

/// Rendering payload for `sitemap.xml.tera`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapContext {
    pub generator_version: String,
    /// One entry per story, in feed order.
    pub entries: Vec<SitemapEntry>,
}

/// A single `<url>` element. Values are already XML-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub priority: String,
}

impl SitemapEntry {
    pub fn from_item(item: &ContentItem) -> Self {
        let priority = if item.is_landing_anchor() {
            LANDING_PRIORITY
        } else {
            DEFAULT_PRIORITY
        };
        Self {
            loc: xml_escape(&item.canonical_url),
            lastmod: xml_escape(&lastmod(&item.updated_at)),
            priority: priority.to_string(),
        }
    }
}

impl SitemapContext {
    /// Build the context from stories. Order is kept; nothing is dropped or deduplicated.
    pub fn from_items(items: &[ContentItem]) -> Self {
        Self {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            entries: items.iter().map(SitemapEntry::from_item).collect(),
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// Truncate a feed timestamp to whole seconds and pin it to UTC.
///
/// `2024-01-02T03:04:05.678Z` becomes `2024-01-02T03:04:05+00:00`. The prefix
/// is taken verbatim; shorter inputs are used whole.
pub fn lastmod(updated_at: &str) -> String {
    let cut = updated_at
        .char_indices()
        .nth(SECOND_PRECISION_LEN)
        .map(|(idx, _)| idx)
        .unwrap_or(updated_at.len());
    format!("{}{UTC_SUFFIX}", &updated_at[..cut])
}

fn xml_escape(raw: &str) -> String {
    quick_xml::escape::escape(raw).into_owned()
}
