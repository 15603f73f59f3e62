//! Domain types for the content feed and the metadata record.
//!
//! Field names follow the feed's JSON shape. Every field defaults when absent;
//! malformed JSON is still a hard parse error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anchor that marks the landing page of a site.
pub const LANDING_ANCHOR: &str = "index";

// ---------------------------------------------------------------------------
// Feed payload
// ---------------------------------------------------------------------------

/// A single story as delivered by the feed.
///
/// One story maps to exactly one output file, named from its `anchor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContentItem {
    pub uid: String,
    pub anchor: String,
    pub canonical_url: String,
    pub title: String,
    pub credits: String,
    pub content: String,
    pub story_date: String,
    pub is_landing: bool,
    pub updated_at: String,
    pub url: String,
    /// Opaque per-story hash supplied by the feed. Never recomputed here.
    pub hash: String,
}

impl ContentItem {
    /// Whether this story is the site's landing page (anchor `index`).
    pub fn is_landing_anchor(&self) -> bool {
        self.anchor == LANDING_ANCHOR
    }
}

/// The whole feed, received once per sync attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Payload {
    pub title: String,
    pub entity: String,
    pub locale: String,
    pub site_name: String,
    pub logo_url: String,
    pub homepage_url: String,
    pub stories: Vec<ContentItem>,
    pub error_page: String,
}

impl Payload {
    /// Parse raw feed bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }
}

// ---------------------------------------------------------------------------
// Metadata record
// ---------------------------------------------------------------------------

/// Site metadata stamped with the checksum of the payload it came from.
///
/// The *current* record lives at the configured metadata path; superseded
/// records are archived under `meta.<checksum>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub homepage_url: String,
    #[serde(default)]
    pub stories: Vec<ContentItem>,
    pub checksum: String,
    pub updated_at: DateTime<Utc>,
}

impl MetadataRecord {
    /// Build the record for `payload`, stamped with `checksum` computed at `updated_at`.
    pub fn from_payload(payload: &Payload, checksum: String, updated_at: DateTime<Utc>) -> Self {
        Self {
            title: payload.title.clone(),
            entity: payload.entity.clone(),
            homepage_url: payload.homepage_url.clone(),
            stories: payload.stories.clone(),
            checksum,
            updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_parses_full_feed() {
        let raw = br#"{
            "title": "Daily",
            "entity": "Acme",
            "locale": "en",
            "site_name": "acme",
            "logo_url": "https://acme.test/logo.png",
            "homepage_url": "https://acme.test/",
            "error_page": "<h1>oops</h1>",
            "stories": [{
                "uid": "s1",
                "anchor": "index",
                "canonical_url": "https://acme.test/",
                "title": "Home",
                "credits": "staff",
                "content": "<p>hi</p>",
                "story_date": "2024-01-01",
                "updated_at": "2024-01-02T03:04:05.678Z",
                "url": "https://cms.acme.test/s1",
                "hash": "abc",
                "is_landing": true
            }]
        }"#;
        let payload = Payload::from_slice(raw).expect("parse");
        assert_eq!(payload.site_name, "acme");
        assert_eq!(payload.stories.len(), 1);
        assert!(payload.stories[0].is_landing);
        assert!(payload.stories[0].is_landing_anchor());
        assert_eq!(payload.error_page, "<h1>oops</h1>");
    }

    #[test]
    fn missing_fields_default() {
        let payload = Payload::from_slice(br#"{"title": "t"}"#).expect("parse");
        assert_eq!(payload.title, "t");
        assert!(payload.stories.is_empty());
        assert_eq!(payload.error_page, "");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Payload::from_slice(b"{\"title\": ").is_err());
        assert!(Payload::from_slice(br#"{"stories": "nope"}"#).is_err());
    }

    #[test]
    fn record_copies_site_fields() {
        let payload = Payload {
            title: "T".into(),
            entity: "E".into(),
            homepage_url: "https://h".into(),
            stories: vec![ContentItem {
                anchor: "a".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let now = Utc::now();
        let record = MetadataRecord::from_payload(&payload, "ff".into(), now);
        assert_eq!(record.title, "T");
        assert_eq!(record.entity, "E");
        assert_eq!(record.homepage_url, "https://h");
        assert_eq!(record.stories, payload.stories);
        assert_eq!(record.checksum, "ff");
        assert_eq!(record.updated_at, now);
    }
}
