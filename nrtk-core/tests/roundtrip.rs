//! JSON roundtrip tests for the persisted metadata record.
//!
//! Cases are in-memory; the filesystem round trip is covered by nrtk-sync.

use chrono::{TimeZone, Utc};
use nrtk_core::types::{ContentItem, MetadataRecord, Payload};
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn story(anchor: &str) -> ContentItem {
    ContentItem {
        uid: format!("uid-{anchor}"),
        anchor: anchor.to_string(),
        canonical_url: format!("https://site.test/{anchor}"),
        title: format!("Title {anchor}"),
        content: format!("<article>{anchor}</article>"),
        updated_at: "2024-05-06T07:08:09.123456Z".to_string(),
        ..Default::default()
    }
}

fn minimal_record() -> MetadataRecord {
    MetadataRecord {
        title: String::new(),
        entity: String::new(),
        homepage_url: String::new(),
        stories: vec![],
        checksum: "0".repeat(64),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn full_record() -> MetadataRecord {
    MetadataRecord {
        title: "Daily".to_string(),
        entity: "Acme".to_string(),
        homepage_url: "https://site.test/".to_string(),
        stories: vec![story("index"), story("b"), story("c")],
        checksum: "ab".repeat(32),
        updated_at: Utc::now(),
    }
}

fn unicode_record() -> MetadataRecord {
    MetadataRecord {
        title: "Новости — 日本語 & <html>".to_string(),
        entity: "Ωmega \"quoted\"".to_string(),
        homepage_url: "https://site.test/ü".to_string(),
        stories: vec![ContentItem {
            content: "emoji 🚀 and tabs\t\n".to_string(),
            ..story("ünï")
        }],
        checksum: "cd".repeat(32),
        updated_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Parameterised roundtrip test
// ---------------------------------------------------------------------------

#[rstest]
#[case("minimal", minimal_record())]
#[case("all_fields", full_record())]
#[case("unicode_strings", unicode_record())]
fn metadata_roundtrip(#[case] label: &str, #[case] record: MetadataRecord) {
    let json = serde_json::to_string_pretty(&record)
        .unwrap_or_else(|e| panic!("[{label}] serialize failed: {e}"));
    let back: MetadataRecord = serde_json::from_str(&json)
        .unwrap_or_else(|e| panic!("[{label}] deserialize failed: {e}"));
    assert_eq!(record.checksum, back.checksum, "[{label}] checksum");
    assert_eq!(record.title, back.title, "[{label}] title");
    assert_eq!(record.entity, back.entity, "[{label}] entity");
    assert_eq!(record.homepage_url, back.homepage_url, "[{label}] homepage_url");
    assert_eq!(record.stories, back.stories, "[{label}] stories");
    assert_eq!(record.updated_at, back.updated_at, "[{label}] updated_at");
}

#[test]
fn metadata_json_uses_feed_field_names() {
    let value = serde_json::to_value(full_record()).expect("serialize");
    for key in ["title", "entity", "homepage_url", "stories", "checksum", "updated_at"] {
        assert!(value.get(key).is_some(), "missing key {key}");
    }
    let first = &value["stories"][0];
    for key in [
        "uid",
        "anchor",
        "canonical_url",
        "title",
        "credits",
        "content",
        "story_date",
        "is_landing",
        "updated_at",
        "url",
        "hash",
    ] {
        assert!(first.get(key).is_some(), "missing story key {key}");
    }
}

#[test]
fn metadata_without_checksum_is_rejected() {
    let err = serde_json::from_str::<MetadataRecord>(r#"{"title": "x"}"#);
    assert!(err.is_err());
}

#[test]
fn payload_preserves_story_order() {
    let raw = r#"{"stories": [{"anchor": "c"}, {"anchor": "a"}, {"anchor": "b"}]}"#;
    let payload = Payload::from_slice(raw.as_bytes()).expect("parse");
    let anchors: Vec<_> = payload.stories.iter().map(|s| s.anchor.as_str()).collect();
    assert_eq!(anchors, ["c", "a", "b"]);
}
