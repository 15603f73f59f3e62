//! nrtk core library — feed types, output layout, settings, errors.
//!
//! - [`types`] — [`Payload`], [`ContentItem`], [`MetadataRecord`]
//! - [`layout`] — [`Layout`], pure path helpers
//! - [`config`] — [`Settings`] loaded from YAML + environment
//! - [`error`] — [`CoreError`]

pub mod config;
pub mod error;
pub mod layout;
pub mod types;

pub use config::{FeedSource, Settings};
pub use error::CoreError;
pub use layout::Layout;
pub use types::{ContentItem, MetadataRecord, Payload, LANDING_ANCHOR};
