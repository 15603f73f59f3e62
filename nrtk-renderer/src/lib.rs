//! # nrtk-renderer
//!
//! Tera-based generator for derived documents, currently the sitemap.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nrtk_core::types::ContentItem;
//! use nrtk_renderer::generate_sitemap;
//!
//! fn sitemap_for(stories: &[ContentItem]) {
//!     if let Ok(xml) = generate_sitemap(stories) {
//!         println!("{} bytes", xml.len());
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{SitemapContext, SitemapEntry};
pub use engine::{generate_sitemap, Renderer, TemplateEngine, SITEMAP_TEMPLATE};
pub use error::RenderError;
