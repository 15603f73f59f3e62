//! Tera rendering engine — [`TemplateEngine`] and [`Renderer`].
//!
//! Templates are embedded at compile time. A user template directory may
//! override any of them by name, e.g. `<app_dir>/templates/sitemap.xml.tera`.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tera::Tera;

use nrtk_core::types::ContentItem;

use crate::context::SitemapContext;
use crate::error::RenderError;

/// Template name of the sitemap document.
pub const SITEMAP_TEMPLATE: &str = "sitemap.xml.tera";

// ---------------------------------------------------------------------------
// Embedded templates, compiled in with include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[(SITEMAP_TEMPLATE, include_str!("templates/sitemap.xml.tera"))];

// ---------------------------------------------------------------------------
// User overrides
// ---------------------------------------------------------------------------

/// `*.tera` files directly inside `dir`, keyed by file name. A missing
/// directory yields nothing.
fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(io_err(dir, e)),
    };

    let mut templates = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name.to_string(), contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_string()))
        .collect();
    if let Some(dir) = user_template_dir {
        templates.extend(load_user_templates(dir)?);
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that replace the embedded
/// template of the same file name.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render the sitemap for the supplied context.
    pub fn render_sitemap(&self, ctx: &SitemapContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let rendered = self.tera.render(SITEMAP_TEMPLATE, &tera_ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renders derived documents from feed stories. Create once and reuse.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    /// Construct a new [`Renderer`] with embedded templates only.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(None)? })
    }

    /// Construct a [`Renderer`] that honours overrides in `dir`, if it exists.
    pub fn with_user_templates(dir: &Path) -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(Some(dir))? })
    }

    /// Sitemap document with one `<url>` per story, in feed order.
    pub fn render_sitemap(&self, items: &[ContentItem]) -> Result<String, RenderError> {
        self.engine.render_sitemap(&SitemapContext::from_items(items))
    }
}

/// Render a sitemap with the embedded template.
pub fn generate_sitemap(items: &[ContentItem]) -> Result<String, RenderError> {
    Renderer::new()?.render_sitemap(items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
