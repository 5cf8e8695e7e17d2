//! Page template rendering with Tera.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tera::Tera;
use tracing::{debug, info};

const PAGE_TEMPLATE: &str = "page.html";
const DEFAULT_PAGE: &str = include_str!("../templates/page.html");

/// Rendered fragments and figures handed to the page template.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageContext {
    pub title: String,
    pub styles: String,
    pub javascript: String,
    pub keyword_search: String,
    pub facets: String,
    pub results: String,
    pub pager: String,
    pub total: u64,
}

/// Theme engine for rendering the search page.
pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Engine with the built-in page template, replaced by
    /// `template_dir/page.html` when that file exists.
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(PAGE_TEMPLATE, DEFAULT_PAGE)
            .context("failed to parse built-in page template")?;

        if let Some(dir) = template_dir {
            let path = dir.join(PAGE_TEMPLATE);
            if path.is_file() {
                tera.add_template_file(&path, Some(PAGE_TEMPLATE))
                    .with_context(|| format!("failed to load {}", path.display()))?;
                info!(path = %path.display(), "using page template override");
            } else {
                debug!(path = %path.display(), "no page template override");
            }
        }

        Ok(Self { tera })
    }

    /// Render the full search page.
    pub fn render_page(&self, page: &PageContext) -> Result<String> {
        let context =
            tera::Context::from_serialize(page).context("failed to build template context")?;
        self.tera
            .render(PAGE_TEMPLATE, &context)
            .context("failed to render page template")
    }
}
