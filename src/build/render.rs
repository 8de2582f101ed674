use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use crate::config::ConfigError;

use super::document::Document;
use super::layout::CONTENT_BLOCK;
use super::lessons::{LessonIndex, LessonNeighbors};
use super::paths::expand_glob;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("templates {first} and {second} both register the name '{name}'")]
    DuplicateTemplate {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("layout '{layout}' used by '{url}' does not match any template")]
    LayoutNotFound { layout: String, url: String },

    #[error("layout '{layout}' used by '{url}' never defines a '{block}' block")]
    MissingContentBlock {
        layout: String,
        url: String,
        block: &'static str,
    },

    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Name under which each page is registered while it renders.
const PAGE_TEMPLATE: &str = "__page__";

/// The template renderer, wrapping Tera.
///
/// Layouts and partials are registered under their file name without
/// extension, so `layouts/lesson.html` is extended as `"lesson"` and
/// `partials/nav.html` is included as `"nav"`.
pub struct Renderer {
    tera: Tera,
    /// Registered template name -> file it came from
    sources: HashMap<String, PathBuf>,
}

impl Renderer {
    /// Load every template matched by `patterns` (relative to `base_path`).
    ///
    /// Each pattern must match at least one file. Two files with the same
    /// basename are rejected.
    pub fn from_globs(base_path: &Path, patterns: &[String]) -> Result<Self, RenderError> {
        let mut files = Vec::new();
        for pattern in patterns {
            for path in expand_glob(base_path, pattern)? {
                let content = std::fs::read_to_string(&path).map_err(|source| {
                    RenderError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                files.push((path, content));
            }
        }

        Self::from_templates(files)
    }

    /// Register templates from `(path, content)` pairs.
    pub fn from_templates(
        files: impl IntoIterator<Item = (PathBuf, String)>,
    ) -> Result<Self, RenderError> {
        let mut sources: HashMap<String, PathBuf> = HashMap::new();
        let mut templates = Vec::new();

        for (path, content) in files {
            let name = template_name(&path);
            if let Some(first) = sources.get(&name) {
                // The same file reached through two overlapping globs is fine
                if *first == path {
                    continue;
                }
                return Err(RenderError::DuplicateTemplate {
                    name,
                    first: first.clone(),
                    second: path,
                });
            }
            sources.insert(name.clone(), path);
            templates.push((name, content));
        }

        let mut tera = Tera::default();
        // Names carry no extension, so enable escaping for every template
        tera.autoescape_on(vec![""]);
        tera.add_raw_templates(templates)?;

        tracing::debug!(count = sources.len(), "Loaded templates");

        Ok(Self { tera, sources })
    }

    /// Whether a layout or partial with this name was loaded.
    pub fn has_template(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Whether `layout`, or a template it extends, defines the content block.
    fn defines_content_block(&self, layout: &str) -> bool {
        let Some(template) = self.tera.templates.get(layout) else {
            return false;
        };
        std::iter::once(template)
            .chain(
                template
                    .parents
                    .iter()
                    .filter_map(|parent| self.tera.templates.get(parent)),
            )
            .any(|template| template.blocks.contains_key(CONTENT_BLOCK))
    }

    /// The file a template name was loaded from.
    pub fn template_path(&self, name: &str) -> Option<&Path> {
        self.sources.get(name).map(PathBuf::as_path)
    }

    /// Render a page whose content has already been wrapped in its layout.
    ///
    /// The wrapped content is added as a temporary template so it can extend
    /// the layout and include partials like any other template.
    pub fn render_page(
        &mut self,
        wrapped: &str,
        layout: &str,
        context: &PageContext,
    ) -> Result<String, RenderError> {
        if !self.has_template(layout) {
            return Err(RenderError::LayoutNotFound {
                layout: layout.to_string(),
                url: context.page.url.clone(),
            });
        }

        // Without the block the page body would be dropped silently
        if !self.defines_content_block(layout) {
            return Err(RenderError::MissingContentBlock {
                layout: layout.to_string(),
                url: context.page.url.clone(),
                block: CONTENT_BLOCK,
            });
        }

        let mut tera_context = Context::new();
        tera_context.insert("site", context.site);
        tera_context.insert("page", &context.page);
        tera_context.insert("lessons", context.lessons);
        tera_context.insert("lesson", &context.lesson);
        tera_context.insert("toc", context.toc);
        tera_context.insert("root_path", &context.page.root_path);
        tera_context.insert("build", context.build);

        self.tera.add_raw_template(PAGE_TEMPLATE, wrapped)?;
        let result = self.tera.render(PAGE_TEMPLATE, &tera_context);

        // Clean up the temporary template
        self.tera.templates.remove(PAGE_TEMPLATE);

        result.map_err(|e| {
            tracing::debug!(
                url = %context.page.url,
                layout,
                path = ?self.template_path(layout),
                "Page failed to render"
            );
            e.into()
        })
    }
}

/// A template's registered name: its file name without extension.
fn template_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Context passed to page templates.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub site: &'a SiteContext,
    pub page: PageInfo,
    /// Every indexed lesson, in curriculum order
    pub lessons: &'a LessonIndex,
    /// Previous/next lessons when the page is itself a lesson
    pub lesson: LessonNeighbors<'a>,
    /// Table of contents for the current page
    pub toc: &'a [TocEntry],
    pub build: &'a BuildInfo,
}

/// Site-level information.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteContext {
    pub name: String,
    pub url: Option<String>,
    /// True for dev builds (watch mode)
    pub dev: bool,
    /// Stylesheets, relative to the output directory, in link order
    pub css_paths: Vec<String>,
    /// Scripts, relative to the output directory, in load order
    pub js_paths: Vec<String>,
    /// Generated syntax highlighting stylesheet, if the theme exists
    pub highlight_css: Option<String>,
}

/// Build/tool information available as `build.*`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub dev: bool,
    pub live_reload: bool,
    pub version: String,
}

/// Information about a page, available as `page.*` (and as lesson entries).
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub root_path: String,
    pub layout: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "is404")]
    pub is_404: bool,
    /// Custom front matter fields (flattened to top level, e.g., `page.author`)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl PageInfo {
    /// Front matter augmented with the document's derived identifiers.
    pub fn from_document(doc: &Document) -> Self {
        let mut extra = doc.front_matter.extra.clone();
        // Derived values take precedence over same-named front matter keys
        for key in ["slug", "url", "root_path"] {
            extra.remove(key);
        }

        Self {
            title: doc.title(),
            slug: doc.slug.clone(),
            url: doc.url.clone(),
            root_path: doc.root_path.clone(),
            layout: doc.front_matter.layout.clone(),
            description: doc.front_matter.description.clone(),
            is_404: doc.front_matter.is_404,
            extra,
        }
    }
}

/// A table of contents entry for the current page.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    /// The heading text
    pub text: String,
    /// The heading id (for anchor links)
    pub id: String,
    /// The heading level (1-6)
    pub level: u8,
}
