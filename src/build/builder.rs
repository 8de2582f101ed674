use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigError};

use super::assets::{AssetError, ResolvedAssets};
use super::document::{Document, parse_front_matter};
use super::highlight::SyntaxHighlighter;
use super::lessons::LessonIndex;
use super::paths::{expand_glob, locate};
use super::pipeline::{Pipeline, PipelineContext, PipelineError, ProcessingDocument};
use super::render::{RenderError, Renderer, SiteContext};

/// Output name of the generated highlighting stylesheet.
const HIGHLIGHT_CSS: &str = "highlight.css";

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    /// Pages written
    pub documents: usize,
    /// Documents left out because their front matter did not parse
    pub skipped: usize,
    /// Lessons placed in the index
    pub lessons: usize,
    /// Stylesheets, scripts and static files copied
    pub assets: usize,
}

pub struct Builder {
    config: Config,
    /// Base path for resolving relative paths (typically the config file's directory)
    base_path: PathBuf,
    dev_mode: bool,
    live_reload: bool,
}

impl Builder {
    pub fn new(config: Config, base_path: PathBuf) -> Self {
        Self {
            config,
            base_path,
            dev_mode: false,
            live_reload: false,
        }
    }

    /// Mark the build as a development build (`site.dev` / `build.dev`).
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Expose the live reload flag to templates. Only takes effect in dev mode.
    pub fn with_live_reload(mut self, live_reload: bool) -> Self {
        self.live_reload = live_reload;
        self
    }

    pub fn build(&self) -> Result<BuildResult, BuildError> {
        // 1. Load templates and resolve assets (config errors stop here)
        // 2. Read and parse every content file
        // 3. Index lessons (complete before anything renders)
        // 4. Copy assets, run each document through the pipeline

        let content_dir = self.config.content_dir(&self.base_path);
        if !content_dir.is_dir() {
            return Err(ConfigError::ContentDirNotFound(content_dir).into());
        }

        let mut renderer = Renderer::from_globs(&self.base_path, &self.config.templates)?;
        let assets = ResolvedAssets::resolve(&self.config.assets, &self.base_path)?;

        let (documents, skipped) = self.load_documents(&content_dir)?;
        tracing::info!(
            documents = documents.len(),
            skipped,
            dir = %content_dir.display(),
            "Loaded content"
        );

        let lessons = LessonIndex::build(&documents, &self.config.lessons);
        tracing::info!(
            lessons = lessons.count(),
            positions = lessons.len(),
            "Indexed lessons"
        );

        let output_dir = self.config.output_dir(&self.base_path);
        std::fs::create_dir_all(&output_dir)?;
        let copied = assets.copy_to(&output_dir)?;

        let highlighter = SyntaxHighlighter::new(&self.config.highlight.theme);
        let highlight_css = match highlighter.generate_css() {
            Some(css) => {
                std::fs::write(output_dir.join(HIGHLIGHT_CSS), css)?;
                Some(HIGHLIGHT_CSS.to_string())
            }
            None => {
                tracing::warn!(
                    theme = %self.config.highlight.theme,
                    "Unknown highlight theme, no stylesheet generated"
                );
                None
            }
        };

        let site = SiteContext {
            name: self.config.site.name.clone(),
            url: self.config.site.url.clone(),
            dev: self.dev_mode,
            css_paths: assets.css_paths(),
            js_paths: assets.js_paths(),
            highlight_css,
        };

        let mut docs: Vec<ProcessingDocument> =
            documents.into_iter().map(ProcessingDocument::new).collect();

        let mut ctx = PipelineContext::new(
            &output_dir,
            &site,
            &self.config.markdown,
            &lessons,
            &highlighter,
            &mut renderer,
            self.dev_mode,
            self.live_reload,
        );
        Pipeline::default_pipeline().run(&mut docs, &mut ctx)?;

        tracing::info!(
            pages = docs.len(),
            output = %output_dir.display(),
            "Wrote pages"
        );

        Ok(BuildResult {
            output_dir,
            documents: docs.len(),
            skipped,
            lessons: lessons.count(),
            assets: copied,
        })
    }

    /// Read every file matched by the content glob.
    ///
    /// Files whose front matter fails to parse are logged and skipped. Returns
    /// the parsed documents and the number skipped.
    fn load_documents(&self, content_dir: &Path) -> Result<(Vec<Document>, usize), BuildError> {
        let paths = expand_glob(content_dir, &self.config.content.pattern)?;

        let mut documents = Vec::with_capacity(paths.len());
        let mut skipped = 0;

        for path in paths {
            let raw = std::fs::read_to_string(&path).map_err(|source| BuildError::Read {
                path: path.clone(),
                source,
            })?;

            let parsed = match parse_front_matter(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "Skipping document with malformed front matter"
                    );
                    skipped += 1;
                    continue;
                }
            };

            let location = locate(&path, content_dir, parsed.front_matter.is_404)?;
            tracing::debug!(url = %location.url, slug = %location.slug, "Parsed document");

            documents.push(Document {
                source_path: path,
                slug: location.slug,
                url: location.url,
                root_path: location.root_path,
                front_matter: parsed.front_matter,
                body: parsed.content,
            });
        }

        Ok((documents, skipped))
    }
}
