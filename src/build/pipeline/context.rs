//! Pipeline context for sharing state across stages.

use std::path::Path;

use crate::build::highlight::SyntaxHighlighter;
use crate::build::lessons::LessonIndex;
use crate::build::render::{BuildInfo, Renderer, SiteContext};
use crate::config::MarkdownConfig;

/// Shared context for pipeline stages.
///
/// The lesson index is complete before a context can be created, so every
/// page renders against the full curriculum regardless of processing order.
pub struct PipelineContext<'a> {
    /// Directory where output files are written
    pub output_dir: &'a Path,

    /// Site metadata and asset lists
    pub site: &'a SiteContext,

    pub markdown_config: &'a MarkdownConfig,

    /// Every lesson in curriculum order
    pub lessons: &'a LessonIndex,

    pub highlighter: &'a SyntaxHighlighter,

    /// Template renderer (mutable because each page is a temporary template)
    pub renderer: &'a mut Renderer,

    pub build: BuildInfo,
}

impl<'a> PipelineContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        output_dir: &'a Path,
        site: &'a SiteContext,
        markdown_config: &'a MarkdownConfig,
        lessons: &'a LessonIndex,
        highlighter: &'a SyntaxHighlighter,
        renderer: &'a mut Renderer,
        dev_mode: bool,
        live_reload: bool,
    ) -> Self {
        Self {
            output_dir,
            site,
            markdown_config,
            lessons,
            highlighter,
            renderer,
            build: BuildInfo {
                dev: dev_mode,
                live_reload: dev_mode && live_reload,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}
