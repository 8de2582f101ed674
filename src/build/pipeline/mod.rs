//! Build pipeline for document processing.
//!
//! The pipeline transforms documents through a series of stages:
//! 1. Code block highlighting in the markdown source
//! 2. Markdown rendering (to HTML with TOC)
//! 3. Unlocking `html-in-md` marker comments
//! 4. Wrapping content in its layout
//! 5. Template rendering (layout, partials, lesson index)
//! 6. Code block highlighting in the rendered page
//! 7. File writing (output to disk)

mod context;
mod document;
mod error;
mod stages;

pub use context::PipelineContext;
pub use document::ProcessingDocument;
pub use error::PipelineError;

use crate::build::highlight::CodeBlockPass;
use stages::{HighlightStage, HtmlInMdStage, LayoutStage, MarkdownStage, TemplateStage, WriteStage};

/// A stage in the document processing pipeline.
///
/// Stages transform documents sequentially. Each stage receives all documents
/// and can modify them in place before passing to the next stage.
pub trait Stage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    /// Process documents through this stage.
    ///
    /// Documents are passed by mutable reference so stages can transform
    /// their content in place. The `ctx` provides access to shared resources
    /// like the renderer and highlighter.
    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// The document processing pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Create the default pipeline with standard stages.
    ///
    /// Stages: highlight-source → markdown → html-in-md → layout → template
    /// → highlight-rendered → write
    pub fn default_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(HighlightStage::new(CodeBlockPass::Source));
        pipeline.add_stage(MarkdownStage);
        pipeline.add_stage(HtmlInMdStage);
        pipeline.add_stage(LayoutStage);
        pipeline.add_stage(TemplateStage);
        pipeline.add_stage(HighlightStage::new(CodeBlockPass::Rendered));
        pipeline.add_stage(WriteStage);
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run the pipeline on a set of documents.
    pub fn run(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for stage in &self.stages {
            tracing::debug!(stage = stage.name(), documents = docs.len(), "Running stage");
            stage.process(docs, ctx)?;
        }
        Ok(())
    }

    /// Get the names of all stages in order.
    #[cfg(test)]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;

    use crate::build::document::{Document, FrontMatter};
    use crate::build::highlight::SyntaxHighlighter;
    use crate::build::lessons::LessonIndex;
    use crate::build::render::{Renderer, SiteContext};
    use crate::config::{LessonsConfig, MarkdownConfig};

    fn document(url: &str, layout: &str, body: &str) -> Document {
        let slug = url.rsplit('/').next().unwrap_or(url).to_string();
        Document {
            source_path: PathBuf::from(format!("/site/content/{url}.md")),
            slug,
            url: url.to_string(),
            root_path: crate::build::paths::root_path_for(url),
            front_matter: FrontMatter {
                layout: Some(layout.to_string()),
                ..FrontMatter::default()
            },
            body: body.to_string(),
        }
    }

    fn renderer() -> Renderer {
        Renderer::from_templates([
            (
                PathBuf::from("layouts/base.html"),
                "<html>{% block main %}{% endblock main %}</html>".to_string(),
            ),
            (
                PathBuf::from("layouts/lesson.html"),
                concat!(
                    "<article>{{ page.title }}|{% block main %}{% endblock main %}",
                    "{% if lesson.next %}|next:{{ lesson.next.slug }}{% endif %}</article>"
                )
                .to_string(),
            ),
            (
                PathBuf::from("layouts/index.html"),
                concat!(
                    "<ul>{% for l in lessons %}<li>{{ l.title }}</li>{% endfor %}</ul>",
                    "{% block main %}{% endblock main %}"
                )
                .to_string(),
            ),
        ])
        .unwrap()
    }

    fn run(docs: Vec<Document>, order: &[&str], output_dir: &Path) -> Vec<ProcessingDocument> {
        let lessons_config = LessonsConfig {
            layout: "lesson".to_string(),
            order: order.iter().map(|s| s.to_string()).collect(),
        };
        let lessons = LessonIndex::build(&docs, &lessons_config);
        let site = SiteContext::default();
        let markdown_config = MarkdownConfig::default();
        let highlighter = SyntaxHighlighter::default();
        let mut renderer = renderer();
        let mut ctx = PipelineContext::new(
            output_dir,
            &site,
            &markdown_config,
            &lessons,
            &highlighter,
            &mut renderer,
            false,
            false,
        );

        let mut processing: Vec<ProcessingDocument> =
            docs.into_iter().map(ProcessingDocument::new).collect();
        Pipeline::default_pipeline()
            .run(&mut processing, &mut ctx)
            .unwrap();
        processing
    }

    #[test]
    fn test_default_stage_order() {
        assert_eq!(
            Pipeline::default_pipeline().stage_names(),
            vec![
                "highlight-source",
                "markdown",
                "html-in-md",
                "layout",
                "template",
                "highlight-rendered",
                "write",
            ]
        );
    }

    #[test]
    fn test_index_sees_lessons_processed_later() {
        let dir = tempfile::tempdir().unwrap();
        let docs = vec![
            document("index", "index", "Welcome"),
            document("lessons/first", "lesson", "One"),
            document("lessons/second", "lesson", "Two"),
        ];
        let processed = run(docs, &["second", "first"], dir.path());

        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.starts_with("<ul><li>Second</li><li>First</li></ul>"));
        assert!(index.contains("<p>Welcome</p>"));

        let second = processed[2].output_html.as_deref().unwrap();
        assert!(second.contains("<article>Second|<p>Two</p>"));
        assert!(second.contains("|next:first</article>"));
    }

    #[test]
    fn test_template_syntax_in_code_sample_is_literal() {
        let dir = tempfile::tempdir().unwrap();
        let body = "Example:\n```\n{{ page.title }}\n```\n";
        let docs = vec![document("page", "base", body)];
        run(docs, &[], dir.path());

        let html = std::fs::read_to_string(dir.path().join("page.html")).unwrap();
        assert!(html.contains("{{ page.title }}"));
    }

    #[test]
    fn test_template_syntax_in_indented_code_is_literal() {
        let dir = tempfile::tempdir().unwrap();
        let body = "Text\n\n    {{ name }}\n    {% if x %}\n";
        let docs = vec![document("page", "base", body)];
        run(docs, &[], dir.path());

        let html = std::fs::read_to_string(dir.path().join("page.html")).unwrap();
        assert!(html.contains("<pre><code>{{ name }}\n{% if x %}\n</code></pre>"));
    }

    #[test]
    fn test_endraw_in_code_sample_stays_guarded() {
        let dir = tempfile::tempdir().unwrap();
        let body = "```\n{% endraw %} {{ page.title }}\n```\n";
        let docs = vec![document("page", "base", body)];
        run(docs, &[], dir.path());

        let html = std::fs::read_to_string(dir.path().join("page.html")).unwrap();
        assert!(html.contains("{&#37; endraw %} {{ page.title }}"));
    }

    #[test]
    fn test_html_in_md_marker_is_unlocked() {
        let dir = tempfile::tempdir().unwrap();
        let body = "<!-- html-in-md <section class=\"demo\"> -->\n\nHello\n\n<!-- html-in-md </section> -->\n";
        let docs = vec![document("demo", "base", body)];
        let processed = run(docs, &[], dir.path());

        let html = processed[0].output_html.as_deref().unwrap();
        assert!(html.contains("<section class=\"demo\">"));
        assert!(html.contains("</section>"));
        assert!(!html.contains("html-in-md"));
    }
}
