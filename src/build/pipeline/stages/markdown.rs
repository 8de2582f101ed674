//! Markdown rendering stage.

use crate::build::markdown::render_markdown;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that renders markdown content to an HTML fragment.
///
/// After this stage, `doc.content` contains HTML and `doc.toc`
/// contains the extracted headings.
pub struct MarkdownStage;

impl Stage for MarkdownStage {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let output = render_markdown(&doc.content, ctx.highlighter, ctx.markdown_config)
                .map_err(|e| {
                    PipelineError::stage("markdown", format!("failed to render {}: {}", doc.url(), e))
                })?;

            doc.content = output.html;
            doc.toc = output.toc;
        }

        Ok(())
    }
}
