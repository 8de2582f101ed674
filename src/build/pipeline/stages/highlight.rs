//! Fenced code block highlighting stage.

use crate::build::highlight::{CodeBlockPass, highlight_code_blocks};
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that replaces fenced code blocks with highlighted markup.
///
/// Runs twice: once over the markdown body, and once over the rendered page
/// so code pulled in by layouts and partials is highlighted too.
pub struct HighlightStage {
    pass: CodeBlockPass,
}

impl HighlightStage {
    pub fn new(pass: CodeBlockPass) -> Self {
        Self { pass }
    }
}

impl Stage for HighlightStage {
    fn name(&self) -> &'static str {
        match self.pass {
            CodeBlockPass::Source => "highlight-source",
            CodeBlockPass::Rendered => "highlight-rendered",
        }
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            match self.pass {
                CodeBlockPass::Source => {
                    doc.content = highlight_code_blocks(&doc.content, ctx.highlighter, self.pass);
                }
                CodeBlockPass::Rendered => {
                    let html = doc.output_html.as_deref().ok_or_else(|| {
                        PipelineError::stage(
                            self.name(),
                            format!("document '{}' has not been rendered", doc.url()),
                        )
                    })?;
                    doc.output_html = Some(highlight_code_blocks(html, ctx.highlighter, self.pass));
                }
            }
        }

        Ok(())
    }
}
