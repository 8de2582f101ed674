//! Marker comment unlocking stage.

use crate::build::html_in_md::unlock_html;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that replaces `<!-- html-in-md ... -->` comments with their payload.
pub struct HtmlInMdStage;

impl Stage for HtmlInMdStage {
    fn name(&self) -> &'static str {
        "html-in-md"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        _ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            doc.content = unlock_html(&doc.content);
        }
        Ok(())
    }
}
