//! Layout wrapping stage.

use crate::build::layout::wrap_in_layout;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that turns each HTML fragment into a template extending its layout.
///
/// Fails on the first document that names no layout.
pub struct LayoutStage;

impl Stage for LayoutStage {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        _ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            doc.content = wrap_in_layout(&doc.content, doc.doc.layout(), &doc.doc.url)?;
        }
        Ok(())
    }
}
