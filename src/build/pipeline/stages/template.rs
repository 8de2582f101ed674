//! Page template rendering stage.

use crate::build::layout::LayoutError;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::build::render::{PageContext, PageInfo};

/// Stage that renders each wrapped page through Tera.
///
/// Pages see the site, their own metadata, the table of contents and the
/// complete lesson index. Lesson pages also get their previous/next lesson.
///
/// After this stage, `doc.output_html` contains the complete HTML page.
pub struct TemplateStage;

impl Stage for TemplateStage {
    fn name(&self) -> &'static str {
        "template"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs {
            let layout = doc
                .doc
                .layout()
                .ok_or_else(|| LayoutError::MissingLayout(doc.doc.url.clone()))?;

            let page_context = PageContext {
                site: ctx.site,
                page: PageInfo::from_document(&doc.doc),
                lessons: ctx.lessons,
                lesson: ctx.lessons.neighbors(&doc.doc.url),
                toc: &doc.toc,
                build: &ctx.build,
            };

            let html = ctx.renderer.render_page(&doc.content, layout, &page_context)?;
            tracing::debug!(url = %doc.doc.url, layout, "Rendered page");

            doc.output_html = Some(html);
        }

        Ok(())
    }
}
