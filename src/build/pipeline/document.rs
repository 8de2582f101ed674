//! Document types for pipeline processing.

use crate::build::document::Document;
use crate::build::render::TocEntry;

/// A document being processed through the pipeline.
///
/// Wraps the parsed `Document` with state that evolves through the stages:
///
/// 1. Initially: `content` = markdown body with front matter removed
/// 2. After highlight-source: fenced code blocks replaced with markup
/// 3. After markdown: `content` = HTML fragment, `toc` = populated
/// 4. After html-in-md: marker comments unwrapped into real HTML
/// 5. After layout: `content` = template source extending the layout
/// 6. After template: `output_html` = full page
/// 7. After highlight-rendered: code blocks in the page highlighted
#[derive(Debug)]
pub struct ProcessingDocument {
    /// The parsed document (metadata and original body)
    pub doc: Document,

    /// Content being processed.
    pub content: String,

    /// Table of contents extracted during markdown rendering.
    pub toc: Vec<TocEntry>,

    /// Final HTML output after template rendering.
    ///
    /// None until the template stage populates it.
    pub output_html: Option<String>,
}

impl ProcessingDocument {
    pub fn new(doc: Document) -> Self {
        let content = doc.body.clone();
        Self {
            doc,
            content,
            toc: Vec::new(),
            output_html: None,
        }
    }

    /// The document's URL path (for output location).
    pub fn url(&self) -> &str {
        &self.doc.url
    }
}
