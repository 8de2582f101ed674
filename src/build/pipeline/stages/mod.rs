//! Default pipeline stages.
//!
//! 1. **HighlightStage** (source) - Highlight fenced code in the markdown body
//! 2. **MarkdownStage** - Convert markdown to HTML and collect the TOC
//! 3. **HtmlInMdStage** - Turn `html-in-md` comments into markup
//! 4. **LayoutStage** - Make the content extend its layout template
//! 5. **TemplateStage** - Render the page with site and lesson data
//! 6. **HighlightStage** (rendered) - Highlight code introduced by templates
//! 7. **WriteStage** - Write final HTML to output directory

mod highlight;
mod html_in_md;
mod layout;
mod markdown;
mod template;
mod write;

pub use highlight::HighlightStage;
pub use html_in_md::HtmlInMdStage;
pub use layout::LayoutStage;
pub use markdown::MarkdownStage;
pub use template::TemplateStage;
pub use write::WriteStage;
