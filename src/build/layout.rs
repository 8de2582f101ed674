//! Wrap rendered page content in its layout.
//!
//! The wrapped content becomes a Tera template that extends the layout named
//! in front matter and fills its `main` block.

/// Block name layouts must define for page content.
pub const CONTENT_BLOCK: &str = "main";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    #[error("document '{0}' has no 'layout' in its front matter")]
    MissingLayout(String),

    #[error("document '{url}' names an invalid layout: {layout:?}")]
    InvalidLayout { url: String, layout: String },
}

/// Wrap `html` so it renders inside `layout`.
///
/// `url` identifies the document in errors.
pub fn wrap_in_layout(html: &str, layout: Option<&str>, url: &str) -> Result<String, LayoutError> {
    let layout = layout
        .map(str::trim)
        .filter(|layout| !layout.is_empty())
        .ok_or_else(|| LayoutError::MissingLayout(url.to_string()))?;

    // The name ends up inside a quoted string literal
    if layout.contains(['"', '\n', '\r']) {
        return Err(LayoutError::InvalidLayout {
            url: url.to_string(),
            layout: layout.to_string(),
        });
    }

    Ok(format!(
        "{{% extends \"{layout}\" %}}{{% block {CONTENT_BLOCK} %}}{html}{{% endblock {CONTENT_BLOCK} %}}"
    ))
}
