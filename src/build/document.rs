use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Documents
// =============================================================================

/// A document flowing through the build pipeline.
///
/// Created when a content file is read and its front matter extracted.
/// The body (markdown without front matter) is carried separately by the
/// pipeline so that stages can transform it in place.
#[derive(Debug, Clone)]
pub struct Document {
    /// Absolute path of the source file
    pub source_path: PathBuf,
    /// Filename without extension (e.g., "vanilla-js")
    pub slug: String,
    /// Path relative to the content root, extension stripped (e.g., "lessons/vanilla-js")
    pub url: String,
    /// Relative prefix from the page back to the site root (e.g., "../")
    pub root_path: String,
    /// Front matter metadata
    pub front_matter: FrontMatter,
    /// The markdown content without the front matter block
    pub body: String,
}

/// Front matter metadata parsed from the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Name of the layout template that wraps this page
    pub layout: Option<String>,
    /// Page title (can override filename-derived title)
    pub title: Option<String>,
    /// Page description for SEO/previews
    pub description: Option<String>,
    /// Marks the not-found page, whose root path is always the site root
    #[serde(default, rename = "is404")]
    pub is_404: bool,
    /// Additional arbitrary metadata (available in templates at top level, e.g., `page.author`)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

#[derive(thiserror::Error, Debug)]
#[error("malformed front matter: {0}")]
pub struct FrontMatterError(#[from] serde_yaml::Error);

/// Result of parsing front matter from markdown content.
#[derive(Debug)]
pub struct ParsedContent {
    /// The parsed front matter (empty if none found)
    pub front_matter: FrontMatter,
    /// The markdown content without the front matter block
    pub content: String,
}

const DELIMITER: &str = "---";

/// Parse front matter from markdown content.
///
/// Front matter is a YAML block delimited by `---` lines at the start of the file:
///
/// ```markdown
/// ---
/// layout: lesson
/// title: Vanilla JS
/// ---
///
/// # Content starts here
/// ```
///
/// Content without an opening delimiter, or with an unterminated block, has
/// empty front matter and is returned whole.
pub fn parse_front_matter(content: &str) -> Result<ParsedContent, FrontMatterError> {
    let no_front_matter = || ParsedContent {
        front_matter: FrontMatter::default(),
        content: content.to_string(),
    };

    let Some(after_opening) = content.strip_prefix(DELIMITER) else {
        return Ok(no_front_matter());
    };

    // The opening delimiter must be alone on its line
    let Some(after_opening) = after_opening
        .strip_prefix("\r\n")
        .or_else(|| after_opening.strip_prefix('\n'))
    else {
        return Ok(no_front_matter());
    };

    // Find the closing delimiter: a line that is exactly `---`
    let mut offset = 0;
    let mut closing = None;
    for line in after_opening.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let Some((yaml_end, body_start)) = closing else {
        return Ok(no_front_matter());
    };

    let yaml_content = &after_opening[..yaml_end];
    let markdown_content = after_opening[body_start..]
        .trim_start_matches(['\r', '\n'])
        .to_string();

    let front_matter = if yaml_content.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml_content)?
    };

    Ok(ParsedContent {
        front_matter,
        content: markdown_content,
    })
}

impl Document {
    /// Get the document title, falling back to the slug if not in front matter.
    pub fn title(&self) -> String {
        self.front_matter
            .title
            .clone()
            .unwrap_or_else(|| title_case(&self.slug))
    }

    /// The layout named in front matter, if present and non-empty.
    pub fn layout(&self) -> Option<&str> {
        self.front_matter
            .layout
            .as_deref()
            .map(str::trim)
            .filter(|layout| !layout.is_empty())
    }
}

/// Convert a filename slug to title case.
/// "vanilla-js" -> "Vanilla Js"
fn title_case(s: &str) -> String {
    s.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("getting-started"), "Getting Started");
        assert_eq!(title_case("intro"), "Intro");
        assert_eq!(title_case("jquery_plugins"), "Jquery Plugins");
        assert_eq!(title_case("404"), "404");
    }

    fn doc_with(front_matter: FrontMatter) -> Document {
        Document {
            source_path: PathBuf::from("/site/content/vanilla-js.md"),
            slug: "vanilla-js".to_string(),
            url: "vanilla-js".to_string(),
            root_path: String::new(),
            front_matter,
            body: String::new(),
        }
    }

    #[test]
    fn test_document_title_fallback() {
        let doc = doc_with(FrontMatter::default());
        assert_eq!(doc.title(), "Vanilla Js");
    }

    #[test]
    fn test_document_title_from_front_matter() {
        let doc = doc_with(FrontMatter {
            title: Some("Vanilla JS".to_string()),
            ..FrontMatter::default()
        });
        assert_eq!(doc.title(), "Vanilla JS");
    }

    #[test]
    fn test_document_layout_ignores_blank() {
        let doc = doc_with(FrontMatter {
            layout: Some("  ".to_string()),
            ..FrontMatter::default()
        });
        assert_eq!(doc.layout(), None);

        let doc = doc_with(FrontMatter {
            layout: Some("lesson".to_string()),
            ..FrontMatter::default()
        });
        assert_eq!(doc.layout(), Some("lesson"));
    }

    #[test]
    fn test_parse_front_matter_basic() {
        let content = r#"---
layout: lesson
title: My Page
description: A test page
---

# Hello World
"#;
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.layout, Some("lesson".to_string()));
        assert_eq!(parsed.front_matter.title, Some("My Page".to_string()));
        assert_eq!(parsed.front_matter.description, Some("A test page".to_string()));
        assert_eq!(parsed.content, "# Hello World\n");
    }

    #[test]
    fn test_parse_front_matter_with_custom_fields() {
        let content = r#"---
layout: page
is404: true
author: Dave
tags:
  - js
  - css
---

Content here
"#;
        let parsed = parse_front_matter(content).unwrap();
        assert!(parsed.front_matter.is_404);
        assert!(parsed.front_matter.extra.contains_key("author"));
        assert!(parsed.front_matter.extra.contains_key("tags"));
        assert!(!parsed.front_matter.extra.contains_key("layout"));
    }

    #[test]
    fn test_parse_front_matter_crlf() {
        let content = "---\r\nlayout: lesson\r\ntitle: Windows\r\n---\r\n\r\nBody\r\n";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.layout.as_deref(), Some("lesson"));
        assert_eq!(parsed.front_matter.title.as_deref(), Some("Windows"));
        assert_eq!(parsed.content, "Body\r\n");
    }

    #[test]
    fn test_parse_front_matter_no_front_matter() {
        let content = "# Just Markdown\n\nNo front matter here.";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.layout, None);
        assert_eq!(parsed.content, content);
    }

    #[test]
    fn test_parse_front_matter_empty_front_matter() {
        let content = "---\n---\n\n# Content";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.title, None);
        assert_eq!(parsed.content, "# Content");
    }

    #[test]
    fn test_parse_front_matter_unterminated() {
        let content = "---\nlayout: page\n\n# Content";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.layout, None);
        assert_eq!(parsed.content, content);
    }

    #[test]
    fn test_parse_front_matter_malformed() {
        let content = "---\nlayout: [unclosed\n---\n\nBody";
        assert!(parse_front_matter(content).is_err());
    }

    #[test]
    fn test_body_never_contains_delimiters() {
        let content = "---\nlayout: page\ntitle: Rules\n---\nBody with a rule\n\n***\n";
        let parsed = parse_front_matter(content).unwrap();
        assert!(!parsed.content.contains("---"));
        assert!(!parsed.content.contains("layout:"));
    }

    #[test]
    fn test_horizontal_rule_in_body_is_kept() {
        let content = "---\nlayout: page\n---\nAbove\n\n---\n\nBelow\n";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.layout.as_deref(), Some("page"));
        assert_eq!(parsed.content, "Above\n\n---\n\nBelow\n");
    }
}
