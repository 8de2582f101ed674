//! Markdown rendering with heading ids and TOC extraction.

use std::collections::HashSet;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use super::highlight::{SyntaxHighlighter, guard_template_syntax};
use super::render::TocEntry;
use crate::config::MarkdownConfig;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),
}

/// Result of rendering markdown, containing both HTML and table of contents.
pub struct MarkdownOutput {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Translate configured extension names into parser options.
pub fn parser_options(markdown_config: &MarkdownConfig) -> Result<Options, MarkdownError> {
    let mut options = Options::empty();
    for extension in &markdown_config.extensions {
        match extension.as_str() {
            "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
            "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
            "gfm" => options.insert(Options::ENABLE_GFM),
            "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
            "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
            "tables" => options.insert(Options::ENABLE_TABLES),
            "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
            other => return Err(MarkdownError::InvalidExtension(other.to_string())),
        }
    }
    Ok(options)
}

/// Render markdown to HTML using pulldown-cmark.
///
/// Raw HTML (including `<pre><code>` blocks produced by the fence pass) is
/// passed through untouched. Code blocks the parser still finds, such as
/// indented ones, go through the syntax highlighter and are guarded against
/// template rendering. Headings without an
/// explicit id get one derived from their text.
pub fn render_markdown(
    markdown: &str,
    highlighter: &SyntaxHighlighter,
    markdown_config: &MarkdownConfig,
) -> Result<MarkdownOutput, MarkdownError> {
    let options = parser_options(markdown_config)?;
    let parser = Parser::new_ext(markdown, options);

    let mut in_code_block = false;
    let mut code_language = String::new();
    let mut code_content = String::new();

    struct HeadingState<'a> {
        level: HeadingLevel,
        classes: Vec<String>,
        attrs: Vec<(String, Option<String>)>,
        text: String,
        events: Vec<Event<'a>>,
    }
    let mut in_heading: Option<HeadingState> = None;
    let mut used_heading_ids: HashSet<String> = HashSet::new();
    let mut toc_entries: Vec<TocEntry> = Vec::new();

    let events: Vec<Event> = parser
        .flat_map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                ref id,
                ref classes,
                ref attrs,
            }) => {
                // If heading already has an id, just pass it through
                if let Some(existing_id) = id {
                    used_heading_ids.insert(existing_id.to_string());
                    return vec![event];
                }
                in_heading = Some(HeadingState {
                    level,
                    classes: classes.iter().map(|c| c.to_string()).collect(),
                    attrs: attrs
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.as_ref().map(|v| v.to_string())))
                        .collect(),
                    text: String::new(),
                    events: Vec::new(),
                });
                vec![]
            }
            Event::End(TagEnd::Heading(_)) if in_heading.is_some() => {
                let Some(state) = in_heading.take() else {
                    return vec![];
                };

                let base_id = slugify(&state.text);
                let mut id = base_id.clone();
                let mut suffix = 1;
                while used_heading_ids.contains(&id) {
                    id = format!("{}-{}", base_id, suffix);
                    suffix += 1;
                }
                used_heading_ids.insert(id.clone());

                toc_entries.push(TocEntry {
                    text: state.text.clone(),
                    id: id.clone(),
                    level: state.level as u8,
                });

                let class_attr = if state.classes.is_empty() {
                    String::new()
                } else {
                    format!(" class=\"{}\"", state.classes.join(" "))
                };

                let extra_attrs = state
                    .attrs
                    .iter()
                    .map(|(k, v)| match v {
                        Some(val) => format!(" {}=\"{}\"", k, val),
                        None => format!(" {}", k),
                    })
                    .collect::<String>();

                let mut inner_html = String::new();
                html::push_html(&mut inner_html, state.events.into_iter());

                vec![Event::Html(
                    format!(
                        "<h{level} id=\"{id}\"{class_attr}{extra_attrs}>{inner_html}</h{level}>\n",
                        level = state.level as usize,
                    )
                    .into(),
                )]
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                code_language = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                code_content.clear();
                vec![] // Don't emit the start tag yet
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                let highlighted = highlighter.code_block(&code_content, code_language.trim());
                vec![Event::Html(guard_template_syntax(&highlighted).into())]
            }
            Event::Text(text) if in_code_block => {
                code_content.push_str(&text);
                vec![]
            }
            event if in_heading.is_some() => {
                if let Some(state) = in_heading.as_mut() {
                    if let Event::Text(text) | Event::Code(text) = &event {
                        state.text.push_str(text);
                    }
                    state.events.push(event);
                }
                vec![]
            }
            _ => vec![event],
        })
        .collect();

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    Ok(MarkdownOutput {
        html: html_output,
        toc: toc_entries,
    })
}

/// Convert a string to a slug suitable for use as an HTML id.
fn slugify(s: &str) -> String {
    s.to_lowercase()
        .replace(' ', "-")
        .replace(|c: char| !c.is_alphanumeric() && c != '-', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> MarkdownOutput {
        render_markdown(markdown, &SyntaxHighlighter::default(), &MarkdownConfig::default())
            .unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("jQuery Plugins"), "jquery-plugins");
    }

    #[test]
    fn test_render_basic_markdown() {
        let output = render("# Hello\n\nWorld");

        assert!(output.html.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(output.html.contains("<p>World</p>"));
        assert_eq!(output.toc.len(), 1);
        assert_eq!(output.toc[0].text, "Hello");
        assert_eq!(output.toc[0].level, 1);
    }

    #[test]
    fn test_heading_with_inline_code() {
        let output = render("## The `map` method");

        assert_eq!(
            output.html,
            "<h2 id=\"the-map-method\">The <code>map</code> method</h2>\n"
        );
        assert_eq!(output.toc[0].text, "The map method");
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let output = render("## Setup\n\n## Setup");
        let ids: Vec<&str> = output.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["setup", "setup-1"]);
    }

    #[test]
    fn test_preserves_highlighted_blocks() {
        let block = "<pre><code class=\"js\"><span class=\"x\">var</span> a = &lt;b&gt;;\n</code></pre>";
        let output = render(&format!("Intro\n{block}\n\nAfter"));

        assert!(output.html.contains(block));
        assert!(output.html.contains("<p>After</p>"));
    }

    #[test]
    fn test_preserves_html_in_md_markers() {
        let output = render("<!-- html-in-md <div class=\"lesson\"> -->\n\n## Inside\n");
        assert!(output.html.contains("<!-- html-in-md <div class=\"lesson\"> -->"));
        assert!(output.html.contains("<h2 id=\"inside\">Inside</h2>"));
    }

    #[test]
    fn test_indented_code_block_is_escaped() {
        let output = render("Text\n\n    <div>\n");
        assert!(output.html.contains("<pre><code>&lt;div&gt;\n</code></pre>"));
    }

    #[test]
    fn test_indented_code_block_is_raw_guarded() {
        let output = render("Text\n\n    {{ name }}\n");
        assert!(
            output
                .html
                .contains("{% raw %}<pre><code>{{ name }}\n</code></pre>{% endraw %}")
        );
    }

    #[test]
    fn test_invalid_extension() {
        let config = MarkdownConfig {
            extensions: vec!["not_a_real_extension".to_string()],
        };

        let result = render_markdown("# Test", &SyntaxHighlighter::default(), &config);
        assert!(result.is_err());
    }
}
