//! Syntax highlighting for fenced code blocks.
//!
//! Fences are replaced in raw text rather than through the markdown parser,
//! so the same pass works on markdown source and on rendered pages (code that
//! arrives through included partials only exists after template rendering).

use std::sync::LazyLock;

use autumnus::{HtmlLinkedBuilder, formatter::Formatter, languages::Language, themes};
use regex::{Captures, Regex};

/// A fence: newline (or start of text), indentation, three backticks,
/// a backtick-free block, three backticks.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\A|\n)( *)```([^`]+)```").expect("valid fence regex"));

/// The opening `{%` of a Tera `endraw` tag, with optional whitespace control.
static ENDRAW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%(-?\s*endraw\s*-?%\})").expect("valid endraw regex")
});

/// Which text a highlighting pass runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeBlockPass {
    /// Markdown source that is still going to be rendered as a template.
    /// Highlighted code is wrapped in a `raw` block so template syntax in
    /// code samples is left alone.
    Source,
    /// Final page HTML.
    Rendered,
}

/// A syntax highlighter using autumnus (tree-sitter based).
pub struct SyntaxHighlighter {
    /// Theme name for CSS generation.
    theme_name: String,
}

impl SyntaxHighlighter {
    /// Create a new syntax highlighter with the given theme.
    pub fn new(theme_name: &str) -> Self {
        Self {
            theme_name: theme_name.to_string(),
        }
    }

    /// Highlight code and return the markup that goes inside `<code>`.
    /// Returns the HTML-escaped code if the language is not supported.
    pub fn highlight(&self, code: &str, language: &str) -> String {
        let lang = Language::guess(language, code);

        if matches!(lang, Language::PlainText) {
            return html_escape(code);
        }

        let formatter = HtmlLinkedBuilder::new().source(code).lang(lang).build();

        let Ok(formatter) = formatter else {
            return html_escape(code);
        };

        let mut output: Vec<u8> = Vec::new();
        if formatter.format(&mut output).is_err() {
            return html_escape(code);
        }

        match String::from_utf8(output) {
            Ok(html) => inner_code(&html)
                .map(str::to_string)
                .unwrap_or_else(|| html_escape(code)),
            Err(_) => html_escape(code),
        }
    }

    /// A complete `<pre><code>` block, class omitted without a language.
    pub fn code_block(&self, code: &str, language: &str) -> String {
        if language.is_empty() {
            format!("<pre><code>{}</code></pre>", html_escape(code))
        } else {
            format!(
                "<pre><code class=\"{}\">{}</code></pre>",
                html_escape(language),
                self.highlight(code, language)
            )
        }
    }

    /// Generate CSS for the current theme.
    pub fn generate_css(&self) -> Option<String> {
        let theme = themes::get(&self.theme_name).ok()?;
        Some(theme.css(false)) // false = don't enable italic
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new("github-dark")
    }
}

/// Replace every fenced code block in `text` with highlighted markup.
///
/// The first line of a block is its language tag. When the fence is
/// indented, that indentation is removed from the start of every line.
/// Blocks without a language are emitted verbatim.
pub fn highlight_code_blocks(
    text: &str,
    highlighter: &SyntaxHighlighter,
    pass: CodeBlockPass,
) -> String {
    FENCE_RE
        .replace_all(text, |caps: &Captures| {
            replace_code_block(&caps[1], &caps[2], highlighter, pass)
        })
        .into_owned()
}

fn replace_code_block(
    indent: &str,
    block: &str,
    highlighter: &SyntaxHighlighter,
    pass: CodeBlockPass,
) -> String {
    let (language, body) = match block.split_once('\n') {
        Some((first_line, rest)) => (first_line.trim(), rest),
        None => ("", block),
    };

    let body = if indent.is_empty() {
        body.to_string()
    } else {
        dedent(body, indent)
    };

    let highlighted = if language.is_empty() {
        body
    } else {
        highlighter.highlight(&body, language)
    };

    let highlighted = match pass {
        CodeBlockPass::Source => guard_template_syntax(&highlighted),
        CodeBlockPass::Rendered => highlighted,
    };

    if language.is_empty() {
        format!("\n<pre><code>{highlighted}</code></pre>")
    } else {
        format!(
            "\n<pre><code class=\"{}\">{highlighted}</code></pre>",
            html_escape(language)
        )
    }
}

/// Wrap markup in a Tera `raw` block so template syntax inside renders
/// literally.
///
/// An `endraw` tag inside the markup has its `{%` written as `{&#37;`,
/// which displays the same but cannot close the block.
pub fn guard_template_syntax(markup: &str) -> String {
    let markup = ENDRAW_RE.replace_all(markup, "{&#37;$1");
    format!("{{% raw %}}{markup}{{% endraw %}}")
}

/// Strip `indent` from the start of every line that begins with it exactly.
fn dedent(body: &str, indent: &str) -> String {
    body.split_inclusive('\n')
        .map(|line| line.strip_prefix(indent).unwrap_or(line))
        .collect()
}

/// The markup between autumnus' `<code ...>` and `</code>`.
fn inner_code(html: &str) -> Option<&str> {
    let code_start = html.find("<code")?;
    let content_start = code_start + html[code_start..].find('>')? + 1;
    let content_end = html.rfind("</code>")?;
    html.get(content_start..content_end)
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(text: &str) -> String {
        highlight_code_blocks(text, &SyntaxHighlighter::default(), CodeBlockPass::Rendered)
    }

    #[test]
    fn test_highlight_rust() {
        let highlighter = SyntaxHighlighter::default();
        let result = highlighter.highlight("fn main() {}", "rust");
        assert!(result.contains("main"));
        assert!(!result.contains("<pre"));
    }

    #[test]
    fn test_highlight_unknown_language() {
        let highlighter = SyntaxHighlighter::default();
        let result = highlighter.highlight("a < b", "unknown_lang_xyz");
        assert_eq!(result, "a &lt; b");
    }

    #[test]
    fn test_code_block_without_language() {
        let highlighter = SyntaxHighlighter::default();
        assert_eq!(
            highlighter.code_block("<div>", ""),
            "<pre><code>&lt;div&gt;</code></pre>"
        );
    }

    #[test]
    fn test_inner_code() {
        let html = r#"<pre class="athl"><code class="language-rust" translate="no">fn</code></pre>"#;
        assert_eq!(inner_code(html), Some("fn"));
        assert_eq!(inner_code("<pre>nothing</pre>"), None);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<div>&</div>"), "&lt;div&gt;&amp;&lt;/div&gt;");
    }

    #[test]
    fn test_generate_css() {
        let highlighter = SyntaxHighlighter::new("dracula");
        let css = highlighter.generate_css();
        assert!(css.is_some_and(|css| !css.is_empty()));
    }

    #[test]
    fn test_fence_with_language_gets_class() {
        let output = rendered("Intro\n```rust\nfn main() {}\n```\nOutro");
        assert!(output.starts_with("Intro\n<pre><code class=\"rust\">"));
        assert!(output.contains("main"));
        assert!(output.ends_with("</code></pre>\nOutro"));
        assert!(!output.contains("```"));
    }

    #[test]
    fn test_fence_without_language_has_no_class() {
        let output = rendered("Intro\n```\n<b>as is</b>\n```");
        assert_eq!(output, "Intro\n<pre><code><b>as is</b>\n</code></pre>");
    }

    #[test]
    fn test_fence_at_start_of_text() {
        let output = rendered("```\nplain\n```");
        assert_eq!(output, "\n<pre><code>plain\n</code></pre>");
    }

    #[test]
    fn test_empty_fence() {
        let output = rendered("Intro\n```\n```");
        assert_eq!(output, "Intro\n<pre><code></code></pre>");
    }

    #[test]
    fn test_single_line_fence_keeps_body() {
        let output = rendered("Intro\n```inline```");
        assert_eq!(output, "Intro\n<pre><code>inline</code></pre>");
    }

    #[test]
    fn test_indented_fence_is_dedented() {
        let output = rendered("- item\n\n    ```\n    one\n      two\n    ```");
        assert_eq!(output, "- item\n\n<pre><code>one\n  two\n</code></pre>");
    }

    #[test]
    fn test_dedent_only_strips_exact_prefix() {
        assert_eq!(dedent("  a\n b\n  c", "  "), "a\n b\nc");
    }

    #[test]
    fn test_source_pass_guards_template_syntax() {
        let output = highlight_code_blocks(
            "Intro\n```\n{{ not_a_variable }}\n```",
            &SyntaxHighlighter::default(),
            CodeBlockPass::Source,
        );
        assert_eq!(
            output,
            "Intro\n<pre><code>{% raw %}{{ not_a_variable }}\n{% endraw %}</code></pre>"
        );
    }

    #[test]
    fn test_guard_neutralizes_endraw_in_sample() {
        assert_eq!(
            guard_template_syntax("a {% endraw %} b {%- endraw -%} {{ x }}"),
            "{% raw %}a {&#37; endraw %} b {&#37;- endraw -%} {{ x }}{% endraw %}"
        );
        assert_eq!(
            guard_template_syntax("{% if x %}"),
            "{% raw %}{% if x %}{% endraw %}"
        );
    }

    #[test]
    fn test_highlighting_is_idempotent() {
        let input = "# Title\n\n```js\nvar x = 1;\n```\n\ntext\n\n```\nplain\n```\n";
        for pass in [CodeBlockPass::Source, CodeBlockPass::Rendered] {
            let highlighter = SyntaxHighlighter::default();
            let once = highlight_code_blocks(input, &highlighter, pass);
            let twice = highlight_code_blocks(&once, &highlighter, pass);
            assert_eq!(once, twice);
        }
    }
}
