//! Unlock raw HTML hidden in markdown comments.
//!
//! Markdown next to a raw HTML block is treated as literal text, so wrapper
//! elements are written as comments and restored after conversion:
//!
//! ```markdown
//! <!-- html-in-md <div class="lesson-content"> -->
//! ## Still markdown
//! <!-- html-in-md </div> -->
//! ```
//!
//! Only single-line markers are recognised.

use std::sync::LazyLock;

use regex::Regex;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!-- html-in-md (.+?) -->").expect("valid html-in-md regex")
});

/// Replace every `<!-- html-in-md X -->` marker with `X`.
pub fn unlock_html(html: &str) -> String {
    MARKER_RE.replace_all(html, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlocks_marker() {
        assert_eq!(unlock_html("<!-- html-in-md <b>x</b> -->"), "<b>x</b>");
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        assert_eq!(unlock_html("<!-- HTML-IN-MD <b>x</b> -->"), "<b>x</b>");
        assert_eq!(unlock_html("<!-- Html-In-Md <i>y</i> -->"), "<i>y</i>");
    }

    #[test]
    fn test_multiple_markers_on_one_line() {
        assert_eq!(
            unlock_html("<!-- html-in-md <p> --> text <!-- html-in-md </p> -->"),
            "<p> text </p>"
        );
    }

    #[test]
    fn test_multiline_marker_is_left_alone() {
        let input = "<!-- html-in-md <div\nclass=\"x\"> -->";
        assert_eq!(unlock_html(input), input);
    }

    #[test]
    fn test_other_comments_are_left_alone() {
        let input = "<!-- just a comment --><p>text</p>";
        assert_eq!(unlock_html(input), input);
    }
}
