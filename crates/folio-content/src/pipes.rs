//! Value pipes for the delimited text format.
//!
//! A text field written as `key|pipe: value` runs `value` through `pipe`
//! before it is stored. Pipes chain left to right.

use pulldown_cmark::{Options, Parser, html};

/// Apply a named pipe to a value.
///
/// Returns `None` when the pipe is unknown.
#[must_use]
pub fn apply_pipe(pipe: &str, value: &str) -> Option<String> {
    let piped = match pipe {
        "markdown" => render_markdown(value),
        "trim" => value.trim().to_owned(),
        "upper" => value.to_uppercase(),
        "lower" => value.to_lowercase(),
        _ => return None,
    };
    Some(piped)
}

/// Render Markdown to HTML.
#[must_use]
pub fn render_markdown(text: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(text, options);

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_pipe() {
        let html = apply_pipe("markdown", "Hello **world**").unwrap();
        assert_eq!(html, "<p>Hello <strong>world</strong></p>\n");
    }

    #[test]
    fn test_case_pipes() {
        assert_eq!(apply_pipe("upper", "News").as_deref(), Some("NEWS"));
        assert_eq!(apply_pipe("lower", "News").as_deref(), Some("news"));
        assert_eq!(apply_pipe("trim", "  x \n").as_deref(), Some("x"));
    }

    #[test]
    fn test_unknown_pipe() {
        assert!(apply_pipe("shout", "x").is_none());
    }

    #[test]
    fn test_render_markdown_table() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }
}
