//! Conversion of highlighter tokens into safe HTML-like markup.

use super::Token;
use crate::domain::LineContent;

/// Placeholder for a line with no tokens, so the row keeps its height.
pub const EMPTY_LINE_MARKUP: &str = " ";

/// Escapes text for inclusion in markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Safe markup for line content; literal text gets escaped, markup is kept.
pub fn content_to_markup(content: &LineContent) -> String {
    match content {
        LineContent::Text(text) => escape_html(text),
        LineContent::Markup(markup) => markup.clone(),
    }
}

/// Renders one line of tokens as color spans. Token text is escaped; the
/// color is escaped too since it comes from an external collaborator.
pub fn tokens_to_markup(tokens: &[Token]) -> String {
    if tokens.is_empty() {
        return EMPTY_LINE_MARKUP.to_string();
    }

    let mut out = String::new();
    for token in tokens {
        out.push_str("<span style=\"color:");
        out.push_str(&escape_html(&token.color));
        out.push_str("\">");
        out.push_str(&escape_html(&token.content));
        out.push_str("</span>");
    }
    out
}

/// Markup for every line of a token stream.
pub fn token_lines_to_markup(lines: &[Vec<Token>]) -> Vec<String> {
    lines.iter().map(|tokens| tokens_to_markup(tokens)).collect()
}
