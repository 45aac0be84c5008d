//! Content rendering
//!
//! Submission text is stored as HTML: bare links are wrapped in anchor
//! tags first, then the whole text runs through a CommonMark renderer.
//! Inline HTML passes through the renderer untouched, so the anchors
//! survive.

use std::sync::LazyLock;

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

/// Bare http(s) and mailto targets. A match sitting right after `[` is the
/// destination of an explicit markdown link and must not be rewritten.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://\S+|mailto:\S+)").unwrap());

/// Wrap bare links in anchor tags
#[must_use]
pub fn autolink(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for found in LINK_RE.find_iter(text) {
        out.push_str(&text[last..found.start()]);
        let url = found.as_str();
        if text[..found.start()].ends_with('[') {
            out.push_str(url);
        } else {
            out.push_str("<a href=\"");
            out.push_str(url);
            out.push_str("\">");
            out.push_str(url);
            out.push_str("</a>");
        }
        last = found.end();
    }

    out.push_str(&text[last..]);
    out
}

/// Render submission text to the archived HTML form
#[must_use]
pub fn render_markdown(text: &str) -> String {
    let linked = autolink(text);
    let parser = Parser::new_ext(&linked, Options::empty());
    let mut out = String::with_capacity(linked.len() * 2);
    html::push_html(&mut out, parser);
    out
}
