//! Tagged documents: HTML or Markdown with a block of comment headers.
//!
//! ```text
//! <!-- title: Hello World -->
//! <!-- tags: intro -->
//! <p>Body starts at the first line that is not a header.</p>
//! ```
//!
//! Headers are read in file order until the first non-matching line. Keys
//! keep their case; a repeated key overwrites the earlier value.

use regex::Regex;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A\s*<!--\s*(.+?)\s*:\s*(.+?)\s*-->\s*").expect("header pattern must compile")
});

/// Extensions converted from Markdown to HTML.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mkd", "mkdn", "mdown", "markdown"];

/// Parse the leading header block.
///
/// Returns the `(key, value)` pairs in file order and the byte offset where
/// the body starts.
pub fn read_headers(text: &str) -> (Vec<(String, String)>, usize) {
    let mut headers = Vec::new();
    let mut end = 0;
    while let Some(caps) = HEADER.captures(&text[end..]) {
        headers.push((caps[1].to_string(), caps[2].to_string()));
        end += caps[0].len();
    }
    (headers, end)
}

pub fn is_markdown(extension: &str) -> bool {
    MARKDOWN_EXTENSIONS.contains(&extension)
}

/// Convert Markdown to HTML, or `None` when built without Markdown support.
#[cfg(feature = "markdown")]
pub fn markdown_to_html(text: &str) -> Option<String> {
    use pulldown_cmark::{Parser, html as md_html};

    let parser = Parser::new(text);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    Some(html)
}

#[cfg(not(feature = "markdown"))]
pub fn markdown_to_html(_text: &str) -> Option<String> {
    None
}
