//! Markdown support for text replies.
//!
//! Plenty of catalog endpoints answer with prose instead of JSON. Bodies that
//! look like markdown get rendered; everything else stays escaped plain text.

use pulldown_cmark::{html, Event, Options, Parser};

/// Heuristic for "this text body is probably markdown": it starts with a
/// heading, contains a paragraph break, or contains a fenced code block.
pub fn looks_like_markdown(text: &str) -> bool {
    !text.is_empty()
        && (text.trim().starts_with('#') || text.contains("\n\n") || text.contains("```"))
}

/// Markdown-to-HTML converter with a fixed option set.
///
/// Raw HTML in the source is demoted to escaped text. Backend prose is not a
/// trusted HTML source, so nothing it writes may land in the page unescaped.
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        MarkdownRenderer { options }
    }

    pub fn to_html(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, self.options).map(|event| match event {
            Event::Html(raw) => Event::Text(raw),
            Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        MarkdownRenderer::new()
    }
}
