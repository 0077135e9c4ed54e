//! Markdown to HTML for the review pane.

use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;

/// Renderable form of a model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub html: String,
}

/// Raw HTML in the answer is shown as text; the review pane injects the
/// result with `innerHTML`.
pub fn render(markdown: &str) -> RenderedDocument {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    RenderedDocument { html: out }
}
