//! Converts markdown bodies to HTML.

use pulldown_cmark::{html, Options, Parser};

/// Converts `markdown` to HTML. Footnotes, strikethrough, tables, and task
/// lists are enabled to match what post authors expect from the wider
/// ecosystem.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}
