//! Markdown to HTML.

use std::sync::Arc;

use pulldown_cmark::{html, Options, Parser};

/// Converts Markdown text to HTML. Used by the `markdown` block.
pub type MarkdownTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The `pulldown-cmark` transform with tables, strikethrough and
/// footnotes.
pub fn default_markdown() -> MarkdownTransform {
    Arc::new(markdown_to_html)
}

pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(source, options));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn headings_and_emphasis() {
        assert_eq!(markdown_to_html("# Hi\n\n*a*"), "<h1>Hi</h1>\n<p><em>a</em></p>\n");
    }

    #[test]
    fn tables_are_enabled() {
        let out = markdown_to_html("| a |\n|---|\n| 1 |\n");
        assert!(out.contains("<table>"));
    }
}
