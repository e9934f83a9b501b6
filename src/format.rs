//! Pluggable per-format markup conversion.
//!
//! Each rendered link of a layout chain is passed through the [`Formatter`]
//! registered for its template's format tag (the source file's extension).
//! Tags with no registered formatter pass through unchanged — `html` needs
//! no conversion and assets never reach a formatter at all.
//!
//! The built-in markdown formatter uses `pulldown-cmark` and registers for
//! both `md` and `markdown`.

use pulldown_cmark::{Parser, html as md_html};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("a formatter for '{0}' is already registered")]
pub struct DuplicateFormat(pub String);

/// Converts evaluated template markup into final output markup.
pub trait Formatter: Send + Sync {
    /// The format tag this formatter claims (e.g. `md`).
    fn format_type(&self) -> &str;
    fn format(&self, markup: &str) -> String;
}

/// Markdown → HTML via pulldown-cmark.
pub struct MarkdownFormatter {
    tag: &'static str,
}

impl MarkdownFormatter {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl Formatter for MarkdownFormatter {
    fn format_type(&self) -> &str {
        self.tag
    }

    fn format(&self, markup: &str) -> String {
        let parser = Parser::new(markup);
        let mut html = String::with_capacity(markup.len() * 2);
        md_html::push_html(&mut html, parser);
        html.trim_end().to_string()
    }
}

/// Format-tag → formatter table. Two formatters claiming the same tag is a
/// registration error.
pub struct FormatterRegistry {
    formatters: BTreeMap<String, Box<dyn Formatter>>,
}

impl FormatterRegistry {
    pub fn empty() -> Self {
        Self {
            formatters: BTreeMap::new(),
        }
    }

    /// Registry with the stock formatters: markdown under `md` and
    /// `markdown`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Box::new(MarkdownFormatter::new("md")))
            .expect("empty registry");
        registry
            .register(Box::new(MarkdownFormatter::new("markdown")))
            .expect("empty registry");
        registry
    }

    pub fn register(&mut self, formatter: Box<dyn Formatter>) -> Result<(), DuplicateFormat> {
        let tag = formatter.format_type().to_string();
        if self.formatters.contains_key(&tag) {
            return Err(DuplicateFormat(tag));
        }
        self.formatters.insert(tag, formatter);
        Ok(())
    }

    /// Apply the formatter for `tag`, or pass through unchanged when none
    /// is registered.
    pub fn apply(&self, tag: &str, markup: &str) -> String {
        match self.formatters.get(tag) {
            Some(formatter) => formatter.format(markup),
            None => markup.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_converts_to_html() {
        let registry = FormatterRegistry::with_defaults();
        let html = registry.apply("md", "# Title\n\nBody *em*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>em</em>"));
    }

    #[test]
    fn unknown_tag_passes_through() {
        let registry = FormatterRegistry::with_defaults();
        assert_eq!(registry.apply("html", "<p>as-is</p>"), "<p>as-is</p>");
        assert_eq!(registry.apply("xyz", "untouched"), "untouched");
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = FormatterRegistry::with_defaults();
        let err = registry
            .register(Box::new(MarkdownFormatter::new("md")))
            .unwrap_err();
        assert_eq!(err.0, "md");
    }

    #[test]
    fn markdown_registered_under_both_tags() {
        let registry = FormatterRegistry::with_defaults();
        assert!(registry.apply("markdown", "*x*").contains("<em>x</em>"));
    }
}
