//! GeneratedDocument: the immutable markup + stylesheet pair.

use crate::dom::NodeId;
use crate::markup::{inner_html, parse_html};

/// A generated page, split into markup and stylesheet text.
///
/// Never mutated after construction; regeneration produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    markup: String,
    stylesheet: String,
}

impl GeneratedDocument {
    pub fn new(markup: impl Into<String>, stylesheet: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            stylesheet: stylesheet.into(),
        }
    }

    /// Split a self-contained HTML document: every `<style>` element's text
    /// moves into the stylesheet and the element is removed from the markup.
    pub fn from_html(code: &str) -> Self {
        let mut doc = parse_html(code);
        let styles: Vec<NodeId> = doc.dom.query_by_tag(doc.root, "style");
        let mut stylesheet = String::new();
        for style in styles {
            let text = doc.dom.text_of(style);
            if !text.trim().is_empty() {
                if !stylesheet.is_empty() {
                    stylesheet.push('\n');
                }
                stylesheet.push_str(text.trim());
            }
            doc.dom.remove(style);
        }
        Self {
            markup: inner_html(&doc.dom, doc.root),
            stylesheet,
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_are_split_out() {
        let doc = GeneratedDocument::from_html(
            "<!DOCTYPE html><html><head><style>h1 { color: red; }</style></head>\
             <body><h1>Hi</h1><style>p { margin: 0; }</style></body></html>",
        );
        assert_eq!(doc.stylesheet(), "h1 { color: red; }\np { margin: 0; }");
        assert!(!doc.markup().contains("<style"));
        assert!(doc.markup().contains("<h1>Hi</h1>"));
    }

    #[test]
    fn no_styles() {
        let doc = GeneratedDocument::from_html("<body><p>x</p></body>");
        assert_eq!(doc.stylesheet(), "");
    }
}
