//! Tree builder: HTML tokens into the arena DOM.
//!
//! This is a forgiving stack machine, not the HTML5 insertion algorithm.
//! It handles what generated documents actually contain: void elements,
//! implied end tags for `p`/`li`/table cells, and stray or misnested end
//! tags (an end tag closes the nearest open element of the same name, and is
//! ignored when there is none).

use crate::dom::{Dom, NodeData, NodeId};
use crate::markup::tokenizer::{tokenize, HtmlToken};
use crate::css::inline::InlineStyle;

/// Elements that never have children.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tag of the synthetic node at the top of every parsed document.
pub const DOCUMENT_TAG: &str = "#document";

/// A parsed HTML document in its own arena.
pub struct HtmlDocument {
    pub dom: Dom,
    /// Synthetic `#document` node.
    pub root: NodeId,
}

impl HtmlDocument {
    /// The `<body>` element, if the source had one.
    pub fn body(&self) -> Option<NodeId> {
        self.dom.query_by_tag(self.root, "body").into_iter().next()
    }

    /// The `<head>` element, if the source had one.
    pub fn head(&self) -> Option<NodeId> {
        self.dom.query_by_tag(self.root, "head").into_iter().next()
    }
}

/// Parse an HTML document (or fragment).
pub fn parse_html(input: &str) -> HtmlDocument {
    let mut dom = Dom::new();
    let root = dom.insert(NodeData::element(DOCUMENT_TAG));
    let mut stack: Vec<NodeId> = vec![root];

    for token in tokenize(input) {
        let current = stack.last().copied().unwrap_or(root);
        match token {
            HtmlToken::Doctype | HtmlToken::Comment(_) => {}
            HtmlToken::Text(text) => {
                dom.insert_child(current, NodeData::text(text));
            }
            HtmlToken::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                close_implied(&dom, &mut stack, &name);
                let parent = stack.last().copied().unwrap_or(root);
                let void = VOID_ELEMENTS.contains(&name.as_str());
                let id = dom.insert_child(parent, element_from(name, attributes));
                if !void && !self_closing {
                    stack.push(id);
                }
            }
            HtmlToken::EndTag(name) => {
                if let Some(pos) = stack
                    .iter()
                    .rposition(|&open| dom.get(open).is_some_and(|d| d.tag == name))
                {
                    if pos > 0 {
                        stack.truncate(pos);
                    }
                }
            }
        }
    }

    HtmlDocument { dom, root }
}

/// Build element data, lifting `id`, `class` and `style` into their fields.
pub fn element_from(name: String, attributes: Vec<(String, String)>) -> NodeData {
    let mut data = NodeData::element(name);
    for (attr, value) in attributes {
        match attr.as_str() {
            "id" => {
                if !value.trim().is_empty() {
                    data.id = Some(value.trim().to_string());
                }
            }
            "class" => {
                data.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "style" => data.style = InlineStyle::parse(&value),
            _ => data.attributes.push((attr, value)),
        }
    }
    data
}

/// Pop elements whose end tag is implied by the start of `name`.
fn close_implied(dom: &Dom, stack: &mut Vec<NodeId>, name: &str) {
    let closes: &[&str] = match name {
        "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "nav" | "aside"
        | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "table" | "form" | "blockquote"
        | "pre" => &["p"],
        "li" => &["li", "p"],
        "dt" | "dd" => &["dt", "dd", "p"],
        "tr" => &["tr", "td", "th"],
        "td" | "th" => &["td", "th"],
        "option" => &["option"],
        "body" => &["head"],
        _ => return,
    };
    while let Some(&top) = stack.last() {
        let open_tag = dom.get(top).map(|d| d.tag.as_str()).unwrap_or_default();
        if stack.len() > 1 && closes.contains(&open_tag) {
            stack.pop();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::serialize::inner_html;

    #[test]
    fn builds_nested_structure() {
        let doc = parse_html("<html><head><title>T</title></head><body><h1 id=\"t\" class=\"a b\">Hi</h1></body></html>");
        let body = doc.body().unwrap();
        let h1 = doc.dom.element_children(body)[0];
        let data = doc.dom.get(h1).unwrap();
        assert_eq!(data.tag, "h1");
        assert_eq!(data.id.as_deref(), Some("t"));
        assert_eq!(data.classes, vec!["a", "b"]);
        assert_eq!(doc.dom.text_of(h1), "Hi");
        assert!(doc.head().is_some());
    }

    #[test]
    fn void_elements_do_not_nest() {
        let doc = parse_html("<p>a<br>b<img src=x>c</p>");
        assert_eq!(inner_html(&doc.dom, doc.root), "<p>a<br>b<img src=\"x\">c</p>");
    }

    #[test]
    fn implied_paragraph_end() {
        let doc = parse_html("<p>one<p>two<ul><li>a<li>b</ul>");
        assert_eq!(
            inner_html(&doc.dom, doc.root),
            "<p>one</p><p>two</p><ul><li>a</li><li>b</li></ul>"
        );
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let doc = parse_html("<div>a</span>b</div></div>c");
        assert_eq!(inner_html(&doc.dom, doc.root), "<div>ab</div>c");
    }

    #[test]
    fn misnested_end_tag_closes_to_match() {
        let doc = parse_html("<div><b>bold</div>after");
        assert_eq!(inner_html(&doc.dom, doc.root), "<div><b>bold</b></div>after");
    }

    #[test]
    fn style_attribute_parsed() {
        let doc = parse_html("<p style=\"color: red; margin: 0\">x</p>");
        let p = doc.dom.element_children(doc.root)[0];
        assert_eq!(doc.dom.get(p).unwrap().style.get("color"), Some("red"));
    }

    #[test]
    fn missing_body() {
        let doc = parse_html("<div>fragment</div>");
        assert!(doc.body().is_none());
    }
}
