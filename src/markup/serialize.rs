//! HTML serialization of arena subtrees.

use std::fmt::Write;

use crate::dom::{Dom, NodeId, NodeKind};
use crate::markup::builder::{DOCUMENT_TAG, VOID_ELEMENTS};
use crate::markup::entities::{escape_attribute, escape_text};
use crate::markup::tokenizer::RAW_TEXT_ELEMENTS;

/// Serialize `id` and its subtree. The synthetic document node serializes
/// as its children only.
pub fn outer_html(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, false, &mut out);
    out
}

/// Serialize the children of `id`.
pub fn inner_html(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    let raw = dom
        .get(id)
        .is_some_and(|d| RAW_TEXT_ELEMENTS.contains(&d.tag.as_str()));
    for &child in dom.children(id) {
        write_node(dom, child, raw, &mut out);
    }
    out
}

/// The opening tag of an element, attributes in `id`, `class`, others,
/// `style` order.
pub fn start_tag(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    if let Some(data) = dom.get(id) {
        let _ = write!(out, "<{}", data.tag);
        if let Some(node_id) = &data.id {
            let _ = write!(out, " id=\"{}\"", escape_attribute(node_id));
        }
        if !data.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_attribute(&data.classes.join(" ")));
        }
        for (name, value) in &data.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
        }
        if !data.style.is_empty() {
            let _ = write!(out, " style=\"{}\"", escape_attribute(&data.style.to_css()));
        }
        out.push('>');
    }
    out
}

fn write_node(dom: &Dom, id: NodeId, raw_parent: bool, out: &mut String) {
    let Some(data) = dom.get(id) else {
        return;
    };
    match &data.kind {
        NodeKind::Text(text) if raw_parent => out.push_str(text),
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Element if data.tag == DOCUMENT_TAG => out.push_str(&inner_html(dom, id)),
        NodeKind::Element => {
            out.push_str(&start_tag(dom, id));
            if VOID_ELEMENTS.contains(&data.tag.as_str()) {
                return;
            }
            out.push_str(&inner_html(dom, id));
            let _ = write!(out, "</{}>", data.tag);
        }
    }
}
