//! Snapshot helpers.
//!
//! Convert a subtree into a compact indented outline for assertions: one
//! line per element with its tag, id, classes and interaction marks, and the
//! text of leaf elements inline.

use crate::dom::{Dom, NodeId};

/// Render `root` and its descendants as an indented outline.
///
/// ```text
/// div#pagecraft-surface
///   section.hero
///     h1.hero-title [selected] "Welcome"
/// ```
///
/// Whitespace-only text is skipped. Lines are joined with `'\n'` and the
/// final line has no trailing newline.
pub fn outline(dom: &Dom, root: NodeId) -> String {
    let mut lines = Vec::new();
    write_node(dom, root, 0, &mut lines);
    lines.join("\n")
}

fn write_node(dom: &Dom, node: NodeId, depth: usize, lines: &mut Vec<String>) {
    let Some(data) = dom.get(node) else {
        return;
    };
    let indent = "  ".repeat(depth);

    if let Some(text) = data.text_content() {
        let text = text.trim();
        if !text.is_empty() {
            lines.push(format!("{indent}{text:?}"));
        }
        return;
    }

    let mut line = format!("{indent}{}", data.tag);
    if let Some(id) = &data.id {
        line.push('#');
        line.push_str(id);
    }
    for class in &data.classes {
        line.push('.');
        line.push_str(class);
    }
    if data.outline.selected {
        line.push_str(" [selected]");
    }
    if data.outline.hovered {
        line.push_str(" [hovered]");
    }

    if dom.has_element_children(node) {
        lines.push(line);
        for &child in dom.children(node) {
            write_node(dom, child, depth + 1, lines);
        }
        return;
    }

    let text = dom.text_of(node);
    let text = text.trim();
    if !text.is_empty() {
        line.push(' ');
        line.push_str(&format!("{text:?}"));
    }
    lines.push(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeData;
    use pretty_assertions::assert_eq;

    #[test]
    fn outlines_nested_elements() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("main").with_id("app"));
        let card = dom.insert_child(root, NodeData::element("div").with_classes(["card", "wide"]));
        let title = dom.insert_child(card, NodeData::element("h2"));
        dom.set_text(title, "Menu");
        dom.insert_child(card, NodeData::text("  loose  "));
        dom.insert_child(root, NodeData::element("hr"));
        if let Some(data) = dom.get_mut(title) {
            data.outline.hovered = true;
        }

        insta::assert_snapshot!(outline(&dom, root), @r#"
main#app
  div.card.wide
    h2 [hovered] "Menu"
    "loose"
  hr
"#);
    }

    #[test]
    fn missing_root_is_empty() {
        let mut dom = Dom::new();
        let node = dom.insert(NodeData::element("p"));
        dom.remove(node);
        assert_eq!(outline(&dom, node), "");
    }
}
