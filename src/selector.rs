//! Selector codec: derive a re-locatable selector for a node, and resolve a
//! stored selector against a fresh tree.
//!
//! Selectors are structural (`#id`, `.class`, `tag:nth-of-type(k)`), so they
//! are stable for an unchanged tree but may orphan or drift when a document
//! is regenerated.

use crate::css::model::Selector;
use crate::css::parser::parse_selector;
use crate::css::stylesheet::{matches_selector, nth_of_type};
use crate::dom::{Dom, NodeId};

/// Derive the selector for an element: `#id`, else `.firstClass`, else
/// `tag:nth-of-type(k)`. Text nodes and missing ids yield `None`.
///
/// Ids and class tokens that are not plain CSS identifiers (and would need
/// escaping) are skipped in favor of the next rule.
pub fn compute(dom: &Dom, node: NodeId) -> Option<String> {
    let data = dom.get(node).filter(|d| d.is_element())?;
    if let Some(id) = data.identity().filter(|id| is_identifier(id)) {
        return Some(format!("#{id}"));
    }
    if let Some(class) = data.classes.first().filter(|c| is_identifier(c)) {
        return Some(format!(".{class}"));
    }
    let k = nth_of_type(dom, node, data).unwrap_or(1);
    Some(format!("{}:nth-of-type({k})", data.tag))
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    let first_ok = match chars.next() {
        Some('-') => chars.clone().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '-'),
        Some(c) => c.is_ascii_alphabetic() || c == '_',
        None => false,
    };
    first_ok && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A parsed selector used to re-locate nodes. Unparseable text yields a
/// matcher that matches nothing.
#[derive(Debug, Clone)]
pub struct SelectorMatcher {
    source: String,
    selector: Option<Selector>,
}

impl SelectorMatcher {
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.selector.is_some()
    }

    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        self.selector
            .as_ref()
            .is_some_and(|s| matches_selector(s, node, dom))
    }

    /// Every matching element under `scope` (inclusive), in tree order.
    pub fn find_all(&self, dom: &Dom, scope: NodeId) -> Vec<NodeId> {
        match &self.selector {
            Some(selector) => dom.select_all(scope, selector),
            None => Vec::new(),
        }
    }
}

/// Parse a stored selector into a matcher.
pub fn parse(selector: &str) -> SelectorMatcher {
    SelectorMatcher {
        source: selector.to_string(),
        selector: parse_selector(selector).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeData;

    fn tree() -> (Dom, NodeId, Vec<NodeId>) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div").with_id("surface"));
        let kids = vec![
            dom.insert_child(root, NodeData::element("p").with_id("intro").with_class("lead")),
            dom.insert_child(root, NodeData::element("p").with_classes(["lead", "big"])),
            dom.insert_child(root, NodeData::element("span")),
            dom.insert_child(root, NodeData::element("p")),
            dom.insert_child(root, NodeData::element("p").with_class("md:flex")),
        ];
        (dom, root, kids)
    }

    #[test]
    fn id_wins_over_classes() {
        let (dom, _, kids) = tree();
        assert_eq!(compute(&dom, kids[0]).as_deref(), Some("#intro"));
    }

    #[test]
    fn first_class_token() {
        let (dom, _, kids) = tree();
        assert_eq!(compute(&dom, kids[1]).as_deref(), Some(".lead"));
    }

    #[test]
    fn positional_among_same_tag() {
        let (dom, _, kids) = tree();
        assert_eq!(compute(&dom, kids[2]).as_deref(), Some("span:nth-of-type(1)"));
        assert_eq!(compute(&dom, kids[3]).as_deref(), Some("p:nth-of-type(3)"));
    }

    #[test]
    fn tokens_needing_escapes_fall_through() {
        let (dom, _, kids) = tree();
        assert_eq!(compute(&dom, kids[4]).as_deref(), Some("p:nth-of-type(4)"));
    }

    #[test]
    fn stable_across_repeated_computation() {
        let (dom, _, kids) = tree();
        for &kid in &kids {
            assert_eq!(compute(&dom, kid), compute(&dom, kid));
        }
    }

    #[test]
    fn text_nodes_have_no_selector() {
        let (mut dom, root, _) = tree();
        let text = dom.insert_child(root, NodeData::text("x"));
        assert_eq!(compute(&dom, text), None);
    }

    #[test]
    fn parse_relocates_all_matches() {
        let (dom, root, kids) = tree();
        let matcher = parse(".lead");
        assert_eq!(matcher.find_all(&dom, root), vec![kids[0], kids[1]]);
        for &kid in &kids {
            let selector = compute(&dom, kid).unwrap();
            assert!(parse(&selector).find_all(&dom, root).contains(&kid));
        }
    }

    #[test]
    fn unparseable_matches_nothing() {
        let (dom, root, _) = tree();
        let matcher = parse("p[data-x]");
        assert!(!matcher.is_valid());
        assert!(matcher.find_all(&dom, root).is_empty());
        assert!(!matcher.matches(&dom, root));
    }
}
