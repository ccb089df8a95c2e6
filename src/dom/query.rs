//! DOM queries scoped to a subtree: by id, class, tag, predicate, and
//! parsed selector.

use super::node::{NodeData, NodeId};
use super::tree::Dom;
use crate::css::model::Selector;
use crate::css::stylesheet::matches_selector;

impl Dom {
    /// First element under `scope` (inclusive, tree order) with the given id.
    pub fn query_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .find(|&n| self.get(n).is_some_and(|d| d.id.as_deref() == Some(id)))
    }

    /// All elements under `scope` (inclusive) carrying the class.
    pub fn query_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.query_all(scope, |data| data.has_class(class))
    }

    /// All elements under `scope` (inclusive) with the tag name.
    pub fn query_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.query_all(scope, |data| data.is_element() && data.tag.eq_ignore_ascii_case(tag))
    }

    /// All nodes under `scope` (inclusive) matching a predicate, in tree order.
    pub fn query_all(&self, scope: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .filter(|&n| self.get(n).is_some_and(&predicate))
            .collect()
    }

    /// All elements under `scope` (inclusive) matching a parsed selector.
    pub fn select_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .filter(|&n| self.get(n).is_some_and(NodeData::is_element))
            .filter(|&n| matches_selector(selector, n, self))
            .collect()
    }
}
