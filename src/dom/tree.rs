//! Tree operations: insert, remove, detach/attach, walk, text access.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId, NodeKind};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The central DOM tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// A detached node keeps its subtree in the arena until it is re-attached or
/// removed.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
        }
    }

    /// Insert a parentless node. The first one inserted becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let index = self.children(parent).len();
        self.insert_child_at(parent, index, data)
    }

    /// Insert a node as a child of `parent` at position `index` (clamped).
    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, data: NodeData) -> NodeId {
        debug_assert!(
            self.nodes.contains_key(parent),
            "parent node does not exist"
        );
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        self.attach_at(id, parent, index);
        id
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        self.detach(id);

        if self.root == Some(id) {
            self.root = None;
        }

        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Remove every child of `id` (and their subtrees).
    pub fn clear_children(&mut self, id: NodeId) {
        let kids = self.children(id).to_vec();
        for child in kids {
            self.remove(child);
        }
    }

    /// Unlink `id` from its parent, keeping it and its subtree in the arena.
    ///
    /// Returns the index it occupied among its siblings.
    pub fn detach(&mut self, id: NodeId) -> Option<usize> {
        let parent_id = self.parent.remove(id)?;
        let siblings = self.children.get_mut(parent_id)?;
        let index = siblings.iter().position(|&child| child == id)?;
        siblings.remove(index);
        Some(index)
    }

    /// Link an existing (detached) node under `parent` at `index` (clamped).
    pub fn attach_at(&mut self, id: NodeId, parent: NodeId, index: usize) {
        debug_assert!(self.nodes.contains_key(id), "node does not exist");
        self.detach(id);
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            let index = index.min(siblings.len());
            siblings.insert(index, id);
        }
    }

    /// Move `node` to become the last child of `new_parent`.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        let index = self.children(new_parent).len();
        self.attach_at(node, new_parent, index);
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Children that are elements (text nodes skipped).
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.get(child).is_some_and(NodeData::is_element))
            .collect()
    }

    pub fn has_element_children(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .any(|&child| self.get(child).is_some_and(NodeData::is_element))
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Element siblings that come before `id`, nearest first.
    pub fn preceding_element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.element_children(parent);
        match siblings.iter().position(|&s| s == id) {
            Some(pos) => siblings[..pos].iter().rev().copied().collect(),
            None => Vec::new(),
        }
    }

    /// Walk from `id` up to the root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `id` is `ancestor` or lies inside its subtree.
    pub fn is_inclusive_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        id == ancestor || self.ancestors(id).contains(&ancestor)
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Explicitly set the root node.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Deep-copy `source_id` from another arena as the last child of `parent`.
    pub fn import_subtree(&mut self, parent: NodeId, source: &Dom, source_id: NodeId) -> Option<NodeId> {
        let data = source.get(source_id)?.clone();
        let id = self.insert_child(parent, data);
        for &child in source.children(source_id) {
            self.import_subtree(id, source, child);
        }
        Some(id)
    }

    /// Concatenated text of every text node under `id`, in document order.
    pub fn text_of(&self, id: NodeId) -> String {
        self.walk_depth_first(id)
            .into_iter()
            .filter_map(|n| self.get(n).and_then(NodeData::text_content))
            .collect()
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        if !text.is_empty() {
            self.insert_child(id, NodeData::text(text));
        }
    }

    /// Overwrite the content of a text node in place.
    pub fn set_text_node(&mut self, id: NodeId, text: &str) {
        if let Some(data) = self.get_mut(id) {
            if let NodeKind::Text(content) = &mut data.kind {
                *content = text.to_owned();
            }
        }
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///       body
    ///      /    \
    ///  section    p
    ///   / \
    ///  h1  "text"
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let body = dom.insert(NodeData::element("body"));
        let section = dom.insert_child(body, NodeData::element("section").with_class("hero"));
        let p = dom.insert_child(body, NodeData::element("p"));
        let h1 = dom.insert_child(section, NodeData::element("h1").with_id("title"));
        let text = dom.insert_child(section, NodeData::text("text"));
        (dom, body, section, p, h1, text)
    }

    #[test]
    fn insert_sets_root() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::element("html"));
        let _second = dom.insert(NodeData::element("orphan"));
        assert_eq!(dom.root(), Some(id));
    }

    #[test]
    fn children_and_parent() {
        let (dom, body, section, p, h1, text) = build_tree();
        assert_eq!(dom.children(body), &[section, p]);
        assert_eq!(dom.children(section), &[h1, text]);
        assert_eq!(dom.parent(h1), Some(section));
        assert_eq!(dom.parent(body), None);
    }

    #[test]
    fn element_children_skip_text() {
        let (dom, _body, section, _p, h1, _text) = build_tree();
        assert_eq!(dom.element_children(section), vec![h1]);
        assert!(dom.has_element_children(section));
        assert!(!dom.has_element_children(h1));
    }

    #[test]
    fn insert_child_at_position() {
        let (mut dom, body, section, p, ..) = build_tree();
        let nav = dom.insert_child_at(body, 0, NodeData::element("nav"));
        assert_eq!(dom.children(body), &[nav, section, p]);
        let footer = dom.insert_child_at(body, 99, NodeData::element("footer"));
        assert_eq!(dom.children(body).last(), Some(&footer));
    }

    #[test]
    fn detach_keeps_subtree_alive() {
        let (mut dom, body, section, p, h1, _text) = build_tree();
        assert_eq!(dom.detach(section), Some(0));
        assert_eq!(dom.children(body), &[p]);
        assert!(dom.contains(section));
        assert!(dom.contains(h1));
        assert_eq!(dom.parent(section), None);

        dom.attach_at(section, body, 0);
        assert_eq!(dom.children(body), &[section, p]);
        assert_eq!(dom.parent(section), Some(body));
    }

    #[test]
    fn remove_subtree() {
        let (mut dom, body, section, p, h1, text) = build_tree();
        let removed = dom.remove(section);
        assert_eq!(removed.map(|d| d.tag), Some("section".to_owned()));
        assert!(!dom.contains(h1));
        assert!(!dom.contains(text));
        assert_eq!(dom.children(body), &[p]);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_root_clears_root() {
        let (mut dom, body, ..) = build_tree();
        dom.remove(body);
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }

    #[test]
    fn stale_id_does_not_resolve() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::element("div"));
        dom.remove(id);
        let _fresh = dom.insert(NodeData::element("div"));
        assert!(dom.get(id).is_none());
        assert!(dom.remove(id).is_none());
    }

    #[test]
    fn ancestors_and_descendant_check() {
        let (dom, body, section, p, h1, _text) = build_tree();
        assert_eq!(dom.ancestors(h1), vec![section, body]);
        assert!(dom.is_inclusive_descendant(h1, body));
        assert!(dom.is_inclusive_descendant(body, body));
        assert!(!dom.is_inclusive_descendant(p, section));
    }

    #[test]
    fn preceding_siblings_nearest_first() {
        let mut dom = Dom::new();
        let ul = dom.insert(NodeData::element("ul"));
        let a = dom.insert_child(ul, NodeData::element("li"));
        dom.insert_child(ul, NodeData::text(" "));
        let b = dom.insert_child(ul, NodeData::element("li"));
        let c = dom.insert_child(ul, NodeData::element("li"));
        assert_eq!(dom.preceding_element_siblings(c), vec![b, a]);
        assert!(dom.preceding_element_siblings(a).is_empty());
    }

    #[test]
    fn walk_depth_first_order() {
        let (dom, body, section, p, h1, text) = build_tree();
        assert_eq!(dom.walk_depth_first(body), vec![body, section, h1, text, p]);
    }

    #[test]
    fn text_helpers() {
        let (mut dom, _body, section, _p, h1, text) = build_tree();
        dom.set_text(h1, "Hello ");
        assert_eq!(dom.text_of(section), "Hello text");
        dom.set_text_node(text, "world");
        assert_eq!(dom.text_of(section), "Hello world");
        dom.set_text(h1, "");
        assert!(dom.children(h1).is_empty());
    }

    #[test]
    fn index_in_parent() {
        let (dom, body, _section, p, ..) = build_tree();
        assert_eq!(dom.index_in_parent(p), Some(1));
        assert_eq!(dom.index_in_parent(body), None);
    }
}
