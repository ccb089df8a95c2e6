//! Node types: NodeId, NodeData, NodeKind.

use slotmap::new_key_type;

use crate::css::inline::InlineStyle;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    ///
    /// Keys are generational: an id whose node has been removed never
    /// resolves to a node inserted later.
    pub struct NodeId;
}

/// Element vs text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text(String),
}

/// Transient interaction outlines. Never serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outline {
    pub hovered: bool,
    pub selected: bool,
}

/// Data associated with a single DOM node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Lowercase tag name. Text nodes use `#text`.
    pub tag: String,
    pub kind: NodeKind,
    /// Optional `id` attribute (CSS #id selector).
    pub id: Option<String>,
    /// Class tokens in document order (for .class selector).
    pub classes: Vec<String>,
    /// Remaining attributes, in document order.
    pub attributes: Vec<(String, String)>,
    /// Parsed `style` attribute.
    pub style: InlineStyle,
    pub outline: Outline,
}

impl NodeData {
    /// Create an element node with the given tag name.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            kind: NodeKind::Element,
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            style: InlineStyle::new(),
            outline: Outline::default(),
        }
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: "#text".to_owned(),
            kind: NodeKind::Text(content.into()),
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            style: InlineStyle::new(),
            outline: Outline::default(),
        }
    }

    /// Set the id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a single class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Add multiple classes (builder).
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for class in classes {
            let class = class.into();
            if !self.classes.contains(&class) {
                self.classes.push(class);
            }
        }
        self
    }

    /// Set a plain attribute (builder).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set one inline style declaration (builder).
    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.style.set(property, value);
        self
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element)
    }

    /// Text content of a text node, `None` for elements.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element => None,
        }
    }

    /// The `id` if present and non-empty.
    pub fn identity(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Check whether this node has a given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_defaults() {
        let data = NodeData::element("DIV");
        assert_eq!(data.tag, "div");
        assert!(data.is_element());
        assert!(data.id.is_none());
        assert!(data.classes.is_empty());
        assert_eq!(data.outline, Outline::default());
    }

    #[test]
    fn text_node() {
        let data = NodeData::text("Hello");
        assert_eq!(data.tag, "#text");
        assert!(!data.is_element());
        assert_eq!(data.text_content(), Some("Hello"));
    }

    #[test]
    fn builder_with_class_dedup() {
        let data = NodeData::element("p").with_class("lead").with_class("lead");
        assert_eq!(data.classes, vec!["lead"]);
    }

    #[test]
    fn builder_with_classes_dedup() {
        let data = NodeData::element("p").with_class("a").with_classes(["a", "b"]);
        assert_eq!(data.classes, vec!["a", "b"]);
    }

    #[test]
    fn identity_ignores_blank_id() {
        assert_eq!(NodeData::element("p").with_id("  ").identity(), None);
        assert_eq!(NodeData::element("p").with_id("hero").identity(), Some("hero"));
    }

    #[test]
    fn attributes_replace_and_remove() {
        let mut data = NodeData::element("a").with_attribute("href", "/a");
        data.set_attribute("HREF", "/b");
        assert_eq!(data.attribute("href"), Some("/b"));
        assert_eq!(data.attributes.len(), 1);
        data.remove_attribute("href");
        assert!(data.attribute("href").is_none());
    }

    #[test]
    fn remove_class_noop() {
        let mut data = NodeData::element("p");
        data.remove_class("missing");
        assert!(data.classes.is_empty());
    }

    #[test]
    fn node_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<NodeId>();
    }
}
