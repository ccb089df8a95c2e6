//! Inline style maps: the parsed form of a node's `style` attribute.

use crate::css::parser::parse_declarations;

/// Ordered `property: value` pairs written directly on a node.
///
/// Property names are normalized to lowercase (custom properties excepted),
/// and setting an existing property replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    entries: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value. `!important` flags are dropped:
    /// inline declarations already outrank every normal rule.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        for decl in parse_declarations(text) {
            style.set(&decl.property, &decl.value);
        }
        style
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let property = normalize(property);
        self.entries
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property. An empty value removes it.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = normalize(property);
        let value = value.trim();
        if value.is_empty() {
            self.remove(&property);
            return;
        }
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.entries.push((property, value.to_string())),
        }
    }

    pub fn remove(&mut self, property: &str) {
        let property = normalize(property);
        self.entries.retain(|(p, _)| *p != property);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serialize as a `style` attribute value.
    pub fn to_css(&self) -> String {
        self.entries
            .iter()
            .map(|(p, v)| format!("{p}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn normalize(property: &str) -> String {
    let property = property.trim();
    if property.starts_with("--") {
        property.to_string()
    } else {
        property.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_get() {
        let style = InlineStyle::parse("Color: red; background: linear-gradient(90deg, #fff, #000)");
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("COLOR"), Some("red"));
        assert_eq!(style.get("background"), Some("linear-gradient(90deg, #fff, #000)"));
        assert_eq!(style.len(), 2);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut style = InlineStyle::parse("color: red; margin: 0");
        style.set("color", "blue");
        assert_eq!(style.to_css(), "color: blue; margin: 0;");
    }

    #[test]
    fn empty_value_removes() {
        let mut style = InlineStyle::parse("color: red");
        style.set("color", "  ");
        assert!(style.is_empty());
    }

    #[test]
    fn important_flag_dropped() {
        let style = InlineStyle::parse("color: red !important");
        assert_eq!(style.get("color"), Some("red"));
    }

    #[test]
    fn custom_properties_keep_case() {
        let mut style = InlineStyle::new();
        style.set("--Brand", "#111");
        assert_eq!(style.get("--Brand"), Some("#111"));
        assert_eq!(style.get("--brand"), None);
    }
}
