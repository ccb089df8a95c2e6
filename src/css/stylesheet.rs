//! Stylesheet compilation, selector matching, and computed styles.
//!
//! A [`CompiledStylesheet`] flattens a parsed [`StyleSheet`] (evaluating
//! `@media` groups against a viewport width), parses each selector once, and
//! resolves a node's [`ComputedStyle`] by cascading matching rules, the
//! node's inline style, inherited properties and `var()` references.

use std::collections::HashMap;

use tracing::trace;

use crate::css::length::{expand_box, Length};
use crate::css::model::{
    Combinator, CompoundSelector, CssItem, Declaration, Selector, SelectorComponent, SelectorPart,
    StyleSheet,
};
use crate::css::parser::parse_selector;
use crate::css::specificity::Specificity;
use crate::dom::node::{NodeData, NodeId};
use crate::dom::tree::Dom;
use crate::inspector::ICON_CLASS;

/// Properties a child inherits from its parent when it does not set them.
const INHERITED: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "letter-spacing",
    "line-height",
    "text-align",
    "text-transform",
    "visibility",
    "-webkit-text-fill-color",
];

/// Initial values reported for properties no rule sets.
const INITIAL: &[(&str, &str)] = &[
    ("color", "rgb(0, 0, 0)"),
    ("background-color", "transparent"),
    ("background-image", "none"),
    ("background-clip", "border-box"),
    ("font-size", "16px"),
    ("font-weight", "400"),
    ("font-family", "serif"),
    ("font-style", "normal"),
    ("text-align", "start"),
    ("line-height", "normal"),
    ("letter-spacing", "normal"),
    ("padding-top", "0px"),
    ("padding-right", "0px"),
    ("padding-bottom", "0px"),
    ("padding-left", "0px"),
    ("margin-top", "0px"),
    ("margin-right", "0px"),
    ("margin-bottom", "0px"),
    ("margin-left", "0px"),
    ("border-radius", "0px"),
    ("border", "none"),
    ("width", "auto"),
    ("height", "auto"),
    ("display", "block"),
];

const MAX_VAR_DEPTH: usize = 8;

/// A rule flattened to a single selector with its cascade key.
#[derive(Debug)]
struct CompiledRule {
    selector: Selector,
    declarations: Vec<Declaration>,
    /// Source order, shared by every selector of the same rule.
    order: u32,
}

/// A compiled stylesheet ready for matching against DOM nodes.
#[derive(Debug, Default)]
pub struct CompiledStylesheet {
    rules: Vec<CompiledRule>,
}

impl CompiledStylesheet {
    /// Compile a parsed stylesheet for a viewport of `viewport_width` pixels.
    ///
    /// Selectors that fail to parse are dropped; they can never match.
    pub fn compile(sheet: &StyleSheet, viewport_width: f32) -> Self {
        let mut compiled = Self::default();
        let mut order = 0u32;
        compiled.push_items(&sheet.items, viewport_width, &mut order);
        compiled
    }

    fn push_items(&mut self, items: &[CssItem], viewport_width: f32, order: &mut u32) {
        for item in items {
            match item {
                CssItem::Rule(rule) => {
                    for text in &rule.selectors {
                        match parse_selector(text) {
                            Ok(selector) => self.rules.push(CompiledRule {
                                selector,
                                declarations: rule.declarations.clone(),
                                order: *order,
                            }),
                            Err(err) => trace!(selector = %text, %err, "selector skipped"),
                        }
                    }
                    *order += 1;
                }
                CssItem::Group { prelude, items } => {
                    if group_applies(prelude, viewport_width) {
                        self.push_items(items, viewport_width, order);
                    }
                }
                CssItem::Opaque(_) => {}
            }
        }
    }

    /// Number of compiled (single-selector) rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Declared values for a node: matching rules in cascade order, then its
    /// inline style, then `!important` rules. Shorthands are expanded.
    pub fn cascaded(&self, node: NodeId, dom: &Dom) -> HashMap<String, String> {
        let mut matches: Vec<(Specificity, &Declaration)> = Vec::new();
        for rule in &self.rules {
            if matches_selector(&rule.selector, node, dom) {
                for decl in &rule.declarations {
                    let key = Specificity::from_selector(&rule.selector, rule.order, decl.important);
                    matches.push((key, decl));
                }
            }
        }
        matches.sort_by(|a, b| a.0.cmp(&b.0));

        let mut values = HashMap::new();
        let (important, normal): (Vec<_>, Vec<_>) =
            matches.into_iter().partition(|(key, _)| key.important == 1);

        for (_, decl) in normal {
            apply_declaration(&mut values, &decl.property, &decl.value);
        }
        if let Some(data) = dom.get(node) {
            for (property, value) in data.style.iter() {
                apply_declaration(&mut values, property, value);
            }
        }
        for (_, decl) in important {
            apply_declaration(&mut values, &decl.property, &decl.value);
        }
        values
    }

    /// Resolve the computed style of `node`, inheriting from its ancestors.
    pub fn compute(&self, dom: &Dom, node: NodeId) -> ComputedStyle {
        let parent = dom.parent(node).map(|p| self.compute(dom, p));
        let mut values = self.cascaded(node, dom);

        if let Some(parent) = &parent {
            for &property in INHERITED {
                if !values.contains_key(property) {
                    if let Some(value) = parent.values.get(property) {
                        values.insert(property.to_string(), value.clone());
                    }
                }
            }
            for (property, value) in &parent.values {
                if property.starts_with("--") && !values.contains_key(property) {
                    values.insert(property.clone(), value.clone());
                }
            }
        }

        let custom: HashMap<String, String> = values
            .iter()
            .filter(|(p, _)| p.starts_with("--"))
            .map(|(p, v)| (p.clone(), v.clone()))
            .collect();
        for (property, value) in values.iter_mut() {
            if !property.starts_with("--") && value.contains("var(") {
                *value = substitute_vars(value, &custom, 0);
            }
        }

        ComputedStyle { values }
    }
}

/// Write one declaration into a value map, expanding the shorthands the
/// editor samples as longhands.
fn apply_declaration(values: &mut HashMap<String, String>, property: &str, value: &str) {
    match property {
        "padding" | "margin" => {
            if let Some(sides) = expand_box(value) {
                for (side, v) in ["top", "right", "bottom", "left"].iter().zip(sides) {
                    values.insert(format!("{property}-{side}"), v);
                }
            }
        }
        "background" => {
            let lower = value.to_ascii_lowercase();
            if lower.contains("gradient(") || lower.contains("url(") {
                values.insert("background-image".into(), value.to_string());
                values.insert("background-color".into(), "transparent".into());
            } else {
                values.insert("background-color".into(), value.to_string());
                values.insert("background-image".into(), "none".into());
            }
        }
        _ => {}
    }
    values.insert(property.to_string(), value.to_string());
}

/// Replace `var(--name)` / `var(--name, fallback)` references.
fn substitute_vars(value: &str, custom: &HashMap<String, String>, depth: usize) -> String {
    if depth >= MAX_VAR_DEPTH {
        return value.to_string();
    }
    let Some(start) = value.find("var(") else {
        return value.to_string();
    };
    let inner_start = start + 4;
    let mut depth_parens = 1usize;
    let mut end = None;
    for (i, c) in value[inner_start..].char_indices() {
        match c {
            '(' => depth_parens += 1,
            ')' => {
                depth_parens -= 1;
                if depth_parens == 0 {
                    end = Some(inner_start + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(end) = end else {
        return value.to_string();
    };
    let inner = &value[inner_start..end];
    let (name, fallback) = match inner.split_once(',') {
        Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
        None => (inner.trim(), None),
    };
    let replacement = custom
        .get(name)
        .map(String::as_str)
        .or(fallback)
        .unwrap_or("")
        .to_string();
    let replacement = substitute_vars(&replacement, custom, depth + 1);
    let rest = substitute_vars(&value[end + 1..], custom, depth + 1);
    format!("{}{}{}", &value[..start], replacement, rest)
}

/// Evaluate a group prelude (`@media ...`, `@supports ...`) for a viewport.
fn group_applies(prelude: &str, viewport_width: f32) -> bool {
    let lower = prelude.to_ascii_lowercase();
    let Some(query) = lower.strip_prefix("@media") else {
        // @supports, @layer, @container: assume the host supports it.
        return true;
    };
    // A comma-separated media query list matches if any query matches.
    query
        .split(',')
        .any(|q| media_query_matches(q.trim(), viewport_width))
}

fn media_query_matches(query: &str, viewport_width: f32) -> bool {
    if query.is_empty() {
        return true;
    }
    let (negate, query) = match query.strip_prefix("not ") {
        Some(rest) => (true, rest),
        None => (false, query.strip_prefix("only ").unwrap_or(query)),
    };
    let result = query.split(" and ").all(|term| {
        let term = term.trim();
        match term {
            "all" | "screen" => true,
            "print" | "speech" => false,
            _ => {
                let Some(feature) = term.strip_prefix('(').and_then(|t| t.strip_suffix(')')) else {
                    return false;
                };
                let Some((name, value)) = feature.split_once(':') else {
                    return false;
                };
                let limit = Length::parse(value).and_then(|l| l.to_px((viewport_width, 0.0)));
                match (name.trim(), limit) {
                    ("max-width", Some(px)) => viewport_width <= px,
                    ("min-width", Some(px)) => viewport_width >= px,
                    _ => false,
                }
            }
        }
    });
    result != negate
}

// ---------------------------------------------------------------------------
// ComputedStyle
// ---------------------------------------------------------------------------

/// Resolved property values for one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    values: HashMap<String, String>,
}

impl ComputedStyle {
    /// The value set by a rule, inline style, or inheritance.
    pub fn specified(&self, property: &str) -> Option<&str> {
        self.values.get(property).map(String::as_str)
    }

    /// The resolved value, falling back to the property's initial value and
    /// then to the empty string.
    pub fn get(&self, property: &str) -> String {
        self.specified(property)
            .or_else(|| {
                INITIAL
                    .iter()
                    .find(|(p, _)| *p == property)
                    .map(|(_, v)| *v)
            })
            .unwrap_or_default()
            .to_string()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComputedStyle {
    /// Build a style from already-resolved values. Shorthands are expanded
    /// the same way the cascade expands them.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = HashMap::new();
        for (property, value) in iter {
            let (property, value) = (property.into(), value.into());
            apply_declaration(&mut values, &property, &value);
        }
        Self { values }
    }
}

/// Whether a color value paints nothing.
pub fn is_transparent(value: &str) -> bool {
    let v: String = value
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if v.is_empty() || v == "transparent" {
        return true;
    }
    if let Some(args) = v
        .strip_prefix("rgba(")
        .or_else(|| v.strip_prefix("hsla("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return args
            .split(',')
            .nth(3)
            .and_then(|a| a.trim_end_matches('%').parse::<f32>().ok())
            .is_some_and(|alpha| alpha == 0.0);
    }
    false
}

// ---------------------------------------------------------------------------
// Selector matching
// ---------------------------------------------------------------------------

/// Check whether a full selector matches a given node.
///
/// Walks the selector parts from right to left, matching compound selectors
/// and navigating the DOM tree via combinators.
pub fn matches_selector(selector: &Selector, node_id: NodeId, dom: &Dom) -> bool {
    let parts = &selector.parts;
    let Some(SelectorPart::Compound(last)) = parts.last() else {
        return false;
    };
    if !matches_compound(last, node_id, dom) {
        return false;
    }
    matches_from(parts, parts.len() - 1, node_id, dom)
}

/// Match `parts[..idx]` leftward, given that `parts[idx]` matched `node`.
fn matches_from(parts: &[SelectorPart], idx: usize, node: NodeId, dom: &Dom) -> bool {
    if idx == 0 {
        return true;
    }
    let (SelectorPart::Combinator(combinator), Some(SelectorPart::Compound(compound))) =
        (&parts[idx - 1], idx.checked_sub(2).and_then(|i| parts.get(i)))
    else {
        return false;
    };
    let next = idx - 2;

    let candidates: Vec<NodeId> = match combinator {
        Combinator::Child => dom.parent(node).into_iter().collect(),
        Combinator::Descendant => dom.ancestors(node),
        Combinator::Adjacent => dom.preceding_element_siblings(node).into_iter().take(1).collect(),
        Combinator::Sibling => dom.preceding_element_siblings(node),
    };

    // Backtrack over every candidate so `.a .b .c` finds any valid chain.
    candidates
        .into_iter()
        .any(|candidate| matches_compound(compound, candidate, dom) && matches_from(parts, next, candidate, dom))
}

/// Check whether a compound selector matches a single node.
fn matches_compound(compound: &CompoundSelector, node_id: NodeId, dom: &Dom) -> bool {
    let Some(node) = dom.get(node_id) else {
        return false;
    };
    if !node.is_element() {
        return false;
    }
    compound.components.iter().all(|component| match component {
        SelectorComponent::Type(name) => node.tag == *name,
        SelectorComponent::Class(name) => node.has_class(name),
        SelectorComponent::Id(name) => node.id.as_deref() == Some(name.as_str()),
        SelectorComponent::Universal => true,
        SelectorComponent::NthOfType(k) => nth_of_type(dom, node_id, node) == Some(*k),
        SelectorComponent::NthChild(k) => {
            dom.parent(node_id).is_some() && dom.preceding_element_siblings(node_id).len() + 1 == *k
        }
        SelectorComponent::PseudoClass(name) => match name.as_str() {
            "first-child" => {
                dom.parent(node_id).is_some() && dom.preceding_element_siblings(node_id).is_empty()
            }
            "last-child" => dom.parent(node_id).is_some_and(|p| {
                dom.element_children(p).last() == Some(&node_id)
            }),
            // Interaction states (:hover, :focus, ...) never hold in the
            // sampled resting state.
            _ => false,
        },
        SelectorComponent::PseudoElement(_) => false,
    })
}

/// 1-based position of `node` among its same-tag element siblings.
pub fn nth_of_type(dom: &Dom, node_id: NodeId, node: &NodeData) -> Option<usize> {
    dom.parent(node_id)?;
    let before = dom
        .preceding_element_siblings(node_id)
        .into_iter()
        .filter(|&s| dom.get(s).is_some_and(|d| d.tag == node.tag && !d.has_class(ICON_CLASS)))
        .count();
    Some(before + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_stylesheet;
    use crate::dom::node::NodeData;

    /// ```text
    /// div#root
    /// ├── header.site
    /// │   └── h1.title
    /// └── main
    ///     ├── p.lead
    ///     └── p
    /// ```
    fn build_dom() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div").with_id("root"));
        let header = dom.insert_child(root, NodeData::element("header").with_class("site"));
        let h1 = dom.insert_child(header, NodeData::element("h1").with_class("title"));
        let main = dom.insert_child(root, NodeData::element("main"));
        let p1 = dom.insert_child(main, NodeData::element("p").with_class("lead"));
        let p2 = dom.insert_child(main, NodeData::element("p"));
        (dom, root, header, h1, main, p1, p2)
    }

    fn compile(css: &str) -> CompiledStylesheet {
        CompiledStylesheet::compile(&parse_stylesheet(css), 1280.0)
    }

    fn matches(sel: &str, dom: &Dom, node: NodeId) -> bool {
        matches_selector(&parse_selector(sel).unwrap(), node, dom)
    }

    // ── Selector matching ────────────────────────────────────────────

    #[test]
    fn match_simple() {
        let (dom, root, _, h1, ..) = build_dom();
        assert!(matches("h1", &dom, h1));
        assert!(matches(".title", &dom, h1));
        assert!(matches("#root", &dom, root));
        assert!(matches("*", &dom, h1));
        assert!(!matches("p", &dom, h1));
    }

    #[test]
    fn match_descendant_backtracks() {
        let (dom, _, _, h1, ..) = build_dom();
        assert!(matches("#root h1", &dom, h1));
        assert!(matches("#root .site .title", &dom, h1));
        assert!(!matches("main h1", &dom, h1));
    }

    #[test]
    fn match_child_and_siblings() {
        let (dom, _, _, h1, main, p1, p2) = build_dom();
        assert!(matches(".site > h1", &dom, h1));
        assert!(!matches("#root > h1", &dom, h1));
        assert!(matches(".lead + p", &dom, p2));
        assert!(matches("header ~ main", &dom, main));
        assert!(!matches("p + .lead", &dom, p1));
    }

    #[test]
    fn match_structural_pseudo_classes() {
        let (dom, _, _, _, main, p1, p2) = build_dom();
        assert!(matches("p:nth-of-type(2)", &dom, p2));
        assert!(matches("p:first-child", &dom, p1));
        assert!(matches("p:last-child", &dom, p2));
        assert!(matches("main:nth-child(2)", &dom, main));
        assert!(!matches("p:hover", &dom, p1));
        assert!(!matches("p::before", &dom, p1));
    }

    #[test]
    fn nth_of_type_counts_same_tag_only() {
        let (mut dom, _, _, _, main, _, p2) = build_dom();
        let span = dom.insert_child(main, NodeData::element("span"));
        assert_eq!(nth_of_type(&dom, span, dom.get(span).unwrap()), Some(1));
        assert_eq!(nth_of_type(&dom, p2, dom.get(p2).unwrap()), Some(2));
        let root = dom.root().unwrap();
        assert_eq!(nth_of_type(&dom, root, dom.get(root).unwrap()), None);
    }

    #[test]
    fn nth_of_type_ignores_inserted_icons() {
        let (mut dom, _, _, _, main, _, _) = build_dom();
        let first = dom.insert_child(main, NodeData::element("span"));
        let icon = dom.insert_child_at(main, 0, NodeData::element("span").with_class(ICON_CLASS));
        assert_eq!(nth_of_type(&dom, first, dom.get(first).unwrap()), Some(1));
        assert_eq!(nth_of_type(&dom, icon, dom.get(icon).unwrap()), Some(1));
    }

    // ── Cascade ──────────────────────────────────────────────────────

    #[test]
    fn specificity_then_source_order() {
        let (dom, _, _, h1, ..) = build_dom();
        let sheet = compile(".title { color: red; } h1 { color: blue; } h1 { font-size: 40px; } h1 { font-size: 48px; }");
        let style = sheet.compute(&dom, h1);
        assert_eq!(style.get("color"), "red");
        assert_eq!(style.get("font-size"), "48px");
    }

    #[test]
    fn inline_beats_rules_but_not_important() {
        let (mut dom, _, _, h1, ..) = build_dom();
        dom.get_mut(h1).unwrap().style.set("color", "green");
        dom.get_mut(h1).unwrap().style.set("font-weight", "700");
        let sheet = compile("#root .title { color: red; } h1 { font-weight: 300 !important; }");
        let style = sheet.compute(&dom, h1);
        assert_eq!(style.get("color"), "green");
        assert_eq!(style.get("font-weight"), "300");
    }

    #[test]
    fn inheritance_and_initial_values() {
        let (dom, _, _, h1, ..) = build_dom();
        let sheet = compile("#root { color: #333; background-color: #fff; }");
        let style = sheet.compute(&dom, h1);
        assert_eq!(style.get("color"), "#333");
        // background does not inherit
        assert_eq!(style.get("background-color"), "transparent");
        assert_eq!(style.get("padding-top"), "0px");
        assert_eq!(style.specified("padding-top"), None);
    }

    #[test]
    fn shorthand_expansion() {
        let (dom, _, _, h1, ..) = build_dom();
        let sheet = compile("h1 { padding: 4px 8px; background: linear-gradient(90deg, red, blue); }");
        let style = sheet.compute(&dom, h1);
        assert_eq!(style.get("padding-left"), "8px");
        assert_eq!(style.get("padding-bottom"), "4px");
        assert_eq!(style.get("background-image"), "linear-gradient(90deg, red, blue)");
        assert_eq!(style.get("background-color"), "transparent");
    }

    #[test]
    fn var_substitution_with_inheritance_and_fallback() {
        let (dom, _, _, h1, ..) = build_dom();
        let sheet = compile(
            "#root { --brand: #667eea; } h1 { color: var(--brand); border: 1px solid var(--missing, red); }",
        );
        let style = sheet.compute(&dom, h1);
        assert_eq!(style.get("color"), "#667eea");
        assert_eq!(style.get("border"), "1px solid red");
    }

    #[test]
    fn media_queries_follow_viewport() {
        let (dom, _, _, h1, ..) = build_dom();
        let sheet = parse_stylesheet("h1 { font-size: 48px; } @media (max-width: 768px) { h1 { font-size: 32px; } }");
        let wide = CompiledStylesheet::compile(&sheet, 1280.0);
        let narrow = CompiledStylesheet::compile(&sheet, 375.0);
        assert_eq!(wide.compute(&dom, h1).get("font-size"), "48px");
        assert_eq!(narrow.compute(&dom, h1).get("font-size"), "32px");
    }

    #[test]
    fn media_query_terms() {
        assert!(group_applies("@media screen and (min-width: 600px)", 800.0));
        assert!(!group_applies("@media print", 800.0));
        assert!(group_applies("@media print, (max-width: 900px)", 800.0));
        assert!(group_applies("@media not print", 800.0));
        assert!(!group_applies("@media (prefers-reduced-motion: reduce)", 800.0));
        assert!(group_applies("@supports (display: grid)", 800.0));
    }

    #[test]
    fn unparseable_selectors_are_dropped() {
        let sheet = compile("a[href], .ok { color: red; }");
        assert_eq!(sheet.len(), 1);
    }

    #[test]
    fn transparency() {
        assert!(is_transparent("transparent"));
        assert!(is_transparent("rgba(0, 0, 0, 0)"));
        assert!(is_transparent(""));
        assert!(!is_transparent("rgba(0, 0, 0, 0.5)"));
        assert!(!is_transparent("#fff"));
    }
}
