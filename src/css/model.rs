//! CSS AST: selectors, declarations, rule sets, at-rule blocks, stylesheet.

use std::fmt::Write as _;

/// A single simple selector inside a compound.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Type selector: matches the tag name (e.g. `h1`).
    Type(String),
    /// Universal selector: `*`.
    Universal,
    /// Class selector: `.classname`.
    Class(String),
    /// ID selector: `#id`.
    Id(String),
    /// `:nth-of-type(k)`, 1-based among same-tag element siblings.
    NthOfType(usize),
    /// `:nth-child(k)`, 1-based among element siblings.
    NthChild(usize),
    /// Any other pseudo-class (`:hover`, `:first-child`, ...).
    PseudoClass(String),
    /// `::before`, `::after`, ... Never matches an element.
    PseudoElement(String),
}

/// A combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
    /// Next-sibling combinator: `A + B`.
    Adjacent,
    /// Subsequent-sibling combinator: `A ~ B`.
    Sibling,
}

/// A sequence of simple selectors without combinators, e.g. `a.cta:hover`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

/// One element in a selector chain: either a compound selector or a combinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    Compound(CompoundSelector),
    Combinator(Combinator),
}

/// A complex selector: compound selectors joined by combinators.
///
/// `parts` alternates and always starts and ends with a compound.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

/// A single declaration, e.g. `color: red !important`.
///
/// The value is kept as source text: generated stylesheets use functions,
/// custom properties and shorthands the editor passes through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important,
        }
    }
}

/// A qualified rule: comma-separated selectors and a declaration block.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    /// Selector texts, split on top-level commas and trimmed.
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
}

/// A top-level stylesheet item.
#[derive(Debug, Clone, PartialEq)]
pub enum CssItem {
    Rule(RuleSet),
    /// Conditional group (`@media`, `@supports`) whose rules are scoped and
    /// cascaded like top-level ones.
    Group { prelude: String, items: Vec<CssItem> },
    /// Any other at-rule (`@keyframes`, `@font-face`, `@import`), kept verbatim.
    Opaque(String),
}

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    pub items: Vec<CssItem>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all items of `other` after this sheet's items.
    pub fn extend(&mut self, other: StyleSheet) {
        self.items.extend(other.items);
    }

    /// Number of qualified rules, including those nested in groups.
    pub fn rule_count(&self) -> usize {
        fn count(items: &[CssItem]) -> usize {
            items
                .iter()
                .map(|item| match item {
                    CssItem::Rule(_) => 1,
                    CssItem::Group { items, .. } => count(items),
                    CssItem::Opaque(_) => 0,
                })
                .sum()
        }
        count(&self.items)
    }

    /// Serialize back to CSS text, one rule per line.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        write_items(&mut out, &self.items, 0);
        out
    }
}

fn write_items(out: &mut String, items: &[CssItem], depth: usize) {
    let indent = "  ".repeat(depth);
    for item in items {
        match item {
            CssItem::Rule(rule) => {
                let body = rule
                    .declarations
                    .iter()
                    .map(|d| {
                        if d.important {
                            format!("{}: {} !important;", d.property, d.value)
                        } else {
                            format!("{}: {};", d.property, d.value)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = writeln!(out, "{indent}{} {{ {body} }}", rule.selectors.join(", "));
            }
            CssItem::Group { prelude, items } => {
                let _ = writeln!(out, "{indent}{prelude} {{");
                write_items(out, items, depth + 1);
                let _ = writeln!(out, "{indent}}}");
            }
            CssItem::Opaque(text) => {
                let _ = writeln!(out, "{indent}{text}");
            }
        }
    }
}
