//! Stylesheet scoping: confine generated rules to the surface root.

use crate::css::model::{CssItem, Declaration, RuleSet, StyleSheet};
use crate::css::parser::parse_stylesheet;

/// Rewrite every rule so it can only match inside `scope` (a selector such as
/// `#pagecraft-surface`), with baseline reset rules placed first.
pub fn scope_stylesheet(source: &str, scope: &str) -> StyleSheet {
    let parsed = parse_stylesheet(source);
    let mut scoped = baseline_rules(scope);
    scoped.items.extend(scope_items(parsed.items, scope));
    scoped
}

/// Full-bleed sizing and border-box sizing for the surface only.
pub fn baseline_rules(scope: &str) -> StyleSheet {
    StyleSheet {
        items: vec![
            CssItem::Rule(RuleSet {
                selectors: vec![scope.to_string()],
                declarations: vec![
                    Declaration::new("margin", "0", false),
                    Declaration::new("padding", "0", false),
                    Declaration::new("width", "100%", false),
                    Declaration::new("min-height", "100%", false),
                    Declaration::new("box-sizing", "border-box", false),
                ],
            }),
            CssItem::Rule(RuleSet {
                selectors: vec![
                    format!("{scope} *"),
                    format!("{scope} *::before"),
                    format!("{scope} *::after"),
                ],
                declarations: vec![Declaration::new("box-sizing", "inherit", false)],
            }),
        ],
    }
}

fn scope_items(items: Vec<CssItem>, scope: &str) -> Vec<CssItem> {
    items
        .into_iter()
        .map(|item| match item {
            CssItem::Rule(rule) => CssItem::Rule(RuleSet {
                selectors: rule
                    .selectors
                    .iter()
                    .map(|s| scope_selector(s, scope))
                    .collect(),
                declarations: rule.declarations,
            }),
            CssItem::Group { prelude, items } => CssItem::Group {
                prelude,
                items: scope_items(items, scope),
            },
            opaque @ CssItem::Opaque(_) => opaque,
        })
        .collect()
}

/// Scope one selector.
///
/// `html`, `:root` and `body` name the surface root itself, so
/// `body.dark > h1` becomes `#s.dark > h1`; anything else becomes a
/// descendant of the surface root. Already scoped selectors are kept.
pub fn scope_selector(selector: &str, scope: &str) -> String {
    let mut rest = selector.trim();
    if rest == scope || rest.starts_with(&format!("{scope} ")) {
        return rest.to_string();
    }

    let mut document_level = false;
    for word in ["html", ":root"] {
        if let Some(after) = strip_word(rest, word) {
            document_level = true;
            if after.is_empty() || !(after.starts_with(char::is_whitespace) || after.starts_with('>')) {
                return format!("{scope}{after}");
            }
            rest = after.trim_start().trim_start_matches('>').trim_start();
            break;
        }
    }

    if let Some(after) = strip_word(rest, "body") {
        return format!("{scope}{after}");
    }
    if document_level && rest.is_empty() {
        return scope.to_string();
    }
    format!("{scope} {rest}")
}

/// Strip a leading type selector `word` (case-insensitive) when it is a whole
/// identifier.
fn strip_word<'a>(input: &'a str, word: &str) -> Option<&'a str> {
    let head = input.get(..word.len())?;
    if !head.eq_ignore_ascii_case(word) {
        return None;
    }
    let after = &input[word.len()..];
    match after.chars().next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '-' || c == '_' => None,
        _ => Some(after),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const S: &str = "#surface";

    #[test]
    fn document_selectors_target_surface_root() {
        assert_eq!(scope_selector("body", S), "#surface");
        assert_eq!(scope_selector("html", S), "#surface");
        assert_eq!(scope_selector(":root", S), "#surface");
        assert_eq!(scope_selector("html body", S), "#surface");
        assert_eq!(scope_selector("html > body .x", S), "#surface .x");
        assert_eq!(scope_selector("body.dark > h1", S), "#surface.dark > h1");
        assert_eq!(scope_selector("html.dark", S), "#surface.dark");
    }

    #[test]
    fn other_selectors_become_descendants() {
        assert_eq!(scope_selector("h1", S), "#surface h1");
        assert_eq!(scope_selector("*", S), "#surface *");
        assert_eq!(scope_selector("html h1", S), "#surface h1");
        assert_eq!(scope_selector("bodyguard", S), "#surface bodyguard");
        assert_eq!(scope_selector("#surface h1", S), "#surface h1");
    }

    #[test]
    fn groups_scoped_recursively_and_opaque_kept() {
        let sheet = scope_stylesheet(
            "@import url(a.css); body { margin: 0 } @media (max-width: 600px) { .hero, p { padding: 1rem } } \
             @keyframes spin { from { transform: rotate(0) } to { transform: rotate(360deg) } }",
            S,
        );
        let css = sheet.to_css();
        assert!(css.starts_with("#surface { margin: 0; padding: 0;"));
        assert!(css.contains("@import url(a.css);"));
        assert!(css.contains("#surface { margin: 0; }"));
        assert!(css.contains("#surface .hero, #surface p { padding: 1rem; }"));
        assert!(css.contains("@keyframes spin"));
        assert!(!css.contains("#surface from"));
    }
}
