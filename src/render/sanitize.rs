//! Markup sanitization and incidental fragment stripping.

use std::sync::OnceLock;

use regex::Regex;

use crate::dom::{Dom, NodeId, NodeKind};

/// Elements removed with their content.
const DROPPED_ELEMENTS: &[&str] = &["script", "noscript", "iframe", "object", "embed"];

/// Attributes that may carry a URL.
const URL_ATTRIBUTES: &[&str] = &["href", "src", "action", "formaction", "xlink:href", "poster"];

/// Result of sanitizing one subtree.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Sanitized {
    /// Text of `<style>` elements lifted out of the markup.
    pub styles: Vec<String>,
    /// Count of dropped elements and attributes.
    pub removed: usize,
}

/// Remove active content under `scope` (exclusive) and lift `<style>`
/// elements out of the markup.
pub fn sanitize(dom: &mut Dom, scope: NodeId) -> Sanitized {
    let mut result = Sanitized::default();

    for id in dom.walk_depth_first(scope) {
        if id == scope || !dom.contains(id) {
            continue;
        }
        let Some(tag) = dom.get(id).map(|d| d.tag.clone()) else {
            continue;
        };
        if tag == "style" {
            let text = dom.text_of(id);
            if !text.trim().is_empty() {
                result.styles.push(text.trim().to_string());
            }
            dom.remove(id);
            continue;
        }
        if DROPPED_ELEMENTS.contains(&tag.as_str()) {
            dom.remove(id);
            result.removed += 1;
            continue;
        }
        if let Some(data) = dom.get_mut(id) {
            let before = data.attributes.len();
            data.attributes.retain(|(name, value)| {
                !(name.starts_with("on")
                    || (URL_ATTRIBUTES.contains(&name.as_str()) && is_script_url(value)))
            });
            result.removed += before - data.attributes.len();
        }
    }

    result
}

fn is_script_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.starts_with("javascript:") || compact.starts_with("vbscript:")
}

// ---------------------------------------------------------------------------
// Fragment stripping
// ---------------------------------------------------------------------------

fn entity_regex() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| {
        Regex::new(r"&(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);").expect("entity pattern")
    })
}

fn bare_html_regex() -> &'static Regex {
    static BARE: OnceLock<Regex> = OnceLock::new();
    BARE.get_or_init(|| {
        Regex::new(r"(?i)^(?:`{3}|\.{2,}|\x{2026})?\s*html\s*(?:`{3}|\.{2,}|\x{2026})?$")
            .expect("bare html pattern")
    })
}

/// A `>` that closes a tag or attribute, not a spaced prose arrow.
fn tag_end_regex() -> &'static Regex {
    static TAG_END: OnceLock<Regex> = OnceLock::new();
    TAG_END.get_or_init(|| Regex::new(r#"[\w"'/]>$"#).expect("tag end pattern"))
}

/// Whether trimmed text looks like markup syntax that leaked into content.
pub fn looks_like_leaked_markup(text: &str) -> bool {
    text.starts_with('<')
        || tag_end_regex().is_match(text)
        || text.contains("</")
        || text.contains("/>")
        || entity_regex().is_match(text)
        || bare_html_regex().is_match(text)
}

/// Emoji and pictographic code points.
pub fn is_pictographic(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2B00..=0x2BFF | 0x2300..=0x23FF | 0x3030 | 0x303D | 0x3297 | 0x3299
    )
}

/// Whether a text node should be removed as an incidental fragment.
///
/// `under_root` is true for text sitting directly under the surface root,
/// where whitespace-only runs are layout noise.
pub fn is_incidental_fragment(text: &str, under_root: bool, limit: usize) -> bool {
    if text.chars().any(is_pictographic) {
        return false;
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return under_root;
    }
    trimmed.chars().count() < limit && looks_like_leaked_markup(trimmed)
}

/// Remove incidental text fragments under `root`. Returns how many were
/// removed.
pub fn strip_fragments(dom: &mut Dom, root: NodeId, limit: usize) -> usize {
    let doomed: Vec<NodeId> = dom
        .walk_depth_first(root)
        .into_iter()
        .filter(|&id| match dom.get(id).map(|d| &d.kind) {
            Some(NodeKind::Text(text)) => {
                let under_root = dom.parent(id) == Some(root);
                let raw = dom
                    .parent(id)
                    .and_then(|p| dom.get(p))
                    .is_some_and(|p| p.tag == "textarea" || p.tag == "pre");
                !raw && is_incidental_fragment(text, under_root, limit)
            }
            _ => false,
        })
        .collect();
    for &id in &doomed {
        dom.remove(id);
    }
    doomed.len()
}
