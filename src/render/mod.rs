//! Render Host: turns a generated document into a sanitized, scoped
//! rendering surface inside the host tree.

pub mod document;
pub mod host;
pub mod sanitize;
pub mod scope;

use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::css::model::StyleSheet;
use crate::css::stylesheet::{CompiledStylesheet, ComputedStyle};
use crate::dom::{Dom, NodeData, NodeId};
use crate::inspector::property::key_to_css;
use crate::markup::{outer_html, parse_html};

pub use document::GeneratedDocument;
pub use host::HostTree;

/// Non-fatal problems found while rendering. Reported, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderWarning {
    #[error("document has no <body>; rendered an empty surface")]
    MissingBody,
    #[error("stripped {0} incidental text fragment(s)")]
    StrippedFragments(usize),
    #[error("removed {0} unsafe element(s) or attribute(s)")]
    RemovedUnsafe(usize),
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// The rendering surface: a subtree of the host DOM plus its scoped styles.
#[derive(Debug)]
pub struct Surface {
    root: NodeId,
    stylesheet: StyleSheet,
    styles: CompiledStylesheet,
    warnings: Vec<RenderWarning>,
}

impl Surface {
    /// The surface root, standing in for the document's `<body>`.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether `node` lies inside the surface (root included).
    pub fn contains(&self, dom: &Dom, node: NodeId) -> bool {
        dom.is_inclusive_descendant(node, self.root)
    }

    /// The scoped stylesheet, baseline rules first.
    pub fn stylesheet(&self) -> &StyleSheet {
        &self.stylesheet
    }

    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    /// Re-evaluate media queries for a new surface width.
    pub fn recompile(&mut self, viewport_width: f32) {
        self.styles = CompiledStylesheet::compile(&self.stylesheet, viewport_width);
    }

    /// Computed style of a surface node.
    pub fn compute(&self, dom: &Dom, node: NodeId) -> ComputedStyle {
        self.styles.compute(dom, node)
    }

    /// Page-level nodes take whole-document background edits: the surface
    /// root (standing in for `body`), `main`, and hero-like containers.
    pub fn is_page_level(&self, dom: &Dom, node: NodeId) -> bool {
        if node == self.root {
            return true;
        }
        let Some(data) = dom.get(node) else {
            return false;
        };
        data.tag == "main"
            || data.id.as_deref().is_some_and(|id| id.to_ascii_lowercase().contains("hero"))
            || data.classes.iter().any(|c| c.to_ascii_lowercase().contains("hero"))
    }

    /// Write one ledger-style `(key, value)` pair onto `node`.
    ///
    /// `textContent` replaces the text of a leaf element, `pageBackground`
    /// paints the surface root and `node` when it is page-level, and every
    /// other key becomes an inline style property. Returns false when the
    /// write does not apply to `node`.
    pub fn apply_edit(&self, dom: &mut Dom, node: NodeId, key: &str, value: &str) -> bool {
        if !self.contains(dom, node) {
            return false;
        }
        match key {
            "textContent" => {
                if dom.has_element_children(node) {
                    return false;
                }
                dom.set_text(node, value);
            }
            "pageBackground" => {
                let targets = if node != self.root && self.is_page_level(dom, node) {
                    vec![self.root, node]
                } else {
                    vec![self.root]
                };
                for target in targets {
                    if let Some(data) = dom.get_mut(target) {
                        data.style.set("background", value);
                    }
                }
            }
            _ => {
                let property = key_to_css(key);
                let Some(data) = dom.get_mut(node) else {
                    return false;
                };
                data.style.set(&property, value);
            }
        }
        true
    }

    /// Serialize as a standalone fragment: the scoped stylesheet followed by
    /// the surface subtree.
    pub fn to_html(&self, dom: &Dom) -> String {
        format!(
            "<style>\n{}</style>\n{}",
            self.stylesheet.to_css(),
            outer_html(dom, self.root)
        )
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render `document` into a fresh surface under `stage`, replacing any
/// surface already there.
pub fn render(
    dom: &mut Dom,
    stage: NodeId,
    document: &GeneratedDocument,
    config: &EditorConfig,
    viewport_width: f32,
) -> Surface {
    for child in dom.element_children(stage) {
        if dom.get(child).and_then(|d| d.id.as_deref()) == Some(config.surface_id.as_str()) {
            dom.remove(child);
        }
    }
    let root = dom.insert_child(stage, NodeData::element("div").with_id(config.surface_id.clone()));

    let mut warnings = Vec::new();
    let mut stylesheet_source = document.stylesheet().to_string();
    let mut parsed = parse_html(document.markup());

    match parsed.body() {
        None => {
            warn!("generated document has no body, rendering an empty surface");
            warnings.push(RenderWarning::MissingBody);
        }
        Some(body) => {
            let sanitized = sanitize::sanitize(&mut parsed.dom, body);
            for style in &sanitized.styles {
                stylesheet_source.push('\n');
                stylesheet_source.push_str(style);
            }
            if sanitized.removed > 0 {
                warn!(count = sanitized.removed, "removed unsafe markup");
                warnings.push(RenderWarning::RemovedUnsafe(sanitized.removed));
            }

            if let (Some(body_data), Some(surface)) = (parsed.dom.get(body), dom.get_mut(root)) {
                for class in &body_data.classes {
                    surface.add_class(class);
                }
                for (property, value) in body_data.style.iter() {
                    surface.style.set(property, value);
                }
            }
            for &child in parsed.dom.children(body) {
                dom.import_subtree(root, &parsed.dom, child);
            }

            let stripped = sanitize::strip_fragments(dom, root, config.fragment_limit);
            if stripped > 0 {
                warn!(count = stripped, "stripped incidental text fragments");
                warnings.push(RenderWarning::StrippedFragments(stripped));
            }
        }
    }

    let stylesheet = scope::scope_stylesheet(&stylesheet_source, &format!("#{}", config.surface_id));
    let styles = CompiledStylesheet::compile(&stylesheet, viewport_width);
    debug!(rules = styles.len(), nodes = dom.walk_depth_first(root).len(), "surface rendered");

    Surface {
        root,
        stylesheet,
        styles,
        warnings,
    }
}
