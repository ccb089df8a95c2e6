//! Property inspector: samples a selected node's style into typed fields and
//! turns control changes into live mutations plus ledger writes.

pub mod panel;
pub mod presets;
pub mod property;

use tracing::debug;

use crate::css::stylesheet::is_transparent;
use crate::dom::{Dom, NodeData, NodeId};
use crate::gradient;
use crate::render::Surface;
use crate::selection::SelectedElement;

pub use panel::{InspectorPanel, PanelControl};
pub use presets::{Preset, ShadowDepth};
pub use property::{EditableProperty, StyleValue, ValueKind};

/// Background reported when nothing up to the surface root paints one.
const DEFAULT_PAGE_BACKGROUND: &str = "#ffffff";

/// One sampled control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub property: EditableProperty,
    pub value: StyleValue,
}

/// The sampled state of the selected node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectorView {
    pub node: NodeId,
    pub selector: String,
    pub page_level: bool,
    pub fields: Vec<Field>,
}

impl InspectorView {
    pub fn get(&self, property: EditableProperty) -> Option<&StyleValue> {
        self.fields
            .iter()
            .find(|f| f.property == property)
            .map(|f| &f.value)
    }
}

/// A `(key, value)` pair to record in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyWrite {
    pub key: String,
    pub value: String,
}

impl PropertyWrite {
    fn new(property: EditableProperty, value: impl Into<String>) -> Self {
        Self {
            key: property.key().to_string(),
            value: value.into(),
        }
    }
}

/// Sample the selected node.
pub fn open(dom: &Dom, surface: &Surface, selected: &SelectedElement, gradient_angle: &str) -> InspectorView {
    let node = selected.node;
    let style = surface.compute(dom, node);
    let mut fields: Vec<Field> = EditableProperty::SAMPLED
        .iter()
        .map(|&property| {
            let value = match property {
                EditableProperty::Color => match gradient::detect(&style, gradient_angle) {
                    Some(descriptor) => StyleValue::Gradient(descriptor),
                    None => StyleValue::Color(style.get("color")),
                },
                _ => StyleValue::of_kind(property.kind(), style.get(property.css_name())),
            };
            Field { property, value }
        })
        .collect();

    if !dom.has_element_children(node) {
        let text = dom.text_of(node);
        if !text.trim().is_empty() {
            fields.push(Field {
                property: EditableProperty::TextContent,
                value: StyleValue::Text(text),
            });
        }
    }

    let page_level = surface.is_page_level(dom, node);
    if page_level {
        fields.push(Field {
            property: EditableProperty::PageBackground,
            value: StyleValue::Color(page_background(dom, surface, node)),
        });
    }

    InspectorView {
        node,
        selector: selected.selector.clone(),
        page_level,
        fields,
    }
}

/// The first painted background from `node` up to the surface root.
pub fn page_background(dom: &Dom, surface: &Surface, node: NodeId) -> String {
    let mut chain = vec![node];
    chain.extend(
        dom.ancestors(node)
            .into_iter()
            .take_while(|&a| surface.contains(dom, a)),
    );
    for id in chain {
        let style = surface.compute(dom, id);
        let image = style.get("background-image");
        if image.contains("gradient(") {
            return image;
        }
        let color = style.get("background-color");
        if !is_transparent(&color) {
            return color;
        }
    }
    DEFAULT_PAGE_BACKGROUND.to_string()
}

/// Apply a control change to the live node and return the writes to record.
///
/// A gradient on the `color` control becomes a `background` write plus the
/// clip-to-text and transparent-fill companions that keep it rendering as
/// text fill.
pub fn apply(
    dom: &mut Dom,
    surface: &Surface,
    node: NodeId,
    property: EditableProperty,
    value: &StyleValue,
) -> Vec<PropertyWrite> {
    let writes = match (property, value) {
        (EditableProperty::Color, StyleValue::Gradient(descriptor)) => vec![
            PropertyWrite::new(EditableProperty::Background, descriptor.encode()),
            PropertyWrite::new(EditableProperty::BackgroundClip, "text"),
            PropertyWrite::new(EditableProperty::WebkitBackgroundClip, "text"),
            PropertyWrite::new(EditableProperty::WebkitTextFillColor, "transparent"),
        ],
        _ => vec![PropertyWrite::new(property, value.to_css())],
    };
    for write in &writes {
        surface.apply_edit(dom, node, &write.key, &write.value);
    }
    debug!(?property, writes = writes.len(), "property applied");
    writes
}

/// Apply a preset through the ordinary write path.
pub fn apply_preset(dom: &mut Dom, surface: &Surface, node: NodeId, preset: Preset) -> Vec<PropertyWrite> {
    preset
        .writes()
        .into_iter()
        .flat_map(|(property, value)| {
            apply(dom, surface, node, property, &StyleValue::of_kind(property.kind(), value))
        })
        .collect()
}

/// Class carried by inserted icons. Icons are editor artifacts, so
/// positional selectors do not count them.
pub const ICON_CLASS: &str = "pagecraft-icon";

/// Prepend an icon glyph to `node`. A live-only structural change: it is
/// not recorded and does not survive a refresh.
pub fn insert_icon(dom: &mut Dom, node: NodeId, glyph: &str) -> NodeId {
    let icon = dom.insert_child_at(
        node,
        0,
        NodeData::element("span")
            .with_class(ICON_CLASS)
            .with_style("margin-right", "0.5em"),
    );
    dom.set_text(icon, glyph);
    icon
}
