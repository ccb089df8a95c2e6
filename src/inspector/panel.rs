//! Inspector panel state and its rendering into the host tree.
//!
//! The panel is **Closed** or **Open** on a sampled [`InspectorView`].
//! Any interaction inside it raises a one-shot signal so the session does
//! not mistake the same press for an outside click.

use tracing::trace;

use super::presets::Preset;
use super::property::{EditableProperty, StyleValue};
use super::InspectorView;
use crate::dom::{Dom, NodeData, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Closed,
    Open(InspectorView),
}

/// A control the user can act on inside the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelControl {
    Property(EditableProperty),
    /// One stop of a gradient-valued color.
    GradientStop(usize),
    Preset(Preset),
    Close,
}

#[derive(Debug, Default)]
pub struct InspectorPanel {
    state: PanelState,
    interacted: bool,
}

impl InspectorPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open(_))
    }

    pub fn view(&self) -> Option<&InspectorView> {
        match &self.state {
            PanelState::Open(view) => Some(view),
            PanelState::Closed => None,
        }
    }

    /// Open on `view`, replacing whatever was shown.
    pub fn open(&mut self, view: InspectorView) {
        trace!(selector = %view.selector, "panel opened");
        self.state = PanelState::Open(view);
    }

    pub fn close(&mut self) {
        self.state = PanelState::Closed;
        self.interacted = false;
    }

    /// Mark that the current press started inside the panel.
    pub fn signal_interaction(&mut self) {
        self.interacted = true;
    }

    /// Consume the interaction signal.
    pub fn take_interaction(&mut self) -> bool {
        std::mem::take(&mut self.interacted)
    }

    /// Rebuild the panel's subtree under `panel_node`.
    pub fn render(&self, dom: &mut Dom, panel_node: NodeId) {
        dom.clear_children(panel_node);
        let view = match &self.state {
            PanelState::Closed => {
                if let Some(data) = dom.get_mut(panel_node) {
                    data.set_attribute("hidden", "");
                }
                return;
            }
            PanelState::Open(view) => view,
        };
        if let Some(data) = dom.get_mut(panel_node) {
            data.remove_attribute("hidden");
        }

        let title = dom.insert_child(panel_node, NodeData::element("h2").with_class("pagecraft-target"));
        dom.set_text(title, &view.selector);
        let close = dom.insert_child(panel_node, NodeData::element("button").with_class("pagecraft-close"));
        dom.set_text(close, "\u{d7}");

        for field in &view.fields {
            let control = dom.insert_child(
                panel_node,
                NodeData::element("div")
                    .with_class("pagecraft-control")
                    .with_attribute("data-property", field.property.key()),
            );
            let label = dom.insert_child(control, NodeData::element("label"));
            dom.set_text(label, field.property.key());
            match &field.value {
                StyleValue::Gradient(descriptor) => {
                    for (index, color) in descriptor.colors.iter().enumerate() {
                        dom.insert_child(
                            control,
                            NodeData::element("span")
                                .with_class("pagecraft-swatch")
                                .with_attribute("data-index", index.to_string())
                                .with_style("background", color),
                        );
                    }
                }
                value => {
                    let shown = dom.insert_child(control, NodeData::element("span").with_class("pagecraft-value"));
                    dom.set_text(shown, &value.to_css());
                }
            }
        }

        let presets = dom.insert_child(panel_node, NodeData::element("div").with_class("pagecraft-presets"));
        for preset in Preset::ALL {
            let button = dom.insert_child(
                presets,
                NodeData::element("button")
                    .with_class("pagecraft-preset")
                    .with_attribute("data-preset", preset.name()),
            );
            dom.set_text(button, preset.name());
        }
    }
}

/// Resolve a node inside the panel to the control it belongs to.
pub fn control_at(dom: &Dom, panel_node: NodeId, node: NodeId) -> Option<PanelControl> {
    if !dom.is_inclusive_descendant(node, panel_node) {
        return None;
    }
    let mut chain = vec![node];
    chain.extend(dom.ancestors(node));
    for id in chain.into_iter().take_while(|&id| id != panel_node) {
        let Some(data) = dom.get(id) else {
            continue;
        };
        if data.has_class("pagecraft-close") {
            return Some(PanelControl::Close);
        }
        if let Some(index) = data.attribute("data-index").and_then(|i| i.parse().ok()) {
            return Some(PanelControl::GradientStop(index));
        }
        if let Some(preset) = data.attribute("data-preset").and_then(Preset::from_name) {
            return Some(PanelControl::Preset(preset));
        }
        if let Some(property) = data.attribute("data-property").and_then(EditableProperty::from_key) {
            return Some(PanelControl::Property(property));
        }
    }
    None
}
