//! Selection controller: hover and click selection of surface nodes.
//!
//! Two states, **Idle** and **Selected**. A press and release on the same
//! surface node with no drag in between selects it; at most one node carries
//! the selection outline at any time. Targets outside the surface are never
//! decorated; a press there is reported so the session can decide whether it
//! is an outside click.

use tracing::debug;

use crate::dom::{Dom, NodeId};
use crate::event::input::{PointerAction, PointerButton, PointerEvent};
use crate::selector;

/// Tags that can never be selected.
pub const NON_SELECTABLE: &[&str] = &["script", "style", "head", "meta", "link", "title"];

/// The selected node and its derived selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedElement {
    pub node: NodeId,
    pub selector: String,
}

/// Result of routing one pointer event through the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Nothing changed.
    Ignored,
    /// A new node was selected.
    Selected(SelectedElement),
    /// A press landed outside the surface.
    OutsideDown,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    node: NodeId,
    x: f32,
    y: f32,
    dragged: bool,
}

/// Per-session selection state.
#[derive(Debug)]
pub struct SelectionController {
    selected: Option<SelectedElement>,
    hovered: Option<NodeId>,
    press: Option<Press>,
    drag_threshold: f32,
}

impl SelectionController {
    pub fn new(drag_threshold: f32) -> Self {
        Self {
            selected: None,
            hovered: None,
            press: None,
            drag_threshold,
        }
    }

    pub fn selected(&self) -> Option<&SelectedElement> {
        self.selected.as_ref()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn is_idle(&self) -> bool {
        self.selected.is_none()
    }

    /// Route a pointer event. `surface_root` bounds what may be decorated.
    pub fn handle_pointer(&mut self, dom: &mut Dom, surface_root: NodeId, event: &PointerEvent) -> PointerOutcome {
        let node = event
            .target
            .and_then(|target| resolve_target(dom, surface_root, target));

        match event.kind {
            PointerAction::Down(PointerButton::Primary) => match node {
                Some(node) => {
                    self.press = Some(Press {
                        node,
                        x: event.x,
                        y: event.y,
                        dragged: false,
                    });
                    PointerOutcome::Ignored
                }
                None => {
                    self.press = None;
                    let inside = event.target.is_some_and(|t| dom.is_inclusive_descendant(t, surface_root));
                    if inside {
                        PointerOutcome::Ignored
                    } else {
                        PointerOutcome::OutsideDown
                    }
                }
            },
            PointerAction::Drag(_) => {
                if let Some(press) = &mut self.press {
                    press.dragged = true;
                }
                PointerOutcome::Ignored
            }
            PointerAction::Up(PointerButton::Primary) => {
                let Some(press) = self.press.take() else {
                    return PointerOutcome::Ignored;
                };
                let distance = ((event.x - press.x).powi(2) + (event.y - press.y).powi(2)).sqrt();
                if press.dragged || distance > self.drag_threshold || node != Some(press.node) {
                    debug!(distance, "press ended as a drag");
                    return PointerOutcome::Ignored;
                }
                match self.select(dom, press.node) {
                    Some(selected) => PointerOutcome::Selected(selected),
                    None => PointerOutcome::Ignored,
                }
            }
            PointerAction::Moved => {
                match node {
                    Some(node) => self.hover(dom, node),
                    None => self.clear_hover(dom),
                }
                PointerOutcome::Ignored
            }
            PointerAction::Leave => {
                self.clear_hover(dom);
                PointerOutcome::Ignored
            }
            _ => PointerOutcome::Ignored,
        }
    }

    /// Select `node`, clearing the previous mark first.
    pub fn select(&mut self, dom: &mut Dom, node: NodeId) -> Option<SelectedElement> {
        let selector = selector::compute(dom, node)?;
        self.clear(dom);
        if let Some(data) = dom.get_mut(node) {
            data.outline.selected = true;
        }
        let selected = SelectedElement { node, selector };
        debug!(selector = %selected.selector, "selected");
        self.selected = Some(selected.clone());
        Some(selected)
    }

    /// Return to Idle, removing the selection outline.
    pub fn clear(&mut self, dom: &mut Dom) {
        if let Some(previous) = self.selected.take() {
            if let Some(data) = dom.get_mut(previous.node) {
                data.outline.selected = false;
            }
        }
    }

    fn hover(&mut self, dom: &mut Dom, node: NodeId) {
        if self.hovered == Some(node) {
            return;
        }
        self.clear_hover(dom);
        if let Some(data) = dom.get_mut(node) {
            data.outline.hovered = true;
            self.hovered = Some(node);
        }
    }

    /// Remove the hover outline, whatever node carries it.
    pub fn clear_hover(&mut self, dom: &mut Dom) {
        if let Some(previous) = self.hovered.take() {
            if let Some(data) = dom.get_mut(previous) {
                data.outline.hovered = false;
            }
        }
    }

    /// Drop all interaction state, e.g. after the surface is rebuilt.
    pub fn reset(&mut self, dom: &mut Dom) {
        self.clear(dom);
        self.clear_hover(dom);
        self.press = None;
    }
}

/// Map an event target to the selectable surface element it stands for.
///
/// Text nodes act on their parent element. Returns `None` for targets outside
/// the surface (host chrome) and for non-visual tags.
pub fn resolve_target(dom: &Dom, surface_root: NodeId, target: NodeId) -> Option<NodeId> {
    let data = dom.get(target)?;
    let node = if data.is_element() { target } else { dom.parent(target)? };
    if !dom.is_inclusive_descendant(node, surface_root) {
        return None;
    }
    let tag = dom.get(node)?.tag.as_str();
    if NON_SELECTABLE.contains(&tag) {
        return None;
    }
    Some(node)
}
