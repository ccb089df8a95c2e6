//! Pilot: programmatic interaction with a headless project session.
//!
//! The `Pilot` wraps a [`ProjectSession`] and provides methods to simulate
//! user input (clicks, double clicks, key presses, typing, panel controls)
//! the way a browser would deliver them, already targeted at a node.

use crate::config::EditorConfig;
use crate::dom::NodeId;
use crate::event::{InputEvent, Key, KeyEvent, Modifiers, PointerAction, PointerButton, PointerEvent};
use crate::geometry::Point;
use crate::inspector::PanelControl;
use crate::ledger::{LedgerStore, MemoryStore};
use crate::render::GeneratedDocument;
use crate::session::ProjectSession;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless session driver for testing.
///
/// # Examples
///
/// ```ignore
/// use pagecraft::testing::Pilot;
///
/// let mut pilot = Pilot::new("<body><h1 class=\"title\">Hi</h1></body>");
/// let title = pilot.find(".title").unwrap();
/// pilot.click(title);
/// assert!(pilot.session().selected().is_some());
/// ```
pub struct Pilot<S: LedgerStore = MemoryStore> {
    session: ProjectSession<S>,
}

impl Pilot {
    /// Open `code` as project `"test"` with the default config and an
    /// in-memory store.
    pub fn new(code: &str) -> Self {
        Self::with_store("test", code, EditorConfig::default(), MemoryStore::new())
    }
}

impl<S: LedgerStore> Pilot<S> {
    pub fn with_store(project_id: &str, code: &str, config: EditorConfig, store: S) -> Self {
        Self {
            session: ProjectSession::open(project_id, GeneratedDocument::from_html(code), config, store),
        }
    }

    pub fn from_session(session: ProjectSession<S>) -> Self {
        Self { session }
    }

    // ── Input simulation ─────────────────────────────────────────────

    fn pointer(&mut self, kind: PointerAction, target: Option<NodeId>, at: Point) {
        let event = PointerEvent::new(kind, target, at.x, at.y);
        self.session.handle_input(InputEvent::Pointer(event));
    }

    /// Centre of `node`'s laid-out region, or the origin.
    fn centre(&self, node: NodeId) -> Point {
        self.session
            .viewport()
            .region(node)
            .map(|r| Point::new(r.x + r.width / 2.0, r.y + r.height / 2.0))
            .unwrap_or_default()
    }

    /// Press and release the primary button on `node`.
    pub fn click(&mut self, node: NodeId) {
        let at = self.centre(node);
        self.pointer(PointerAction::Down(PointerButton::Primary), Some(node), at);
        self.pointer(PointerAction::Up(PointerButton::Primary), Some(node), at);
    }

    /// Click whatever surface element is laid out under `point`. Returns the
    /// hit node, or `None` when nothing is there (the click lands outside).
    pub fn click_at(&mut self, point: Point) -> Option<NodeId> {
        let hit = self.session.viewport().hit_test(point);
        self.pointer(PointerAction::Down(PointerButton::Primary), hit, point);
        self.pointer(PointerAction::Up(PointerButton::Primary), hit, point);
        hit
    }

    /// Press on `from`, drag by `(dx, dy)` and release on `to`.
    pub fn drag(&mut self, from: NodeId, to: NodeId, dx: f32, dy: f32) {
        let start = self.centre(from);
        let end = Point::new(start.x + dx, start.y + dy);
        self.pointer(PointerAction::Down(PointerButton::Primary), Some(from), start);
        self.pointer(PointerAction::Drag(PointerButton::Primary), Some(to), end);
        self.pointer(PointerAction::Up(PointerButton::Primary), Some(to), end);
    }

    /// Two clicks followed by the double-click event.
    pub fn double_click(&mut self, node: NodeId) {
        self.click(node);
        self.click(node);
        let at = self.centre(node);
        self.pointer(PointerAction::DoubleClick, Some(node), at);
    }

    /// Move the pointer over `node`.
    pub fn hover(&mut self, node: NodeId) {
        let at = self.centre(node);
        self.pointer(PointerAction::Moved, Some(node), at);
    }

    /// Move the pointer off the surface.
    pub fn leave(&mut self) {
        self.pointer(PointerAction::Leave, None, Point::default());
    }

    /// Press on host chrome or empty space outside the surface.
    pub fn click_outside(&mut self, target: Option<NodeId>) {
        self.pointer(PointerAction::Down(PointerButton::Primary), target, Point::default());
        self.pointer(PointerAction::Up(PointerButton::Primary), target, Point::default());
    }

    /// Click the rendered panel element for `control`. Returns whether the
    /// panel currently shows it.
    pub fn click_panel(&mut self, control: PanelControl) -> bool {
        match self.panel_node(control) {
            Some(node) => {
                self.click(node);
                true
            }
            None => false,
        }
    }

    fn panel_node(&self, control: PanelControl) -> Option<NodeId> {
        let dom = self.session.dom();
        let panel = self.session.host().panel;
        dom.walk_depth_first(panel)
            .into_iter()
            .find(|&node| crate::inspector::panel::control_at(dom, panel, node) == Some(control))
    }

    /// Simulate a key press with no modifiers.
    pub fn press_key(&mut self, key: Key) {
        self.press_key_with(key, Modifiers::NONE);
    }

    /// Simulate a key press with the given modifiers.
    pub fn press_key_with(&mut self, key: Key, modifiers: Modifiers) {
        self.session.handle_input(InputEvent::Key(KeyEvent::new(key, modifiers)));
    }

    /// Send each character of `text` as a separate key press.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.press_key(Key::Char(ch));
        }
    }

    pub fn paste(&mut self, text: &str) {
        self.session.handle_input(InputEvent::Paste(text.to_string()));
    }

    pub fn blur(&mut self) {
        self.session.handle_input(InputEvent::Blur);
    }

    // ── Query ────────────────────────────────────────────────────────

    /// First surface node matching `selector`.
    pub fn find(&self, selector: &str) -> Option<NodeId> {
        crate::selector::parse(selector)
            .find_all(self.session.dom(), self.session.surface().root())
            .into_iter()
            .next()
    }

    pub fn session(&self) -> &ProjectSession<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ProjectSession<S> {
        &mut self.session
    }

    pub fn into_session(self) -> ProjectSession<S> {
        self.session
    }

    /// Indented outline of the surface, see [`super::snapshot::outline`].
    pub fn outline(&self) -> String {
        super::snapshot::outline(self.session.dom(), self.session.surface().root())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::{EditableProperty, Preset, StyleValue};
    use pretty_assertions::assert_eq;

    const DOC: &str = "<html><body>\
        <section class=\"hero\" style=\"padding: 20px\"><h1 class=\"hero-title\">Welcome</h1></section>\
        <p>Second</p></body></html>";

    #[test]
    fn click_selects_under_pointer() {
        let mut pilot = Pilot::new(DOC);
        let title = pilot.find(".hero-title").unwrap();
        pilot.click(title);
        assert_eq!(pilot.session().selected().unwrap().node, title);
        assert!(pilot.session().panel().is_open());
    }

    #[test]
    fn click_at_uses_layout() {
        let mut pilot = Pilot::new(DOC);
        let title = pilot.find(".hero-title").unwrap();
        let region = pilot.session().viewport().region(title).unwrap();
        let hit = pilot.click_at(Point::new(region.x + 1.0, region.y + 1.0));
        assert_eq!(hit, Some(title));
        assert_eq!(pilot.session().selected().unwrap().selector, ".hero-title");
    }

    #[test]
    fn drag_does_not_select() {
        let mut pilot = Pilot::new(DOC);
        let title = pilot.find(".hero-title").unwrap();
        pilot.drag(title, title, 40.0, 0.0);
        assert!(pilot.session().selected().is_none());
    }

    #[test]
    fn click_outside_clears() {
        let mut pilot = Pilot::new(DOC);
        let title = pilot.find(".hero-title").unwrap();
        pilot.click(title);
        let header = pilot.session().host().header;
        pilot.click_outside(Some(header));
        assert!(pilot.session().selected().is_none());
        assert!(!pilot.session().panel().is_open());
    }

    #[test]
    fn panel_clicks_keep_selection() {
        let mut pilot = Pilot::new(DOC);
        let title = pilot.find(".hero-title").unwrap();
        pilot.click(title);
        assert!(pilot.click_panel(PanelControl::Property(EditableProperty::FontSize)));
        assert_eq!(pilot.session().selected().unwrap().node, title);

        assert!(pilot.click_panel(PanelControl::Preset(Preset::Rounded)));
        assert_eq!(pilot.session().ledger().get(".hero-title", "borderRadius").unwrap().value, "12px");

        assert!(pilot.click_panel(PanelControl::Close));
        assert!(pilot.session().selected().is_none());
        assert!(!pilot.click_panel(PanelControl::Close));
    }

    #[test]
    fn double_click_types_and_commits() {
        let mut pilot = Pilot::new(DOC);
        let title = pilot.find(".hero-title").unwrap();
        pilot.double_click(title);
        assert!(pilot.session().editor().is_active());
        assert!(pilot.session().selected().is_none());
        pilot.press_key(Key::End);
        pilot.type_text(" back");
        pilot.blur();
        assert_eq!(pilot.session().dom().text_of(title), "Welcome back");
        assert_eq!(
            pilot.session().ledger().get(".hero-title", "textContent").unwrap().value,
            "Welcome back"
        );
    }

    #[test]
    fn escape_abandons_inline_edit() {
        let mut pilot = Pilot::new(DOC);
        let title = pilot.find(".hero-title").unwrap();
        pilot.double_click(title);
        pilot.type_text("xyz");
        pilot.press_key(Key::Escape);
        assert!(!pilot.session().editor().is_active());
        assert_eq!(pilot.session().dom().text_of(title), "Welcome");
        assert!(pilot.session().ledger().is_empty());
    }

    #[test]
    fn hover_marks_and_leave_clears() {
        let mut pilot = Pilot::new(DOC);
        let title = pilot.find(".hero-title").unwrap();
        pilot.hover(title);
        assert_eq!(pilot.session().hovered(), Some(title));
        pilot.leave();
        assert_eq!(pilot.session().hovered(), None);
    }

    #[test]
    fn outline_reflects_edits() {
        let mut pilot = Pilot::new(DOC);
        let title = pilot.find(".hero-title").unwrap();
        pilot.click(title);
        pilot
            .session_mut()
            .change_property(EditableProperty::Color, StyleValue::Color("red".into()))
            .unwrap();
        assert_eq!(
            pilot.outline(),
            "div#pagecraft-surface\n  section.hero\n    h1.hero-title [selected] \"Welcome\"\n  p \"Second\""
        );
    }
}
