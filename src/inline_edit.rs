//! Inline text editor: swap a text-bearing leaf for an editable surrogate.
//!
//! The original node is detached (not destroyed) while the surrogate sits at
//! its index, so cancelling restores it untouched and committing restores it
//! with new text.

use tracing::debug;

use crate::css::stylesheet::ComputedStyle;
use crate::dom::{Dom, NodeData, NodeId};
use crate::event::input::{Key, KeyEvent, Modifiers};

/// Tags whose text may be edited inline.
pub const TEXT_BEARING: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "a", "button", "label",
];

/// Computed properties copied onto the surrogate so it matches the original.
const MATCHED_PROPERTIES: &[&str] = &[
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "letter-spacing",
    "text-align",
    "text-transform",
    "color",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
];

/// Class carried by the surrogate element.
pub const SURROGATE_CLASS: &str = "pagecraft-inline-editor";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InlineEditError {
    #[error("node no longer exists")]
    Missing,
    #[error("<{0}> is not an editable text leaf")]
    NotEditable(String),
    #[error("node is detached from the tree")]
    Detached,
}

// ---------------------------------------------------------------------------
// TextBuffer
// ---------------------------------------------------------------------------

/// Editable text with a cursor.
///
/// The cursor position is tracked as a byte offset into the value string.
/// All cursor operations are char-boundary safe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    value: String,
    cursor_position: usize,
}

impl TextBuffer {
    /// A buffer holding `value`, cursor at the end.
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor_position = value.len();
        Self {
            value,
            cursor_position,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Return the cursor position (byte offset).
    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Insert a character at the current cursor position.
    pub fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor_position, ch);
        self.cursor_position += ch.len_utf8();
    }

    pub fn insert_str(&mut self, text: &str) {
        self.value.insert_str(self.cursor_position, text);
        self.cursor_position += text.len();
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        let prev = self.prev_char_boundary();
        self.value.drain(prev..self.cursor_position);
        self.cursor_position = prev;
    }

    /// Delete the character after the cursor (delete forward).
    pub fn delete_forward(&mut self) {
        if self.cursor_position >= self.value.len() {
            return;
        }
        let next = self.next_char_boundary();
        self.value.drain(self.cursor_position..next);
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position = self.prev_char_boundary();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.value.len() {
            self.cursor_position = self.next_char_boundary();
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.value.len();
    }

    fn prev_char_boundary(&self) -> usize {
        let mut pos = self.cursor_position.saturating_sub(1);
        while pos > 0 && !self.value.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn next_char_boundary(&self) -> usize {
        let mut pos = self.cursor_position + 1;
        while pos < self.value.len() && !self.value.is_char_boundary(pos) {
            pos += 1;
        }
        pos
    }
}

// ---------------------------------------------------------------------------
// InlineEditor
// ---------------------------------------------------------------------------

/// A finished inline edit whose text should be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub node: NodeId,
    pub text: String,
    pub changed: bool,
}

/// What a key press did to the active edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit is still open.
    Editing,
    Committed(Commit),
    /// Escape: the original was restored unmodified.
    Cancelled(NodeId),
}

#[derive(Debug)]
struct ActiveEdit {
    original: NodeId,
    surrogate: NodeId,
    parent: NodeId,
    index: usize,
    original_text: String,
    buffer: TextBuffer,
}

/// Holds at most one active inline edit.
#[derive(Debug, Default)]
pub struct InlineEditor {
    active: Option<ActiveEdit>,
}

impl InlineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The surrogate element of the active edit.
    pub fn surrogate(&self) -> Option<NodeId> {
        self.active.as_ref().map(|a| a.surrogate)
    }

    /// The node being edited.
    pub fn original(&self) -> Option<NodeId> {
        self.active.as_ref().map(|a| a.original)
    }

    pub fn buffer(&self) -> Option<&TextBuffer> {
        self.active.as_ref().map(|a| &a.buffer)
    }

    /// Whether `node` is a text-bearing leaf with non-empty text.
    pub fn is_editable(dom: &Dom, node: NodeId) -> bool {
        dom.get(node).is_some_and(|data| {
            TEXT_BEARING.contains(&data.tag.as_str())
                && !dom.has_element_children(node)
                && !dom.text_of(node).trim().is_empty()
        })
    }

    /// Start editing `node`, styled from its computed style.
    ///
    /// An edit already in progress is committed first and returned so the
    /// caller can record it.
    pub fn begin(
        &mut self,
        dom: &mut Dom,
        node: NodeId,
        style: &ComputedStyle,
    ) -> Result<Option<Commit>, InlineEditError> {
        let tag = dom.get(node).ok_or(InlineEditError::Missing)?.tag.clone();
        if !Self::is_editable(dom, node) {
            return Err(InlineEditError::NotEditable(tag));
        }
        let previous = self.commit(dom);

        let parent = dom.parent(node).ok_or(InlineEditError::Detached)?;
        let text = dom.text_of(node);
        let mut surrogate = NodeData::element("textarea")
            .with_class(SURROGATE_CLASS)
            .with_attribute("data-editing", tag.as_str());
        for &property in MATCHED_PROPERTIES {
            surrogate.style.set(property, &style.get(property));
        }
        surrogate.style.set("background", "transparent");
        surrogate.style.set("resize", "none");

        let index = dom.detach(node).ok_or(InlineEditError::Detached)?;
        let surrogate = dom.insert_child_at(parent, index, surrogate);
        dom.set_text(surrogate, &text);
        debug!(tag = %tag, "inline edit started");

        self.active = Some(ActiveEdit {
            original: node,
            surrogate,
            parent,
            index,
            buffer: TextBuffer::with_value(text.clone()),
            original_text: text,
        });
        Ok(previous)
    }

    /// Route a key press to the active edit.
    pub fn handle_key(&mut self, dom: &mut Dom, key: &KeyEvent) -> EditOutcome {
        let Some(active) = self.active.as_mut() else {
            return EditOutcome::Editing;
        };
        let plain = key.modifiers.is_empty() || key.modifiers == Modifiers::SHIFT;
        match key.code {
            Key::Enter if key.modifiers.is_empty() => {
                return match self.commit(dom) {
                    Some(commit) => EditOutcome::Committed(commit),
                    None => EditOutcome::Editing,
                };
            }
            Key::Enter if key.modifiers.contains(Modifiers::SHIFT) => active.buffer.insert_char('\n'),
            Key::Escape => {
                return match self.cancel(dom) {
                    Some(node) => EditOutcome::Cancelled(node),
                    None => EditOutcome::Editing,
                };
            }
            Key::Char(c) if plain => active.buffer.insert_char(c),
            Key::Backspace => active.buffer.delete_char(),
            Key::Delete => active.buffer.delete_forward(),
            Key::Left => active.buffer.move_cursor_left(),
            Key::Right => active.buffer.move_cursor_right(),
            Key::Home => active.buffer.move_cursor_home(),
            Key::End => active.buffer.move_cursor_end(),
            _ => return EditOutcome::Editing,
        }
        dom.set_text(active.surrogate, active.buffer.value());
        EditOutcome::Editing
    }

    /// Insert pasted text at the cursor.
    pub fn paste(&mut self, dom: &mut Dom, text: &str) {
        if let Some(active) = self.active.as_mut() {
            active.buffer.insert_str(text);
            dom.set_text(active.surrogate, active.buffer.value());
        }
    }

    /// Finish the active edit, writing the surrogate's text into the
    /// original node.
    pub fn commit(&mut self, dom: &mut Dom) -> Option<Commit> {
        let active = self.active.take()?;
        let text = active.buffer.value().to_string();
        let changed = text != active.original_text;
        restore(dom, &active);
        if changed {
            dom.set_text(active.original, &text);
        }
        debug!(changed, "inline edit committed");
        Some(Commit {
            node: active.original,
            text,
            changed,
        })
    }

    /// Abandon the active edit, restoring the original unmodified.
    pub fn cancel(&mut self, dom: &mut Dom) -> Option<NodeId> {
        let active = self.active.take()?;
        restore(dom, &active);
        debug!("inline edit cancelled");
        Some(active.original)
    }

    /// Forget the active edit without touching the tree (the tree it
    /// referenced was replaced).
    pub fn abandon(&mut self) {
        self.active = None;
    }
}

fn restore(dom: &mut Dom, active: &ActiveEdit) {
    dom.remove(active.surrogate);
    if dom.contains(active.parent) {
        dom.attach_at(active.original, active.parent, active.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_stylesheet;
    use crate::css::stylesheet::CompiledStylesheet;
    use crate::markup::inner_html;

    fn setup() -> (Dom, NodeId, NodeId, ComputedStyle) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::element("div"));
        dom.insert_child(root, NodeData::element("span"));
        let h1 = dom.insert_child(root, NodeData::element("h1").with_class("title"));
        dom.set_text(h1, "Hello");
        dom.insert_child(root, NodeData::element("p"));
        let sheet = CompiledStylesheet::compile(
            &parse_stylesheet(".title { font-size: 48px; color: #123456; text-align: center; letter-spacing: 2px; }"),
            1280.0,
        );
        let style = sheet.compute(&dom, h1);
        (dom, root, h1, style)
    }

    fn type_text(editor: &mut InlineEditor, dom: &mut Dom, text: &str) {
        for c in text.chars() {
            editor.handle_key(dom, &KeyEvent::plain(Key::Char(c)));
        }
    }

    #[test]
    fn surrogate_takes_the_original_place_and_style() {
        let (mut dom, root, h1, style) = setup();
        let mut editor = InlineEditor::new();
        editor.begin(&mut dom, h1, &style).unwrap();

        let surrogate = editor.surrogate().unwrap();
        assert_eq!(dom.children(root)[1], surrogate);
        assert_eq!(dom.parent(h1), None);
        let data = dom.get(surrogate).unwrap();
        assert_eq!(data.tag, "textarea");
        assert_eq!(data.style.get("font-size"), Some("48px"));
        assert_eq!(data.style.get("color"), Some("#123456"));
        assert_eq!(data.style.get("text-align"), Some("center"));
        assert_eq!(data.style.get("letter-spacing"), Some("2px"));
        assert_eq!(dom.text_of(surrogate), "Hello");
    }

    #[test]
    fn enter_commits_in_place() {
        let (mut dom, root, h1, style) = setup();
        let mut editor = InlineEditor::new();
        editor.begin(&mut dom, h1, &style).unwrap();
        type_text(&mut editor, &mut dom, ", world");
        let outcome = editor.handle_key(&mut dom, &KeyEvent::plain(Key::Enter));
        assert_eq!(
            outcome,
            EditOutcome::Committed(Commit {
                node: h1,
                text: "Hello, world".into(),
                changed: true
            })
        );
        assert_eq!(
            inner_html(&dom, root),
            "<span></span><h1 class=\"title\">Hello, world</h1><p></p>"
        );
        assert!(!editor.is_active());
    }

    #[test]
    fn escape_restores_original() {
        let (mut dom, root, h1, style) = setup();
        let before = inner_html(&dom, root);
        let mut editor = InlineEditor::new();
        editor.begin(&mut dom, h1, &style).unwrap();
        type_text(&mut editor, &mut dom, "zzz");
        let outcome = editor.handle_key(&mut dom, &KeyEvent::plain(Key::Escape));
        assert_eq!(outcome, EditOutcome::Cancelled(h1));
        assert_eq!(inner_html(&dom, root), before);
    }

    #[test]
    fn shift_enter_inserts_newline_and_cursor_edits() {
        let (mut dom, _, h1, style) = setup();
        let mut editor = InlineEditor::new();
        editor.begin(&mut dom, h1, &style).unwrap();
        editor.handle_key(&mut dom, &KeyEvent::new(Key::Enter, Modifiers::SHIFT));
        editor.handle_key(&mut dom, &KeyEvent::plain(Key::Home));
        editor.handle_key(&mut dom, &KeyEvent::plain(Key::Delete));
        editor.handle_key(&mut dom, &KeyEvent::plain(Key::Char('J')));
        editor.handle_key(&mut dom, &KeyEvent::plain(Key::End));
        editor.handle_key(&mut dom, &KeyEvent::plain(Key::Backspace));
        assert_eq!(editor.buffer().unwrap().value(), "Jello");
        editor.paste(&mut dom, "!\u{e9}");
        assert_eq!(dom.text_of(editor.surrogate().unwrap()), "Jello!\u{e9}");
    }

    #[test]
    fn ctrl_chars_are_ignored() {
        let (mut dom, _, h1, style) = setup();
        let mut editor = InlineEditor::new();
        editor.begin(&mut dom, h1, &style).unwrap();
        editor.handle_key(&mut dom, &KeyEvent::new(Key::Char('a'), Modifiers::CTRL));
        assert_eq!(editor.buffer().unwrap().value(), "Hello");
    }

    #[test]
    fn starting_second_edit_commits_first() {
        let (mut dom, root, h1, style) = setup();
        let p = dom.element_children(root)[2];
        dom.set_text(p, "Para");
        let mut editor = InlineEditor::new();
        editor.begin(&mut dom, h1, &style).unwrap();
        type_text(&mut editor, &mut dom, "!");
        let previous = editor.begin(&mut dom, p, &style).unwrap();
        assert_eq!(previous.map(|c| c.text), Some("Hello!".to_string()));
        assert_eq!(dom.text_of(h1), "Hello!");
        assert_eq!(editor.original(), Some(p));
    }

    #[test]
    fn only_text_leaves_are_editable() {
        let (mut dom, root, h1, style) = setup();
        let span = dom.element_children(root)[0];
        let mut editor = InlineEditor::new();
        assert_eq!(
            editor.begin(&mut dom, span, &style),
            Err(InlineEditError::NotEditable("span".into()))
        );
        dom.insert_child(h1, NodeData::element("b"));
        assert!(!InlineEditor::is_editable(&dom, h1));
        assert!(!InlineEditor::is_editable(&dom, root));
    }

    #[test]
    fn unchanged_commit_reports_unchanged() {
        let (mut dom, _, h1, style) = setup();
        let mut editor = InlineEditor::new();
        editor.begin(&mut dom, h1, &style).unwrap();
        let commit = editor.commit(&mut dom).unwrap();
        assert!(!commit.changed);
        assert_eq!(commit.text, "Hello");
    }
}
