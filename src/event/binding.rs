//! Session key bindings.
//!
//! [`KeyBindingRegistry`] maps key+modifier combinations to
//! [`SessionAction`]s. Bindings only apply while no inline edit is active;
//! the inline editor consumes keys first.

use std::collections::HashMap;

use super::input::{Key, KeyEvent, Modifiers};
use crate::viewport::DeviceClass;

/// Action to take when a key binding is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Return to Idle and close the inspector.
    ClearSelection,
    /// Re-render the last document and replay the ledger.
    Refresh,
    /// Switch the emulated device.
    Device(DeviceClass),
    /// Start an inline edit on the selected node.
    EditSelected,
}

/// Registry of key bindings, mapping (Key, Modifiers) -> SessionAction.
#[derive(Debug, Default)]
pub struct KeyBindingRegistry {
    bindings: HashMap<(Key, Modifiers), SessionAction>,
}

impl KeyBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard bindings:
    /// - `Escape` -> ClearSelection
    /// - `Ctrl+R` -> Refresh
    /// - `Ctrl+1/2/3` -> wide / medium / narrow device
    /// - `Enter` -> EditSelected
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind(Key::Escape, Modifiers::NONE, SessionAction::ClearSelection);
        registry.bind(Key::Char('r'), Modifiers::CTRL, SessionAction::Refresh);
        for (digit, device) in ['1', '2', '3'].into_iter().zip(DeviceClass::ALL) {
            registry.bind(Key::Char(digit), Modifiers::CTRL, SessionAction::Device(device));
        }
        registry.bind(Key::Enter, Modifiers::NONE, SessionAction::EditSelected);
        registry
    }

    /// Register a key binding, replacing any existing one for the combination.
    pub fn bind(&mut self, key: Key, modifiers: Modifiers, action: SessionAction) {
        self.bindings.insert((key, modifiers), action);
    }

    pub fn unbind(&mut self, key: Key, modifiers: Modifiers) -> Option<SessionAction> {
        self.bindings.remove(&(key, modifiers))
    }

    /// Exact match of key + modifiers.
    pub fn resolve(&self, event: &KeyEvent) -> Option<SessionAction> {
        self.bindings.get(&(event.code, event.modifiers)).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let reg = KeyBindingRegistry::with_defaults();
        assert_eq!(reg.len(), 6);
        assert_eq!(
            reg.resolve(&KeyEvent::new(Key::Char('3'), Modifiers::CTRL)),
            Some(SessionAction::Device(DeviceClass::Narrow))
        );
        assert_eq!(reg.resolve(&KeyEvent::plain(Key::Escape)), Some(SessionAction::ClearSelection));
    }

    #[test]
    fn modifiers_must_match_exactly() {
        let reg = KeyBindingRegistry::with_defaults();
        assert_eq!(reg.resolve(&KeyEvent::plain(Key::Char('r'))), None);
        assert_eq!(
            reg.resolve(&KeyEvent::new(Key::Char('r'), Modifiers::CTRL | Modifiers::SHIFT)),
            None
        );
    }

    #[test]
    fn rebinding_replaces() {
        let mut reg = KeyBindingRegistry::new();
        assert!(reg.is_empty());
        reg.bind(Key::Tab, Modifiers::NONE, SessionAction::Refresh);
        reg.bind(Key::Tab, Modifiers::NONE, SessionAction::ClearSelection);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.unbind(Key::Tab, Modifiers::NONE), Some(SessionAction::ClearSelection));
        assert!(reg.is_empty());
    }
}
