//! Event system: host input events and session key bindings.

pub mod binding;
pub mod input;

pub use binding::{KeyBindingRegistry, SessionAction};
pub use input::{InputEvent, Key, KeyEvent, Modifiers, PointerAction, PointerButton, PointerEvent};
