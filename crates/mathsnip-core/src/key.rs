//! Keystroke representation.
//!
//! The host intercepts keydown events and forwards them to the engine; the engine's return
//! value tells the host whether the key was consumed or should fall through to default
//! editor behavior.

use crate::settings::TriggerKey;

/// A logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character (includes space).
    Char(char),
    /// The Tab key.
    Tab,
    /// The Enter/Return key.
    Enter,
    /// Any other key the engine does not care about.
    Other,
}

/// A keydown event with the modifier state the engine inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The logical key.
    pub key: Key,
    /// Shift held.
    pub shift: bool,
    /// Ctrl (or Cmd) held. Such chords are never handled, so native shortcuts (undo, etc.)
    /// pass through.
    pub ctrl_or_cmd: bool,
}

impl KeyEvent {
    /// A plain printable-character event.
    pub fn char(ch: char) -> Self {
        Self {
            key: Key::Char(ch),
            shift: false,
            ctrl_or_cmd: false,
        }
    }

    /// A plain Tab event.
    pub fn tab() -> Self {
        Self {
            key: Key::Tab,
            shift: false,
            ctrl_or_cmd: false,
        }
    }

    /// A plain Enter event.
    pub fn enter() -> Self {
        Self {
            key: Key::Enter,
            shift: false,
            ctrl_or_cmd: false,
        }
    }

    /// Shift+Enter.
    pub fn shift_enter() -> Self {
        Self {
            key: Key::Enter,
            shift: true,
            ctrl_or_cmd: false,
        }
    }

    /// The character this event would insert, if it is a plain printable keystroke.
    pub fn typed_char(&self) -> Option<char> {
        match self.key {
            Key::Char(ch) if !self.ctrl_or_cmd => Some(ch),
            _ => None,
        }
    }

    /// Returns `true` if this event is the configured manual snippet trigger.
    pub fn is_manual_trigger(&self, trigger: TriggerKey) -> bool {
        match trigger {
            TriggerKey::Tab => self.key == Key::Tab && !self.shift && !self.ctrl_or_cmd,
            TriggerKey::Space => self.key == Key::Char(' ') && !self.ctrl_or_cmd,
        }
    }
}
