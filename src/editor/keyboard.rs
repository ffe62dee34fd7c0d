//! Window-level keyboard shortcuts.

use serde::{Deserialize, Serialize};

/// A keydown as seen by the window listener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyInput {
    /// `KeyboardEvent.key`.
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
    /// A text input or textarea has focus.
    pub input_focused: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Cmd on mac, Ctrl elsewhere.
    pub fn with_command(mut self, is_mac: bool) -> Self {
        if is_mac {
            self.meta = true;
        } else {
            self.ctrl = true;
        }
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn in_input(mut self) -> Self {
        self.input_focused = true;
        self
    }
}

/// Editor command bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shortcut {
    FocusFind,
    Undo,
    Redo,
    FindNext,
    FindPrev,
    Escape,
    Move { d_row: i64, d_col: i64 },
    BeginEdit,
    ToggleFullscreen,
}

/// Map a keydown to a shortcut. Navigation and the plain `f` key are
/// ignored while a text input has focus.
pub fn resolve_shortcut(event: &KeyInput, is_mac: bool) -> Option<Shortcut> {
    let key = event.key.to_lowercase();
    let command = if is_mac { event.meta } else { event.ctrl };

    if command {
        match key.as_str() {
            "f" => return Some(Shortcut::FocusFind),
            "z" => return Some(Shortcut::Undo),
            "y" => return Some(Shortcut::Redo),
            "g" if event.shift => return Some(Shortcut::FindPrev),
            "g" => return Some(Shortcut::FindNext),
            _ => {}
        }
    }
    if key == "escape" {
        return Some(Shortcut::Escape);
    }

    let fullscreen_chord = if is_mac { event.meta } else { event.alt };
    if key == "enter" && fullscreen_chord {
        return Some(Shortcut::ToggleFullscreen);
    }
    if event.input_focused {
        return None;
    }

    let plain = !event.ctrl && !event.meta && !event.alt;
    match key.as_str() {
        "arrowright" => Some(Shortcut::Move { d_row: 0, d_col: 1 }),
        "arrowleft" => Some(Shortcut::Move { d_row: 0, d_col: -1 }),
        "arrowdown" => Some(Shortcut::Move { d_row: 1, d_col: 0 }),
        "arrowup" => Some(Shortcut::Move { d_row: -1, d_col: 0 }),
        "enter" => Some(Shortcut::BeginEdit),
        "f" if plain => Some(Shortcut::ToggleFullscreen),
        _ => None,
    }
}
