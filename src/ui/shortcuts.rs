//! Keyboard shortcuts

use macroquad::prelude::*;

/// A keyboard shortcut (key + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    pub key: KeyCode,
    pub ctrl: bool, // Cmd on Mac
    pub shift: bool,
}

impl Shortcut {
    /// Create a shortcut with just a key (no modifiers)
    pub const fn key(key: KeyCode) -> Self {
        Self { key, ctrl: false, shift: false }
    }

    /// Create a shortcut with Ctrl/Cmd + key
    pub const fn ctrl(key: KeyCode) -> Self {
        Self { key, ctrl: true, shift: false }
    }

    /// Create a shortcut with Ctrl/Cmd + Shift + key
    pub const fn ctrl_shift(key: KeyCode) -> Self {
        Self { key, ctrl: true, shift: true }
    }

    /// Check if this shortcut was pressed this frame.
    /// Modifiers must match exactly, so Ctrl+Z does not fire on
    /// Ctrl+Shift+Z.
    pub fn is_pressed(&self) -> bool {
        if !is_key_pressed(self.key) {
            return false;
        }

        let ctrl_down = is_key_down(KeyCode::LeftControl)
            || is_key_down(KeyCode::RightControl)
            || is_key_down(KeyCode::LeftSuper)
            || is_key_down(KeyCode::RightSuper);
        let shift_down = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);

        self.ctrl == ctrl_down && self.shift == shift_down
    }
}
