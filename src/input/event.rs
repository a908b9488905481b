//! Input event types.
//!
//! Raw terminal bytes decode into these structured events. Key identity is a
//! single [`KeyCode`] sum type: printable input arrives as `Char`, special
//! keys as named variants, so matching never involves escape strings.

/// Key codes for keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Function key (F1-F12).
    F(u8),
    /// Backspace key.
    Backspace,
    /// Enter/Return key.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Tab key.
    Tab,
    /// Backtab (Shift+Tab).
    BackTab,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
    /// Escape key.
    Esc,
    /// Null (Ctrl+Space on some terminals).
    Null,
}

/// Key modifiers.
///
/// Alt/Option reports as `meta`; there is no separate alt flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    /// Shift key held.
    pub shift: bool,
    /// Control key held.
    pub ctrl: bool,
    /// Meta/Alt/Option key held.
    pub meta: bool,
}

impl KeyModifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        meta: false,
    };

    /// Only shift.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        meta: false,
    };

    /// Only control.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        meta: false,
    };

    /// Only meta.
    pub const META: Self = Self {
        shift: false,
        ctrl: false,
        meta: true,
    };

    /// Check if any modifier is active.
    pub const fn any(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// A decoded keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifiers held during the press.
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[inline]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// A key press with modifiers.
    #[inline]
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Whether this is ctrl plus the given character.
    #[inline]
    pub fn is_ctrl(&self, c: char) -> bool {
        self.modifiers.ctrl && self.code == KeyCode::Char(c)
    }
}

/// Mouse button, including the wheel directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Right,
    /// Scroll wheel up.
    WheelUp,
    /// Scroll wheel down.
    WheelDown,
}

/// What the mouse did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    /// Button pressed. Wheel events always report as `Down`.
    Down,
    /// Button released.
    Up,
    /// Pointer moved (with or without a held button).
    Move,
}

/// A decoded mouse event. Coordinates are 0-based screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Column (0-based).
    pub x: u16,
    /// Row (0-based).
    pub y: u16,
    /// The button involved, `None` for buttonless motion.
    pub button: Option<MouseButton>,
    /// What happened.
    pub action: MouseAction,
    /// Modifiers held during the event.
    pub modifiers: KeyModifiers,
}

/// Any decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A keyboard event.
    Key(KeyEvent),
    /// A mouse event.
    Mouse(MouseEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_ctrl_check() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CTRL);
        assert!(ev.is_ctrl('c'));
        assert!(!ev.is_ctrl('d'));
        assert!(!KeyEvent::plain(KeyCode::Char('c')).is_ctrl('c'));
    }

    #[test]
    fn test_modifier_consts() {
        assert!(!KeyModifiers::NONE.any());
        assert!(KeyModifiers::SHIFT.any());
        assert!(KeyModifiers::CTRL.ctrl);
        assert!(KeyModifiers::META.meta);
    }
}
