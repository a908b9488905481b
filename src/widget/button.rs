//! A focusable push button.

use crate::focus::Focusable;
use crate::input::{KeyCode, KeyEvent};
use crate::layout::Rect;
use crate::screen::Surface;
use crate::style::{visual_width, Modifiers, Style};

/// Visual configuration for the button.
#[derive(Debug, Clone)]
pub struct ButtonStyle {
    /// At rest.
    pub normal: Style,
    /// While holding focus.
    pub focused: Style,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            normal: Style::default(),
            focused: Style::default().with_mods(Modifiers::REVERSED),
        }
    }
}

/// A push button activated by enter, space, or a mouse click.
///
/// Arrow keys and tab are left unconsumed so focus navigation works across
/// a row of buttons.
pub struct Button {
    label: String,
    bounds: Rect,
    focused: bool,
    style: ButtonStyle,
    action: Option<Box<dyn FnMut()>>,
}

impl Button {
    /// Create a button with a label.
    pub fn new(bounds: Rect, label: &str) -> Self {
        Self {
            label: label.to_string(),
            bounds,
            focused: false,
            style: ButtonStyle::default(),
            action: None,
        }
    }

    /// Run `action` whenever the button is activated.
    #[must_use]
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Set the visual styles.
    #[must_use]
    pub fn with_style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    /// Button label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Widget bounds.
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Move the button.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Whether the button currently holds focus.
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether a screen position falls on the button, for mouse hit tests.
    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.bounds.contains(x, y)
    }

    /// Activate the button, as a mouse click does.
    pub fn press(&mut self) {
        if let Some(action) = &mut self.action {
            action();
        }
    }
}

impl Focusable for Button {
    fn focus(&mut self) {
        self.focused = true;
    }

    fn blur(&mut self) {
        self.focused = false;
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if !self.focused || key.modifiers.ctrl || key.modifiers.meta {
            return false;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.press();
                true
            }
            _ => false,
        }
    }

    /// Centers the label inside the bounds.
    fn draw(&self, surface: &mut Surface) {
        let style = if self.focused {
            self.style.focused
        } else {
            self.style.normal
        };
        surface.fill(self.bounds, ' ', style);

        let mut sgr = Vec::new();
        style.encode_sgr(&mut sgr);
        let mut text = String::from_utf8_lossy(&sgr).into_owned();
        text.push_str(&self.label);

        let label_width = visual_width(&self.label) as i32;
        let x = (i32::from(self.bounds.width) - label_width) / 2;
        let y = i32::from(self.bounds.height.saturating_sub(1)) / 2;
        surface.write(x.max(0), y, &text, Some(self.bounds));
    }
}

impl std::fmt::Debug for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Button")
            .field("label", &self.label)
            .field("bounds", &self.bounds)
            .field("focused", &self.focused)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn pressed_button() -> (Button, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let mut button = Button::new(Rect::new(0, 0, 10, 1), "OK")
            .with_action(move || counter.set(counter.get() + 1));
        button.focus();
        (button, count)
    }

    #[test]
    fn test_enter_and_space_activate() {
        let (mut button, count) = pressed_button();
        assert!(button.handle_key(&KeyEvent::plain(KeyCode::Enter)));
        assert!(button.handle_key(&KeyEvent::plain(KeyCode::Char(' '))));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_navigation_keys_pass_through() {
        let (mut button, count) = pressed_button();
        assert!(!button.handle_key(&KeyEvent::plain(KeyCode::Tab)));
        assert!(!button.handle_key(&KeyEvent::plain(KeyCode::Left)));
        assert!(!button.handle_key(&KeyEvent::plain(KeyCode::Down)));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_unfocused_button_ignores_keys() {
        let (mut button, count) = pressed_button();
        button.blur();
        assert!(!button.handle_key(&KeyEvent::plain(KeyCode::Enter)));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_press_counts_as_activation() {
        let (mut button, count) = pressed_button();
        button.press();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_draw_centers_label() {
        let mut surface = Surface::new(10, 1);
        let button = Button::new(Rect::new(0, 0, 10, 1), "OK");
        button.draw(&mut surface);
        let row: String = (0..10)
            .map(|x| surface.cell(x, 0).unwrap().glyph())
            .collect();
        assert_eq!(row, "    OK    ");
    }

    #[test]
    fn test_focused_button_draws_reversed() {
        let mut surface = Surface::new(6, 1);
        let mut button = Button::new(Rect::new(0, 0, 6, 1), "Go");
        button.focus();
        button.draw(&mut surface);
        let cell = surface.cell(2, 0).unwrap();
        assert_eq!(cell.glyph(), 'G');
        assert!(cell.style().mods.contains(Modifiers::REVERSED));
    }

    #[test]
    fn test_contains_matches_bounds() {
        let button = Button::new(Rect::new(2, 3, 4, 1), "Hi");
        assert!(button.contains(2, 3));
        assert!(button.contains(5, 3));
        assert!(!button.contains(6, 3));
        assert!(!button.contains(2, 4));
    }
}
