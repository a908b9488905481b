//! Single-line text input with cursor and editing support.

use crate::focus::Focusable;
use crate::input::{KeyCode, KeyEvent};
use crate::layout::Rect;
use crate::screen::Surface;
use crate::style::{visual_width, Color, Modifiers, Style};

/// Visual configuration for the text input.
#[derive(Debug, Clone)]
pub struct TextInputStyle {
    /// Entered text.
    pub text: Style,
    /// Prompt prefix.
    pub prompt: Style,
    /// Placeholder shown while empty.
    pub placeholder: Style,
    /// The cell under the cursor while focused.
    pub cursor: Style,
}

impl Default for TextInputStyle {
    fn default() -> Self {
        Self {
            text: Style::default(),
            prompt: Style::default().with_fg(Color::Cyan),
            placeholder: Style::default().with_fg(Color::BrightBlack),
            cursor: Style::default().with_mods(Modifiers::REVERSED),
        }
    }
}

/// A single-line text input.
///
/// Editing keys (characters, backspace, delete, left/right, home/end) are
/// consumed while focused, but only when they change the content or move
/// the cursor: a press with nothing to do (left at the start, backspace on
/// empty content) falls through, so the focus ring can treat an arrow at
/// the field edge as navigation. Everything else, enter included, passes
/// through so forms can act on it.
#[derive(Debug)]
pub struct TextInput {
    /// Current content.
    content: String,
    /// Cursor position as a byte offset into `content`.
    cursor: usize,
    /// Widget bounds; drawing clips to this rectangle.
    bounds: Rect,
    focused: bool,
    style: TextInputStyle,
    /// Prompt prefix, e.g. `"> "`.
    prompt: String,
    /// Placeholder shown while the content is empty.
    placeholder: String,
    /// Mask character for secret entry.
    mask: Option<char>,
}

impl TextInput {
    /// Create a text input occupying `bounds` (one row is used).
    pub fn new(bounds: Rect) -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            bounds,
            focused: false,
            style: TextInputStyle::default(),
            prompt: String::new(),
            placeholder: String::new(),
            mask: None,
        }
    }

    /// Set the prompt prefix.
    #[must_use]
    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.to_string();
        self
    }

    /// Set the placeholder text.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    /// Echo `mask` instead of typed characters.
    #[must_use]
    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Set the visual styles.
    #[must_use]
    pub fn with_style(mut self, style: TextInputStyle) -> Self {
        self.style = style;
        self
    }

    /// Current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the content, moving the cursor to the end.
    pub fn set_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.cursor = self.content.len();
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Widget bounds.
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Move the widget.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Whether the widget currently holds focus.
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Visual column of the cursor within the content.
    fn cursor_column(&self) -> i32 {
        match self.mask {
            Some(_) => self.content[..self.cursor].chars().count() as i32,
            None => visual_width(&self.content[..self.cursor]) as i32,
        }
    }

    fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    // The editing helpers report whether they changed anything, so a
    // boundary press can be declined instead of consumed.

    fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = self.content[..self.cursor]
            .char_indices()
            .last()
            .map_or(0, |(i, _)| i);
        self.content.remove(prev);
        self.cursor = prev;
        true
    }

    fn delete(&mut self) -> bool {
        if self.cursor >= self.content.len() {
            return false;
        }
        self.content.remove(self.cursor);
        true
    }

    fn cursor_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = self.content[..self.cursor]
            .char_indices()
            .last()
            .map_or(0, |(i, _)| i);
        true
    }

    fn cursor_right(&mut self) -> bool {
        let Some(c) = self.content[self.cursor..].chars().next() else {
            return false;
        };
        self.cursor += c.len_utf8();
        true
    }
}

impl Focusable for TextInput {
    fn focus(&mut self) {
        self.focused = true;
    }

    fn blur(&mut self) {
        self.focused = false;
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if !self.focused {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                if key.modifiers.ctrl || key.modifiers.meta {
                    return false;
                }
                self.insert_char(c);
                true
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor_left(),
            KeyCode::Right => self.cursor_right(),
            KeyCode::Home => {
                let moved = self.cursor != 0;
                self.cursor = 0;
                moved
            }
            KeyCode::End => {
                let moved = self.cursor != self.content.len();
                self.cursor = self.content.len();
                moved
            }
            _ => false,
        }
    }

    /// Renders prompt, content (or placeholder), and the cursor cell into
    /// the widget's row, scrolling so the cursor stays visible.
    fn draw(&self, surface: &mut Surface) {
        let clip = Some(self.bounds);
        surface.fill(self.bounds, ' ', self.style.text);

        let mut sgr = Vec::new();
        let prompt_width = visual_width(&self.prompt) as i32;
        if !self.prompt.is_empty() {
            surface.write(0, 0, &restyle(&self.prompt, self.style.prompt, &mut sgr), clip);
        }

        if self.content.is_empty() && !self.focused {
            if !self.placeholder.is_empty() {
                let text = restyle(&self.placeholder, self.style.placeholder, &mut sgr);
                surface.write(prompt_width, 0, &text, clip);
            }
            return;
        }

        let display: String = match self.mask {
            Some(mask) => std::iter::repeat(mask)
                .take(self.content.chars().count())
                .collect(),
            None => self.content.clone(),
        };
        let field_width = i32::from(self.bounds.width).saturating_sub(prompt_width);
        let cursor_col = self.cursor_column();
        // Scroll so the cursor cell stays inside the field
        let scroll = (cursor_col + 1 - field_width).max(0);
        surface.write(
            prompt_width - scroll,
            0,
            &restyle(&display, self.style.text, &mut sgr),
            clip,
        );

        if self.focused {
            let under: char = match self.mask {
                Some(mask) if self.cursor < self.content.len() => mask,
                _ => self.content[self.cursor..].chars().next().unwrap_or(' '),
            };
            let mut cell = String::new();
            cell.push(under);
            surface.write(
                prompt_width + cursor_col - scroll,
                0,
                &restyle(&cell, self.style.cursor, &mut sgr),
                clip,
            );
        }
    }
}

/// Wrap `text` in a style's SGR prefix, reusing `scratch` for the encoder.
fn restyle(text: &str, style: Style, scratch: &mut Vec<u8>) -> String {
    if style.is_default() {
        return text.to_string();
    }
    scratch.clear();
    style.encode_sgr(scratch);
    let mut out = String::from_utf8_lossy(scratch).into_owned();
    out.push_str(text);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> TextInput {
        let mut input = TextInput::new(Rect::new(0, 0, 20, 1));
        input.focus();
        input
    }

    fn press(input: &mut TextInput, code: KeyCode) -> bool {
        input.handle_key(&KeyEvent::plain(code))
    }

    fn type_str(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            assert!(press(input, KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut input = input();
        type_str(&mut input, "Hi");
        assert_eq!(input.content(), "Hi");
        press(&mut input, KeyCode::Left);
        type_str(&mut input, "e");
        assert_eq!(input.content(), "Hei");
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut input = input();
        input.set_content("Hello");
        assert!(press(&mut input, KeyCode::Backspace));
        assert_eq!(input.content(), "Hell");
        press(&mut input, KeyCode::Home);
        assert!(press(&mut input, KeyCode::Delete));
        assert_eq!(input.content(), "ell");
    }

    #[test]
    fn test_cursor_movement_respects_char_boundaries() {
        let mut input = input();
        input.set_content("aé日");
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.content(), "a日");
        press(&mut input, KeyCode::End);
        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.content(), "a");
    }

    #[test]
    fn test_enter_is_not_consumed() {
        let mut input = input();
        assert!(!press(&mut input, KeyCode::Enter));
        assert!(!press(&mut input, KeyCode::Tab));
    }

    #[test]
    fn test_boundary_presses_are_not_consumed() {
        let mut input = input();
        assert!(!press(&mut input, KeyCode::Left));
        assert!(!press(&mut input, KeyCode::Backspace));
        assert!(!press(&mut input, KeyCode::Delete));
        assert!(!press(&mut input, KeyCode::Home));
        assert!(!press(&mut input, KeyCode::End));

        type_str(&mut input, "ab");
        assert!(!press(&mut input, KeyCode::Right));
        assert!(!press(&mut input, KeyCode::End));
        assert!(press(&mut input, KeyCode::Left));
        assert!(press(&mut input, KeyCode::Home));
    }

    #[test]
    fn test_unfocused_input_ignores_keys() {
        let mut input = TextInput::new(Rect::new(0, 0, 20, 1));
        assert!(!press(&mut input, KeyCode::Char('x')));
        assert_eq!(input.content(), "");
    }

    #[test]
    fn test_draw_renders_prompt_and_content() {
        let mut surface = Surface::new(20, 1);
        let mut input = TextInput::new(Rect::new(0, 0, 20, 1)).with_prompt("> ");
        input.focus();
        input.set_content("ok");
        input.draw(&mut surface);
        let row: String = (0..6)
            .map(|x| surface.cell(x, 0).unwrap().glyph())
            .collect();
        assert_eq!(row, "> ok  ");
    }

    #[test]
    fn test_draw_masks_secret_content() {
        let mut surface = Surface::new(20, 1);
        let mut input = TextInput::new(Rect::new(0, 0, 20, 1)).with_mask('*');
        input.focus();
        input.set_content("secret");
        input.draw(&mut surface);
        let row: String = (0..7)
            .map(|x| surface.cell(x, 0).unwrap().glyph())
            .collect();
        assert_eq!(row, "****** ");
    }

    #[test]
    fn test_draw_scrolls_to_keep_cursor_visible() {
        let mut surface = Surface::new(5, 1);
        let mut input = TextInput::new(Rect::new(0, 0, 5, 1));
        input.focus();
        input.set_content("abcdefgh");
        input.draw(&mut surface);
        // Cursor sits one past the end; the tail scrolls into view
        let row: String = (0..5)
            .map(|x| surface.cell(x, 0).unwrap().glyph())
            .collect();
        assert_eq!(row, "efgh ");
    }

    #[test]
    fn test_cursor_cell_uses_cursor_style() {
        let mut surface = Surface::new(10, 1);
        let mut input = TextInput::new(Rect::new(0, 0, 10, 1));
        input.focus();
        input.set_content("ab");
        press(&mut input, KeyCode::Left);
        input.draw(&mut surface);
        let cell = surface.cell(1, 0).unwrap();
        assert_eq!(cell.glyph(), 'b');
        assert!(cell.style().mods.contains(Modifiers::REVERSED));
    }

    #[test]
    fn test_placeholder_shown_when_empty_and_blurred() {
        let mut surface = Surface::new(10, 1);
        let input = TextInput::new(Rect::new(0, 0, 10, 1)).with_placeholder("name");
        input.draw(&mut surface);
        let row: String = (0..4)
            .map(|x| surface.cell(x, 0).unwrap().glyph())
            .collect();
        assert_eq!(row, "name");
    }
}
