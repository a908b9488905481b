//! Cell: the atomic unit of terminal display.
//!
//! Each cell holds one code point plus the [`Style`] it renders under. Wide
//! glyphs (CJK, fullwidth forms, most emoji) occupy two cells: the leading
//! cell carries the glyph with width 2, the trailing cell is a continuation
//! with width 0 that never renders on its own.

use unicode_width::UnicodeWidthChar;

use crate::style::Style;

/// A single terminal cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// The character displayed in this cell.
    glyph: char,
    /// Display width: 0 = wide continuation, 1 = normal, 2 = wide.
    width: u8,
    /// The style the glyph renders under.
    style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// An empty cell (space with the default style).
    pub const EMPTY: Self = Self {
        glyph: ' ',
        width: 1,
        style: Style::DEFAULT,
    };

    /// Create a cell from a character with the default style.
    #[inline]
    pub fn new(glyph: char) -> Self {
        Self::styled(glyph, Style::DEFAULT)
    }

    /// Create a cell from a character and a style.
    ///
    /// The display width is derived from the character; zero-width code
    /// points get width 1 so they stay addressable in the grid.
    #[inline]
    pub fn styled(glyph: char, style: Style) -> Self {
        let width = glyph.width().unwrap_or(1).clamp(1, 2) as u8;
        Self { glyph, width, style }
    }

    /// Create the continuation cell placed behind a wide glyph.
    #[inline]
    pub const fn continuation(style: Style) -> Self {
        Self { glyph: ' ', width: 0, style }
    }

    /// The character displayed in this cell.
    #[inline]
    pub const fn glyph(&self) -> char {
        self.glyph
    }

    /// Display width (0 for continuations, otherwise 1 or 2).
    #[inline]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// The cell's style.
    #[inline]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// Whether this cell trails a wide glyph.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Whether the glyph needs a continuation cell after it.
    #[inline]
    pub const fn is_wide(&self) -> bool {
        self.width == 2
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            write!(f, "Cell(<cont>)")
        } else {
            write!(f, "Cell({:?} w{} {:?})", self.glyph, self.width, self.style)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Color, Modifiers};

    #[test]
    fn test_cell_ascii_width() {
        let cell = Cell::new('A');
        assert_eq!(cell.glyph(), 'A');
        assert_eq!(cell.width(), 1);
        assert!(!cell.is_wide());
    }

    #[test]
    fn test_cell_cjk_is_wide() {
        let cell = Cell::new('日');
        assert_eq!(cell.width(), 2);
        assert!(cell.is_wide());
        assert!(!cell.is_continuation());
    }

    #[test]
    fn test_continuation_cell() {
        let style = Style::default().with_bg(Color::Blue);
        let cont = Cell::continuation(style);
        assert!(cont.is_continuation());
        assert_eq!(cont.width(), 0);
        assert_eq!(cont.style(), style);
    }

    #[test]
    fn test_zero_width_codepoint_stays_addressable() {
        // Combining acute accent reports width 0 on its own
        let cell = Cell::new('\u{0301}');
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn test_cell_equality_includes_style() {
        let bold = Style::default().with_mods(Modifiers::BOLD);
        let a = Cell::styled('x', bold);
        let b = Cell::styled('x', bold);
        let c = Cell::new('x');
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_empty_cell_is_default() {
        assert_eq!(Cell::default(), Cell::EMPTY);
        assert_eq!(Cell::EMPTY.glyph(), ' ');
        assert_eq!(Cell::EMPTY.width(), 1);
    }
}
