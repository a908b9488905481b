//! Double-buffered drawing surface.
//!
//! A [`Surface`] owns the front and back cell grids, per-row dirty flags,
//! and the cursor/style memory that carries across flushes. Drawing writes
//! styled text into the back grid; [`Surface::flush_into`] diffs the two
//! grids and appends the minimal escape stream to a byte buffer.
//!
//! Writes never render outside their clip rectangle, and a flush with no
//! intervening writes emits nothing.

use unicode_width::UnicodeWidthChar;

use crate::buffer::diff::{render_diff, DiffStats, FlushState};
use crate::buffer::{Cell, Grid};
use crate::layout::Rect;
use crate::style::{parse_params, Style, Token, Tokens};

/// Double-buffered cell surface with dirty-row tracking.
#[derive(Debug)]
pub struct Surface {
    current: Grid,
    previous: Grid,
    dirty: Vec<bool>,
    state: FlushState,
}

impl Surface {
    /// Create a surface of the given size. All cells start blank and every
    /// row starts dirty, so the first flush paints the full frame.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            current: Grid::new(width, height),
            previous: Grid::new(width, height),
            dirty: vec![true; height as usize],
            state: FlushState::new(),
        }
    }

    /// Surface width in columns.
    pub const fn width(&self) -> u16 {
        self.current.width()
    }

    /// Surface height in rows.
    pub const fn height(&self) -> u16 {
        self.current.height()
    }

    /// Bounds of the whole surface as a rectangle at the origin.
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    /// Cell at a position in the back grid.
    pub fn cell(&self, x: u16, y: u16) -> Option<&Cell> {
        self.current.get(x, y)
    }

    /// Resize both grids, discarding all content.
    ///
    /// Cursor and style memory is dropped with it: the terminal scrambles
    /// layout on resize, so nothing from before can be trusted.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.current.resize(width, height);
        self.previous.resize(width, height);
        self.dirty.clear();
        self.dirty.resize(height as usize, true);
        self.state.reset();
    }

    /// Blank the back grid and mark every row dirty.
    pub fn clear(&mut self) {
        self.current.clear();
        for flag in &mut self.dirty {
            *flag = true;
        }
    }

    /// Forget what the terminal is showing, forcing the next flush to
    /// repaint every cell.
    pub fn invalidate(&mut self) {
        self.previous.clear();
        for flag in &mut self.dirty {
            *flag = true;
        }
        self.state.reset();
    }

    /// Write styled text into the back grid at `(x, y)`.
    ///
    /// The text is a single row: SGR sequences restyle the run, every other
    /// escape or control character is dropped. With a clip rectangle the
    /// coordinates are relative to the clip origin and nothing renders
    /// outside it (or outside the surface). Coordinates may be negative;
    /// cells that fall before the left edge are consumed without rendering.
    /// A wide glyph that straddles an edge is dropped whole, but still
    /// advances the cursor by its width.
    pub fn write(&mut self, x: i32, y: i32, text: &str, clip: Option<Rect>) {
        let bounds = match clip {
            Some(rect) => rect.intersection(&self.bounds()),
            None => self.bounds(),
        };
        if bounds.is_empty() {
            return;
        }
        let origin = clip.map_or((0, 0), |rect| (i32::from(rect.x), i32::from(rect.y)));
        let row = origin.1 + y;
        if row < i32::from(bounds.y) || row >= i32::from(bounds.bottom()) {
            return;
        }
        let row = row as u16;
        let (x0, x1) = (i32::from(bounds.x), i32::from(bounds.right()));

        let mut col = origin.0 + x;
        let mut style = Style::default();
        let mut params = Vec::new();
        for token in Tokens::new(text) {
            match token {
                Token::Sgr(raw) => {
                    parse_params(raw, &mut params);
                    style.apply_sgr(&params);
                }
                Token::Char(c) => {
                    let width = c.width().unwrap_or(0) as i32;
                    if width == 0 {
                        // Control and zero-width characters do not render
                        continue;
                    }
                    if col >= x1 {
                        break;
                    }
                    if col >= x0 && col + width <= x1 {
                        self.place(col as u16, row, c, width == 2, style);
                    }
                    col += width;
                }
            }
        }
    }

    /// Fill a rectangle with a single styled character.
    pub fn fill(&mut self, rect: Rect, c: char, style: Style) {
        let area = rect.intersection(&self.bounds());
        let wide = c.width().unwrap_or(1) > 1;
        let step = if wide { 2 } else { 1 };
        for y in area.y..area.bottom() {
            let mut x = area.x;
            while x + step <= area.right() {
                self.place(x, y, c, wide, style);
                x += step;
            }
        }
    }

    /// Append the escape stream for all pending changes to `out`.
    pub fn flush_into(&mut self, out: &mut Vec<u8>) -> DiffStats {
        render_diff(
            &self.current,
            &mut self.previous,
            &mut self.dirty,
            out,
            &mut self.state,
        )
    }

    fn place(&mut self, x: u16, y: u16, c: char, wide: bool, style: Style) {
        self.put(x, y, Cell::styled(c, style));
        if wide {
            self.put(x + 1, y, Cell::continuation(style));
        }
    }

    /// Store one cell, blanking the orphaned half of any wide glyph this
    /// write cuts through.
    fn put(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(existing) = self.current.get(x, y).copied() else {
            return;
        };
        if existing.is_continuation() && x > 0 {
            let head_style = self
                .current
                .get(x - 1, y)
                .map_or_else(Style::default, |head| head.style());
            self.current.set(x - 1, y, Cell::styled(' ', head_style));
        }
        if existing.is_wide() {
            self.current.set(x + 1, y, Cell::styled(' ', existing.style()));
        }
        self.current.set(x, y, cell);
        self.dirty[usize::from(y)] = true;
    }
}
