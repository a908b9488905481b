//! Grid: a row-major plane of cells.
//!
//! Cells live in one contiguous `Vec` for cache efficiency, indexed as
//! `y * width + x`. The grid knows nothing about dirtiness or diffing; the
//! surface layers that on top with two grids and a per-row dirty set.

use super::cell::Cell;

/// A grid of cells covering the terminal screen.
#[derive(Clone)]
pub struct Grid {
    /// Contiguous cell storage (row-major order).
    cells: Vec<Cell>,
    /// Width in columns.
    width: u16,
    /// Height in rows.
    height: u16,
}

impl Grid {
    /// Create a grid of blank cells. Zero-sized grids are valid and simply
    /// hold no cells.
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            cells: vec![Cell::EMPTY; size],
            width,
            height,
        }
    }

    /// Grid width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Convert (x, y) coordinates to a linear index.
    ///
    /// Returns `None` if coordinates are out of bounds.
    #[inline]
    pub fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Get a reference to the cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Set the cell at (x, y). Returns `false` if out of bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if let Some(idx) = self.index_of(x, y) {
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    /// Get one row as a slice, or `None` past the bottom.
    #[inline]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = (y as usize) * (self.width as usize);
            Some(&self.cells[start..start + self.width as usize])
        } else {
            None
        }
    }

    /// Copy one row from another grid of identical dimensions.
    pub(crate) fn copy_row_from(&mut self, other: &Self, y: u16) {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        if y < self.height {
            let start = (y as usize) * (self.width as usize);
            let end = start + self.width as usize;
            self.cells[start..end].copy_from_slice(&other.cells[start..end]);
        }
    }

    /// Get the underlying cell slice.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Fill the whole grid with blank cells.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the grid, discarding all content.
    ///
    /// The caller is expected to repaint from its own model afterwards.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = (width as usize) * (height as usize);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
