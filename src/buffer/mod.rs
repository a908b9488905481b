//! Buffer module: core data structures for the double-buffer renderer.
//!
//! This module contains:
//! - [`Cell`]: one glyph plus its style, the atomic unit of display
//! - [`Grid`]: a row-major plane of cells
//! - [`diff`]: the run-based diff renderer producing minimal ANSI output

mod cell;
mod grid;
pub mod diff;

pub use cell::Cell;
pub use grid::Grid;
