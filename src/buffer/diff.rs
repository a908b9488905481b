//! Diff renderer: minimal ANSI sequences from grid deltas.
//!
//! The anti-flicker core. Dirty rows of the current grid are compared
//! against the previously flushed grid cell by cell; consecutive changed
//! cells sharing one style coalesce into runs, each emitted as at most one
//! cursor move, at most one SGR sequence, and the run's glyphs. Cursor and
//! style memory persists across flushes so repeated updates to the same
//! region cost almost nothing.

use std::io::Write;

use super::Grid;
use crate::style::Style;

/// Largest column gap bridged with a relative `CSI n C` move. Wider gaps
/// (and any row change) use absolute addressing.
const RELATIVE_MOVE_MAX: u16 = 4;

/// Terminal-side cursor and style memory carried across flushes.
///
/// Tracks what the real terminal last saw so redundant positioning and SGR
/// traffic can be skipped. Must be reset whenever that knowledge is
/// invalidated (resize, explicit clear, session entry).
#[derive(Debug, Clone)]
pub struct FlushState {
    /// Cursor position after the last emitted run, if known.
    cursor: Option<(u16, u16)>,
    /// Style of the last emitted run, if known.
    style: Option<Style>,
}

impl Default for FlushState {
    fn default() -> Self {
        Self::new()
    }
}

impl FlushState {
    /// Create a state with no knowledge of the terminal.
    pub const fn new() -> Self {
        Self { cursor: None, style: None }
    }

    /// Forget everything; the next run re-emits position and style.
    pub fn reset(&mut self) {
        self.cursor = None;
        self.style = None;
    }
}

/// Statistics from one diff pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffStats {
    /// Number of cells covered by emitted runs (continuations included).
    pub cells_changed: usize,
    /// Number of runs emitted.
    pub runs: usize,
    /// Number of cursor move sequences emitted.
    pub cursor_moves: usize,
    /// Number of style sequences emitted.
    pub style_changes: usize,
}

/// Emit the minimal update taking `previous` to `current`.
///
/// Only rows flagged in `dirty_rows` are examined. Processed rows are
/// copied into `previous` and their flags cleared, so flushing twice in a
/// row appends nothing the second time.
pub fn render_diff(
    current: &Grid,
    previous: &mut Grid,
    dirty_rows: &mut [bool],
    out: &mut Vec<u8>,
    state: &mut FlushState,
) -> DiffStats {
    debug_assert_eq!(current.width(), previous.width());
    debug_assert_eq!(current.height(), previous.height());
    debug_assert_eq!(dirty_rows.len(), current.height() as usize);

    let mut stats = DiffStats::default();
    for y in 0..current.height() {
        if !dirty_rows[y as usize] {
            continue;
        }
        diff_row(current, previous, y, out, state, &mut stats);
        previous.copy_row_from(current, y);
        dirty_rows[y as usize] = false;
    }
    stats
}

/// Diff a single row into runs.
fn diff_row(
    current: &Grid,
    previous: &Grid,
    y: u16,
    out: &mut Vec<u8>,
    state: &mut FlushState,
    stats: &mut DiffStats,
) {
    let (Some(cur), Some(prev)) = (current.row(y), previous.row(y)) else {
        return;
    };
    let width = cur.len();
    let mut x = 0;
    while x < width {
        if cur[x] == prev[x] {
            x += 1;
            continue;
        }
        // A continuation only differs when its wide lead does too, and the
        // lead was handled just before it. Never anchor a run on one.
        if cur[x].is_continuation() {
            x += 1;
            continue;
        }

        let run_style = cur[x].style();
        position_cursor(out, x as u16, y, state, stats);
        if state.style != Some(run_style) {
            run_style.encode_sgr(out);
            state.style = Some(run_style);
            stats.style_changes += 1;
        }
        stats.runs += 1;

        let mut buf = [0u8; 4];
        // Where the terminal cursor lands; a trailing wide glyph pushes it
        // one column past the last examined cell
        let mut run_end = x;
        while x < width && cur[x] != prev[x] {
            let cell = &cur[x];
            if cell.is_continuation() {
                // The wide glyph just written already advanced over this
                stats.cells_changed += 1;
                x += 1;
                continue;
            }
            if cell.style() != run_style {
                break;
            }
            out.extend_from_slice(cell.glyph().encode_utf8(&mut buf).as_bytes());
            stats.cells_changed += 1;
            run_end = x + cell.width() as usize;
            x += 1;
        }
        state.cursor = Some((run_end as u16, y));
    }
}

/// Position the cursor for the next run.
///
/// A no-op when already in place; a relative right-move when the gap on the
/// same row is small; otherwise the most compact absolute form (`CSI H` for
/// home, `CSI rowH` for column one, `CSI row;colH` in general).
fn position_cursor(
    out: &mut Vec<u8>,
    x: u16,
    y: u16,
    state: &mut FlushState,
    stats: &mut DiffStats,
) {
    if state.cursor == Some((x, y)) {
        return;
    }
    if let Some((cx, cy)) = state.cursor {
        if cy == y && x > cx && x - cx <= RELATIVE_MOVE_MAX {
            let _ = write!(out, "\x1b[{}C", x - cx);
            state.cursor = Some((x, y));
            stats.cursor_moves += 1;
            return;
        }
    }
    // ANSI uses 1-indexed positions
    let row = y + 1;
    let col = x + 1;
    if row == 1 && col == 1 {
        out.extend_from_slice(b"\x1b[H");
    } else if col == 1 {
        let _ = write!(out, "\x1b[{row}H");
    } else {
        let _ = write!(out, "\x1b[{row};{col}H");
    }
    state.cursor = Some((x, y));
    stats.cursor_moves += 1;
}
