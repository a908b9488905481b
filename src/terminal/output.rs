//! `OutputBuffer`: single-syscall output buffer for ANSI sequences.

use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// Control sequences and diff output are accumulated here, then flushed in a
/// single `write()` syscall so the terminal never sees a half-painted frame.
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the underlying byte vector, for diff emission.
    #[inline]
    pub(crate) fn as_mut_vec(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    /// Get the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Hide the cursor.
    #[inline]
    pub fn cursor_hide(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25l");
    }

    /// Show the cursor.
    #[inline]
    pub fn cursor_show(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25h");
    }

    /// Move the cursor to the top-left corner.
    #[inline]
    pub fn cursor_home(&mut self) {
        self.data.extend_from_slice(b"\x1b[H");
    }

    /// Reset all SGR attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
    }

    /// Clear the entire screen.
    #[inline]
    pub fn clear_screen(&mut self) {
        self.data.extend_from_slice(b"\x1b[2J");
    }

    /// Switch to the alternate screen buffer.
    #[inline]
    pub fn enter_alt_screen(&mut self) {
        self.data.extend_from_slice(b"\x1b[?1049h");
    }

    /// Return to the main screen buffer.
    #[inline]
    pub fn leave_alt_screen(&mut self) {
        self.data.extend_from_slice(b"\x1b[?1049l");
    }

    /// Enable mouse reporting: button events, drag motion, SGR encoding.
    #[inline]
    pub fn enable_mouse(&mut self) {
        self.data
            .extend_from_slice(b"\x1b[?1000h\x1b[?1002h\x1b[?1006h");
    }

    /// Disable mouse reporting, reversing [`OutputBuffer::enable_mouse`].
    #[inline]
    pub fn disable_mouse(&mut self) {
        self.data
            .extend_from_slice(b"\x1b[?1006l\x1b[?1002l\x1b[?1000l");
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
