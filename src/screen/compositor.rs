//! Z-ordered root compositing.
//!
//! A root is a draw closure mounted at a z level. While any roots are
//! mounted, a repaint blanks the surface and runs every root in ascending
//! z order, so later layers overdraw earlier ones; the cell diff then
//! keeps the emitted bytes proportional to what actually changed on
//! screen. With no roots the frame is whatever was written directly.

use super::Surface;

/// Conventional z bands for mounted roots.
pub mod layer {
    /// Backdrops and chrome that everything else draws over.
    pub const BACKGROUND: i32 = 0;
    /// Ordinary application content.
    pub const CONTENT: i32 = 100;
    /// Dialogs and overlays that cover content.
    pub const MODAL: i32 = 200;
    /// Transient hints above everything.
    pub const TOOLTIP: i32 = 300;
}

/// Handle identifying a mounted root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootId(u64);

type DrawFn = Box<dyn FnMut(&mut Surface)>;

struct Root {
    id: RootId,
    z: i32,
    draw: DrawFn,
}

/// Registry of draw roots, painted back to front.
#[derive(Default)]
pub struct Compositor {
    roots: Vec<Root>,
    next_id: u64,
    needs_paint: bool,
}

impl Compositor {
    /// Create an empty compositor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a draw closure at a z level and schedule a repaint.
    ///
    /// Roots at the same level keep their mount order, later on top.
    pub fn mount(&mut self, z: i32, draw: DrawFn) -> RootId {
        let id = RootId(self.next_id);
        self.next_id += 1;
        self.roots.push(Root { id, z, draw });
        self.roots.sort_by_key(|root| root.z);
        self.needs_paint = true;
        id
    }

    /// Remove a root. Returns whether it was mounted.
    pub fn unmount(&mut self, id: RootId) -> bool {
        let before = self.roots.len();
        self.roots.retain(|root| root.id != id);
        let removed = self.roots.len() != before;
        if removed {
            self.needs_paint = true;
        }
        removed
    }

    /// Number of mounted roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no roots are mounted.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Request a repaint on the next frame.
    pub fn schedule(&mut self) {
        self.needs_paint = true;
    }

    /// Whether a repaint has been requested.
    pub fn scheduled(&self) -> bool {
        self.needs_paint
    }

    /// Blank the surface and draw every root in z order.
    ///
    /// With no roots mounted the surface is left untouched; content put
    /// there by direct writes stays until a root takes over the frame.
    pub fn repaint(&mut self, surface: &mut Surface) {
        if !self.roots.is_empty() {
            surface.clear();
            for root in &mut self.roots {
                (root.draw)(surface);
            }
        }
        self.needs_paint = false;
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("roots", &self.roots.len())
            .field("needs_paint", &self.needs_paint)
            .finish()
    }
}
