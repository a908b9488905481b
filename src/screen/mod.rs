//! Frame composition: the drawing surface and the z-ordered root registry.

mod compositor;
mod surface;

pub use compositor::{layer, Compositor, RootId};
pub use surface::Surface;
