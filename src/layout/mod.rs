//! Layout module: rectangle geometry for clipping and demo layout.

mod rect;

pub use rect::Rect;
