//! Ready-made focusable widgets.
//!
//! These are small reference implementations of the focus and drawing
//! contracts: each widget is a plain struct that implements
//! [`crate::focus::Focusable`] for key handling and exposes a `draw`
//! method to call from a mounted root.

mod button;
mod text_input;

pub use button::{Button, ButtonStyle};
pub use text_input::{TextInput, TextInputStyle};
