//! Style module: colors, attributes, and styled-text helpers.
//!
//! The engine represents styling structurally. [`Style`] carries a
//! foreground [`Color`], a background [`Color`], and a [`Modifiers`] bitset;
//! SGR escape text is parsed into styles on the way in and re-encoded as one
//! reset-and-apply sequence on the way out.

mod color;
mod text;

pub use color::{Color, Modifiers, Style};
pub use text::{strip, styled, truncate, truncate_split, visual_width};

pub(crate) use text::{parse_params, Token, Tokens};
