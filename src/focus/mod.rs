//! Keyboard focus: the focusable contract and the navigation ring.

mod focusable;
mod ring;

pub use focusable::{FocusHandle, FocusLink, Focusable};
pub use ring::FocusRing;
