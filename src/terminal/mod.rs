//! Terminal module: byte-level output and the restore safety net.

mod output;
mod restore;

pub use output::OutputBuffer;
pub use restore::restore_now;

pub(crate) use restore::{install_panic_hook, mark_entered, mark_left};
