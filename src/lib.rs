//! # Weft
//!
//! A cell-grid rendering runtime for interactive terminal applications.
//!
//! Weft keeps a double-buffered grid of styled cells, diffs frames row by
//! row, and emits the near-minimal ANSI byte stream to bring the terminal
//! up to date. Around that core it layers raw input decoding, z-ordered
//! compositing, and keyboard focus routing.
//!
//! ## Core Concepts
//!
//! - **Double-buffered grid**: writes land in a back grid; a flush diffs it
//!   against what the terminal shows and emits only the changed runs
//! - **Structured styles**: SGR text is parsed once into [`style::Style`]
//!   values and re-encoded exactly once per run at flush time
//! - **Raw input decoding**: bytes from a raw-mode terminal become key and
//!   mouse events, with escape sequences reassembled across reads
//! - **Session**: raw mode, alternate screen, signal-safe restore, and the
//!   event loop tying input to repaints
//!
//! ## Example
//!
//! ```rust,ignore
//! use weft::screen::layer;
//! use weft::Session;
//!
//! let mut session = Session::new();
//! session.mount(layer::CONTENT, Box::new(|s| {
//!     s.write(2, 1, "hello \x1b[1mworld\x1b[0m", None);
//! }));
//! session.on_key(|s, key| {
//!     if key.is_ctrl('q') {
//!         s.stop();
//!     }
//!     false
//! });
//! session.run()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod focus;
pub mod input;
pub mod layout;
pub mod screen;
pub mod session;
pub mod style;
pub mod terminal;
pub mod widget;

// Re-exports for convenience
pub use buffer::{Cell, Grid};
pub use focus::{FocusHandle, FocusRing, Focusable};
pub use input::{
    InputEvent, KeyCode, KeyEvent, KeyModifiers, MouseAction, MouseButton, MouseEvent,
};
pub use layout::Rect;
pub use screen::{Compositor, Surface};
pub use session::{Error, ListenerId, Session, SessionConfig};
pub use style::{Color, Modifiers, Style};
