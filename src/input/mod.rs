//! Terminal input: raw-byte decoding and the threads that produce bytes.

mod decoder;
mod event;
mod reader;

pub use decoder::Decoder;
pub use event::{
    InputEvent, KeyCode, KeyEvent, KeyModifiers, MouseAction, MouseButton, MouseEvent,
};
pub use reader::ReaderEvent;

pub(crate) use reader::StdinReader;

#[cfg(unix)]
pub(crate) use reader::SignalWatcher;
