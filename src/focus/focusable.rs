//! The contract for elements that can hold keyboard focus.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::input::KeyEvent;
use crate::screen::Surface;

/// Shared handle to a focusable element.
pub type FocusHandle = Rc<RefCell<dyn Focusable>>;

/// Weak handle used for parent links, so containers and children can refer
/// to each other without a cycle.
pub type FocusLink = Weak<RefCell<dyn Focusable>>;

/// An element that can take keyboard focus and consume key events.
///
/// Focus and blur are notifications, not requests: by the time they run the
/// ring has already moved. `handle_key` returns whether the event was
/// consumed; unconsumed events bubble to [`Focusable::parent`] and finally
/// fall back to ring navigation.
pub trait Focusable {
    /// Called when the element becomes the active focus target.
    fn focus(&mut self) {}

    /// Called when focus moves away.
    fn blur(&mut self) {}

    /// Offer a key event to the element. Return `true` to stop routing.
    fn handle_key(&mut self, key: &KeyEvent) -> bool;

    /// Paint the element into the frame.
    fn draw(&self, _surface: &mut Surface) {}

    /// Enclosing container to bubble unconsumed keys to.
    fn parent(&self) -> Option<FocusLink> {
        None
    }
}
