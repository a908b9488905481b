//! Ordered focus ring with key routing.
//!
//! Elements register in tab order. Keys go to the active element first,
//! then bubble up its parent chain; only unconsumed keys reach the ring's
//! own navigation (tab and arrows, wrapping at the ends). This lets a text
//! input swallow arrow keys for cursor movement while buttons let the same
//! keys move focus.

use std::rc::Rc;

use tracing::trace;

use super::focusable::FocusHandle;
use crate::input::{KeyCode, KeyEvent};

/// Upper bound on parent links followed while bubbling one key. Parent
/// graphs are expected to be shallow trees; a cycle stops here instead of
/// hanging the dispatch.
const MAX_PARENT_HOPS: usize = 32;

/// Registry of focusable elements in navigation order.
#[derive(Default)]
pub struct FocusRing {
    items: Vec<FocusHandle>,
    active: Option<usize>,
}

impl FocusRing {
    /// Create an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the ring has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an element at the end of the ring.
    ///
    /// The first element registered receives focus immediately.
    pub fn register(&mut self, item: FocusHandle) {
        self.items.push(item);
        if self.active.is_none() {
            self.activate(0);
        }
    }

    /// Remove an element. If it was active, focus moves to the next element
    /// in order. Returns whether the element was registered.
    pub fn unregister(&mut self, item: &FocusHandle) -> bool {
        let Some(index) = self.items.iter().position(|i| Rc::ptr_eq(i, item)) else {
            return false;
        };
        self.items.remove(index);
        match self.active {
            Some(active) if active == index => {
                if self.items.is_empty() {
                    self.active = None;
                } else {
                    // The element after the removed one sits at its index now
                    self.activate(index % self.items.len());
                }
            }
            Some(active) if active > index => self.active = Some(active - 1),
            _ => {}
        }
        true
    }

    /// Handle to the active element.
    pub fn active(&self) -> Option<FocusHandle> {
        self.active.map(|i| Rc::clone(&self.items[i]))
    }

    /// Whether `item` currently holds focus.
    pub fn is_active(&self, item: &FocusHandle) -> bool {
        self.active
            .is_some_and(|i| Rc::ptr_eq(&self.items[i], item))
    }

    /// Move focus to a specific element. Returns whether it was registered.
    pub fn focus(&mut self, item: &FocusHandle) -> bool {
        let Some(index) = self.items.iter().position(|i| Rc::ptr_eq(i, item)) else {
            return false;
        };
        self.move_to(index);
        true
    }

    /// Advance focus to the next element, wrapping at the end.
    pub fn focus_next(&mut self) {
        if let Some(active) = self.active {
            self.move_to((active + 1) % self.items.len());
        }
    }

    /// Move focus to the previous element, wrapping at the start.
    pub fn focus_prev(&mut self) {
        if let Some(active) = self.active {
            self.move_to((active + self.items.len() - 1) % self.items.len());
        }
    }

    /// Route a key event. Returns whether anything consumed it.
    ///
    /// Order: the active element, then its parent chain (followed for at
    /// most a fixed number of links), then ring navigation for plain tab
    /// and arrow keys.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if let Some(active) = self.active() {
            if active.borrow_mut().handle_key(key) {
                return true;
            }
            let mut link = active.borrow().parent();
            let mut hops = 0;
            while let Some(weak) = link {
                if hops == MAX_PARENT_HOPS {
                    break;
                }
                let Some(container) = weak.upgrade() else {
                    break;
                };
                if container.borrow_mut().handle_key(key) {
                    return true;
                }
                link = container.borrow().parent();
                hops += 1;
            }
        }
        self.navigate(key)
    }

    /// Ring navigation fallback for unconsumed keys.
    fn navigate(&mut self, key: &KeyEvent) -> bool {
        if self.items.is_empty() || key.modifiers.ctrl || key.modifiers.meta {
            return false;
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down | KeyCode::Right => {
                self.focus_next();
                true
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Left => {
                self.focus_prev();
                true
            }
            _ => false,
        }
    }

    /// Blur the active element and focus the one at `index`.
    fn move_to(&mut self, index: usize) {
        if let Some(active) = self.active {
            if active == index {
                return;
            }
            self.items[active].borrow_mut().blur();
        }
        self.activate(index);
    }

    fn activate(&mut self, index: usize) {
        trace!(index, "focus moved");
        self.active = Some(index);
        self.items[index].borrow_mut().focus();
    }
}

impl std::fmt::Debug for FocusRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusRing")
            .field("items", &self.items.len())
            .field("active", &self.active)
            .finish()
    }
}
