//! Dialog overlays.
//!
//! This module owns everything that floats above the page:
//! - [`DialogStack`] - the ordered collection of open dialogs
//! - [`Dialogs`] - the single shared handle every screen talks to
//! - [`OverlayHost`] - draws the stack over the page and hit-tests clicks
//! - [`AuthGuard`] - asks the user to log in before a protected action

mod guard;
mod host;
mod scroll_lock;
mod stack;

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::KeyEvent;

pub use guard::{AuthGuard, AuthStatus, Navigator};
pub use host::OverlayHost;
pub use scroll_lock::ScrollLock;
pub use stack::{DialogStack, ModalId, ModalOptions};

use crate::ui::{DialogEvent, EventResult, Modal, Result};

pub type BoxedModal = Box<dyn Modal>;

/// Shared handle to the application's one dialog stack.
///
/// Cloning the handle does not create a new stack; every clone operates on
/// the same collection. Each method borrows the stack only for its own
/// duration, so callers never hold a borrow across calls.
#[derive(Clone)]
pub struct Dialogs {
    stack: Rc<RefCell<DialogStack<BoxedModal>>>,
    scroll_lock: ScrollLock,
}

impl Dialogs {
    pub fn new(scroll_lock: ScrollLock) -> Self {
        Self {
            stack: Rc::new(RefCell::new(DialogStack::new(scroll_lock.clone()))),
            scroll_lock,
        }
    }

    /// Open `modal` on top with default options.
    pub fn open(&self, modal: impl Modal + 'static) -> ModalId {
        self.open_with(modal, ModalOptions::default())
    }

    pub fn open_with(&self, modal: impl Modal + 'static, options: ModalOptions) -> ModalId {
        self.stack.borrow_mut().open(Box::new(modal), options)
    }

    /// Close `id`, or the topmost dialog when `id` is `None`.
    ///
    /// Returns whether anything was closed.
    pub fn close(&self, id: Option<ModalId>) -> bool {
        self.stack.borrow_mut().close(id).is_some()
    }

    pub fn close_all(&self) {
        self.stack.borrow_mut().close_all();
    }

    pub fn dismiss_from_backdrop(&self, id: ModalId) -> bool {
        self.stack.borrow_mut().dismiss_from_backdrop(id)
    }

    pub fn handle_key(&self, key: KeyEvent) -> Result<EventResult<(ModalId, DialogEvent)>> {
        self.stack.borrow_mut().handle_key(key)
    }

    pub fn is_open(&self) -> bool {
        self.stack.borrow().is_open()
    }

    pub fn count(&self) -> usize {
        self.stack.borrow().count()
    }

    pub fn top_id(&self) -> Option<ModalId> {
        self.stack.borrow().top_id()
    }

    pub fn contains(&self, id: ModalId) -> bool {
        self.stack.borrow().contains(id)
    }

    /// Title of the topmost dialog, for the status bar.
    pub fn top_title(&self) -> Option<String> {
        let stack = self.stack.borrow();
        let id = stack.top_id()?;
        stack.get(id)?.content().title().map(str::to_string)
    }

    pub fn ids(&self) -> Vec<ModalId> {
        self.stack.borrow().ids()
    }

    pub const fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll_lock
    }

    fn with_stack<R>(&self, f: impl FnOnce(&mut DialogStack<BoxedModal>) -> R) -> R {
        f(&mut self.stack.borrow_mut())
    }
}

impl Default for Dialogs {
    fn default() -> Self {
        Self::new(ScrollLock::new())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::KeyResolver;
    use crate::ui::{ConfirmDialog, ErrorDialog};

    #[test]
    fn test_clones_share_one_stack() {
        let dialogs = Dialogs::default();
        let page_handle = dialogs.clone();

        let id = dialogs.open(ErrorDialog::new("boom", Arc::new(KeyResolver::default())));

        assert!(page_handle.contains(id));
        assert!(page_handle.scroll_lock().is_locked());
        page_handle.close_all();
        assert!(!dialogs.is_open());
        assert!(!dialogs.scroll_lock().is_locked());
    }

    #[test]
    fn test_top_title_follows_topmost() {
        let dialogs = Dialogs::default();
        let resolver = Arc::new(KeyResolver::default());
        assert_eq!(dialogs.top_title(), None);

        dialogs.open(ErrorDialog::new("boom", Arc::clone(&resolver)));
        let confirm = dialogs.open(ConfirmDialog::new("Sure?", resolver).with_title("Delete entry"));
        assert_eq!(dialogs.top_title().as_deref(), Some("Delete entry"));

        dialogs.close(Some(confirm));
        assert_eq!(dialogs.top_title().as_deref(), Some("Error"));
    }
}
