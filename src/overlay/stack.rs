//! Ordered stack of open dialogs.
//!
//! The stack owns every open dialog in the application. Entries are kept in
//! the order they were opened: the last entry is the topmost one, it is the
//! only one that receives keys and the only one a backdrop click may close.
//!
//! # Invariants
//!
//! - New entries are appended, so order always equals recency.
//! - Ids come from a process-wide counter and are never handed out twice.
//! - Layer values strictly increase with position, and each entry's content
//!   sits exactly one layer above its own backdrop.
//! - The page scroll lock is held exactly while the stack is non-empty.
//!
//! # Failure Modes
//!
//! None. Closing an unknown id or closing an empty stack is a no-op, since
//! async completions may race a user closing the same dialog.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::event::KeyEvent;
use tracing::debug;

use super::scroll_lock::{ScrollLock, ScrollLockGuard};
use crate::ui::{DialogEvent, EventResult, Modal, Result};

/// Layer of the bottom-most backdrop.
pub const BASE_LAYER: u32 = 1000;

/// Distance between two stacked entries.
pub const LAYER_INCREMENT: u32 = 10;

static NEXT_MODAL_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one open dialog for as long as the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModalId(u64);

impl ModalId {
    fn next() -> Self {
        Self(NEXT_MODAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal#{}", self.0)
    }
}

/// Per-entry behaviour overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModalOptions {
    /// Ignore backdrop clicks; the dialog must be closed explicitly.
    pub prevent_backdrop_close: bool,
}

impl ModalOptions {
    pub const fn prevent_backdrop_close() -> Self {
        Self {
            prevent_backdrop_close: true,
        }
    }
}

/// Visual layers of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Layer {
    pub backdrop: u32,
    pub content: u32,
}

impl Layer {
    /// Layer of the entry at `index` (0 = bottom).
    pub fn at(index: usize) -> Self {
        let offset = u32::try_from(index)
            .unwrap_or(u32::MAX)
            .saturating_mul(LAYER_INCREMENT);
        let backdrop = BASE_LAYER.saturating_add(offset);
        Self {
            backdrop,
            content: backdrop.saturating_add(1),
        }
    }
}

/// One open dialog.
pub struct ModalEntry<C> {
    id: ModalId,
    content: C,
    options: ModalOptions,
}

impl<C> ModalEntry<C> {
    pub const fn id(&self) -> ModalId {
        self.id
    }

    pub const fn content(&self) -> &C {
        &self.content
    }

    pub const fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }
}

impl<C> fmt::Debug for ModalEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalEntry")
            .field("id", &self.id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Stack of open dialogs, bottom first.
///
/// The content type is opaque to the stack; it is only ever handed back to
/// the caller or, when it implements [`Modal`], given keys while topmost.
pub struct DialogStack<C> {
    entries: Vec<ModalEntry<C>>,
    scroll_lock: ScrollLock,
    lock_guard: Option<ScrollLockGuard>,
}

impl<C> DialogStack<C> {
    pub const fn new(scroll_lock: ScrollLock) -> Self {
        Self {
            entries: Vec::new(),
            scroll_lock,
            lock_guard: None,
        }
    }

    /// Push `content` on top of the stack and return its id.
    pub fn open(&mut self, content: C, options: ModalOptions) -> ModalId {
        let id = ModalId::next();
        self.entries.push(ModalEntry {
            id,
            content,
            options,
        });
        self.sync_scroll_lock();
        debug!(%id, depth = self.entries.len(), ?options, "Opened dialog");
        id
    }

    /// Close the entry with `id`, or the topmost entry when `id` is `None`.
    ///
    /// The remaining entries keep their relative order. Returns the removed
    /// entry, or `None` if there was nothing to close.
    pub fn close(&mut self, id: Option<ModalId>) -> Option<ModalEntry<C>> {
        let removed = match id {
            Some(id) => {
                let Some(index) = self.position(id) else {
                    debug!(%id, "Ignoring close for dialog that is not open");
                    return None;
                };
                self.entries.remove(index)
            }
            None => self.entries.pop()?,
        };
        self.sync_scroll_lock();
        debug!(id = %removed.id, depth = self.entries.len(), "Closed dialog");
        Some(removed)
    }

    /// Close every open entry at once.
    pub fn close_all(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let closed = self.entries.len();
        self.entries.clear();
        self.sync_scroll_lock();
        debug!(closed, "Closed all dialogs");
    }

    /// Close `id` in response to a click on its backdrop.
    ///
    /// Only the topmost entry can be dismissed this way, and only if it did
    /// not opt out with [`ModalOptions::prevent_backdrop_close`].
    pub fn dismiss_from_backdrop(&mut self, id: ModalId) -> bool {
        let Some(top) = self.entries.last() else {
            return false;
        };
        if top.id != id || top.options.prevent_backdrop_close {
            return false;
        }
        self.close(Some(id)).is_some()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        !self.entries.is_empty()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn top_id(&self) -> Option<ModalId> {
        self.entries.last().map(ModalEntry::id)
    }

    pub fn contains(&self, id: ModalId) -> bool {
        self.position(id).is_some()
    }

    /// Ids of all open entries, bottom first.
    pub fn ids(&self) -> Vec<ModalId> {
        self.entries.iter().map(ModalEntry::id).collect()
    }

    pub fn get(&self, id: ModalId) -> Option<&ModalEntry<C>> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries paired with their layer, bottom first, for drawing.
    pub(super) fn layered_mut(&mut self) -> impl Iterator<Item = (Layer, &mut ModalEntry<C>)> {
        self.entries
            .iter_mut()
            .enumerate()
            .map(|(index, entry)| (Layer::at(index), entry))
    }

    fn position(&self, id: ModalId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn sync_scroll_lock(&mut self) {
        if self.entries.is_empty() {
            self.lock_guard = None;
        } else if self.lock_guard.is_none() {
            self.lock_guard = Some(self.scroll_lock.acquire());
        }
    }
}

impl<C: Modal> DialogStack<C> {
    /// Route a key to the topmost entry only.
    ///
    /// Returns `Ignored` when no dialog is open. Emitted events are tagged
    /// with the id of the entry that produced them.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<(ModalId, DialogEvent)>> {
        let Some(top) = self.entries.last_mut() else {
            return Ok(EventResult::Ignored);
        };
        let id = top.id;
        Ok(match top.content.handle_key(key)? {
            EventResult::Event(event) => EventResult::Event((id, event)),
            // The topmost dialog blocks the page even for keys it does not use.
            EventResult::Consumed | EventResult::Ignored => EventResult::Consumed,
        })
    }
}
