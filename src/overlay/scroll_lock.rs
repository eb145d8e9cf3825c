//! Page scroll lock held while any dialog is open.

use std::cell::Cell;
use std::rc::Rc;

/// Shared scroll lock for the page under the dialogs.
///
/// The lock is reference counted: it stays engaged for as long as at least
/// one [`ScrollLockGuard`] is alive. Cloning the lock hands out another view
/// of the same counter, so the page and the dialog stack observe the same
/// state.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    holders: Rc<Cell<usize>>,
}

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engage the lock until the returned guard is dropped.
    #[must_use = "the lock is released as soon as the guard is dropped"]
    pub fn acquire(&self) -> ScrollLockGuard {
        self.holders.set(self.holders.get() + 1);
        ScrollLockGuard {
            holders: Rc::clone(&self.holders),
        }
    }

    /// Whether the page must currently ignore scroll input.
    pub fn is_locked(&self) -> bool {
        self.holders.get() > 0
    }
}

/// Releases its hold on the [`ScrollLock`] when dropped.
#[derive(Debug)]
pub struct ScrollLockGuard {
    holders: Rc<Cell<usize>>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.holders.set(self.holders.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = ScrollLock::new();
        assert!(!lock.is_locked());

        let guard = lock.acquire();
        assert!(lock.is_locked());

        drop(guard);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_clones_share_state() {
        let lock = ScrollLock::new();
        let page_view = lock.clone();

        let first = lock.acquire();
        let second = lock.acquire();
        assert!(page_view.is_locked());

        drop(first);
        assert!(page_view.is_locked());

        drop(second);
        assert!(!page_view.is_locked());
    }
}
