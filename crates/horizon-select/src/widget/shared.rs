//! Mutex-guarded controllers for multi-threaded hosts.
//!
//! Controllers are plain `&mut self` state machines. A host that drives one
//! from several threads wraps it in a [`SharedController`], which serializes
//! every public operation behind a `parking_lot::Mutex`.
//!
//! Signals fire while the lock is held. A slot must not call back into the
//! same shared controller or it will deadlock.
//!
//! ```
//! use horizon_select::widget::SharedController;
//! use horizon_select::widget::widgets::{SortConfig, SortController};
//!
//! let sort = SharedController::new(SortController::new(SortConfig::default()));
//! let handle = sort.clone();
//!
//! std::thread::spawn(move || {
//!     handle.with(|sort| sort.sort_by_id("name").map(|_| ()))
//! })
//! .join()
//! .unwrap()
//! .unwrap_err();
//!
//! assert_eq!(sort.with(|sort| sort.active().map(str::to_owned)), None);
//! ```

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// A controller shared between threads.
///
/// Cloning is cheap and yields a handle to the same controller.
pub struct SharedController<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> SharedController<T> {
    /// Wrap a controller.
    pub fn new(controller: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Lock the controller for a sequence of calls.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Try to lock the controller without blocking.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_lock()
    }
}

impl<T> Clone for SharedController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SharedController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_lock() {
            Some(guard) => f.debug_tuple("SharedController").field(&*guard).finish(),
            None => f.write_str("SharedController(<locked>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{CycleEntry, CyclerConfig, KeyboardItemCycler};

    #[test]
    fn test_concurrent_navigation_keeps_cursor_valid() {
        let shared = SharedController::new(KeyboardItemCycler::new(CyclerConfig::new().wrap(true)));
        shared.with(|cycler| {
            cycler.update_items((0..5).map(CycleEntry::new).collect());
        });

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        shared.with(|cycler| {
                            if n % 2 == 0 {
                                cycler.set_next_item_active();
                            } else {
                                cycler.set_previous_item_active();
                            }
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let index = shared.lock().active_index();
        assert!(index.is_some_and(|i| i < 5));
    }

    #[test]
    fn test_try_lock_while_held() {
        let shared = SharedController::new(0u32);
        let guard = shared.lock();
        assert!(shared.try_lock().is_none());
        drop(guard);
        *shared.lock() += 1;
        assert_eq!(shared.with(|n| *n), 1);
    }
}
