//! Mirror and subscription lifecycle primitives shared by the entity stores.
//!
//! A [`Mirror`] is the local in-memory copy of a remote document or
//! collection. A [`Watch`] is the cancellation handle returned by a live
//! subscription. A [`WatchSlot`] owns at most one open watch and enforces
//! the lifecycle rule: opening an already-open slot is a no-op (or an
//! explicit replace), closing is idempotent.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

/// Cancellation handle for a live subscription.
///
/// Cancelling is immediate and idempotent; a dropped watch cancels itself.
pub struct Watch {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Watch {
    /// Wrap a cancellation closure.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Cancel the subscription. No further snapshots are delivered.
    pub fn cancel(&self) {
        if let Some(cancel) = self.cancel.lock().take() {
            cancel();
        }
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl core::fmt::Debug for Watch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Watch")
            .field("active", &self.cancel.lock().is_some())
            .finish()
    }
}

/// Clears a mirror's loading flag when dropped.
///
/// Guards the duration of a call, not exclusivity: concurrent operations
/// may overlap and each holds its own guard.
pub struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Local in-memory copy of a remote document or collection.
pub struct Mirror<T> {
    value: RwLock<T>,
    loading: AtomicBool,
}

impl<T: Clone> Mirror<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(initial),
            loading: AtomicBool::new(false),
        }
    }

    /// Snapshot the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Replace the current value (full replace, not merge).
    pub fn set(&self, value: T) {
        *self.value.write() = value;
    }

    /// Read through a closure without cloning.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read())
    }

    /// Mutate in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.value.write())
    }

    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }

    /// Set the loading flag for the lifetime of the returned guard.
    pub fn loading_guard(&self) -> LoadingGuard<'_> {
        self.loading.store(true, Ordering::SeqCst);
        LoadingGuard {
            flag: &self.loading,
        }
    }
}

impl<T: Clone + Default> Default for Mirror<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Owner of at most one open [`Watch`].
#[derive(Default)]
pub struct WatchSlot {
    watch: Mutex<Option<Watch>>,
}

impl WatchSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            watch: Mutex::new(None),
        }
    }

    /// Whether a watch is currently open.
    pub fn is_open(&self) -> bool {
        self.watch.lock().is_some()
    }

    /// Open a watch unless one is already open.
    ///
    /// Returns `true` when `open` ran; `false` when the slot was already
    /// occupied (idempotent subscribe - duplicate listeners are prevented).
    pub fn open_with(&self, open: impl FnOnce() -> Watch) -> bool {
        let mut slot = self.watch.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(open());
        true
    }

    /// Cancel any open watch, then open a fresh one.
    ///
    /// Used where the watched key changes (e.g. a different ambassador id).
    pub fn replace_with(&self, open: impl FnOnce() -> Watch) {
        let mut slot = self.watch.lock();
        if let Some(old) = slot.take() {
            old.cancel();
        }
        *slot = Some(open());
    }

    /// Cancel and clear. Idempotent; returns whether a watch was open.
    pub fn close(&self) -> bool {
        match self.watch.lock().take() {
            Some(watch) => {
                watch.cancel();
                true
            }
            None => false,
        }
    }
}
