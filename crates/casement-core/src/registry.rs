use log::debug;
use std::collections::BTreeMap;

use crate::native::NativeHandle;
use crate::window::SharedWindow;

/// Application-side table of windows created through a script wrapper.
///
/// Keyed by native handle. The wrapper's finaliser must call
/// [`WindowRegistry::on_wrapper_finalized`]; after that the registry holds no
/// reference and the window dies with its last remaining owner.
#[derive(Default)]
pub struct WindowRegistry {
    windows: BTreeMap<NativeHandle, SharedWindow>,
}

impl WindowRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, window: SharedWindow) -> NativeHandle {
        let handle = window.borrow().handle();
        self.windows.insert(handle, window);
        debug!(target: "wm", "registry.insert handle={} len={}", handle, self.windows.len());
        handle
    }

    #[inline]
    pub fn get(&self, handle: NativeHandle) -> Option<SharedWindow> {
        self.windows.get(&handle).cloned()
    }

    #[inline]
    pub fn contains(&self, handle: NativeHandle) -> bool {
        self.windows.contains_key(&handle)
    }

    /// Live handles in ascending order.
    pub fn handles(&self) -> Vec<NativeHandle> {
        self.windows.keys().copied().collect()
    }

    /// Snapshot of every registered window.
    pub fn windows(&self) -> Vec<SharedWindow> {
        self.windows.values().cloned().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Poll every registered window; returns the total number of envelopes enqueued.
    pub fn poll_all(&self) -> usize {
        self.windows
            .values()
            .map(|w| w.borrow_mut().poll())
            .sum()
    }

    /// Drop the registry's reference for a collected script wrapper.
    ///
    /// The removed reference is handed back so the caller can release it
    /// outside of any borrow on the registry.
    pub fn on_wrapper_finalized(&mut self, handle: NativeHandle) -> Option<SharedWindow> {
        let removed = self.windows.remove(&handle);
        debug!(
            target: "wm",
            "registry.finalized handle={} found={} len={}",
            handle,
            removed.is_some(),
            self.windows.len()
        );
        removed
    }
}
