use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::error::{WmError, WmResult};
use crate::event::RawEvent;
use crate::native::{NativeBackend, NativeHandle};

/// Per-handle event channel.
///
/// Producer side may live on any thread; the owning window is the only consumer.
struct Slot {
    tx: Sender<RawEvent>,
    rx: Receiver<RawEvent>,
}

/// In-process native backend without any rendering.
///
/// Handles are allocated from a counter; each one owns an unbounded channel
/// that stands in for the platform event queue.
pub struct HeadlessBackend {
    slots: Mutex<BTreeMap<NativeHandle, Slot>>,
    next_id: AtomicU64,
    max_windows: Option<usize>,
    released: AtomicUsize,
}

impl HeadlessBackend {
    #[inline]
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// `max_windows` caps the number of simultaneously live handles.
    pub fn with_limit(max_windows: Option<usize>) -> Self {
        Self {
            slots: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            max_windows,
            released: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn live_windows(&self) -> usize {
        self.slots.lock().len()
    }

    /// Total handles destroyed so far.
    #[inline]
    pub fn released(&self) -> usize {
        self.released.load(Ordering::Acquire)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBackend for HeadlessBackend {
    fn create_window(&self) -> WmResult<NativeHandle> {
        let mut slots = self.slots.lock();

        if let Some(max) = self.max_windows {
            if slots.len() >= max {
                return Err(WmError::HandleAllocation(format!(
                    "window limit reached ({max})"
                )));
            }
        }

        let raw = self.next_id.fetch_add(1, Ordering::AcqRel);
        let handle = NativeHandle::new(raw)
            .ok_or_else(|| WmError::HandleAllocation("handle space exhausted".into()))?;

        let (tx, rx) = unbounded();
        slots.insert(handle, Slot { tx, rx });

        debug!(target: "wm", "headless.create handle={}", handle);
        Ok(handle)
    }

    fn destroy_window(&self, handle: NativeHandle) {
        if self.slots.lock().remove(&handle).is_some() {
            self.released.fetch_add(1, Ordering::AcqRel);
            debug!(target: "wm", "headless.destroy handle={}", handle);
        } else {
            warn!(target: "wm", "headless.destroy unknown handle={}", handle);
        }
    }

    fn send_event(&self, handle: NativeHandle, event: RawEvent) -> WmResult<()> {
        let slots = self.slots.lock();
        let slot = slots.get(&handle).ok_or(WmError::UnknownWindow(handle))?;
        slot.tx
            .send(event)
            .map_err(|_| WmError::UnknownWindow(handle))
    }

    fn next_event(&self, handle: NativeHandle) -> Option<RawEvent> {
        let slots = self.slots.lock();
        slots.get(&handle).and_then(|slot| slot.rx.try_recv().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn handles_are_distinct_and_tracked() {
        let backend = HeadlessBackend::new();
        let a = backend.create_window().unwrap();
        let b = backend.create_window().unwrap();

        assert_ne!(a, b);
        assert_eq!(backend.live_windows(), 2);

        backend.destroy_window(a);
        assert_eq!(backend.live_windows(), 1);
        assert_eq!(backend.released(), 1);
    }

    #[test]
    fn events_come_back_in_delivery_order() {
        let backend = HeadlessBackend::new();
        let h = backend.create_window().unwrap();

        backend.send_event(h, RawEvent::close()).unwrap();
        backend
            .send_event(h, RawEvent::mouse(crate::EventType::MouseButtonUp, 1, 2, 3))
            .unwrap();

        assert_eq!(backend.next_event(h), Some(RawEvent::close()));
        assert_eq!(backend.next_event(h).map(|e| e.mouse.y), Some(2));
        assert_eq!(backend.next_event(h), None);
    }

    #[test]
    fn limit_surfaces_allocation_error() {
        let backend = HeadlessBackend::with_limit(Some(1));
        let h = backend.create_window().unwrap();

        assert!(matches!(
            backend.create_window(),
            Err(WmError::HandleAllocation(_))
        ));

        backend.destroy_window(h);
        assert!(backend.create_window().is_ok());
    }

    #[test]
    fn sending_to_destroyed_handle_fails() {
        let backend = HeadlessBackend::new();
        let h = backend.create_window().unwrap();
        backend.destroy_window(h);

        assert_eq!(
            backend.send_event(h, RawEvent::close()),
            Err(WmError::UnknownWindow(h))
        );
        assert_eq!(backend.next_event(h), None);
    }
}
