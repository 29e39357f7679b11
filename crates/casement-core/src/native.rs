use std::fmt;
use std::num::NonZeroU64;

use crate::error::WmResult;
use crate::event::RawEvent;

/// Opaque identifier of a platform window resource. Never null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(NonZeroU64);

impl NativeHandle {
    #[inline]
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform window subsystem as seen by [`crate::Window`].
///
/// Implementations own the actual resources; windows only hold handles.
/// Events may be delivered from any thread; `next_event` must never block.
pub trait NativeBackend: Send + Sync {
    fn create_window(&self) -> WmResult<NativeHandle>;

    /// Called exactly once per handle returned by `create_window`.
    fn destroy_window(&self, handle: NativeHandle);

    /// Deliver a raw event to the queue of `handle`.
    fn send_event(&self, handle: NativeHandle, event: RawEvent) -> WmResult<()>;

    /// Pop the oldest undelivered event for `handle`, if any.
    fn next_event(&self, handle: NativeHandle) -> Option<RawEvent>;
}
