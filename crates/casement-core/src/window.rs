use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{WmError, WmResult};
use crate::event::Event;
use crate::native::{NativeBackend, NativeHandle};

/// Shared ownership of a window between the application and script wrappers.
///
/// The native handle is released when the last clone is dropped.
pub type SharedWindow = Rc<RefCell<Window>>;

/// A native window plus its application-level event queue.
///
/// `closed` is monotonic: it only flips to `true` inside [`Window::poll`]
/// when a close event is drained, and nothing resets it.
pub struct Window {
    backend: Arc<dyn NativeBackend>,
    handle: NativeHandle,

    caption: String,
    width: u32,
    height: u32,
    visible: bool,
    closed: bool,

    queue: VecDeque<Event>,
}

impl Window {
    pub fn create(backend: Arc<dyn NativeBackend>) -> WmResult<Self> {
        let handle = backend.create_window()?;
        info!(target: "wm", "window.create handle={}", handle);

        Ok(Self {
            backend,
            handle,
            caption: String::new(),
            width: 0,
            height: 0,
            visible: true,
            closed: false,
            queue: VecDeque::new(),
        })
    }

    #[inline]
    pub fn create_shared(backend: Arc<dyn NativeBackend>) -> WmResult<SharedWindow> {
        Ok(Rc::new(RefCell::new(Self::create(backend)?)))
    }

    #[inline]
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    #[inline]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    #[inline]
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[inline]
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Number of envelopes waiting in the application queue.
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drain everything the native source has for this window into the queue.
    ///
    /// Returns the number of envelopes enqueued. Never blocks, never fails.
    pub fn poll(&mut self) -> usize {
        let mut n = 0usize;

        while let Some(raw) = self.backend.next_event(self.handle) {
            let event = match Event::try_from(raw) {
                Ok(e) => e,
                Err(e) => {
                    warn!(target: "wm", "window.poll handle={} dropped: {}", self.handle, e);
                    continue;
                }
            };

            if event.is_close() && !self.closed {
                self.closed = true;
                info!(target: "wm", "window.closed handle={}", self.handle);
            }

            self.queue.push_back(event);
            n += 1;
        }

        if n > 0 {
            debug!(target: "wm", "window.poll handle={} enqueued={}", self.handle, n);
        }
        n
    }

    /// Pop the oldest envelope.
    ///
    /// An empty queue is topped up from the native source first (without
    /// waiting); if there is still nothing, fails with [`WmError::EmptyQueue`].
    pub fn get_event(&mut self) -> WmResult<Event> {
        if self.queue.is_empty() {
            self.poll();
        }
        self.queue.pop_front().ok_or(WmError::EmptyQueue)
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        debug!(target: "wm", "window.release handle={}", self.handle);
        self.backend.destroy_window(self.handle);
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("handle", &self.handle)
            .field("caption", &self.caption)
            .field("size", &(self.width, self.height))
            .field("visible", &self.visible)
            .field("closed", &self.closed)
            .field("pending", &self.queue.len())
            .finish()
    }
}
