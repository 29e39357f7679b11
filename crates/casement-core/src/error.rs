use thiserror::Error;

use crate::event::EventType;
use crate::native::NativeHandle;

pub type WmResult<T> = Result<T, WmError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WmError {
    /// `get_event` found nothing queued and nothing pending at the native source.
    #[error("Event queue empty")]
    EmptyQueue,

    #[error("native window allocation failed: {0}")]
    HandleAllocation(String),

    /// Payload requested under the wrong discriminant.
    #[error("event type mismatch: expected {expected} payload, found {found} event")]
    TypeMismatch {
        expected: &'static str,
        found: EventType,
    },

    #[error("unknown event type tag {0}")]
    UnknownEventType(u32),

    #[error("unknown window handle {0}")]
    UnknownWindow(NativeHandle),

    #[error("config error: {0}")]
    Config(String),
}
