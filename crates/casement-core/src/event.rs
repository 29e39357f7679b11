use std::fmt;
use std::str::FromStr;

use crate::error::{WmError, WmResult};

/// Discriminant of an [`Event`].
///
/// The numeric value is the leading tag of the native wire record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EventType {
    Close = 1,
    MouseButtonDown = 2,
    MouseButtonUp = 3,
}

impl EventType {
    #[inline]
    pub fn tag(self) -> u32 {
        self as u32
    }

    #[inline]
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::Close),
            2 => Some(Self::MouseButtonDown),
            3 => Some(Self::MouseButtonUp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::MouseButtonDown => "mouse_button_down",
            Self::MouseButtonUp => "mouse_button_up",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "close" => Ok(Self::Close),
            "mouse_button_down" => Ok(Self::MouseButtonDown),
            "mouse_button_up" => Ok(Self::MouseButtonUp),
            other => Err(format!("unknown event type '{other}'")),
        }
    }
}

/// Mouse button payload. `button_state` is a bitmask of pressed buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct MouseEvent {
    pub x: i32,
    pub y: i32,
    pub button_state: u32,
}

/// Close carries no fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CloseEvent;

/// Fixed-layout record as delivered by the native event source.
///
/// Fields after `kind` are meaningful only for the tags that use them;
/// zeroed otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct RawEvent {
    pub kind: u32,
    pub mouse: MouseEvent,
}

impl RawEvent {
    #[inline]
    pub fn close() -> Self {
        Self {
            kind: EventType::Close.tag(),
            mouse: MouseEvent::default(),
        }
    }

    #[inline]
    pub fn mouse(kind: EventType, x: i32, y: i32, button_state: u32) -> Self {
        Self {
            kind: kind.tag(),
            mouse: MouseEvent { x, y, button_state },
        }
    }
}

/// Event Envelope: one immutable occurrence from the native source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Close,
    MouseButtonDown(MouseEvent),
    MouseButtonUp(MouseEvent),
}

impl Event {
    #[inline]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Close => EventType::Close,
            Self::MouseButtonDown(_) => EventType::MouseButtonDown,
            Self::MouseButtonUp(_) => EventType::MouseButtonUp,
        }
    }

    #[inline]
    pub fn is_close(&self) -> bool {
        matches!(self, Self::Close)
    }

    /// Checked view onto the typed payload.
    pub fn payload<P: EventPayload>(&self) -> WmResult<&P> {
        P::from_event(self).ok_or(WmError::TypeMismatch {
            expected: P::NAME,
            found: self.event_type(),
        })
    }

    #[inline]
    pub fn as_mouse(&self) -> WmResult<&MouseEvent> {
        self.payload::<MouseEvent>()
    }
}

/// Payload types that can be viewed out of an [`Event`].
pub trait EventPayload: Sized + 'static {
    const NAME: &'static str;

    fn from_event(event: &Event) -> Option<&Self>;
}

impl EventPayload for MouseEvent {
    const NAME: &'static str = "mouse";

    fn from_event(event: &Event) -> Option<&Self> {
        match event {
            Event::MouseButtonDown(m) | Event::MouseButtonUp(m) => Some(m),
            Event::Close => None,
        }
    }
}

impl EventPayload for CloseEvent {
    const NAME: &'static str = "close";

    fn from_event(event: &Event) -> Option<&Self> {
        match event {
            Event::Close => Some(&CloseEvent),
            _ => None,
        }
    }
}

impl TryFrom<RawEvent> for Event {
    type Error = WmError;

    fn try_from(raw: RawEvent) -> WmResult<Self> {
        match EventType::from_tag(raw.kind) {
            Some(EventType::Close) => Ok(Self::Close),
            Some(EventType::MouseButtonDown) => Ok(Self::MouseButtonDown(raw.mouse)),
            Some(EventType::MouseButtonUp) => Ok(Self::MouseButtonUp(raw.mouse)),
            None => Err(WmError::UnknownEventType(raw.kind)),
        }
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        match event {
            Event::Close => RawEvent::close(),
            Event::MouseButtonDown(m) | Event::MouseButtonUp(m) => RawEvent {
                kind: event.event_type().tag(),
                mouse: m,
            },
        }
    }
}
