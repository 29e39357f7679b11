pub mod config;
pub mod error;
pub mod event;
pub mod headless;
pub mod native;
pub mod registry;
pub mod signals;
pub mod window;

pub use crate::config::{CasementConfig, ConsoleConfig, LineJoin, LogConfig, WmConfig};
pub use crate::error::{WmError, WmResult};
pub use crate::event::{CloseEvent, Event, EventPayload, EventType, MouseEvent, RawEvent};
pub use crate::headless::HeadlessBackend;
pub use crate::native::{NativeBackend, NativeHandle};
pub use crate::registry::WindowRegistry;
pub use crate::signals::QuitSignal;
pub use crate::window::{SharedWindow, Window};
