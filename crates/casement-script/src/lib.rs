pub mod console;
pub mod context;
pub mod error;
pub mod wm;

pub use crate::console::{Console, ExitReason, LineOutcome};
pub use crate::context::{ScriptContext, ScriptEngine};
pub use crate::error::{ScriptError, ScriptResult};
pub use crate::wm::{register_namespace, LuaWindow, ScriptWindows, SharedRegistry};
