use casement_core::QuitSignal;
use log::{debug, info};
use mlua::{FromLuaMulti, IntoLuaMulti, Lua, Table};

use crate::error::{ScriptError, ScriptResult};

/// Chunk name used for console input in error messages.
const CHUNK_NAME: &str = "=console";

/// Anything the console can hand a statement buffer to.
///
/// Source is raw bytes: Lua string literals may hold bytes that are not UTF-8.
pub trait ScriptEngine {
    fn execute(&mut self, source: &[u8]) -> ScriptResult<()>;
}

/// Lua execution context: global namespace plus native callables.
pub struct ScriptContext {
    lua: Lua,
}

impl ScriptContext {
    pub fn new() -> Self {
        info!(target: "script", "context.create");
        Self { lua: Lua::new() }
    }

    /// Run `source` to completion.
    pub fn execute(&self, source: impl AsRef<[u8]>) -> ScriptResult<()> {
        self.lua
            .load(source.as_ref())
            .set_name(CHUNK_NAME)
            .exec()
            .map_err(ScriptError::from)
    }

    /// Bind a native function to a global name.
    pub fn register_function<A, R, F>(&self, name: &str, f: F) -> ScriptResult<()>
    where
        A: FromLuaMulti,
        R: IntoLuaMulti,
        F: Fn(&Lua, A) -> mlua::Result<R> + 'static,
    {
        let func = self.lua.create_function(f)?;
        self.lua.globals().set(name, func)?;
        debug!(target: "script", "context.register name='{}'", name);
        Ok(())
    }

    /// Register `quit()`, which only raises `signal`.
    pub fn register_quit(&self, signal: QuitSignal) -> ScriptResult<()> {
        self.register_function("quit", move |_, ()| {
            signal.set();
            Ok(())
        })
    }

    #[inline]
    pub fn globals(&self) -> Table {
        self.lua.globals()
    }

    #[inline]
    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}

impl Default for ScriptContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine for ScriptContext {
    #[inline]
    fn execute(&mut self, source: &[u8]) -> ScriptResult<()> {
        ScriptContext::execute(self, source)
    }
}
