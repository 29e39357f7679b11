//! `wm` script namespace: the `Window()` constructor and the window table.
//!
//! Every window created from script is shared between its Lua wrapper and the
//! application-side [`WindowRegistry`]. Collecting the wrapper removes the
//! registry entry; the native handle goes away with the last owner.
//!
//! `wm.windows` maps handles to live wrappers. Its values are weak, so it
//! never keeps a wrapper from being collected.

use casement_core::{
    Event, EventType, NativeBackend, NativeHandle, RawEvent, SharedWindow, Window,
    WindowRegistry,
};
use log::debug;
use mlua::{Lua, MetaMethod, Table, UserData, UserDataMethods, UserDataRef};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::Arc;

use crate::context::ScriptContext;
use crate::error::ScriptResult;

pub type SharedRegistry = Rc<ScriptWindows>;

/// [`WindowRegistry`] shared by the application and the script wrappers.
///
/// The collector may finalise a wrapper while the registry is borrowed. Such
/// handles are parked and removed on the next [`borrow`](Self::borrow) or
/// [`borrow_mut`](Self::borrow_mut).
#[derive(Default)]
pub struct ScriptWindows {
    registry: RefCell<WindowRegistry>,
    finalized: RefCell<Vec<NativeHandle>>,
}

impl ScriptWindows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn borrow(&self) -> Ref<'_, WindowRegistry> {
        self.reap();
        self.registry.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, WindowRegistry> {
        self.reap();
        self.registry.borrow_mut()
    }

    /// Handles whose wrapper is gone but whose registry entry is still parked.
    #[inline]
    pub fn deferred(&self) -> usize {
        self.finalized.borrow().len()
    }

    fn finalize(&self, handle: NativeHandle) {
        let removed = match self.registry.try_borrow_mut() {
            Ok(mut registry) => registry.on_wrapper_finalized(handle),
            Err(_) => {
                debug!(target: "wm", "wrapper.finalize handle={} deferred", handle);
                self.finalized.borrow_mut().push(handle);
                None
            }
        };
        // released after the registry borrow ends
        drop(removed);
    }

    fn reap(&self) {
        let parked = std::mem::take(&mut *self.finalized.borrow_mut());
        if parked.is_empty() {
            return;
        }

        let removed: Vec<SharedWindow> = match self.registry.try_borrow_mut() {
            Ok(mut registry) => parked
                .into_iter()
                .filter_map(|handle| registry.on_wrapper_finalized(handle))
                .collect(),
            Err(_) => {
                self.finalized.borrow_mut().extend(parked);
                return;
            }
        };
        debug!(target: "wm", "wrapper.reap count={}", removed.len());
    }
}

/// Script-side owner of a window.
pub struct LuaWindow {
    handle: NativeHandle,
    window: SharedWindow,
    registry: SharedRegistry,
}

impl LuaWindow {
    #[inline]
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }
}

impl Drop for LuaWindow {
    fn drop(&mut self) {
        self.registry.finalize(self.handle);
    }
}

impl UserData for LuaWindow {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("handle", |_, this, ()| Ok(this.handle.get()));

        methods.add_method("caption", |_, this, ()| {
            Ok(this.window.borrow().caption().to_owned())
        });
        methods.add_method("set_caption", |_, this, caption: String| {
            this.window.borrow_mut().set_caption(caption);
            Ok(())
        });

        methods.add_method("size", |_, this, ()| Ok(this.window.borrow().size()));
        methods.add_method("set_size", |_, this, (width, height): (u32, u32)| {
            this.window.borrow_mut().set_size(width, height);
            Ok(())
        });
        methods.add_method("width", |_, this, ()| Ok(this.window.borrow().width()));
        methods.add_method("height", |_, this, ()| Ok(this.window.borrow().height()));

        methods.add_method("visible", |_, this, ()| Ok(this.window.borrow().visible()));
        methods.add_method("set_visible", |_, this, visible: bool| {
            this.window.borrow_mut().set_visible(visible);
            Ok(())
        });

        methods.add_method("closed", |_, this, ()| Ok(this.window.borrow().closed()));
        methods.add_method("poll", |_, this, ()| Ok(this.window.borrow_mut().poll()));
        methods.add_method("get_event", |lua, this, ()| {
            let event = this
                .window
                .borrow_mut()
                .get_event()
                .map_err(mlua::Error::external)?;
            event_to_table(lua, &event)
        });

        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("Window({})", this.handle))
        });
    }
}

fn event_to_table(lua: &Lua, event: &Event) -> mlua::Result<Table> {
    let t = lua.create_table()?;
    t.set("type", event.event_type().as_str())?;
    if let Ok(m) = event.as_mouse() {
        t.set("x", m.x)?;
        t.set("y", m.y)?;
        t.set("button_state", m.button_state)?;
    }
    Ok(t)
}

fn raw_from_table(t: &Table) -> mlua::Result<RawEvent> {
    let kind: String = t.get("type")?;
    let kind: EventType = kind.parse().map_err(mlua::Error::RuntimeError)?;

    Ok(match kind {
        EventType::Close => RawEvent::close(),
        mouse => RawEvent::mouse(
            mouse,
            t.get::<Option<i32>>("x")?.unwrap_or(0),
            t.get::<Option<i32>>("y")?.unwrap_or(0),
            t.get::<Option<u32>>("button_state")?.unwrap_or(0),
        ),
    })
}

/// Install `Window` and `wm` into the context's globals.
pub fn register_namespace(
    ctx: &ScriptContext,
    backend: Arc<dyn NativeBackend>,
    registry: SharedRegistry,
) -> ScriptResult<()> {
    let lua = ctx.lua();

    let windows: Table = lua
        .load("return setmetatable({}, { __mode = 'v' })")
        .set_name("=wm")
        .eval()?;

    let ctor = {
        let backend = backend.clone();
        let registry = registry.clone();
        let windows = windows.clone();
        lua.create_function(move |lua, ()| {
            let window = Window::create_shared(backend.clone()).map_err(mlua::Error::external)?;
            let handle = registry.borrow_mut().insert(window.clone());
            let wrapper = lua.create_userdata(LuaWindow {
                handle,
                window,
                registry: registry.clone(),
            })?;
            windows.raw_set(handle.get(), wrapper.clone())?;
            Ok(wrapper)
        })?
    };

    let count = {
        let registry = registry.clone();
        lua.create_function(move |_, ()| Ok(registry.borrow().len()))?
    };

    let poll = {
        let registry = registry.clone();
        lua.create_function(move |_, ()| Ok(registry.borrow().poll_all()))?
    };

    let send_event = lua.create_function(
        move |_, (target, event): (UserDataRef<LuaWindow>, Table)| {
            let raw = raw_from_table(&event)?;
            backend
                .send_event(target.handle(), raw)
                .map_err(mlua::Error::external)
        },
    )?;

    let wm = lua.create_table()?;
    wm.set("Window", ctor.clone())?;
    wm.set("windows", windows)?;
    wm.set("count", count)?;
    wm.set("poll", poll)?;
    wm.set("send_event", send_event)?;

    let globals = lua.globals();
    globals.set("Window", ctor)?;
    globals.set("wm", wm)?;

    debug!(target: "wm", "namespace.register");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use casement_core::HeadlessBackend;
    use pretty_assertions::assert_eq;

    struct Fixture {
        ctx: ScriptContext,
        backend: Arc<HeadlessBackend>,
        registry: SharedRegistry,
    }

    fn fixture() -> Fixture {
        let ctx = ScriptContext::new();
        let backend = Arc::new(HeadlessBackend::new());
        let registry = SharedRegistry::default();
        register_namespace(&ctx, backend.clone(), registry.clone()).unwrap();
        Fixture { ctx, backend, registry }
    }

    #[test]
    fn constructor_registers_window() {
        let f = fixture();
        f.ctx.execute("w = Window()").unwrap();

        assert_eq!(f.registry.borrow().len(), 1);
        assert_eq!(f.backend.live_windows(), 1);

        f.ctx
            .execute("assert(tostring(w) == 'Window(' .. w:handle() .. ')')")
            .unwrap();
        f.ctx.execute("assert(wm.count() == 1)").unwrap();
        f.ctx
            .execute(
                r#"
                local seen = 0
                for handle, window in pairs(wm.windows) do
                    assert(handle == w:handle())
                    assert(tostring(window) == tostring(w))
                    assert(window == w)
                    seen = seen + 1
                end
                assert(seen == 1)
                "#,
            )
            .unwrap();
    }

    #[test]
    fn collecting_wrapper_empties_registry_and_releases_handle() {
        let f = fixture();
        f.ctx.execute("w = Window()").unwrap();

        f.ctx.execute("w = nil; collectgarbage()").unwrap();

        assert!(f.registry.borrow().is_empty());
        assert_eq!(f.backend.released(), 1);
        f.ctx.execute("assert(next(wm.windows) == nil)").unwrap();
    }

    #[test]
    fn window_table_does_not_keep_wrappers_alive() {
        let f = fixture();
        f.ctx.execute("a = Window(); b = Window()").unwrap();

        f.ctx.execute("a = nil; collectgarbage()").unwrap();

        f.ctx
            .execute("assert(wm.windows[b:handle()] == b and wm.count() == 1)")
            .unwrap();
        assert_eq!(f.backend.released(), 1);
    }

    #[test]
    fn wrapper_collected_during_registry_borrow_is_reaped_later() {
        let f = fixture();
        f.ctx.execute("w = Window()").unwrap();

        let guard = f.registry.borrow();
        f.ctx.execute("w = nil; collectgarbage()").unwrap();
        assert_eq!(guard.len(), 1);
        drop(guard);

        assert_eq!(f.registry.deferred(), 1);
        assert_eq!(f.backend.released(), 0);

        f.ctx.execute("assert(wm.count() == 0)").unwrap();
        assert_eq!(f.registry.deferred(), 0);
        assert_eq!(f.backend.released(), 1);
        assert!(f.registry.borrow().is_empty());
    }

    #[test]
    fn application_reference_outlives_wrapper() {
        let f = fixture();
        f.ctx.execute("w = Window()").unwrap();

        let handle = f.registry.borrow().handles()[0];
        let app_side = f.registry.borrow().get(handle).unwrap();

        f.ctx.execute("w = nil; collectgarbage()").unwrap();
        assert!(f.registry.borrow().is_empty());
        assert_eq!(f.backend.released(), 0);

        drop(app_side);
        assert_eq!(f.backend.released(), 1);
    }

    #[test]
    fn window_properties_from_script() {
        let f = fixture();
        f.ctx
            .execute(
                r#"
                w = Window()
                assert(w:caption() == "")
                assert(w:width() == 0 and w:height() == 0)
                assert(w:visible() == true)
                assert(w:closed() == false)
                w:set_caption("Test")
                w:set_size(48, 32)
                w:set_visible(false)
                local width, height = w:size()
                assert(width == 48 and height == 32)
                "#,
            )
            .unwrap();

        let window = f.registry.borrow().windows().remove(0);
        let window = window.borrow();
        assert_eq!(window.caption(), "Test");
        assert_eq!(window.size(), (48, 32));
        assert!(!window.visible());
    }

    #[test]
    fn events_flow_through_script() {
        let f = fixture();
        f.ctx
            .execute(
                r#"
                w = Window()
                wm.send_event(w, { type = "mouse_button_down", x = 32, y = 64, button_state = 2 })
                local e = w:get_event()
                assert(e.type == "mouse_button_down")
                assert(e.x == 32 and e.y == 64 and e.button_state == 2)

                wm.send_event(w, { type = "close" })
                assert(wm.poll() == 1)
                assert(w:closed())
                assert(w:get_event().type == "close")
                "#,
            )
            .unwrap();
    }

    #[test]
    fn empty_queue_is_script_error() {
        let f = fixture();
        f.ctx.execute("w = Window()").unwrap();

        let err = f.ctx.execute("w:get_event()").unwrap_err();
        assert!(err.to_string().contains("Event queue empty"), "{err}");

        f.ctx
            .execute("local ok, e = pcall(w.get_event, w); assert(not ok)")
            .unwrap();
    }

    #[test]
    fn allocation_failure_is_script_error() {
        let ctx = ScriptContext::new();
        let backend = Arc::new(HeadlessBackend::with_limit(Some(1)));
        let registry = SharedRegistry::default();
        register_namespace(&ctx, backend, registry.clone()).unwrap();

        ctx.execute("a = Window()").unwrap();
        let err = ctx.execute("b = Window()").unwrap_err();

        assert!(err.to_string().contains("allocation failed"), "{err}");
        assert_eq!(registry.borrow().len(), 1);
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let f = fixture();
        f.ctx.execute("w = Window()").unwrap();

        let err = f
            .ctx
            .execute("wm.send_event(w, { type = 'scroll' })")
            .unwrap_err();
        assert!(err.to_string().contains("unknown event type"), "{err}");
    }
}
