//! Application state.
//!
//! [`App`] owns everything that outlives a frame: the entity store, the
//! effect queue, the windows, and the platform services. It is single
//! threaded; reentrancy is handled by leasing (state moves out of the store
//! while a callback runs) rather than by locks, and cross-entity reactions go
//! through the effect queue rather than nested callbacks.

mod context;
mod effects;
mod entities;
mod view;

use std::cell::Cell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use slotmap::{Key, SlotMap, new_key_type};

use crate::config::RuntimeConfig;
use crate::error::{ObjectKind, Result, UiError};
use crate::platform::{Platform, TestPlatform};
use crate::text::{MonospaceTextSystem, TextSystem};
use crate::theme::Theme;
use crate::types::Size;
use crate::window::focus::FocusOp;
use crate::window::Window;

pub use context::Ctx;
pub(crate) use effects::Effect;
pub use entities::{EntityId, Handle, ObserverHandle, ReleaseHandle, SubscriberHandle};
pub use view::{AnyView, Render};

use entities::{EntityState, EntityStore, ObserverEntry, ReleaseEntry, SubscriberEntry};

new_key_type! {
    /// Key of one open window.
    pub struct WindowId;
}

impl WindowId {
    pub fn as_u64(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Identifier of a deferred task queued with [`App::defer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    id: u64,
}

// =============================================================================
// App
// =============================================================================

/// Root of the runtime. One per process, never shared across threads.
pub struct App {
    entities: EntityStore,
    effects: VecDeque<Effect>,
    flushing: bool,
    update_depth: usize,
    windows: SlotMap<WindowId, Option<Box<Window>>>,
    dirty_windows: HashSet<WindowId>,
    pending_focus: Vec<(WindowId, FocusOp)>,
    active_window: Option<WindowId>,
    platform: Rc<dyn Platform>,
    text: Rc<dyn TextSystem>,
    theme: Theme,
    config: RuntimeConfig,
    next_task_id: u64,
}

impl App {
    /// App with an in-memory platform and default config. The variant most
    /// tests use; no environment is consulted.
    pub fn new() -> Self {
        Self::build(Rc::new(TestPlatform::new()), RuntimeConfig::default())
    }

    /// App with an in-memory platform and config read from the environment.
    pub fn from_env() -> Self {
        Self::build(Rc::new(TestPlatform::new()), RuntimeConfig::from_env())
    }

    /// App on a caller-provided platform, default config.
    pub fn with_platform(platform: Rc<dyn Platform>) -> Self {
        Self::build(platform, RuntimeConfig::default())
    }

    /// App on a caller-provided platform and config.
    pub fn with_platform_and_config(platform: Rc<dyn Platform>, config: RuntimeConfig) -> Self {
        Self::build(platform, config)
    }

    fn build(platform: Rc<dyn Platform>, config: RuntimeConfig) -> Self {
        log::debug!("app starting on {} platform", platform.name());
        Self {
            entities: EntityStore::new(),
            effects: VecDeque::new(),
            flushing: false,
            update_depth: 0,
            windows: SlotMap::with_key(),
            dirty_windows: HashSet::new(),
            pending_focus: Vec::new(),
            active_window: None,
            platform,
            text: Rc::new(MonospaceTextSystem::new()),
            theme: Theme::default(),
            config,
            next_task_id: 0,
        }
    }

    // ===== Services =====

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.mark_dirty(None);
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn platform(&self) -> &Rc<dyn Platform> {
        &self.platform
    }

    pub fn text_system(&self) -> &Rc<dyn TextSystem> {
        &self.text
    }

    pub fn clipboard_text(&self) -> Option<String> {
        self.platform.clipboard_text()
    }

    pub fn set_clipboard_text(&self, text: impl Into<String>) {
        self.platform.set_clipboard_text(text.into());
    }

    /// Number of live entities, for diagnostics.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ===== Entities =====

    /// Create an entity. The init callback runs with a context for the new
    /// entity; the entity is unreadable until init returns.
    pub fn new_entity<T: 'static>(&mut self, init: impl FnOnce(&mut Ctx<T>) -> T) -> Handle<T> {
        let id = self.entities.reserve(self.active_window);
        self.update_depth += 1;
        let state = {
            let mut cx = Ctx::new(self, id);
            init(&mut cx)
        };
        self.entities.finish_insert(id, Box::new(state));
        self.update_depth -= 1;
        if self.update_depth == 0 {
            self.flush_effects();
        }
        Handle::from_raw(id)
    }

    /// Borrow an entity's state. Fails with `Leased` while the entity is
    /// inside one of its own update callbacks.
    pub fn read_entity<T: 'static>(&self, handle: &Handle<T>) -> Result<&T> {
        let slot = self
            .entities
            .get(handle.id)
            .ok_or_else(|| entities::not_found(handle.id))?;
        match &slot.state {
            EntityState::Present(state) => state
                .downcast_ref::<T>()
                .ok_or_else(|| type_mismatch(handle.id)),
            EntityState::Leased => Err(entities::leased(handle.id)),
        }
    }

    /// Update an entity under a lease. The state is moved out of the store
    /// for the duration of the callback, so the callback can reach the rest
    /// of the app but any access to *this* entity fails with `Leased`.
    /// Effects queued by the callback flush when the outermost update ends.
    pub fn update_entity<T: 'static, R>(
        &mut self,
        handle: &Handle<T>,
        f: impl FnOnce(&mut T, &mut Ctx<T>) -> R,
    ) -> Result<R> {
        let state = self.entities.lease(handle.id)?;
        let mut state = match state.downcast::<T>() {
            Ok(state) => state,
            Err(state) => {
                self.entities.restore(handle.id, state);
                return Err(type_mismatch(handle.id));
            }
        };

        self.update_depth += 1;
        let (result, dropped) = {
            let mut cx = Ctx::new(self, handle.id);
            let result = f(&mut state, &mut cx);
            (result, cx.dropped())
        };
        self.entities.restore(handle.id, state);
        if dropped {
            self.push_effect(Effect::Release { entity: handle.id });
        }
        self.update_depth -= 1;
        if self.update_depth == 0 {
            self.flush_effects();
        }
        Ok(result)
    }

    /// Register an observer for an entity's change notifications. The
    /// observer stays installed until canceled or the entity is released.
    pub fn observe<T: 'static>(
        &mut self,
        handle: &Handle<T>,
        f: impl FnMut(&mut App) + 'static,
    ) -> ObserverHandle {
        let active = Rc::new(Cell::new(true));
        if let Some(meta) = self.entities.meta_mut(handle.id) {
            meta.observers.push(ObserverEntry {
                active: active.clone(),
                callback: Box::new(f),
            });
        } else {
            active.set(false);
        }
        ObserverHandle { active }
    }

    /// Register a subscriber for one event type emitted by an entity.
    pub fn subscribe<T: 'static>(
        &mut self,
        handle: &Handle<T>,
        event_type: impl Into<String>,
        f: impl FnMut(&dyn std::any::Any, &mut App) + 'static,
    ) -> SubscriberHandle {
        let active = Rc::new(Cell::new(true));
        if let Some(meta) = self.entities.meta_mut(handle.id) {
            meta.subscribers.push(SubscriberEntry {
                active: active.clone(),
                event_type: event_type.into(),
                callback: Box::new(f),
            });
        } else {
            active.set(false);
        }
        SubscriberHandle { active }
    }

    /// Register a drop handler that runs, with the final state, when the
    /// entity is released.
    pub fn on_release<T: 'static>(
        &mut self,
        handle: &Handle<T>,
        f: impl FnOnce(&mut dyn std::any::Any, &mut App) + 'static,
    ) -> ReleaseHandle {
        let active = Rc::new(Cell::new(true));
        if let Some(meta) = self.entities.meta_mut(handle.id) {
            meta.release_handlers.push(ReleaseEntry {
                active: active.clone(),
                callback: Box::new(f),
            });
        } else {
            active.set(false);
        }
        ReleaseHandle { active }
    }

    /// Queue the entity's release. Drop handlers run during the next flush;
    /// releasing an already-gone entity is a no-op.
    pub fn drop_entity<T: 'static>(&mut self, handle: &Handle<T>) {
        if !self.entities.contains(handle.id) {
            return;
        }
        self.push_effect(Effect::Release { entity: handle.id });
        if self.update_depth == 0 {
            self.flush_effects();
        }
    }

    // ===== Deferred work =====

    /// Queue a closure to run at the next flush, after everything already in
    /// the queue.
    pub fn defer(&mut self, f: impl FnOnce(&mut App) + 'static) -> TaskHandle {
        let task = TaskHandle {
            id: self.next_task_id,
        };
        self.next_task_id += 1;
        self.push_effect(Effect::Callback(Box::new(f)));
        task
    }

    /// Deferred tasks cannot be pulled back out of the queue.
    pub fn cancel_deferred(&mut self, task: TaskHandle) -> Result<()> {
        log::debug!("cancel_deferred({:?}) refused", task);
        Err(UiError::Unsupported("deferred task cancellation"))
    }

    // ===== Windows =====

    /// Open a window. The build callback creates the root view with the
    /// window already in scope, so entities it creates are associated with
    /// the window.
    pub fn open_window(
        &mut self,
        size: Size,
        build_root: impl FnOnce(&mut Window, &mut App) -> AnyView,
    ) -> WindowId {
        let id = self.windows.insert(None);
        let mut window = Box::new(Window::new(id, size));
        let previous = self.active_window.replace(id);
        let root = build_root(&mut window, self);
        window.set_root(root);
        self.active_window = previous;
        self.windows[id] = Some(window);
        self.mark_dirty(Some(id));
        log::debug!("opened window {} at {:?}", id.as_u64(), size);
        id
    }

    /// Close a window and drop its per-frame state. Entities associated with
    /// the window stay alive. Closing from inside one of the window's own
    /// callbacks fails with `Leased`.
    pub fn close_window(&mut self, id: WindowId) -> Result<()> {
        match self.windows.get(id) {
            Some(Some(_)) => {}
            Some(None) => {
                return Err(UiError::Leased {
                    kind: ObjectKind::Window,
                    id: id.as_u64(),
                });
            }
            None => {
                return Err(UiError::NotFound {
                    kind: ObjectKind::Window,
                    id: id.as_u64(),
                });
            }
        }
        self.windows.remove(id);
        self.dirty_windows.remove(&id);
        self.pending_focus.retain(|(window, _)| *window != id);
        log::debug!("closed window {}", id.as_u64());
        Ok(())
    }

    /// Run a callback with a window leased out of the slot. A reentrant
    /// update of the same window fails with `Leased`.
    pub fn update_window<R>(
        &mut self,
        id: WindowId,
        f: impl FnOnce(&mut Window, &mut App) -> R,
    ) -> Result<R> {
        let mut window = self.lease_window(id)?;
        let result = f(&mut window, self);
        self.restore_window(id, window);
        self.apply_parked_focus(id);
        Ok(result)
    }

    /// Queue an input event on a window. It is dispatched at the start of
    /// the window's next frame.
    pub fn push_input(&mut self, id: WindowId, event: crate::input::PlatformInput) -> Result<()> {
        self.update_window(id, |window, _| window.push_input(event))?;
        self.mark_dirty(Some(id));
        Ok(())
    }

    /// Produce one frame for a window: dispatch latched input, flush
    /// effects, then run the full draw protocol.
    pub fn render_frame(&mut self, id: WindowId) -> Result<()> {
        let mut window = self.lease_window(id)?;
        self.dirty_windows.remove(&id);
        let previous = self.active_window.replace(id);

        window.dispatch_pending_input(self);
        self.flush_effects();
        let result = window.draw(self);

        self.active_window = previous;
        self.restore_window(id, window);
        self.apply_parked_focus(id);
        result
    }

    pub fn window_dirty(&self, id: WindowId) -> bool {
        self.dirty_windows.contains(&id)
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().collect()
    }

    /// Mark a window (or, with `None`, every window) as needing a frame.
    pub(crate) fn mark_dirty(&mut self, window: Option<WindowId>) {
        let mut changed = false;
        match window {
            Some(id) => {
                if self.windows.contains_key(id) {
                    changed |= self.dirty_windows.insert(id);
                }
            }
            None => {
                for id in self.windows.keys() {
                    changed |= self.dirty_windows.insert(id);
                }
            }
        }
        if changed {
            self.platform.request_frame();
        }
    }

    fn lease_window(&mut self, id: WindowId) -> Result<Box<Window>> {
        let slot = self.windows.get_mut(id).ok_or(UiError::NotFound {
            kind: ObjectKind::Window,
            id: id.as_u64(),
        })?;
        slot.take().ok_or(UiError::Leased {
            kind: ObjectKind::Window,
            id: id.as_u64(),
        })
    }

    fn restore_window(&mut self, id: WindowId, window: Box<Window>) {
        if let Some(slot) = self.windows.get_mut(id) {
            *slot = Some(window);
        }
    }

    /// Apply focus ops that arrived while this window was leased.
    fn apply_parked_focus(&mut self, id: WindowId) {
        if self.pending_focus.is_empty() {
            return;
        }
        let (mine, rest): (Vec<_>, Vec<_>) = self
            .pending_focus
            .drain(..)
            .partition(|(window, _)| *window == id);
        self.pending_focus = rest;
        if let Some(Some(window)) = self.windows.get_mut(id) {
            for (_, op) in mine {
                window.apply_focus_op(op);
            }
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn type_mismatch(id: EntityId) -> UiError {
    UiError::lifecycle(format!(
        "entity {} accessed through a handle of the wrong type",
        id.as_u64()
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Counter {
        count: u32,
    }

    #[test]
    fn test_first_read_returns_init_value() {
        let mut app = App::new();
        let counter = app.new_entity(|_| Counter { count: 41 });
        assert_eq!(app.read_entity(&counter).unwrap().count, 41);
    }

    #[test]
    fn test_update_returns_callback_value() {
        let mut app = App::new();
        let counter = app.new_entity(|_| Counter { count: 0 });
        let doubled = counter
            .update(&mut app, |state, _| {
                state.count = 21;
                state.count * 2
            })
            .unwrap();
        assert_eq!(doubled, 42);
        assert_eq!(app.read_entity(&counter).unwrap().count, 21);
    }

    #[test]
    fn test_reentrant_update_fails_with_leased() {
        let mut app = App::new();
        let counter = app.new_entity(|_| Counter { count: 0 });

        counter
            .update(&mut app, |_, cx| {
                let me = cx.handle();
                let err = cx.update_entity(&me, |_, _| ()).unwrap_err();
                assert!(err.is_leased());
                assert!(!err.is_not_found());
            })
            .unwrap();
    }

    #[test]
    fn test_read_inside_own_update_fails_with_leased() {
        let mut app = App::new();
        let counter = app.new_entity(|_| Counter { count: 0 });

        counter
            .update(&mut app, |_, cx| {
                let me = cx.handle();
                assert!(cx.read_entity(&me).unwrap_err().is_leased());
            })
            .unwrap();
    }

    #[test]
    fn test_updating_other_entities_inside_update_works() {
        let mut app = App::new();
        let a = app.new_entity(|_| Counter { count: 1 });
        let b = app.new_entity(|_| Counter { count: 2 });

        a.update(&mut app, |state, cx| {
            state.count += 10;
            b.update(cx, |other, _| other.count += 20).unwrap();
        })
        .unwrap();

        assert_eq!(app.read_entity(&a).unwrap().count, 11);
        assert_eq!(app.read_entity(&b).unwrap().count, 22);
    }

    #[test]
    fn test_drop_self_releases_after_update() {
        let mut app = App::new();
        let counter = app.new_entity(|_| Counter { count: 0 });

        counter.update(&mut app, |_, cx| cx.drop_self()).unwrap();
        assert!(app.read_entity(&counter).unwrap_err().is_not_found());
    }

    #[test]
    fn test_handle_from_init_context_matches() {
        let mut app = App::new();
        let mut captured = None;
        let counter = app.new_entity(|cx| {
            captured = Some(cx.handle());
            Counter { count: 0 }
        });
        assert_eq!(captured.unwrap(), counter);
    }

    #[test]
    fn test_cancel_deferred_is_unsupported() {
        let mut app = App::new();
        let task = app.defer(|_| {});
        let err = app.cancel_deferred(task).unwrap_err();
        assert!(matches!(err, UiError::Unsupported(_)));
    }

    #[test]
    fn test_notify_during_nested_update_flushes_once_at_top() {
        let mut app = App::new();
        let a = app.new_entity(|_| Counter { count: 0 });
        let b = app.new_entity(|_| Counter { count: 0 });

        let b_for_observer = b;
        app.observe(&a, move |app| {
            // By flush time the outer update has finished; the lease is back.
            b_for_observer
                .update(app, |state, _| state.count += 1)
                .unwrap();
        });

        a.update(&mut app, |state, cx| {
            state.count += 1;
            cx.notify();
            // Nested update of another entity must not trigger the flush
            // while `a` is still leased.
            b.update(cx, |_, _| ()).unwrap();
        })
        .unwrap();

        assert_eq!(app.read_entity(&b).unwrap().count, 1);
    }

    #[test]
    fn test_close_window_removes_it() {
        use crate::element::{AnyElement, IntoElement, block};

        let mut app = App::new();

        struct Blank;
        impl Render for Blank {
            fn render(&mut self, _window: &mut Window, _cx: &mut Ctx<Self>) -> AnyElement {
                block().into_any()
            }
        }

        let view = app.new_entity(|_| Blank);
        let window = app.open_window(Size::new(100.0, 100.0), |_, _| AnyView::from(view));
        assert!(app.window_ids().contains(&window));

        app.close_window(window).unwrap();
        assert!(app.window_ids().is_empty());
        assert!(app.render_frame(window).unwrap_err().is_not_found());
        assert!(app.close_window(window).unwrap_err().is_not_found());
    }
}
