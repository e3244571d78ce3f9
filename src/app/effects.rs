//! Effect queue.
//!
//! Mutations never call observers synchronously. They queue an [`Effect`] and
//! the queue is drained by [`App::flush_effects`] at well-defined points: the
//! end of the outermost entity update and the frame boundaries. The drain is
//! re-entry guarded; a flush while flushing is a no-op, and the outer drain
//! keeps going until the queue is empty, including effects appended mid-drain.

use std::any::Any;

use crate::app::entities::{EntityId, EntityState, EntitySlot};
use crate::app::{App, WindowId};
use crate::window::focus::{FocusId, FocusOp};

/// One queued side effect.
pub(crate) enum Effect {
    /// Entity changed; run its observers and dirty its window.
    Notify { entity: EntityId },
    /// Entity emitted an event; run matching subscribers.
    Emit {
        entity: EntityId,
        event_type: String,
        payload: Box<dyn Any>,
    },
    /// Push a focus target onto a window's focus stack.
    Focus { window: WindowId, focus: FocusId },
    /// Remove a focus target from a window's focus stack.
    Blur { window: WindowId, focus: FocusId },
    /// Run drop handlers and remove the entity.
    Release { entity: EntityId },
    /// Arbitrary deferred work.
    Callback(Box<dyn FnOnce(&mut App)>),
}

impl App {
    /// Drain the effect queue to empty. Re-entrant calls return immediately;
    /// the outermost drain picks up anything they queued.
    pub fn flush_effects(&mut self) {
        if self.flushing {
            return;
        }
        self.flushing = true;
        while let Some(effect) = self.effects.pop_front() {
            self.dispatch_effect(effect);
        }
        self.flushing = false;
    }

    pub(crate) fn push_effect(&mut self, effect: Effect) {
        self.effects.push_back(effect);
    }

    fn dispatch_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Notify { entity } => self.dispatch_notify(entity),
            Effect::Emit {
                entity,
                event_type,
                payload,
            } => self.dispatch_emit(entity, &event_type, payload),
            Effect::Focus { window, focus } => self.route_focus_op(window, FocusOp::Focus(focus)),
            Effect::Blur { window, focus } => self.route_focus_op(window, FocusOp::Blur(focus)),
            Effect::Release { entity } => self.dispatch_release(entity),
            Effect::Callback(callback) => callback(self),
        }
    }

    fn dispatch_notify(&mut self, entity: EntityId) {
        let window = self
            .entities
            .get(entity)
            .and_then(|slot| slot.meta.window);
        self.mark_dirty(window);

        let Some(meta) = self.entities.meta_mut(entity) else {
            return;
        };
        let mut entries = std::mem::take(&mut meta.observers);
        entries.retain_mut(|entry| {
            if entry.active.get() {
                (entry.callback)(self);
                true
            } else {
                false
            }
        });
        // Observers registered during the callbacks landed in the slot's
        // fresh vector; keep them after the survivors.
        if let Some(meta) = self.entities.meta_mut(entity) {
            let added = std::mem::replace(&mut meta.observers, entries);
            meta.observers.extend(added);
        }
    }

    fn dispatch_emit(&mut self, entity: EntityId, event_type: &str, payload: Box<dyn Any>) {
        let Some(meta) = self.entities.meta_mut(entity) else {
            return;
        };
        let mut entries = std::mem::take(&mut meta.subscribers);
        entries.retain_mut(|entry| {
            if !entry.active.get() {
                return false;
            }
            if entry.event_type == event_type {
                (entry.callback)(payload.as_ref(), self);
            }
            true
        });
        if let Some(meta) = self.entities.meta_mut(entity) {
            let added = std::mem::replace(&mut meta.subscribers, entries);
            meta.subscribers.extend(added);
        }
    }

    fn dispatch_release(&mut self, entity: EntityId) {
        let Some(slot) = self.entities.remove(entity) else {
            return;
        };
        let EntitySlot { state, meta } = slot;
        let mut state = match state {
            EntityState::Present(state) => state,
            EntityState::Leased => {
                log::warn!(
                    "release of leased entity {}; drop handlers skipped",
                    entity.as_u64()
                );
                return;
            }
        };
        for entry in meta.release_handlers {
            if entry.active.get() {
                (entry.callback)(state.as_mut(), self);
            }
        }
    }

    /// Apply a focus op to a window, parking it if the window is currently
    /// leased and dropping it if the window is gone.
    fn route_focus_op(&mut self, window: WindowId, op: FocusOp) {
        match self.windows.get_mut(window) {
            Some(Some(live)) => live.apply_focus_op(op),
            Some(None) => self.pending_focus.push((window, op)),
            None => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::app::App;

    #[derive(Debug)]
    struct Counter {
        count: u32,
    }

    #[test]
    fn test_notify_runs_observers() {
        let mut app = App::new();
        let counter = app.new_entity(|_| Counter { count: 0 });

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        app.observe(&counter, move |_| log.borrow_mut().push("a"));
        let log = seen.clone();
        app.observe(&counter, move |_| log.borrow_mut().push("b"));

        counter
            .update(&mut app, |state, cx| {
                state.count += 1;
                cx.notify();
            })
            .unwrap();

        assert_eq!(*seen.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_canceled_observer_does_not_run() {
        let mut app = App::new();
        let counter = app.new_entity(|_| Counter { count: 0 });

        let seen = Rc::new(RefCell::new(0));
        let hits = seen.clone();
        let handle = app.observe(&counter, move |_| *hits.borrow_mut() += 1);
        handle.cancel();

        counter.update(&mut app, |_, cx| cx.notify()).unwrap();
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn test_emit_filters_by_event_type() {
        let mut app = App::new();
        let source = app.new_entity(|_| Counter { count: 0 });

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        app.subscribe(&source, "pressed", move |payload, _| {
            let value = payload.downcast_ref::<u32>().copied().unwrap_or(0);
            log.borrow_mut().push(("pressed", value));
        });
        let log = seen.clone();
        app.subscribe(&source, "hovered", move |_, _| {
            log.borrow_mut().push(("hovered", 0));
        });

        source
            .update(&mut app, |_, cx| cx.emit("pressed", 42u32))
            .unwrap();

        assert_eq!(*seen.borrow(), vec![("pressed", 42)]);
    }

    #[test]
    fn test_flush_drains_effects_queued_mid_flush() {
        let mut app = App::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = order.clone();
        let inner_log = order.clone();
        app.defer(move |app| {
            log.borrow_mut().push(1);
            app.defer(move |_| inner_log.borrow_mut().push(2));
        });
        let log = order.clone();
        app.defer(move |_| log.borrow_mut().push(3));

        app.flush_effects();

        // FIFO: the callback queued mid-flush runs after everything that was
        // already in the queue.
        assert_eq!(*order.borrow(), vec![1, 3, 2]);
    }

    #[test]
    fn test_reentrant_flush_is_a_no_op() {
        let mut app = App::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = order.clone();
        app.defer(move |app| {
            log.borrow_mut().push("outer");
            // Flushing from inside a flush must not recurse into the queue.
            app.flush_effects();
            log.borrow_mut().push("outer-end");
        });
        let log = order.clone();
        app.defer(move |_| log.borrow_mut().push("tail"));

        app.flush_effects();
        assert_eq!(*order.borrow(), vec!["outer", "outer-end", "tail"]);
    }

    #[test]
    fn test_release_runs_drop_handlers_once_in_order() {
        let mut app = App::new();
        let entity = app.new_entity(|_| Counter { count: 9 });

        let order = Rc::new(RefCell::new(Vec::new()));
        let log = order.clone();
        app.on_release(&entity, move |state, _| {
            let counter = state.downcast_ref::<Counter>().unwrap();
            log.borrow_mut().push(("first", counter.count));
        });
        let log = order.clone();
        app.on_release(&entity, move |_, _| log.borrow_mut().push(("second", 0)));

        app.drop_entity(&entity);

        assert_eq!(*order.borrow(), vec![("first", 9), ("second", 0)]);
        assert!(app.read_entity(&entity).unwrap_err().is_not_found());

        // A second drop is a no-op; handlers already ran.
        app.drop_entity(&entity);
        assert_eq!(order.borrow().len(), 2);
    }

    #[test]
    fn test_observer_added_during_notify_survives_for_next_notify() {
        let mut app = App::new();
        let counter = app.new_entity(|_| Counter { count: 0 });

        let seen = Rc::new(RefCell::new(0u32));
        let outer_seen = seen.clone();
        let outer = counter;
        app.observe(&counter, move |app| {
            let inner_seen = outer_seen.clone();
            app.observe(&outer, move |_| *inner_seen.borrow_mut() += 1);
        });

        counter.update(&mut app, |_, cx| cx.notify()).unwrap();
        // The observer added mid-notify must not fire for the notify that
        // created it.
        assert_eq!(*seen.borrow(), 0);

        counter.update(&mut app, |_, cx| cx.notify()).unwrap();
        assert_eq!(*seen.borrow(), 1);
    }
}
