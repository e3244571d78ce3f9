//! Entity update context.
//!
//! A [`Ctx`] is handed to entity init and update callbacks. It knows which
//! entity is being updated and derefs to the [`App`], so everything the app
//! can do is in reach, except re-leasing the entity the context belongs to.

use std::any::Any;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use crate::app::effects::Effect;
use crate::app::entities::{EntityId, Handle};
use crate::app::App;
use crate::window::focus::FocusHandle;

/// Context for the entity currently under update.
pub struct Ctx<'a, T> {
    app: &'a mut App,
    entity: EntityId,
    dropped: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: 'static> Ctx<'a, T> {
    pub(crate) fn new(app: &'a mut App, entity: EntityId) -> Self {
        Self {
            app,
            entity,
            dropped: false,
            _marker: PhantomData,
        }
    }

    /// Handle of the entity this context belongs to.
    pub fn handle(&self) -> Handle<T> {
        Handle::from_raw(self.entity)
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity
    }

    /// Queue a change notification for this entity. Observers run at the
    /// next flush; the owning window is marked dirty.
    pub fn notify(&mut self) {
        let entity = self.entity;
        self.app.push_effect(Effect::Notify { entity });
    }

    /// Queue an event emission from this entity. Only subscribers registered
    /// for `event_type` see it.
    pub fn emit<E: Any>(&mut self, event_type: impl Into<String>, payload: E) {
        let entity = self.entity;
        self.app.push_effect(Effect::Emit {
            entity,
            event_type: event_type.into(),
            payload: Box::new(payload),
        });
    }

    /// Queue a focus request for the handle's window.
    pub fn focus(&mut self, handle: &FocusHandle) {
        self.app.push_effect(Effect::Focus {
            window: handle.window_id(),
            focus: handle.id(),
        });
    }

    /// Queue a blur request for the handle's window.
    pub fn blur(&mut self, handle: &FocusHandle) {
        self.app.push_effect(Effect::Blur {
            window: handle.window_id(),
            focus: handle.id(),
        });
    }

    /// Release this entity once the current update finishes. Drop handlers
    /// run during the following flush.
    pub fn drop_self(&mut self) {
        self.dropped = true;
    }

    pub(crate) fn dropped(&self) -> bool {
        self.dropped
    }
}

impl<T> Deref for Ctx<'_, T> {
    type Target = App;

    fn deref(&self) -> &App {
        self.app
    }
}

impl<T> DerefMut for Ctx<'_, T> {
    fn deref_mut(&mut self) -> &mut App {
        self.app
    }
}
