//! Entity storage.
//!
//! Entities are opaque boxed values in a slotmap arena. Reads borrow the
//! boxed state in place; updates *lease* it, taking the box out of the slot
//! for the duration of the callback so the callback can hold `&mut T` while
//! the rest of the [`App`](super::App) stays reachable. A slot whose state is
//! out on lease answers every other access with [`UiError::Leased`].

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::Rc;

use slotmap::{Key, SlotMap, new_key_type};

use crate::app::{App, WindowId};
use crate::error::{ObjectKind, Result, UiError};

new_key_type! {
    /// Key of one entity in the store.
    pub struct EntityId;
}

impl EntityId {
    /// Raw id for error messages and logs.
    pub fn as_u64(self) -> u64 {
        self.data().as_ffi()
    }
}

// =============================================================================
// Handles
// =============================================================================

/// Typed, inert reference to an entity. Holding a handle keeps nothing alive;
/// every access goes through the [`App`](super::App) and can fail with
/// `NotFound` once the entity is released.
pub struct Handle<T> {
    pub(crate) id: EntityId,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Handle<T> {
    pub(crate) fn from_raw(id: EntityId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.id
    }

    /// Sugar for [`App::read_entity`].
    pub fn read<'a>(&self, app: &'a App) -> Result<&'a T> {
        app.read_entity(self)
    }

    /// Sugar for [`App::update_entity`].
    pub fn update<R>(
        &self,
        app: &mut App,
        f: impl FnOnce(&mut T, &mut crate::app::Ctx<T>) -> R,
    ) -> Result<R> {
        app.update_entity(self, f)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.id).finish()
    }
}

// =============================================================================
// Subscription handles
// =============================================================================

/// Cancels an [`App::observe`] registration. Inert until
/// [`ObserverHandle::cancel`]; dropping it leaves the observer installed.
pub struct ObserverHandle {
    pub(crate) active: Rc<Cell<bool>>,
}

impl ObserverHandle {
    pub fn cancel(self) {
        self.active.set(false);
    }
}

/// Cancels an [`App::subscribe`] registration.
pub struct SubscriberHandle {
    pub(crate) active: Rc<Cell<bool>>,
}

impl SubscriberHandle {
    pub fn cancel(self) {
        self.active.set(false);
    }
}

/// Cancels an [`App::on_release`] registration.
pub struct ReleaseHandle {
    pub(crate) active: Rc<Cell<bool>>,
}

impl ReleaseHandle {
    pub fn cancel(self) {
        self.active.set(false);
    }
}

// =============================================================================
// Slots
// =============================================================================

pub(crate) enum EntityState {
    Present(Box<dyn Any>),
    Leased,
}

pub(crate) struct ObserverEntry {
    pub active: Rc<Cell<bool>>,
    pub callback: Box<dyn FnMut(&mut App)>,
}

pub(crate) struct SubscriberEntry {
    pub active: Rc<Cell<bool>>,
    pub event_type: String,
    pub callback: Box<dyn FnMut(&dyn Any, &mut App)>,
}

pub(crate) struct ReleaseEntry {
    pub active: Rc<Cell<bool>>,
    pub callback: Box<dyn FnOnce(&mut dyn Any, &mut App)>,
}

#[derive(Default)]
pub(crate) struct EntityMeta {
    pub observers: Vec<ObserverEntry>,
    pub subscribers: Vec<SubscriberEntry>,
    pub release_handlers: Vec<ReleaseEntry>,
    /// Window this entity renders into, when it is a view. Notifications for
    /// tagged entities dirty only that window.
    pub window: Option<WindowId>,
}

pub(crate) struct EntitySlot {
    pub state: EntityState,
    pub meta: EntityMeta,
}

// =============================================================================
// Store
// =============================================================================

/// Arena of entity slots plus their metadata.
pub(crate) struct EntityStore {
    slots: SlotMap<EntityId, EntitySlot>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    /// Allocate a slot in the `Leased` state. The entity is unreadable until
    /// [`EntityStore::finish_insert`] parks its initial state.
    pub fn reserve(&mut self, window: Option<WindowId>) -> EntityId {
        self.slots.insert(EntitySlot {
            state: EntityState::Leased,
            meta: EntityMeta {
                window,
                ..EntityMeta::default()
            },
        })
    }

    pub fn finish_insert(&mut self, id: EntityId, state: Box<dyn Any>) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.state = EntityState::Present(state);
        } else {
            debug_assert!(false, "finish_insert on missing slot");
        }
    }

    /// Take the state out for an update. Fails with `Leased` when an update
    /// is already in progress on this entity.
    pub fn lease(&mut self, id: EntityId) -> Result<Box<dyn Any>> {
        let slot = self.slots.get_mut(id).ok_or_else(|| not_found(id))?;
        match std::mem::replace(&mut slot.state, EntityState::Leased) {
            EntityState::Present(state) => Ok(state),
            EntityState::Leased => Err(leased(id)),
        }
    }

    /// Put leased state back. If the slot vanished in the meantime the state
    /// is dropped.
    pub fn restore(&mut self, id: EntityId, state: Box<dyn Any>) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.state = EntityState::Present(state);
        } else {
            log::warn!("entity {} released while leased; dropping state", id.as_u64());
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&EntitySlot> {
        self.slots.get(id)
    }

    pub fn meta_mut(&mut self, id: EntityId) -> Option<&mut EntityMeta> {
        self.slots.get_mut(id).map(|slot| &mut slot.meta)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<EntitySlot> {
        self.slots.remove(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

pub(crate) fn not_found(id: EntityId) -> UiError {
    UiError::NotFound {
        kind: ObjectKind::Entity,
        id: id.as_u64(),
    }
}

pub(crate) fn leased(id: EntityId) -> UiError {
    UiError::Leased {
        kind: ObjectKind::Entity,
        id: id.as_u64(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_slot_is_leased_until_finished() {
        let mut store = EntityStore::new();
        let id = store.reserve(None);
        assert!(store.lease(id).unwrap_err().is_leased());

        store.finish_insert(id, Box::new(7u32));
        let state = store.lease(id).unwrap();
        assert_eq!(*state.downcast::<u32>().unwrap(), 7);
    }

    #[test]
    fn test_lease_is_exclusive() {
        let mut store = EntityStore::new();
        let id = store.reserve(None);
        store.finish_insert(id, Box::new(String::from("a")));

        let state = store.lease(id).unwrap();
        assert!(store.lease(id).unwrap_err().is_leased());

        store.restore(id, state);
        assert!(store.lease(id).is_ok());
    }

    #[test]
    fn test_missing_entity_is_not_found() {
        let mut store = EntityStore::new();
        let id = store.reserve(None);
        store.finish_insert(id, Box::new(1u8));
        store.remove(id);

        assert!(store.lease(id).unwrap_err().is_not_found());
        assert!(!store.contains(id));
    }

    #[test]
    fn test_handle_is_copy_and_comparable() {
        let mut store = EntityStore::new();
        let id = store.reserve(None);
        let a: Handle<u32> = Handle::from_raw(id);
        let b = a;
        assert_eq!(a, b);
        assert_eq!(a.entity_id(), id);
    }
}
