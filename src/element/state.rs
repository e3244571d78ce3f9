//! Persistent element state.
//!
//! Elements are rebuilt every frame, but some of them need state that
//! outlives a frame (pressed flags, caret positions, animation clocks). The
//! arena keys that state by [`GlobalElementId`], which is positional: if the
//! tree shape changes above an element, its id shifts and it may land on a
//! slot holding another element's state. Each slot therefore records the
//! stored type; a type mismatch discards the stale state instead of handing
//! it to the wrong element. Slots not touched during a frame are swept when
//! the frame ends.

use std::any::{Any, TypeId};

use crate::element::GlobalElementId;

struct Slot {
    visited: u32,
    state: Option<(TypeId, Box<dyn Any>)>,
}

pub(crate) struct ElementStateArena {
    slots: Vec<Slot>,
    generation: u32,
}

impl ElementStateArena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generation: 0,
        }
    }

    /// Start a new frame; anything not accessed before [`Self::sweep`] is
    /// garbage.
    pub fn begin_frame(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Take the state stored for an element, marking the slot live for this
    /// frame. Returns `None` when the slot is empty or holds a different
    /// type.
    pub fn take<S: 'static>(&mut self, id: GlobalElementId) -> Option<S> {
        let generation = self.generation;
        let slot = self.slot_mut(id);
        slot.visited = generation;
        match slot.state.take() {
            Some((fingerprint, state)) if fingerprint == TypeId::of::<S>() => {
                state.downcast::<S>().ok().map(|boxed| *boxed)
            }
            Some(_) => {
                log::debug!("element state at {:?} changed type; discarding", id);
                None
            }
            None => None,
        }
    }

    /// Park state for an element until the next frame.
    pub fn store<S: 'static>(&mut self, id: GlobalElementId, state: S) {
        let generation = self.generation;
        let slot = self.slot_mut(id);
        slot.visited = generation;
        slot.state = Some((TypeId::of::<S>(), Box::new(state)));
    }

    /// Drop state for every element that did not render this frame.
    pub fn sweep(&mut self) {
        for slot in &mut self.slots {
            if slot.visited != self.generation {
                slot.state = None;
            }
        }
        while matches!(self.slots.last(), Some(slot) if slot.state.is_none()) {
            self.slots.pop();
        }
    }

    /// Number of slots currently holding state.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.state.is_some()).count()
    }

    fn slot_mut(&mut self, id: GlobalElementId) -> &mut Slot {
        let index = id.0 as usize;
        while self.slots.len() <= index {
            self.slots.push(Slot {
                visited: self.generation.wrapping_sub(1),
                state: None,
            });
        }
        &mut self.slots[index]
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_survives_across_frames() {
        let mut arena = ElementStateArena::new();
        let id = GlobalElementId(3);

        arena.begin_frame();
        assert_eq!(arena.take::<u32>(id), None);
        arena.store(id, 7u32);
        arena.sweep();

        arena.begin_frame();
        assert_eq!(arena.take::<u32>(id), Some(7));
    }

    #[test]
    fn test_type_mismatch_discards_stale_state() {
        let mut arena = ElementStateArena::new();
        let id = GlobalElementId(0);

        arena.begin_frame();
        arena.store(id, String::from("old"));
        arena.sweep();

        arena.begin_frame();
        // Same slot, different element type landed here.
        assert_eq!(arena.take::<u32>(id), None);
        assert_eq!(arena.live_count(), 0);
    }

    #[test]
    fn test_sweep_drops_unvisited_slots() {
        let mut arena = ElementStateArena::new();
        arena.begin_frame();
        arena.store(GlobalElementId(0), 1u8);
        arena.store(GlobalElementId(1), 2u8);
        arena.sweep();

        arena.begin_frame();
        assert_eq!(arena.take::<u8>(GlobalElementId(0)), Some(1));
        arena.store(GlobalElementId(0), 1u8);
        // Slot 1 never touched this frame.
        arena.sweep();

        arena.begin_frame();
        assert_eq!(arena.take::<u8>(GlobalElementId(1)), None);
        assert_eq!(arena.take::<u8>(GlobalElementId(0)), Some(1));
    }

    #[test]
    fn test_store_without_take_still_counts_as_visited() {
        let mut arena = ElementStateArena::new();
        arena.begin_frame();
        arena.store(GlobalElementId(5), 9i32);
        arena.sweep();
        assert_eq!(arena.live_count(), 1);
    }
}
