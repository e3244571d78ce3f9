//! Focus.
//!
//! Focus is a per-window stack of [`FocusId`]s: focusing pushes (or hoists)
//! an id to the top, blurring removes it wherever it sits, and the element
//! that held focus before a modal grabbed it returns to the top once the
//! modal blurs. At the end of every frame the stack is pruned against the
//! focusable ids that actually rendered, so focus never points at a node
//! that no longer exists.

use std::collections::HashSet;

use crate::app::WindowId;
use crate::types::Bounds;

/// Identity of one focusable element, allocated per window and stable for
/// the window's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FocusId(pub(crate) u64);

/// A claim on focus. Inert: focusing goes through the window (synchronous)
/// or the update context (queued as an effect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusHandle {
    id: FocusId,
    window: WindowId,
}

impl FocusHandle {
    pub(crate) fn new(id: FocusId, window: WindowId) -> Self {
        Self { id, window }
    }

    pub fn id(&self) -> FocusId {
        self.id
    }

    pub fn window_id(&self) -> WindowId {
        self.window
    }
}

/// A queued focus mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FocusOp {
    Focus(FocusId),
    Blur(FocusId),
}

// =============================================================================
// Focus stack
// =============================================================================

pub(crate) struct FocusStack {
    stack: Vec<FocusId>,
    saved: Option<Vec<FocusId>>,
    next_id: u64,
}

impl FocusStack {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            saved: None,
            next_id: 1,
        }
    }

    pub fn allocate(&mut self, window: WindowId) -> FocusHandle {
        let id = FocusId(self.next_id);
        self.next_id += 1;
        FocusHandle::new(id, window)
    }

    /// Current focus, the top of the stack.
    pub fn current(&self) -> Option<FocusId> {
        self.stack.last().copied()
    }

    pub fn is_focused(&self, id: FocusId) -> bool {
        self.current() == Some(id)
    }

    /// Push an id to the top. An id already in the stack is hoisted, not
    /// duplicated.
    pub fn focus(&mut self, id: FocusId) {
        self.stack.retain(|entry| *entry != id);
        self.stack.push(id);
    }

    /// Remove an id from the stack. Removing the top reveals the entry
    /// beneath it.
    pub fn blur(&mut self, id: FocusId) {
        self.stack.retain(|entry| *entry != id);
    }

    pub fn apply(&mut self, op: FocusOp) {
        match op {
            FocusOp::Focus(id) => self.focus(id),
            FocusOp::Blur(id) => self.blur(id),
        }
    }

    /// Drop stack entries whose focus target did not render this frame.
    /// Returns true when the stack changed.
    pub fn prune(&mut self, live: &HashSet<FocusId>) -> bool {
        let before = self.stack.len();
        self.stack.retain(|entry| live.contains(entry));
        self.stack.len() != before
    }

    /// Snapshot the stack into the single save slot.
    pub fn save(&mut self) {
        self.saved = Some(self.stack.clone());
    }

    /// Replace the stack with the saved snapshot, if one exists.
    pub fn restore(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.stack = saved;
        }
    }
}

// =============================================================================
// Tab stops
// =============================================================================

/// One keyboard-reachable element registered for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabStop {
    pub focus: FocusId,
    pub bounds: Bounds,
    pub group: u32,
    pub index: u32,
}

/// Frame registry of tab stops. Traversal order is group-major: all of group
/// 1 in index order, then group 2, and so on, wrapping at the end. An
/// unknown current focus starts from the beginning.
pub(crate) struct TabStops {
    stops: Vec<TabStop>,
}

impl TabStops {
    pub fn new() -> Self {
        Self { stops: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.stops.clear();
    }

    pub fn insert(&mut self, stop: TabStop) {
        self.stops.push(stop);
    }

    /// Stops in traversal order. Registration order breaks ties within the
    /// same group and index.
    fn ordered(&self) -> Vec<&TabStop> {
        let mut ordered: Vec<&TabStop> = self.stops.iter().collect();
        ordered.sort_by_key(|stop| (stop.group, stop.index));
        ordered
    }

    pub fn next(&self, current: Option<FocusId>) -> Option<FocusId> {
        let ordered = self.ordered();
        if ordered.is_empty() {
            return None;
        }
        let position = current
            .and_then(|id| ordered.iter().position(|stop| stop.focus == id));
        let next = match position {
            Some(index) => (index + 1) % ordered.len(),
            None => 0,
        };
        Some(ordered[next].focus)
    }

    pub fn prev(&self, current: Option<FocusId>) -> Option<FocusId> {
        let ordered = self.ordered();
        if ordered.is_empty() {
            return None;
        }
        let position = current
            .and_then(|id| ordered.iter().position(|stop| stop.focus == id));
        let prev = match position {
            Some(0) | None => ordered.len() - 1,
            Some(index) => index - 1,
        };
        Some(ordered[prev].focus)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bounds;

    fn ids(stack: &FocusStack) -> Vec<u64> {
        stack.stack.iter().map(|id| id.0).collect()
    }

    #[test]
    fn test_focus_hoists_instead_of_duplicating() {
        let mut stack = FocusStack::new();
        let a = FocusId(1);
        let b = FocusId(2);

        stack.focus(a);
        stack.focus(b);
        stack.focus(a);

        assert_eq!(ids(&stack), vec![2, 1]);
        assert_eq!(stack.current(), Some(a));
    }

    #[test]
    fn test_blur_top_reveals_previous() {
        let mut stack = FocusStack::new();
        let a = FocusId(1);
        let b = FocusId(2);

        stack.focus(a);
        stack.focus(b);
        stack.blur(b);

        assert_eq!(stack.current(), Some(a));
    }

    #[test]
    fn test_prune_drops_dead_ids() {
        let mut stack = FocusStack::new();
        stack.focus(FocusId(1));
        stack.focus(FocusId(2));
        stack.focus(FocusId(3));

        let live: HashSet<FocusId> = [FocusId(1), FocusId(3)].into_iter().collect();
        assert!(stack.prune(&live));
        assert!(!stack.prune(&live));

        assert_eq!(ids(&stack), vec![1, 3]);
    }

    #[test]
    fn test_save_and_restore_round_trip() {
        let mut stack = FocusStack::new();
        stack.focus(FocusId(1));
        stack.save();
        stack.focus(FocusId(9));
        stack.blur(FocusId(1));

        stack.restore();
        assert_eq!(ids(&stack), vec![1]);

        // The slot is consumed; a second restore changes nothing.
        stack.focus(FocusId(2));
        stack.restore();
        assert_eq!(ids(&stack), vec![1, 2]);
    }

    fn stop(focus: u64, group: u32, index: u32) -> TabStop {
        TabStop {
            focus: FocusId(focus),
            bounds: bounds(0.0, 0.0, 10.0, 10.0),
            group,
            index,
        }
    }

    #[test]
    fn test_tab_order_is_group_major() {
        let mut stops = TabStops::new();
        // Registration order deliberately scrambled.
        stops.insert(stop(30, 3, 0));
        stops.insert(stop(12, 1, 2));
        stops.insert(stop(20, 2, 0));
        stops.insert(stop(11, 1, 1));

        // Group 1 exhausts before group 2, which comes before group 3.
        assert_eq!(stops.next(None), Some(FocusId(11)));
        assert_eq!(stops.next(Some(FocusId(11))), Some(FocusId(12)));
        assert_eq!(stops.next(Some(FocusId(12))), Some(FocusId(20)));
        assert_eq!(stops.next(Some(FocusId(20))), Some(FocusId(30)));
        assert_eq!(stops.next(Some(FocusId(30))), Some(FocusId(11)));
    }

    #[test]
    fn test_tab_prev_wraps_backwards() {
        let mut stops = TabStops::new();
        stops.insert(stop(1, 1, 0));
        stops.insert(stop(2, 1, 1));

        assert_eq!(stops.prev(Some(FocusId(1))), Some(FocusId(2)));
        assert_eq!(stops.prev(Some(FocusId(2))), Some(FocusId(1)));
        assert_eq!(stops.prev(None), Some(FocusId(2)));
    }

    #[test]
    fn test_unknown_focus_starts_from_the_beginning() {
        let mut stops = TabStops::new();
        stops.insert(stop(5, 1, 0));
        assert_eq!(stops.next(Some(FocusId(99))), Some(FocusId(5)));
    }

    #[test]
    fn test_empty_registry_yields_nothing() {
        let stops = TabStops::new();
        assert_eq!(stops.next(None), None);
        assert_eq!(stops.prev(None), None);
    }
}
