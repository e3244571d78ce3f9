//! Deferred rendering.
//!
//! Wrapping an element in [`deferred`] lifts it out of its tree position:
//! the wrapper leaves a zero-size placeholder behind and hands the child to
//! the window, which lays it out against the full window and paints it
//! above the main tree. Higher priority paints later, and so on top.

use crate::app::App;
use crate::element::{AnyElement, Element, GlobalElementId, IntoElement};
use crate::error::Result;
use crate::layout::LayoutId;
use crate::style::Style;
use crate::types::Bounds;
use crate::window::Window;

/// Defer a subtree to the overlay pass.
pub fn deferred(child: impl IntoElement) -> Deferred {
    Deferred {
        child: Some(child.into_any()),
        priority: 0,
    }
}

pub struct Deferred {
    child: Option<AnyElement>,
    priority: i32,
}

impl Deferred {
    /// Order among deferred subtrees. Equal priorities keep their paint
    /// order from the main tree.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Element for Deferred {
    type RequestState = ();
    type PrepaintState = ();

    fn request_layout(
        &mut self,
        _id: GlobalElementId,
        window: &mut Window,
        _cx: &mut App,
    ) -> Result<(LayoutId, ())> {
        Ok((
            window.request_layout(&Style::deferred_placeholder(), &[])?,
            (),
        ))
    }

    fn prepaint(
        &mut self,
        _id: GlobalElementId,
        _bounds: Bounds,
        _request: &mut (),
        window: &mut Window,
        _cx: &mut App,
    ) -> Result<()> {
        if let Some(child) = self.child.take() {
            window.defer_draw(child, self.priority);
        }
        Ok(())
    }

    fn paint(
        &mut self,
        _id: GlobalElementId,
        _bounds: Bounds,
        _request: &mut (),
        _prepaint: &mut (),
        _window: &mut Window,
        _cx: &mut App,
    ) -> Result<()> {
        Ok(())
    }
}

impl IntoElement for Deferred {
    type Element = Deferred;

    fn into_element(self) -> Deferred {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
