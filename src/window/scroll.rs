//! Scroll state.
//!
//! A [`ScrollHandle`] is shared between the view that owns it and the
//! element that renders the scrollable region. The element reports viewport
//! and content geometry during prepaint; wheel and scrollbar input mutate
//! the offset through the handle. Offsets are positive and grow toward the
//! content's end: painting subtracts them.
//!
//! The clamp invariant: once a content size has been reported,
//! `0 <= offset <= max(0, content - viewport)` holds on both axes after any
//! mutation. Before the first report, `scroll_by` accumulates unclamped so
//! no wheel input is lost during the first layout, while `set_offset`
//! clamps to whatever is known.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::types::{Bounds, Point, Size};

/// Scrollbar axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Vertical,
    Horizontal,
}

/// An in-progress scrollbar thumb drag.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ThumbDrag {
    pub axis: Axis,
    /// Offset on the dragged axis when the drag started.
    pub start_offset: f32,
    /// Mouse position on the dragged axis when the drag started.
    pub start_mouse: f32,
    pub track_length: f32,
    pub thumb_length: f32,
    pub max_scroll: f32,
}

impl ThumbDrag {
    /// Offset for the current mouse position, scaling mouse travel by the
    /// ratio of scrollable range to free track.
    pub fn offset_for(&self, mouse: f32) -> f32 {
        let free_track = self.track_length - self.thumb_length;
        if free_track <= 0.0 {
            return self.start_offset;
        }
        let scale = self.max_scroll / free_track;
        (self.start_offset + (mouse - self.start_mouse) * scale).clamp(0.0, self.max_scroll)
    }
}

#[derive(Debug)]
pub(crate) struct ScrollState {
    offset: Point,
    content_size: Option<Size>,
    viewport_size: Size,
    viewport_origin: Point,
    pub(crate) vertical_thumb: Option<Bounds>,
    pub(crate) horizontal_thumb: Option<Bounds>,
    pub(crate) drag: Option<ThumbDrag>,
}

impl ScrollState {
    fn new() -> Self {
        Self {
            offset: Point::ZERO,
            content_size: None,
            viewport_size: Size::ZERO,
            viewport_origin: Point::ZERO,
            vertical_thumb: None,
            horizontal_thumb: None,
            drag: None,
        }
    }

    fn max_offset(&self) -> Point {
        match self.content_size {
            Some(content) => Point::new(
                (content.width - self.viewport_size.width).max(0.0),
                (content.height - self.viewport_size.height).max(0.0),
            ),
            None => Point::ZERO,
        }
    }

    fn clamp_offset(&mut self) {
        let max = self.max_offset();
        self.offset = self.offset.clamp(Point::ZERO, max);
    }
}

/// Shared, cheaply clonable scroll position.
#[derive(Clone)]
pub struct ScrollHandle(Rc<RefCell<ScrollState>>);

impl ScrollHandle {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ScrollState::new())))
    }

    pub fn offset(&self) -> Point {
        self.0.borrow().offset
    }

    /// Scrollable range on each axis; zero until content size is known.
    pub fn max_offset(&self) -> Point {
        self.0.borrow().max_offset()
    }

    pub fn content_size(&self) -> Option<Size> {
        self.0.borrow().content_size
    }

    pub fn viewport_bounds(&self) -> Bounds {
        let state = self.0.borrow();
        Bounds {
            origin: state.viewport_origin,
            size: state.viewport_size,
        }
    }

    /// Set the offset outright. Clamped against everything known so far;
    /// with no content report yet, that means non-negative.
    pub fn set_offset(&self, offset: Point) {
        let mut state = self.0.borrow_mut();
        state.offset = offset;
        match state.content_size {
            Some(_) => state.clamp_offset(),
            None => {
                state.offset = Point::new(state.offset.x.max(0.0), state.offset.y.max(0.0));
            }
        }
    }

    /// Move the offset by a delta. Returns whether the offset actually
    /// changed, which wheel dispatch uses to fall through to an outer
    /// scrollable. Unclamped until a content size has been reported.
    pub fn scroll_by(&self, delta: Point) -> bool {
        let mut state = self.0.borrow_mut();
        let before = state.offset;
        state.offset = state.offset + delta;
        if state.content_size.is_some() {
            state.clamp_offset();
        }
        state.offset != before
    }

    /// Prepaint report of the region's geometry. Re-clamps, so an offset
    /// that outlived its content shrinks back into range.
    pub fn update_geometry(&self, viewport: Bounds, content: Size) {
        let mut state = self.0.borrow_mut();
        state.viewport_origin = viewport.origin;
        state.viewport_size = viewport.size;
        state.content_size = Some(content);
        state.clamp_offset();
    }

    /// Whether content overflows the viewport on the vertical axis.
    pub fn overflows_vertically(&self) -> bool {
        self.max_offset().y > 0.0
    }

    pub fn overflows_horizontally(&self) -> bool {
        self.max_offset().x > 0.0
    }

    pub(crate) fn state(&self) -> Ref<'_, ScrollState> {
        self.0.borrow()
    }

    pub(crate) fn set_thumbs(&self, vertical: Option<Bounds>, horizontal: Option<Bounds>) {
        let mut state = self.0.borrow_mut();
        state.vertical_thumb = vertical;
        state.horizontal_thumb = horizontal;
    }

    pub(crate) fn begin_drag(&self, drag: ThumbDrag) {
        self.0.borrow_mut().drag = Some(drag);
    }

    pub(crate) fn drag(&self) -> Option<ThumbDrag> {
        self.0.borrow().drag
    }

    pub(crate) fn end_drag(&self) {
        self.0.borrow_mut().drag = None;
    }

    /// Apply a drag update on the dragged axis.
    pub(crate) fn drag_to(&self, mouse: Point) -> bool {
        let Some(drag) = self.drag() else {
            return false;
        };
        let (axis_mouse, current) = match drag.axis {
            Axis::Vertical => (mouse.y, self.offset().y),
            Axis::Horizontal => (mouse.x, self.offset().x),
        };
        let next = drag.offset_for(axis_mouse);
        if next == current {
            return false;
        }
        let offset = self.offset();
        match drag.axis {
            Axis::Vertical => self.set_offset(Point::new(offset.x, next)),
            Axis::Horizontal => self.set_offset(Point::new(next, offset.y)),
        }
        true
    }

    /// Identity comparison for routing: two handles are the same region if
    /// they share state.
    pub fn ptr_eq(&self, other: &ScrollHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for ScrollHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScrollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("ScrollHandle")
            .field("offset", &state.offset)
            .field("content_size", &state.content_size)
            .field("viewport_size", &state.viewport_size)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bounds;

    fn reported_handle() -> ScrollHandle {
        let handle = ScrollHandle::new();
        // 200x200 viewport over 300x300 content: 100 of travel on each axis.
        handle.update_geometry(bounds(0.0, 0.0, 200.0, 200.0), Size::new(300.0, 300.0));
        handle
    }

    #[test]
    fn test_set_offset_clamps_to_scroll_range() {
        let handle = reported_handle();
        handle.set_offset(Point::new(-50.0, 99999.0));
        assert_eq!(handle.offset(), Point::new(0.0, 100.0));
    }

    #[test]
    fn test_scroll_by_clamps_once_content_is_known() {
        let handle = reported_handle();
        assert!(handle.scroll_by(Point::new(0.0, 250.0)));
        assert_eq!(handle.offset(), Point::new(0.0, 100.0));

        // Already pinned to the bottom; another push downward moves nothing.
        assert!(!handle.scroll_by(Point::new(0.0, 10.0)));
    }

    #[test]
    fn test_scroll_by_before_content_report_accumulates() {
        let handle = ScrollHandle::new();
        assert!(handle.scroll_by(Point::new(0.0, 500.0)));
        assert_eq!(handle.offset().y, 500.0);

        // The report brings the offset back into range.
        handle.update_geometry(bounds(0.0, 0.0, 200.0, 200.0), Size::new(300.0, 300.0));
        assert_eq!(handle.offset().y, 100.0);
    }

    #[test]
    fn test_set_offset_without_content_clamps_to_zero_floor() {
        let handle = ScrollHandle::new();
        handle.set_offset(Point::new(-10.0, 40.0));
        assert_eq!(handle.offset(), Point::new(0.0, 40.0));
    }

    #[test]
    fn test_content_smaller_than_viewport_never_scrolls() {
        let handle = ScrollHandle::new();
        handle.update_geometry(bounds(0.0, 0.0, 200.0, 200.0), Size::new(100.0, 100.0));
        assert!(!handle.scroll_by(Point::new(0.0, 5.0)));
        assert_eq!(handle.offset(), Point::ZERO);
        assert!(!handle.overflows_vertically());
    }

    #[test]
    fn test_thumb_drag_scales_by_track_ratio() {
        let drag = ThumbDrag {
            axis: Axis::Vertical,
            start_offset: 0.0,
            start_mouse: 10.0,
            track_length: 200.0,
            thumb_length: 100.0,
            max_scroll: 100.0,
        };
        // 100 of free track maps onto 100 of scroll: 1:1.
        assert_eq!(drag.offset_for(60.0), 50.0);
        assert_eq!(drag.offset_for(500.0), 100.0);
        assert_eq!(drag.offset_for(-500.0), 0.0);
    }

    #[test]
    fn test_drag_to_moves_only_the_dragged_axis() {
        let handle = reported_handle();
        handle.set_offset(Point::new(25.0, 0.0));
        handle.begin_drag(ThumbDrag {
            axis: Axis::Vertical,
            start_offset: 0.0,
            start_mouse: 0.0,
            track_length: 200.0,
            thumb_length: 133.0,
            max_scroll: 100.0,
        });

        assert!(handle.drag_to(Point::new(999.0, 33.5)));
        let offset = handle.offset();
        assert_eq!(offset.x, 25.0);
        assert!(offset.y > 0.0);

        handle.end_drag();
        assert!(!handle.drag_to(Point::new(0.0, 50.0)));
    }
}
