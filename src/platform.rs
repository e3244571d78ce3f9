//! Platform backend.
//!
//! The runtime talks to the outside world through [`Platform`]: a clock,
//! a clipboard, image registration, and scene presentation. The in-memory
//! implementation captures presented frames and lets callers steer the
//! clock, which is what the demos and every timing-sensitive test run on.
//! Actual GPU submission lives behind the same trait in a real backend.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use crate::scene::{Primitive, Scene};
use crate::types::{Bounds, Size};

/// Host services the runtime needs but does not own.
pub trait Platform {
    fn name(&self) -> &'static str;

    /// Monotonic time since the platform started. All runtime timing (click
    /// intervals, tooltip delays) goes through this clock.
    fn now(&self) -> Duration;

    /// Track an image upload; the returned id is what sprite primitives
    /// reference.
    fn register_image(&self, size: Size) -> u64;

    /// Hand a finished frame to the compositor.
    fn present(&self, viewport: Size, scene: &Scene);

    /// Ask for another frame to be scheduled.
    fn request_frame(&self);

    /// Current clipboard contents, if any.
    fn clipboard_text(&self) -> Option<String>;

    /// Replace the clipboard contents.
    fn set_clipboard_text(&self, text: String);
}

// =============================================================================
// Test platform
// =============================================================================

/// One presented frame, kept for inspection.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub viewport: Size,
    pub commands: Vec<(Option<Bounds>, Primitive)>,
}

impl CapturedFrame {
    /// Primitives only, in draw order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.commands.iter().map(|(_, primitive)| primitive)
    }
}

/// In-memory platform: no compositor, no vsync, a clock that only moves when
/// told to.
pub struct TestPlatform {
    clock: Cell<Duration>,
    next_image_id: Cell<u64>,
    image_sizes: RefCell<Vec<Size>>,
    frames: RefCell<Vec<CapturedFrame>>,
    frame_requests: Cell<usize>,
    clipboard: RefCell<Option<String>>,
}

impl TestPlatform {
    pub fn new() -> Self {
        Self {
            clock: Cell::new(Duration::ZERO),
            next_image_id: Cell::new(1),
            image_sizes: RefCell::new(Vec::new()),
            frames: RefCell::new(Vec::new()),
            frame_requests: Cell::new(0),
            clipboard: RefCell::new(None),
        }
    }

    /// Move the clock forward.
    pub fn advance_clock(&self, by: Duration) {
        self.clock.set(self.clock.get() + by);
    }

    /// The most recently presented frame, if any.
    pub fn last_frame(&self) -> Option<CapturedFrame> {
        self.frames.borrow().last().cloned()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn frame_requests(&self) -> usize {
        self.frame_requests.get()
    }

    /// Size recorded for a registered image id.
    pub fn image_size(&self, id: u64) -> Option<Size> {
        let index = (id as usize).checked_sub(1)?;
        self.image_sizes.borrow().get(index).copied()
    }
}

impl Default for TestPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for TestPlatform {
    fn name(&self) -> &'static str {
        "test"
    }

    fn now(&self) -> Duration {
        self.clock.get()
    }

    fn register_image(&self, size: Size) -> u64 {
        let id = self.next_image_id.get();
        self.next_image_id.set(id + 1);
        self.image_sizes.borrow_mut().push(size);
        id
    }

    fn present(&self, viewport: Size, scene: &Scene) {
        let commands = scene
            .masked_primitives()
            .map(|(mask, primitive)| (mask, primitive.clone()))
            .collect();
        self.frames.borrow_mut().push(CapturedFrame { viewport, commands });
    }

    fn request_frame(&self) {
        self.frame_requests.set(self.frame_requests.get() + 1);
    }

    fn clipboard_text(&self) -> Option<String> {
        self.clipboard.borrow().clone()
    }

    fn set_clipboard_text(&self, text: String) {
        *self.clipboard.borrow_mut() = Some(text);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Quad;
    use crate::types::{bounds, Edges, Rgba};

    #[test]
    fn test_clock_starts_at_zero_and_advances() {
        let platform = TestPlatform::new();
        assert_eq!(platform.now(), Duration::ZERO);
        platform.advance_clock(Duration::from_millis(250));
        platform.advance_clock(Duration::from_millis(250));
        assert_eq!(platform.now(), Duration::from_millis(500));
    }

    #[test]
    fn test_present_captures_primitives() {
        let platform = TestPlatform::new();
        let mut scene = Scene::new();
        scene.push_quad(Quad {
            bounds: bounds(0.0, 0.0, 10.0, 10.0),
            background: Rgba::BLUE,
            border_color: Rgba::TRANSPARENT,
            border_widths: Edges::ZERO,
            corner_radius: 0.0,
        });
        scene.finish();

        platform.present(Size::new(800.0, 600.0), &scene);

        let frame = platform.last_frame().unwrap();
        assert_eq!(frame.viewport, Size::new(800.0, 600.0));
        assert_eq!(frame.primitives().count(), 1);
    }

    #[test]
    fn test_image_ids_are_sequential_and_sized() {
        let platform = TestPlatform::new();
        let a = platform.register_image(Size::new(32.0, 32.0));
        let b = platform.register_image(Size::new(64.0, 16.0));
        assert_ne!(a, b);
        assert_eq!(platform.image_size(a), Some(Size::new(32.0, 32.0)));
        assert_eq!(platform.image_size(b), Some(Size::new(64.0, 16.0)));
        assert_eq!(platform.image_size(999), None);
    }

    #[test]
    fn test_clipboard_round_trips() {
        let platform = TestPlatform::new();
        assert_eq!(platform.clipboard_text(), None);
        platform.set_clipboard_text("copied".into());
        assert_eq!(platform.clipboard_text(), Some("copied".into()));
    }
}
