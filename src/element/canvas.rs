//! Free-form drawing element.
//!
//! Escape hatch for custom painting: a leaf node that hands its solved
//! bounds to user closures instead of interpreting a style. Useful for
//! charts, gauges, and anything else the built-in elements do not cover.

use crate::app::App;
use crate::element::{Element, GlobalElementId, IntoElement};
use crate::error::Result;
use crate::layout::LayoutId;
use crate::style::{Dimension, Style};
use crate::types::Bounds;
use crate::window::Window;

type CanvasFn = Box<dyn FnMut(Bounds, &mut Window, &mut App)>;

/// An element that paints through the given closure.
pub fn canvas(paint: impl FnMut(Bounds, &mut Window, &mut App) + 'static) -> Canvas {
    Canvas {
        style: Style::default(),
        prepaint_fn: None,
        paint_fn: Box::new(paint),
    }
}

pub struct Canvas {
    style: Style,
    prepaint_fn: Option<CanvasFn>,
    paint_fn: CanvasFn,
}

impl Canvas {
    /// Run a closure during prepaint, before anything paints. Hit nodes and
    /// frame metadata registered here land in the right tree position.
    pub fn with_prepaint(mut self, prepaint: impl FnMut(Bounds, &mut Window, &mut App) + 'static) -> Self {
        self.prepaint_fn = Some(Box::new(prepaint));
        self
    }

    pub fn w(mut self, width: impl Into<Dimension>) -> Self {
        self.style.width = width.into();
        self
    }

    pub fn h(mut self, height: impl Into<Dimension>) -> Self {
        self.style.height = height.into();
        self
    }

    pub fn w_full(mut self) -> Self {
        self.style.width = Dimension::Percent(100.0);
        self
    }

    pub fn h_full(mut self) -> Self {
        self.style.height = Dimension::Percent(100.0);
        self
    }

    pub fn grow(mut self) -> Self {
        self.style.flex_grow = 1.0;
        self
    }
}

impl Element for Canvas {
    type RequestState = ();
    type PrepaintState = ();

    fn request_layout(
        &mut self,
        _id: GlobalElementId,
        window: &mut Window,
        _cx: &mut App,
    ) -> Result<(LayoutId, ())> {
        Ok((window.request_layout(&self.style, &[])?, ()))
    }

    fn prepaint(
        &mut self,
        _id: GlobalElementId,
        bounds: Bounds,
        _request: &mut (),
        window: &mut Window,
        cx: &mut App,
    ) -> Result<()> {
        if let Some(prepaint) = &mut self.prepaint_fn {
            prepaint(bounds, window, cx);
        }
        Ok(())
    }

    fn paint(
        &mut self,
        _id: GlobalElementId,
        bounds: Bounds,
        _request: &mut (),
        _prepaint: &mut (),
        window: &mut Window,
        cx: &mut App,
    ) -> Result<()> {
        (self.paint_fn)(bounds, window, cx);
        Ok(())
    }
}

impl IntoElement for Canvas {
    type Element = Canvas;

    fn into_element(self) -> Canvas {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_layout() {
        let element = canvas(|_, _, _| {}).w(80.0).h_full().grow();
        assert_eq!(element.style.width, Dimension::Px(80.0));
        assert_eq!(element.style.height, Dimension::Percent(100.0));
        assert_eq!(element.style.flex_grow, 1.0);
        assert!(element.prepaint_fn.is_none());
    }
}
