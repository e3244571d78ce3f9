//! Image element.
//!
//! Pixel data lives with the platform; the element only carries the image
//! id and its natural size. Unless overridden, the layout node takes the
//! natural size.

use crate::app::App;
use crate::element::{Element, GlobalElementId, IntoElement};
use crate::error::Result;
use crate::layout::LayoutId;
use crate::scene::Sprite;
use crate::style::{Dimension, Style};
use crate::types::{Bounds, Size};
use crate::window::Window;

/// Handle to an uploaded image: the platform's id plus the natural size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSource {
    pub id: u64,
    pub size: Size,
}

impl ImageSource {
    pub const fn new(id: u64, size: Size) -> Self {
        Self { id, size }
    }

    /// Register an image of the given size with the platform.
    pub fn upload(cx: &App, size: Size) -> Self {
        Self {
            id: cx.platform().register_image(size),
            size,
        }
    }
}

/// An element painting one uploaded image.
pub fn image(source: ImageSource) -> Image {
    Image {
        source,
        style: Style::default(),
    }
}

pub struct Image {
    source: ImageSource,
    style: Style,
}

impl Image {
    pub fn w(mut self, width: impl Into<Dimension>) -> Self {
        self.style.width = width.into();
        self
    }

    pub fn h(mut self, height: impl Into<Dimension>) -> Self {
        self.style.height = height.into();
        self
    }

    pub fn rounded(mut self, radius: f32) -> Self {
        self.style.corner_radius = radius;
        self
    }
}

impl Element for Image {
    type RequestState = ();
    type PrepaintState = ();

    fn request_layout(
        &mut self,
        _id: GlobalElementId,
        window: &mut Window,
        _cx: &mut App,
    ) -> Result<(LayoutId, ())> {
        let mut style = self.style.clone();
        if style.width == Dimension::Auto {
            style.width = Dimension::Px(self.source.size.width);
        }
        if style.height == Dimension::Auto {
            style.height = Dimension::Px(self.source.size.height);
        }
        Ok((window.request_layout(&style, &[])?, ()))
    }

    fn prepaint(
        &mut self,
        _id: GlobalElementId,
        _bounds: Bounds,
        _request: &mut (),
        _window: &mut Window,
        _cx: &mut App,
    ) -> Result<()> {
        Ok(())
    }

    fn paint(
        &mut self,
        _id: GlobalElementId,
        bounds: Bounds,
        _request: &mut (),
        _prepaint: &mut (),
        window: &mut Window,
        _cx: &mut App,
    ) -> Result<()> {
        window.paint_sprite(Sprite {
            bounds,
            image_id: self.source.id,
            corner_radius: self.style.corner_radius,
        });
        Ok(())
    }
}

impl IntoElement for Image {
    type Element = Image;

    fn into_element(self) -> Image {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
