//! Text element.
//!
//! A [`Label`] is a measured leaf: its layout node carries a measure
//! callback so the solver can size it from content, wrapping against the
//! width it is actually given. The final line breaks are recomputed at
//! prepaint from the solved bounds and painted as one text run per line.

use taffy::AvailableSpace;

use crate::app::App;
use crate::element::{Element, GlobalElementId, IntoElement};
use crate::error::Result;
use crate::layout::{LayoutId, MeasureFn};
use crate::scene::TextRun;
use crate::style::Style;
use crate::text::TextLayout;
use crate::types::{Bounds, Point, Rgba};
use crate::window::Window;

/// A piece of themed text.
pub fn label(text: impl Into<String>) -> Label {
    Label {
        text: text.into(),
        color: None,
        font_size: None,
        wrap: true,
    }
}

pub struct Label {
    text: String,
    color: Option<Rgba>,
    font_size: Option<f32>,
    wrap: bool,
}

impl Label {
    /// Override the theme's text color.
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    /// Override the theme's font size.
    pub fn text_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Keep the text on its authored lines even when width-constrained.
    pub fn no_wrap(mut self) -> Self {
        self.wrap = false;
        self
    }

    fn resolved_font_size(&self, cx: &App) -> f32 {
        self.font_size.unwrap_or(cx.theme().font_size)
    }
}

/// Frame-to-frame cache of the broken lines, keyed by everything that feeds
/// the layout.
struct LayoutCache {
    text: String,
    font_size: f32,
    wrap_width: Option<f32>,
    layout: TextLayout,
}

impl Element for Label {
    type RequestState = ();
    type PrepaintState = TextLayout;

    fn request_layout(
        &mut self,
        _id: GlobalElementId,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<(LayoutId, ())> {
        let text = self.text.clone();
        let font_size = self.resolved_font_size(cx);
        let wrap = self.wrap;
        let text_system = cx.text_system().clone();

        let measure: MeasureFn = Box::new(move |known, available| {
            if !wrap {
                return text_system.measure(&text, font_size);
            }
            let wrap_width = match known.width {
                Some(width) => Some(width),
                None => match available.width {
                    AvailableSpace::Definite(width) => Some(width),
                    AvailableSpace::MaxContent => None,
                    // Min-content width is the widest unbreakable word.
                    AvailableSpace::MinContent => {
                        let longest = text
                            .split_whitespace()
                            .map(|word| text_system.measure(word, font_size).width)
                            .fold(0.0, f32::max);
                        return text_system.layout(&text, font_size, Some(longest)).size;
                    }
                },
            };
            text_system.layout(&text, font_size, wrap_width).size
        });

        let layout_id = window.request_measured_layout(&Style::default(), measure)?;
        Ok((layout_id, ()))
    }

    fn prepaint(
        &mut self,
        id: GlobalElementId,
        bounds: Bounds,
        _request: &mut (),
        window: &mut Window,
        cx: &mut App,
    ) -> Result<TextLayout> {
        let font_size = self.resolved_font_size(cx);
        let wrap_width = self.wrap.then_some(bounds.size.width);
        let text_system = cx.text_system().clone();

        // Line breaking is the expensive part; reuse last frame's result
        // while the inputs hold still.
        let layout = window.with_element_state(id, |cache: Option<LayoutCache>, _| {
            if let Some(cache) = cache {
                if cache.text == self.text
                    && cache.font_size == font_size
                    && cache.wrap_width == wrap_width
                {
                    let layout = cache.layout.clone();
                    return (cache, layout);
                }
            }
            let layout = text_system.layout(&self.text, font_size, wrap_width);
            let cache = LayoutCache {
                text: self.text.clone(),
                font_size,
                wrap_width,
                layout: layout.clone(),
            };
            (cache, layout)
        });
        Ok(layout)
    }

    fn paint(
        &mut self,
        _id: GlobalElementId,
        bounds: Bounds,
        _request: &mut (),
        layout: &mut TextLayout,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<()> {
        let font_size = self.resolved_font_size(cx);
        let color = self.color.unwrap_or(cx.theme().text);
        let line_height = cx.text_system().line_height(font_size);

        for (index, line) in layout.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            window.paint_text_run(TextRun {
                origin: Point::new(
                    bounds.origin.x,
                    bounds.origin.y + index as f32 * line_height,
                ),
                text: line.clone(),
                color,
                font_size,
            });
        }
        Ok(())
    }
}

impl IntoElement for Label {
    type Element = Label;

    fn into_element(self) -> Label {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
