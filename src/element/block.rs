//! Container element.
//!
//! [`Block`] is the workhorse: a styled flex container that can hold
//! children, react to input, claim focus, scroll, and announce a tooltip.
//! Everything is builder-style; an inert block costs nothing at dispatch
//! time because it registers no hit node.

use smallvec::SmallVec;

use crate::app::App;
use crate::element::{AnyElement, Element, GlobalElementId, IntoElement};
use crate::error::Result;
use crate::input::hit_test::{HandlerSet, HitNodeData};
use crate::input::{
    ActionEvent, ClickEvent, EventCtx, KeyEvent, MouseEvent, MouseMoveEvent, ScrollWheelEvent,
    TextEvent,
};
use crate::layout::LayoutId;
use crate::scene::{Quad, Shadow};
use crate::style::{
    AlignItems, BoxShadow, Dimension, Display, FlexDirection, FlexWrap, JustifyContent, Overflow,
    Position, Style,
};
use crate::types::{Bounds, Edges, Point, Rgba, Size};
use crate::window::focus::FocusHandle;
use crate::window::scroll::ScrollHandle;
use crate::window::Window;

const SCROLLBAR_THICKNESS: f32 = 8.0;
const SCROLLBAR_MIN_THUMB: f32 = 20.0;

/// A new, empty container.
pub fn block() -> Block {
    Block {
        style: Style::default(),
        children: SmallVec::new(),
        handlers: HandlerSet::default(),
        focus: None,
        focus_on_press: false,
        tab_stop: None,
        tooltip: None,
        scroll: None,
        key_context: None,
    }
}

pub struct Block {
    style: Style,
    children: SmallVec<[AnyElement; 2]>,
    handlers: HandlerSet,
    focus: Option<FocusHandle>,
    focus_on_press: bool,
    tab_stop: Option<(u32, u32)>,
    tooltip: Option<String>,
    scroll: Option<ScrollHandle>,
    key_context: Option<String>,
}

impl Block {
    // ===== Children =====

    pub fn child(mut self, child: impl IntoElement) -> Self {
        self.children.push(child.into_any());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = impl IntoElement>) -> Self {
        self.children
            .extend(children.into_iter().map(IntoElement::into_any));
        self
    }

    // ===== Sizing =====

    pub fn w(mut self, width: impl Into<Dimension>) -> Self {
        self.style.width = width.into();
        self
    }

    pub fn h(mut self, height: impl Into<Dimension>) -> Self {
        self.style.height = height.into();
        self
    }

    pub fn size(self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.w(width).h(height)
    }

    pub fn w_full(mut self) -> Self {
        self.style.width = Dimension::Percent(100.0);
        self
    }

    pub fn h_full(mut self) -> Self {
        self.style.height = Dimension::Percent(100.0);
        self
    }

    pub fn min_w(mut self, width: impl Into<Dimension>) -> Self {
        self.style.min_width = width.into();
        self
    }

    pub fn min_h(mut self, height: impl Into<Dimension>) -> Self {
        self.style.min_height = height.into();
        self
    }

    pub fn max_w(mut self, width: impl Into<Dimension>) -> Self {
        self.style.max_width = width.into();
        self
    }

    pub fn max_h(mut self, height: impl Into<Dimension>) -> Self {
        self.style.max_height = height.into();
        self
    }

    // ===== Flex =====

    pub fn flex_row(mut self) -> Self {
        self.style.flex_direction = FlexDirection::Row;
        self
    }

    pub fn flex_col(mut self) -> Self {
        self.style.flex_direction = FlexDirection::Column;
        self
    }

    pub fn flex_wrap(mut self) -> Self {
        self.style.flex_wrap = FlexWrap::Wrap;
        self
    }

    pub fn flex_grow(mut self, grow: f32) -> Self {
        self.style.flex_grow = grow;
        self
    }

    /// Grow to fill remaining space.
    pub fn grow(self) -> Self {
        self.flex_grow(1.0)
    }

    pub fn flex_shrink(mut self, shrink: f32) -> Self {
        self.style.flex_shrink = shrink;
        self
    }

    pub fn justify(mut self, justify: JustifyContent) -> Self {
        self.style.justify_content = justify;
        self
    }

    pub fn justify_center(self) -> Self {
        self.justify(JustifyContent::Center)
    }

    pub fn items(mut self, align: AlignItems) -> Self {
        self.style.align_items = Some(align);
        self
    }

    pub fn items_center(self) -> Self {
        self.items(AlignItems::Center)
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.style.gap = Size::new(gap, gap);
        self
    }

    // ===== Box model =====

    pub fn p(mut self, padding: f32) -> Self {
        self.style.padding = Edges::all(padding);
        self
    }

    pub fn px(mut self, padding: f32) -> Self {
        self.style.padding.left = padding;
        self.style.padding.right = padding;
        self
    }

    pub fn py(mut self, padding: f32) -> Self {
        self.style.padding.top = padding;
        self.style.padding.bottom = padding;
        self
    }

    pub fn m(mut self, margin: f32) -> Self {
        self.style.margin = Edges::all(margin);
        self
    }

    // ===== Position =====

    pub fn absolute(mut self) -> Self {
        self.style.position = Position::Absolute;
        self
    }

    pub fn top(mut self, value: impl Into<Dimension>) -> Self {
        self.style.inset.top = value.into();
        self
    }

    pub fn right(mut self, value: impl Into<Dimension>) -> Self {
        self.style.inset.right = value.into();
        self
    }

    pub fn bottom(mut self, value: impl Into<Dimension>) -> Self {
        self.style.inset.bottom = value.into();
        self
    }

    pub fn left(mut self, value: impl Into<Dimension>) -> Self {
        self.style.inset.left = value.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.style.display = Display::Hidden;
        self
    }

    // ===== Paint =====

    pub fn bg(mut self, color: Rgba) -> Self {
        self.style.background = Some(color);
        self
    }

    pub fn border(mut self, width: f32, color: Rgba) -> Self {
        self.style.border_widths = Edges::all(width);
        self.style.border_color = Some(color);
        self
    }

    pub fn rounded(mut self, radius: f32) -> Self {
        self.style.corner_radius = radius;
        self
    }

    pub fn shadow(mut self, color: Rgba, offset: Point, blur_radius: f32) -> Self {
        self.style.shadow = Some(BoxShadow {
            color,
            offset,
            blur_radius,
        });
        self
    }

    // ===== Overflow =====

    pub fn overflow_hidden(mut self) -> Self {
        self.style.overflow = Overflow::Hidden;
        self
    }

    /// Clip and scroll children by the handle's offset. The handle receives
    /// viewport and content geometry during prepaint.
    pub fn overflow_scroll(mut self, scroll: &ScrollHandle) -> Self {
        self.style.overflow = Overflow::Scroll;
        self.scroll = Some(scroll.clone());
        self
    }

    // ===== Interactivity =====

    pub fn on_mouse_down(mut self, handler: impl Fn(&MouseEvent, &mut EventCtx) + 'static) -> Self {
        self.handlers.mouse_down.push(std::rc::Rc::new(handler));
        self
    }

    pub fn on_mouse_up(mut self, handler: impl Fn(&MouseEvent, &mut EventCtx) + 'static) -> Self {
        self.handlers.mouse_up.push(std::rc::Rc::new(handler));
        self
    }

    pub fn on_mouse_move(
        mut self,
        handler: impl Fn(&MouseMoveEvent, &mut EventCtx) + 'static,
    ) -> Self {
        self.handlers.mouse_move.push(std::rc::Rc::new(handler));
        self
    }

    pub fn on_click(mut self, handler: impl Fn(&ClickEvent, &mut EventCtx) + 'static) -> Self {
        self.handlers.click.push(std::rc::Rc::new(handler));
        self
    }

    pub fn on_key_down(mut self, handler: impl Fn(&KeyEvent, &mut EventCtx) + 'static) -> Self {
        self.handlers.key_down.push(std::rc::Rc::new(handler));
        self
    }

    pub fn on_key_up(mut self, handler: impl Fn(&KeyEvent, &mut EventCtx) + 'static) -> Self {
        self.handlers.key_up.push(std::rc::Rc::new(handler));
        self
    }

    pub fn on_text(mut self, handler: impl Fn(&TextEvent, &mut EventCtx) + 'static) -> Self {
        self.handlers.text.push(std::rc::Rc::new(handler));
        self
    }

    /// Observe wheel input before the scroll containers consume it. Stopping
    /// propagation here prevents the scroll.
    pub fn on_scroll_wheel(
        mut self,
        handler: impl Fn(&ScrollWheelEvent, &mut EventCtx) + 'static,
    ) -> Self {
        self.handlers.scroll_wheel.push(std::rc::Rc::new(handler));
        self
    }

    /// Called with `true` when the pointer enters and `false` when it
    /// leaves.
    pub fn on_hover(mut self, handler: impl Fn(bool, &mut EventCtx) + 'static) -> Self {
        self.handlers.hover.push(std::rc::Rc::new(handler));
        self
    }

    /// Handle a named action resolved from a key binding.
    pub fn on_action(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&ActionEvent, &mut EventCtx) + 'static,
    ) -> Self {
        self.handlers
            .actions
            .push((name.into(), std::rc::Rc::new(handler)));
        self
    }

    /// Make this block the hit-test owner of a focus target.
    pub fn track_focus(mut self, focus: &FocusHandle) -> Self {
        self.focus = Some(*focus);
        self
    }

    /// Take focus on the down event instead of waiting for the click.
    pub fn focus_on_press(mut self) -> Self {
        self.focus_on_press = true;
        self
    }

    /// Join the keyboard traversal order. Requires [`Block::track_focus`].
    pub fn tab_stop(mut self, group: u32, index: u32) -> Self {
        self.tab_stop = Some((group, index));
        self
    }

    pub fn tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip = Some(text.into());
        self
    }

    /// Name the key-binding context this subtree provides.
    pub fn key_context(mut self, context: impl Into<String>) -> Self {
        self.key_context = Some(context.into());
        self
    }

    fn is_interactive(&self) -> bool {
        !self.handlers.is_empty()
            || self.focus.is_some()
            || self.scroll.is_some()
            || self.tooltip.is_some()
            || self.key_context.is_some()
    }
}

pub struct BlockRequest {
    layout_id: LayoutId,
}

impl Element for Block {
    type RequestState = BlockRequest;
    type PrepaintState = ();

    fn request_layout(
        &mut self,
        _id: GlobalElementId,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<(LayoutId, BlockRequest)> {
        let mut child_ids: SmallVec<[LayoutId; 8]> = SmallVec::new();
        for child in &mut self.children {
            child_ids.push(child.request_layout(window, cx)?);
        }
        let layout_id = window.request_layout(&self.style, &child_ids)?;
        Ok((layout_id, BlockRequest { layout_id }))
    }

    fn prepaint(
        &mut self,
        id: GlobalElementId,
        bounds: Bounds,
        request: &mut BlockRequest,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<()> {
        if let Some(scroll) = &self.scroll {
            let content = window.content_size_of(request.layout_id)?;
            scroll.update_geometry(bounds, content);
        }

        let interactive = self.is_interactive();
        if interactive {
            window.begin_hit_node(HitNodeData {
                element: id,
                bounds,
                handlers: std::mem::take(&mut self.handlers),
                focus: self.focus.as_ref().map(FocusHandle::id),
                focus_on_press: self.focus_on_press,
                scroll: self.scroll.clone(),
                key_context: self.key_context.clone(),
            });
        }

        if let Some((group, index)) = self.tab_stop {
            match &self.focus {
                Some(focus) => window.register_tab_stop(focus.id(), bounds, group, index),
                None => log::debug!("tab stop on {:?} without a focus handle", id),
            }
        }
        if let Some(text) = &self.tooltip {
            window.register_tooltip(id, bounds, text.clone());
        }

        let scroll_offset = self
            .scroll
            .as_ref()
            .map(|scroll| scroll.offset())
            .unwrap_or(Point::ZERO);
        window.with_element_offset(-scroll_offset, |window| {
            for child in &mut self.children {
                child.prepaint(window, cx);
            }
        });

        if interactive {
            window.end_hit_node();
        }
        Ok(())
    }

    fn paint(
        &mut self,
        _id: GlobalElementId,
        bounds: Bounds,
        _request: &mut BlockRequest,
        _prepaint: &mut (),
        window: &mut Window,
        cx: &mut App,
    ) -> Result<()> {
        if self.style.display == Display::Hidden {
            return Ok(());
        }

        if let Some(shadow) = self.style.shadow {
            window.paint_shadow(Shadow {
                bounds: bounds.translate(shadow.offset),
                color: shadow.color,
                corner_radius: self.style.corner_radius,
                blur_radius: shadow.blur_radius,
            });
        }

        if self.style.background.is_some() || self.style.border_color.is_some() {
            window.paint_quad(Quad {
                bounds,
                background: self.style.background.unwrap_or(Rgba::TRANSPARENT),
                border_color: self.style.border_color.unwrap_or(Rgba::TRANSPARENT),
                border_widths: self.style.border_widths,
                corner_radius: self.style.corner_radius,
            });
        }

        if self.style.overflow.clips() {
            window.with_clip(bounds, |window| {
                for child in &mut self.children {
                    child.paint(window, cx);
                }
            });
        } else {
            for child in &mut self.children {
                child.paint(window, cx);
            }
        }

        if let Some(scroll) = &self.scroll {
            paint_scrollbars(scroll, bounds, window, cx);
        }
        Ok(())
    }
}

impl IntoElement for Block {
    type Element = Block;

    fn into_element(self) -> Block {
        self
    }
}

/// Paint overlay scrollbars along the viewport's trailing edges and record
/// the thumb geometry for drag pickup.
fn paint_scrollbars(scroll: &ScrollHandle, bounds: Bounds, window: &mut Window, cx: &mut App) {
    let thumb_color = cx.theme().scrollbar_thumb;
    let track_color = cx.theme().scrollbar_track;
    let Some(content) = scroll.content_size() else {
        return;
    };
    let offset = scroll.offset();
    let max_offset = scroll.max_offset();

    let mut vertical_thumb = None;
    if max_offset.y > 0.0 {
        let track = Bounds {
            origin: Point::new(bounds.right() - SCROLLBAR_THICKNESS, bounds.origin.y),
            size: Size::new(SCROLLBAR_THICKNESS, bounds.size.height),
        };
        let thumb_length = (bounds.size.height / content.height * track.size.height)
            .max(SCROLLBAR_MIN_THUMB)
            .min(track.size.height);
        let free_track = track.size.height - thumb_length;
        let thumb_offset = if max_offset.y > 0.0 {
            offset.y / max_offset.y * free_track
        } else {
            0.0
        };
        let thumb = Bounds {
            origin: Point::new(track.origin.x, track.origin.y + thumb_offset),
            size: Size::new(SCROLLBAR_THICKNESS, thumb_length),
        };
        if !track_color.is_transparent() {
            window.paint_quad(Quad {
                bounds: track,
                background: track_color,
                border_color: Rgba::TRANSPARENT,
                border_widths: Edges::ZERO,
                corner_radius: 0.0,
            });
        }
        window.paint_quad(Quad {
            bounds: thumb,
            background: thumb_color,
            border_color: Rgba::TRANSPARENT,
            border_widths: Edges::ZERO,
            corner_radius: SCROLLBAR_THICKNESS / 2.0,
        });
        vertical_thumb = Some(thumb);
    }

    let mut horizontal_thumb = None;
    if max_offset.x > 0.0 {
        let track = Bounds {
            origin: Point::new(bounds.origin.x, bounds.bottom() - SCROLLBAR_THICKNESS),
            size: Size::new(bounds.size.width, SCROLLBAR_THICKNESS),
        };
        let thumb_length = (bounds.size.width / content.width * track.size.width)
            .max(SCROLLBAR_MIN_THUMB)
            .min(track.size.width);
        let free_track = track.size.width - thumb_length;
        let thumb_offset = if max_offset.x > 0.0 {
            offset.x / max_offset.x * free_track
        } else {
            0.0
        };
        let thumb = Bounds {
            origin: Point::new(track.origin.x + thumb_offset, track.origin.y),
            size: Size::new(thumb_length, SCROLLBAR_THICKNESS),
        };
        if !track_color.is_transparent() {
            window.paint_quad(Quad {
                bounds: track,
                background: track_color,
                border_color: Rgba::TRANSPARENT,
                border_widths: Edges::ZERO,
                corner_radius: 0.0,
            });
        }
        window.paint_quad(Quad {
            bounds: thumb,
            background: thumb_color,
            border_color: Rgba::TRANSPARENT,
            border_widths: Edges::ZERO,
            corner_radius: SCROLLBAR_THICKNESS / 2.0,
        });
        horizontal_thumb = Some(thumb);
    }

    scroll.set_thumbs(vertical_thumb, horizontal_thumb);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_style() {
        let element = block()
            .w(120.0)
            .h(Dimension::Percent(50.0))
            .bg(Rgba::RED)
            .border(2.0, Rgba::WHITE)
            .rounded(4.0)
            .p(8.0)
            .gap(4.0)
            .flex_col()
            .grow();

        assert_eq!(element.style.width, Dimension::Px(120.0));
        assert_eq!(element.style.height, Dimension::Percent(50.0));
        assert_eq!(element.style.background, Some(Rgba::RED));
        assert_eq!(element.style.border_widths, Edges::all(2.0));
        assert_eq!(element.style.corner_radius, 4.0);
        assert_eq!(element.style.padding, Edges::all(8.0));
        assert_eq!(element.style.gap, Size::new(4.0, 4.0));
        assert_eq!(element.style.flex_direction, FlexDirection::Column);
        assert_eq!(element.style.flex_grow, 1.0);
    }

    #[test]
    fn test_inert_block_registers_nothing() {
        let plain = block().bg(Rgba::BLUE).child("hi");
        assert!(!plain.is_interactive());

        let hoverable = block().on_hover(|_, _| {});
        assert!(hoverable.is_interactive());

        let scrollable = block().overflow_scroll(&ScrollHandle::new());
        assert!(scrollable.is_interactive());
        assert_eq!(scrollable.style.overflow, Overflow::Scroll);
    }

    #[test]
    fn test_children_accumulate() {
        let element = block().child("a").children(["b", "c"]).child(block());
        assert_eq!(element.children.len(), 4);
    }
}
