//! Windows and the frame protocol.
//!
//! A [`Window`] owns everything with per-frame or per-window lifetime: the
//! layout engine, the scene being painted, the hit-test tree, focus and tab
//! stops, scroll regions, deferred overlay draws, and the latched input
//! queue. The [`App`](crate::app::App) leases the window out of its slot for
//! the duration of a frame, so window state is never aliased with app state.
//!
//! A frame runs in a fixed order: reset the per-frame registries, render the
//! root view, request layout for the whole tree, solve it, prepaint (which
//! records bounds, hit nodes, tab stops, tooltips, and deferred draws),
//! paint the main band, then run deferred overlays, the tooltip, and the
//! debug overlay through the same three phases into higher bands. The frame
//! seals by building the hit tree for the next dispatch, pruning focus
//! against what actually rendered, sweeping element state, and presenting
//! the sorted scene.

pub(crate) mod focus;
pub(crate) mod scroll;

pub use focus::{FocusHandle, FocusId, TabStop};
pub use scroll::ScrollHandle;

use std::collections::VecDeque;
use std::time::Duration;

use crate::app::{AnyView, App, WindowId};
use crate::element::state::ElementStateArena;
use crate::element::{AnyElement, GlobalElementId, IntoElement, block, label};
use crate::error::{Result, UiError};
use crate::input::dispatch::{InputState, dispatch_event};
use crate::input::hit_test::{HitNodeData, HitScope, HitTestTree, HitTreeBuilder};
use crate::input::{Keystroke, PlatformInput};
use crate::layout::{LayoutEngine, LayoutId, MeasureFn};
use crate::scene::{
    BAND_DEBUG, BAND_MAIN, BAND_OVERLAY, BAND_TOOLTIP, Path, Quad, Scene, Shadow, Sprite, TextRun,
    Underline,
};
use crate::style::Style;
use crate::types::{Bounds, Edges, Point, Rgba, Size};

use focus::{FocusOp, FocusStack, TabStops};

/// Space between a tooltip and the element that anchors it.
const TOOLTIP_GAP: f32 = 4.0;

/// An element whose draw was postponed out of the main pass.
struct DeferredDraw {
    element: AnyElement,
    priority: i32,
}

/// A tooltip registered during prepaint, waiting for a hover.
struct TooltipRequest {
    element: GlobalElementId,
    bounds: Bounds,
    text: String,
}

/// Hover progress toward showing a tooltip.
#[derive(Clone, Copy)]
struct TooltipHover {
    target: GlobalElementId,
    since: Duration,
}

/// A keystroke bound to a named action, optionally scoped to a key context.
pub(crate) struct KeyBinding {
    pub(crate) keystroke: Keystroke,
    pub(crate) action: String,
    pub(crate) context: Option<String>,
}

// =============================================================================
// Window
// =============================================================================

pub struct Window {
    id: WindowId,
    size: Size,
    root: Option<AnyView>,
    layout: LayoutEngine,
    scene: Scene,
    element_offset_stack: Vec<Point>,
    next_element_id: u32,
    element_states: ElementStateArena,
    hit_builder: HitTreeBuilder,
    hit_tree: HitTestTree,
    focus: FocusStack,
    tab_stops: TabStops,
    deferred: Vec<DeferredDraw>,
    tooltips: Vec<TooltipRequest>,
    last_tooltips: Vec<TooltipRequest>,
    tooltip_hover: Option<TooltipHover>,
    bindings: Vec<KeyBinding>,
    pending_input: VecDeque<PlatformInput>,
    last_frame_at: Option<Duration>,
    pub(crate) input: InputState,
}

impl Window {
    pub(crate) fn new(id: WindowId, size: Size) -> Self {
        Self {
            id,
            size,
            root: None,
            layout: LayoutEngine::new(),
            scene: Scene::new(),
            element_offset_stack: Vec::new(),
            next_element_id: 0,
            element_states: ElementStateArena::new(),
            hit_builder: HitTreeBuilder::new(),
            hit_tree: HitTestTree::empty(),
            focus: FocusStack::new(),
            tab_stops: TabStops::new(),
            deferred: Vec::new(),
            tooltips: Vec::new(),
            last_tooltips: Vec::new(),
            tooltip_hover: None,
            bindings: Vec::new(),
            pending_input: VecDeque::new(),
            last_frame_at: None,
            input: InputState::default(),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn viewport(&self) -> Bounds {
        Bounds::new(Point::ZERO, self.size)
    }

    /// Replace the view rendered at the window root.
    pub fn set_root(&mut self, root: AnyView) {
        self.root = Some(root);
    }

    pub(crate) fn resize(&mut self, size: Size) {
        if self.size != size {
            self.size = size;
        }
    }

    // ===== Input =====

    /// Latch an input event for the next frame.
    pub fn push_input(&mut self, event: PlatformInput) {
        self.pending_input.push_back(event);
    }

    /// Drain the latched input queue through the dispatcher. Runs against
    /// the hit tree built by the previous frame.
    pub(crate) fn dispatch_pending_input(&mut self, app: &mut App) {
        while let Some(event) = self.pending_input.pop_front() {
            dispatch_event(self, app, event);
        }
    }

    pub(crate) fn hit_path(&self, point: Point) -> Vec<HitNodeData> {
        self.hit_tree.hit_path(point)
    }

    pub(crate) fn path_to_focus(&self, focus: FocusId) -> Vec<HitNodeData> {
        self.hit_tree.path_to_focus(focus)
    }

    // ===== Key bindings =====

    /// Bind a keystroke like `"ctrl-s"` to a named action, optionally
    /// scoped to a key context declared by an element subtree.
    pub fn bind_key(
        &mut self,
        keys: &str,
        action: impl Into<String>,
        context: Option<&str>,
    ) -> Result<()> {
        let Some(keystroke) = Keystroke::parse(keys) else {
            return Err(UiError::lifecycle(format!(
                "unrecognized keystroke {keys:?}"
            )));
        };
        self.bindings.push(KeyBinding {
            keystroke,
            action: action.into(),
            context: context.map(str::to_owned),
        });
        Ok(())
    }

    pub(crate) fn key_bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    // ===== Focus =====

    /// Allocate a focus target owned by this window.
    pub fn new_focus_handle(&mut self) -> FocusHandle {
        self.focus.allocate(self.id)
    }

    pub fn focus(&mut self, handle: &FocusHandle) {
        if handle.window_id() != self.id {
            log::warn!("focus handle belongs to another window; ignoring");
            return;
        }
        self.focus.focus(handle.id());
    }

    pub fn blur(&mut self, handle: &FocusHandle) {
        if handle.window_id() != self.id {
            log::warn!("focus handle belongs to another window; ignoring");
            return;
        }
        self.focus.blur(handle.id());
    }

    pub fn is_focused(&self, handle: &FocusHandle) -> bool {
        self.focus.is_focused(handle.id())
    }

    /// The focus id on top of the stack, if any.
    pub fn focused(&self) -> Option<FocusId> {
        self.focus.current()
    }

    /// Move focus to the next tab stop in group-major order, wrapping at
    /// the end. Returns false when the frame registered no tab stops.
    pub fn focus_next(&mut self) -> bool {
        match self.tab_stops.next(self.focus.current()) {
            Some(id) => {
                self.focus.focus(id);
                true
            }
            None => false,
        }
    }

    pub fn focus_prev(&mut self) -> bool {
        match self.tab_stops.prev(self.focus.current()) {
            Some(id) => {
                self.focus.focus(id);
                true
            }
            None => false,
        }
    }

    /// Snapshot the focus stack into the single save slot. A modal saves
    /// before taking focus and restores when it closes.
    pub fn save_focus(&mut self) {
        self.focus.save();
    }

    pub fn restore_focus(&mut self) {
        self.focus.restore();
    }

    pub(crate) fn apply_focus_op(&mut self, op: FocusOp) {
        self.focus.apply(op);
    }

    // ===== Frame registries =====

    pub(crate) fn allocate_element_id(&mut self) -> GlobalElementId {
        let id = GlobalElementId(self.next_element_id);
        self.next_element_id += 1;
        id
    }

    /// Run `f` with typed state persisted for `id` across frames. The state
    /// is taken out for the duration of the callback and stored back after.
    pub fn with_element_state<S: 'static, R>(
        &mut self,
        id: GlobalElementId,
        f: impl FnOnce(Option<S>, &mut Window) -> (S, R),
    ) -> R {
        let state = self.element_states.take::<S>(id);
        let (state, result) = f(state, self);
        self.element_states.store(id, state);
        result
    }

    pub(crate) fn begin_hit_node(&mut self, data: HitNodeData) {
        self.hit_builder.begin_node(data);
    }

    pub(crate) fn end_hit_node(&mut self) {
        self.hit_builder.end_node();
    }

    pub(crate) fn register_tab_stop(
        &mut self,
        focus: FocusId,
        bounds: Bounds,
        group: u32,
        index: u32,
    ) {
        self.tab_stops.insert(TabStop {
            focus,
            bounds,
            group,
            index,
        });
    }

    pub(crate) fn register_tooltip(&mut self, element: GlobalElementId, bounds: Bounds, text: String) {
        self.tooltips.push(TooltipRequest {
            element,
            bounds,
            text,
        });
    }

    /// Postpone an element's draw until after the main pass. Higher
    /// priorities paint later and sit higher in the scene.
    pub fn defer_draw(&mut self, element: AnyElement, priority: i32) {
        self.deferred.push(DeferredDraw { element, priority });
    }

    /// The tooltip anchor under `point` from the last sealed frame,
    /// topmost registration first.
    pub(crate) fn tooltip_target_at(&self, point: Point) -> Option<GlobalElementId> {
        self.last_tooltips
            .iter()
            .rev()
            .find(|tip| tip.bounds.contains(point))
            .map(|tip| tip.element)
    }

    /// Track hover progress toward showing a tooltip. Returns true when the
    /// hover target changed.
    pub(crate) fn note_tooltip_hover(
        &mut self,
        target: Option<GlobalElementId>,
        now: Duration,
    ) -> bool {
        match (self.tooltip_hover, target) {
            (Some(hover), Some(target)) if hover.target == target => false,
            (None, None) => false,
            (_, Some(target)) => {
                self.tooltip_hover = Some(TooltipHover { target, since: now });
                true
            }
            (_, None) => {
                self.tooltip_hover = None;
                true
            }
        }
    }

    // ===== Layout =====

    pub fn request_layout(&mut self, style: &Style, children: &[LayoutId]) -> Result<LayoutId> {
        self.layout.request_layout(style, children)
    }

    pub fn request_measured_layout(
        &mut self,
        style: &Style,
        measure: MeasureFn,
    ) -> Result<LayoutId> {
        self.layout.request_measured_layout(style, measure)
    }

    /// Solved bounds for a node, shifted by the current element offset.
    pub fn layout_bounds(&mut self, id: LayoutId) -> Result<Bounds> {
        let bounds = self.layout.layout_bounds(id)?;
        Ok(bounds.translate(self.element_offset()))
    }

    /// Solver-reported content size of a node, padding included.
    pub fn content_size_of(&self, id: LayoutId) -> Result<Size> {
        self.layout.content_size(id)
    }

    pub fn element_offset(&self) -> Point {
        self.element_offset_stack
            .last()
            .copied()
            .unwrap_or(Point::ZERO)
    }

    /// Shift the bounds of everything prepainted inside `f` by `offset`.
    /// Offsets nest by accumulating.
    pub fn with_element_offset<R>(
        &mut self,
        offset: Point,
        f: impl FnOnce(&mut Window) -> R,
    ) -> R {
        if offset == Point::ZERO {
            return f(self);
        }
        let combined = self.element_offset() + offset;
        self.element_offset_stack.push(combined);
        let result = f(self);
        self.element_offset_stack.pop();
        result
    }

    // ===== Painting =====

    /// Clip everything painted inside `f` to `bounds`. Clips nest by
    /// intersection.
    pub fn with_clip<R>(&mut self, bounds: Bounds, f: impl FnOnce(&mut Window) -> R) -> R {
        self.scene.push_clip(bounds);
        let result = f(self);
        self.scene.pop_clip();
        result
    }

    pub fn paint_quad(&mut self, quad: Quad) {
        self.scene.push_quad(quad);
    }

    pub fn paint_shadow(&mut self, shadow: Shadow) {
        self.scene.push_shadow(shadow);
    }

    pub fn paint_text_run(&mut self, run: TextRun) {
        self.scene.push_text(run);
    }

    pub fn paint_sprite(&mut self, sprite: Sprite) {
        self.scene.push_sprite(sprite);
    }

    pub fn paint_path(&mut self, path: Path) {
        self.scene.push_path(path);
    }

    pub fn paint_underline(&mut self, underline: Underline) {
        self.scene.push_underline(underline);
    }

    // ===== Frame protocol =====

    /// Produce one frame. Inner element failures were already contained
    /// during the phases; an error here means the frame itself could not be
    /// produced (no root, solver failure, root view leased).
    pub(crate) fn draw(&mut self, app: &mut App) -> Result<()> {
        let Some(root_view) = self.root else {
            return Err(UiError::lifecycle("draw on a window with no root view"));
        };

        // Reset everything with frame lifetime.
        self.next_element_id = 0;
        self.element_states.begin_frame();
        self.layout.clear();
        self.scene.clear();
        self.hit_builder.clear();
        self.tab_stops.clear();
        self.tooltips.clear();
        self.deferred.clear();

        let size = self.size;

        // Three phases over the main tree.
        let mut root = root_view.render(self, app)?;
        let root_layout = root.request_layout(self, app)?;
        self.layout.compute_layout(root_layout, size)?;
        root.prepaint(self, app);
        self.scene.set_band(BAND_MAIN);
        root.paint(self, app);

        self.run_deferred(app)?;
        self.run_tooltip(app)?;
        if app.config().debug_overlay {
            self.paint_debug_overlay(app);
        }

        // Seal the frame.
        self.hit_tree = self.hit_builder.finish();
        let live = self.hit_tree.collect_focus_ids();
        if self.focus.prune(&live) {
            app.mark_dirty(Some(self.id));
        }
        self.last_tooltips = std::mem::take(&mut self.tooltips);
        self.element_states.sweep();
        self.scene.finish();
        app.platform().present(size, &self.scene);
        self.last_frame_at = Some(app.platform().now());
        Ok(())
    }

    /// Drain deferred draws in ascending priority, each through its own
    /// three phases against the full window, into successive overlay bands.
    /// An overlay may defer further draws; those join the next round.
    fn run_deferred(&mut self, app: &mut App) -> Result<()> {
        let size = self.size;
        let mut band = BAND_OVERLAY;
        while !self.deferred.is_empty() {
            let mut batch = std::mem::take(&mut self.deferred);
            batch.sort_by_key(|draw| draw.priority);
            for mut draw in batch {
                let layout_id = draw.element.request_layout(self, app)?;
                self.layout.compute_layout(layout_id, size)?;
                self.hit_builder.set_scope(HitScope::Overlay {
                    priority: draw.priority,
                });
                draw.element.prepaint(self, app);
                self.hit_builder.set_scope(HitScope::Main);
                self.scene.set_band(band);
                draw.element.paint(self, app);
                band += 1;
            }
        }
        self.scene.set_band(BAND_MAIN);
        Ok(())
    }

    /// Show the armed tooltip once its delay has elapsed. The tooltip
    /// prepaints with hit registration suppressed so it never occludes the
    /// element it describes.
    fn run_tooltip(&mut self, app: &mut App) -> Result<()> {
        let Some(hover) = self.tooltip_hover else {
            return Ok(());
        };
        let Some((anchor, text)) = self
            .tooltips
            .iter()
            .find(|tip| tip.element == hover.target)
            .map(|tip| (tip.bounds, tip.text.clone()))
        else {
            // The hovered element stopped offering a tooltip.
            self.tooltip_hover = None;
            return Ok(());
        };
        let delay = Duration::from_millis(app.config().tooltip_delay_ms);
        if app.platform().now().saturating_sub(hover.since) < delay {
            return Ok(());
        }

        let background = app.theme().tooltip_background;
        let color = app.theme().tooltip_text;
        let mut tip = block()
            .bg(background)
            .rounded(3.0)
            .p(4.0)
            .child(label(text).color(color).no_wrap())
            .into_any();

        let size = self.size;
        let layout_id = tip.request_layout(self, app)?;
        self.layout.compute_layout(layout_id, size)?;
        let tip_size = self.layout.layout_bounds(layout_id)?.size;
        let origin = tooltip_origin(anchor, tip_size, size);

        self.hit_builder.set_suppressed(true);
        tip.prepaint_at(origin, self, app);
        self.hit_builder.set_suppressed(false);

        self.scene.set_band(BAND_TOOLTIP);
        tip.paint(self, app);
        self.scene.set_band(BAND_MAIN);
        Ok(())
    }

    /// Frame statistics in the top-right corner, painted into the topmost
    /// band without touching the element tree.
    fn paint_debug_overlay(&mut self, app: &App) {
        let background = app.theme().debug_background;
        let color = app.theme().debug_text;
        let font_size = app.theme().font_size;
        let text_system = app.text_system().clone();
        let line_height = text_system.line_height(font_size);

        let now = app.platform().now();
        let frame_time = now.saturating_sub(self.last_frame_at.unwrap_or(now));
        let lines = [
            format!("frame: {:.1} ms", frame_time.as_secs_f64() * 1000.0),
            format!("elements: {}", self.next_element_id),
            format!("layout nodes: {}", self.layout.node_count()),
            format!("primitives: {}", self.scene.len()),
            // The hit tree is rebuilt after paint, so this count lags a frame.
            format!("hit nodes: {}", self.hit_tree.node_count()),
            format!("element states: {}", self.element_states.live_count()),
        ];
        let width = lines
            .iter()
            .map(|line| text_system.measure(line, font_size).width)
            .fold(0.0, f32::max);

        const PAD: f32 = 6.0;
        let panel = Size::new(
            width + PAD * 2.0,
            line_height * lines.len() as f32 + PAD * 2.0,
        );
        let origin = Point::new((self.size.width - panel.width - 4.0).max(0.0), 4.0);

        self.scene.set_band(BAND_DEBUG);
        self.scene.push_quad(Quad {
            bounds: Bounds::new(origin, panel),
            background,
            border_color: Rgba::TRANSPARENT,
            border_widths: Edges::ZERO,
            corner_radius: 2.0,
        });
        for (index, line) in lines.iter().enumerate() {
            self.scene.push_text(TextRun {
                origin: Point::new(origin.x + PAD, origin.y + PAD + index as f32 * line_height),
                text: line.clone(),
                color,
                font_size,
            });
        }
        self.scene.set_band(BAND_MAIN);
    }
}

/// Place a tooltip under its anchor, pulled back inside the window, flipped
/// above the anchor when there is no room below.
fn tooltip_origin(anchor: Bounds, tip: Size, window: Size) -> Point {
    let mut origin = Point::new(anchor.origin.x, anchor.bottom() + TOOLTIP_GAP);
    if origin.x + tip.width > window.width {
        origin.x = (window.width - tip.width).max(0.0);
    }
    if origin.y + tip.height > window.height {
        origin.y = (anchor.origin.y - TOOLTIP_GAP - tip.height).max(0.0);
    }
    origin
}

// =============================================================================
// Tests
// =============================================================================
