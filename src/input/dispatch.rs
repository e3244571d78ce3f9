//! Event dispatch over the hit-test tree.
//!
//! Raw platform events arrive between frames and are routed along paths from
//! the most recent frame's hit tree. Pointer events bubble from the deepest
//! node under the cursor toward the root; keyboard events follow the focused
//! element's path when one exists and otherwise fall back to the path under
//! the cursor. Any handler can call [`EventCtx::stop_propagation`] to end
//! the walk early.
//!
//! While a mouse button is held the pressed path captures the pointer:
//! moves and the release route to it even if the cursor has left. A click is
//! synthesized on release only when press and release share the same deepest
//! node.

use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::time::Duration;

use crate::app::{App, Effect};
use crate::input::hit_test::{HandlerSet, HitNodeData};
use crate::input::{
    ActionEvent, ClickEvent, KeyEvent, Keystroke, Modifiers, MouseButton, MouseEvent,
    MouseMoveEvent, PlatformInput, ScrollDelta, ScrollWheelEvent, TextEvent,
};
use crate::types::Point;
use crate::window::focus::{FocusHandle, FocusOp};
use crate::window::scroll::{Axis, ScrollHandle, ThumbDrag};
use crate::window::{KeyBinding, Window};

/// Presses closer together than this, in time and in distance, extend a
/// multi-click streak.
const MULTI_CLICK_INTERVAL: Duration = Duration::from_millis(500);
const MULTI_CLICK_SLOP: f32 = 4.0;

// =============================================================================
// Event context
// =============================================================================

/// Handler-side view of the app and window during event dispatch.
///
/// Derefs to [`App`], so entity reads, updates, and subscriptions work
/// directly on the context. Window state such as focus and size is reached
/// through [`EventCtx::window`].
pub struct EventCtx<'a> {
    window: &'a mut Window,
    app: &'a mut App,
    stopped: bool,
}

impl<'a> EventCtx<'a> {
    pub(crate) fn new(window: &'a mut Window, app: &'a mut App) -> Self {
        Self {
            window,
            app,
            stopped: false,
        }
    }

    /// Stop the bubble walk after the current handler returns.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.stopped
    }

    /// The window the event was dispatched in.
    pub fn window(&mut self) -> &mut Window {
        self.window
    }

    /// Move focus to `handle`. Applies immediately when the handle belongs
    /// to this window, otherwise routes through the effect queue.
    pub fn focus(&mut self, handle: &FocusHandle) {
        if handle.window_id() == self.window.id() {
            self.window.apply_focus_op(FocusOp::Focus(handle.id()));
            let id = self.window.id();
            self.app.mark_dirty(Some(id));
        } else {
            self.app.push_effect(Effect::Focus {
                window: handle.window_id(),
                focus: handle.id(),
            });
        }
    }

    /// Remove `handle` from its window's focus stack.
    pub fn blur(&mut self, handle: &FocusHandle) {
        if handle.window_id() == self.window.id() {
            self.window.apply_focus_op(FocusOp::Blur(handle.id()));
            let id = self.window.id();
            self.app.mark_dirty(Some(id));
        } else {
            self.app.push_effect(Effect::Blur {
                window: handle.window_id(),
                focus: handle.id(),
            });
        }
    }
}

impl Deref for EventCtx<'_> {
    type Target = App;

    fn deref(&self) -> &App {
        self.app
    }
}

impl DerefMut for EventCtx<'_> {
    fn deref_mut(&mut self) -> &mut App {
        self.app
    }
}

// =============================================================================
// Input state
// =============================================================================

/// Pointer and keyboard state carried across events.
#[derive(Default)]
pub(crate) struct InputState {
    /// Last known cursor position in window coordinates.
    pub cursor: Point,
    /// Path that most recently received hover enter notifications.
    pub hovered: Vec<HitNodeData>,
    /// Capture state while a mouse button is held.
    pub pressed: Option<PressedState>,
    /// Trailing press used to extend multi-click streaks.
    pub last_click: Option<ClickStreak>,
    /// Scroll region whose thumb is being dragged.
    pub dragging: Option<ScrollHandle>,
    /// True between composition start and end; raw keys are suppressed.
    pub composing: bool,
}

pub(crate) struct PressedState {
    pub path: Vec<HitNodeData>,
    pub button: MouseButton,
}

#[derive(Clone, Copy)]
pub(crate) struct ClickStreak {
    pub at: Duration,
    pub position: Point,
    pub button: MouseButton,
    pub count: u32,
}

// =============================================================================
// Dispatch
// =============================================================================

/// Route one platform event through the window.
pub(crate) fn dispatch_event(window: &mut Window, app: &mut App, event: PlatformInput) {
    match event {
        PlatformInput::MouseDown {
            position,
            button,
            modifiers,
        } => mouse_down(window, app, position, button, modifiers),
        PlatformInput::MouseUp {
            position,
            button,
            modifiers,
        } => mouse_up(window, app, position, button, modifiers),
        PlatformInput::MouseMove {
            position,
            modifiers,
        } => mouse_move(window, app, position, modifiers),
        PlatformInput::ScrollWheel {
            position,
            delta,
            modifiers,
        } => scroll_wheel(window, app, position, delta, modifiers),
        PlatformInput::KeyDown { keystroke } => key_down(window, app, keystroke),
        PlatformInput::KeyUp { keystroke } => key_up(window, app, keystroke),
        PlatformInput::Text { text } => text_input(window, app, text, false),
        PlatformInput::CompositionStart => window.input.composing = true,
        PlatformInput::CompositionUpdate { text } => text_input(window, app, text, true),
        PlatformInput::CompositionEnd { text } => {
            window.input.composing = false;
            text_input(window, app, text, false);
        }
        PlatformInput::Resized { size } => {
            window.resize(size);
            let id = window.id();
            app.mark_dirty(Some(id));
        }
    }
}

fn mouse_down(
    window: &mut Window,
    app: &mut App,
    position: Point,
    button: MouseButton,
    modifiers: Modifiers,
) {
    window.input.cursor = position;
    let path = window.hit_path(position);

    // A press on a scrollbar thumb starts a drag instead of dispatching.
    if button == MouseButton::Left {
        if let Some((scroll, drag)) = thumb_under(&path, position) {
            scroll.begin_drag(drag);
            window.input.dragging = Some(scroll);
            return;
        }
    }

    let now = app.platform().now();
    let count = next_click_count(window.input.last_click, now, position, button);
    window.input.last_click = Some(ClickStreak {
        at: now,
        position,
        button,
        count,
    });

    // Nodes that opted into focus-on-press focus now; everyone else waits
    // for the synthesized click.
    let press_focus = path
        .iter()
        .rev()
        .find(|node| node.focus_on_press)
        .and_then(|node| node.focus);
    if let Some(focus) = press_focus {
        window.apply_focus_op(FocusOp::Focus(focus));
        let id = window.id();
        app.mark_dirty(Some(id));
    }

    window.input.pressed = Some(PressedState {
        path: path.clone(),
        button,
    });

    let event = MouseEvent {
        position,
        button,
        modifiers,
        click_count: count,
    };
    let mut cx = EventCtx::new(window, app);
    bubble(&path, &event, |handlers| handlers.mouse_down.as_slice(), &mut cx);
}

fn mouse_move(window: &mut Window, app: &mut App, position: Point, modifiers: Modifiers) {
    window.input.cursor = position;

    // An active thumb drag swallows moves entirely.
    if let Some(scroll) = window.input.dragging.clone() {
        if scroll.drag_to(position) {
            let id = window.id();
            app.mark_dirty(Some(id));
        }
        return;
    }

    let captured = window.input.pressed.as_ref().map(|p| p.path.clone());
    let path = match captured {
        // While a button is down, moves keep routing to the pressed path.
        Some(path) => path,
        None => {
            let path = window.hit_path(position);
            update_hover(window, app, &path);
            let target = window.tooltip_target_at(position);
            let now = app.platform().now();
            if window.note_tooltip_hover(target, now) {
                let id = window.id();
                app.mark_dirty(Some(id));
            }
            path
        }
    };

    let event = MouseMoveEvent {
        position,
        modifiers,
    };
    let mut cx = EventCtx::new(window, app);
    bubble(&path, &event, |handlers| handlers.mouse_move.as_slice(), &mut cx);
}

fn mouse_up(
    window: &mut Window,
    app: &mut App,
    position: Point,
    button: MouseButton,
    modifiers: Modifiers,
) {
    window.input.cursor = position;

    if let Some(scroll) = window.input.dragging.take() {
        scroll.end_drag();
        let id = window.id();
        app.mark_dirty(Some(id));
        return;
    }

    let pressed = if window
        .input
        .pressed
        .as_ref()
        .is_some_and(|p| p.button == button)
    {
        window.input.pressed.take()
    } else {
        None
    };

    let geometric = window.hit_path(position);
    let route = pressed
        .as_ref()
        .map_or_else(|| geometric.clone(), |p| p.path.clone());
    let count = window.input.last_click.map_or(1, |streak| streak.count);

    let event = MouseEvent {
        position,
        button,
        modifiers,
        click_count: count,
    };
    {
        let mut cx = EventCtx::new(window, app);
        bubble(&route, &event, |handlers| handlers.mouse_up.as_slice(), &mut cx);
    }

    // A click happens only when press and release land on the same deepest
    // node.
    if let Some(pressed) = &pressed {
        let down = pressed.path.last().map(|node| node.element);
        let up = geometric.last().map(|node| node.element);
        if down.is_some() && down == up {
            if let Some(node) = geometric.iter().rev().find(|node| node.focus.is_some()) {
                if !node.focus_on_press {
                    if let Some(focus) = node.focus {
                        window.apply_focus_op(FocusOp::Focus(focus));
                        let id = window.id();
                        app.mark_dirty(Some(id));
                    }
                }
            }
            let event = ClickEvent {
                position,
                button,
                modifiers,
                click_count: count,
            };
            let mut cx = EventCtx::new(window, app);
            bubble(&geometric, &event, |handlers| handlers.click.as_slice(), &mut cx);
        }
    }

    if pressed.is_some() {
        // Capture is over; rebuild hover from the path under the cursor.
        let path = window.hit_path(position);
        update_hover(window, app, &path);
    }
}

fn scroll_wheel(
    window: &mut Window,
    app: &mut App,
    position: Point,
    delta: ScrollDelta,
    modifiers: Modifiers,
) {
    window.input.cursor = position;
    let path = window.hit_path(position);

    let line_height = app.text_system().line_height(app.theme().font_size);
    let pixels = delta.to_pixels(line_height, app.config().wheel_lines);

    let event = ScrollWheelEvent {
        position,
        delta: pixels,
        modifiers,
    };
    let stopped = {
        let mut cx = EventCtx::new(window, app);
        bubble(&path, &event, |handlers| handlers.scroll_wheel.as_slice(), &mut cx)
    };
    if stopped {
        return;
    }

    // Deepest scroll region first; one pinned at its limit passes the wheel
    // outward.
    for node in path.iter().rev() {
        if let Some(scroll) = &node.scroll {
            if scroll.scroll_by(pixels) {
                let id = window.id();
                app.mark_dirty(Some(id));
                return;
            }
        }
    }
}

fn key_down(window: &mut Window, app: &mut App, keystroke: Keystroke) {
    // Raw keys pause while the IME is composing.
    if window.input.composing {
        return;
    }

    let path = key_path(window);

    if let Some(action) = resolve_binding(window.key_bindings(), &keystroke, &path) {
        let event = ActionEvent {
            name: action.clone(),
        };
        let mut handled = false;
        {
            let mut cx = EventCtx::new(window, app);
            'path: for node in path.iter().rev() {
                for (name, handler) in &node.handlers.actions {
                    if *name == action {
                        handler(&event, &mut cx);
                        handled = true;
                        if cx.stopped {
                            break 'path;
                        }
                    }
                }
            }
        }
        // A binding with no handler on this path falls through to raw keys.
        if handled {
            return;
        }
    }

    let event = KeyEvent {
        keystroke: keystroke.clone(),
    };
    let stopped = {
        let mut cx = EventCtx::new(window, app);
        bubble(&path, &event, |handlers| handlers.key_down.as_slice(), &mut cx)
    };
    if stopped {
        return;
    }

    // Unhandled tab traverses the tab stops.
    if keystroke.key == "tab" {
        let moved = if keystroke.modifiers == Modifiers::SHIFT {
            window.focus_prev()
        } else if keystroke.modifiers.is_empty() {
            window.focus_next()
        } else {
            false
        };
        if moved {
            let id = window.id();
            app.mark_dirty(Some(id));
        }
    }
}

fn key_up(window: &mut Window, app: &mut App, keystroke: Keystroke) {
    if window.input.composing {
        return;
    }
    let path = key_path(window);
    let event = KeyEvent { keystroke };
    let mut cx = EventCtx::new(window, app);
    bubble(&path, &event, |handlers| handlers.key_up.as_slice(), &mut cx);
}

fn text_input(window: &mut Window, app: &mut App, text: String, composing: bool) {
    let path = key_path(window);
    let event = TextEvent { text, composing };
    let mut cx = EventCtx::new(window, app);
    bubble(&path, &event, |handlers| handlers.text.as_slice(), &mut cx);
}

// =============================================================================
// Routing helpers
// =============================================================================

/// Walk `path` from deepest to root, firing the selected handler list on
/// each node. Returns true when a handler stopped propagation.
fn bubble<E>(
    path: &[HitNodeData],
    event: &E,
    select: impl Fn(&HandlerSet) -> &[Rc<dyn Fn(&E, &mut EventCtx)>],
    cx: &mut EventCtx,
) -> bool {
    for node in path.iter().rev() {
        for handler in select(&node.handlers) {
            handler(event, cx);
            if cx.stopped {
                return true;
            }
        }
    }
    false
}

/// Diff the hovered path against `path` and fire hover handlers: departed
/// nodes deepest first, entered nodes root first.
fn update_hover(window: &mut Window, app: &mut App, path: &[HitNodeData]) {
    let old = std::mem::take(&mut window.input.hovered);
    let unchanged =
        old.len() == path.len() && old.iter().zip(path).all(|(a, b)| a.element == b.element);
    if unchanged {
        window.input.hovered = old;
        return;
    }

    {
        let mut cx = EventCtx::new(window, app);
        for node in old.iter().rev() {
            if path.iter().all(|n| n.element != node.element) {
                for handler in &node.handlers.hover {
                    handler(false, &mut cx);
                }
            }
        }
        for node in path {
            if old.iter().all(|n| n.element != node.element) {
                for handler in &node.handlers.hover {
                    handler(true, &mut cx);
                }
            }
        }
    }
    window.input.hovered = path.to_vec();
}

/// Keyboard events follow the focused path; with nothing focused they fall
/// back to the path under the cursor.
fn key_path(window: &Window) -> Vec<HitNodeData> {
    if let Some(focus) = window.focused() {
        let path = window.path_to_focus(focus);
        if !path.is_empty() {
            return path;
        }
    }
    window.hit_path(window.input.cursor)
}

/// Pick the binding for `keystroke`, preferring the one whose context names
/// the deepest matching node on the path. Context-free bindings apply
/// everywhere but lose to any contextual match; among equals the most
/// recently bound wins.
fn resolve_binding(
    bindings: &[KeyBinding],
    keystroke: &Keystroke,
    path: &[HitNodeData],
) -> Option<String> {
    let mut best: Option<(usize, &KeyBinding)> = None;
    for binding in bindings {
        if binding.keystroke != *keystroke {
            continue;
        }
        let rank = match &binding.context {
            None => 0,
            Some(context) => {
                match path
                    .iter()
                    .rposition(|node| node.key_context.as_deref() == Some(context.as_str()))
                {
                    Some(depth) => depth + 1,
                    None => continue,
                }
            }
        };
        if best.is_none_or(|(r, _)| rank >= r) {
            best = Some((rank, binding));
        }
    }
    best.map(|(_, binding)| binding.action.clone())
}

fn next_click_count(
    last: Option<ClickStreak>,
    now: Duration,
    position: Point,
    button: MouseButton,
) -> u32 {
    match last {
        Some(streak)
            if streak.button == button
                && now.saturating_sub(streak.at) <= MULTI_CLICK_INTERVAL
                && streak.position.distance(position) <= MULTI_CLICK_SLOP =>
        {
            streak.count + 1
        }
        _ => 1,
    }
}

/// Find the deepest scroll region on `path` whose painted thumb contains
/// `position`, and build the drag for it.
fn thumb_under(path: &[HitNodeData], position: Point) -> Option<(ScrollHandle, ThumbDrag)> {
    for node in path.iter().rev() {
        let Some(scroll) = &node.scroll else { continue };
        if let Some(drag) = thumb_drag_at(scroll, position) {
            return Some((scroll.clone(), drag));
        }
    }
    None
}

fn thumb_drag_at(scroll: &ScrollHandle, position: Point) -> Option<ThumbDrag> {
    let state = scroll.state();
    if let Some(thumb) = state.vertical_thumb {
        if thumb.contains(position) {
            return Some(ThumbDrag {
                axis: Axis::Vertical,
                start_offset: scroll.offset().y,
                start_mouse: position.y,
                track_length: scroll.viewport_bounds().size.height,
                thumb_length: thumb.size.height,
                max_scroll: scroll.max_offset().y,
            });
        }
    }
    if let Some(thumb) = state.horizontal_thumb {
        if thumb.contains(position) {
            return Some(ThumbDrag {
                axis: Axis::Horizontal,
                start_offset: scroll.offset().x,
                start_mouse: position.x,
                track_length: scroll.viewport_bounds().size.width,
                thumb_length: thumb.size.width,
                max_scroll: scroll.max_offset().x,
            });
        }
    }
    None
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::GlobalElementId;
    use crate::types::{bounds, point, size, Bounds};

    fn node(id: u32, context: Option<&str>) -> HitNodeData {
        HitNodeData {
            element: GlobalElementId(id),
            bounds: Bounds::ZERO,
            handlers: HandlerSet::default(),
            focus: None,
            focus_on_press: false,
            scroll: None,
            key_context: context.map(str::to_owned),
        }
    }

    fn binding(keys: &str, action: &str, context: Option<&str>) -> KeyBinding {
        KeyBinding {
            keystroke: Keystroke::parse(keys).unwrap(),
            action: action.to_owned(),
            context: context.map(str::to_owned),
        }
    }

    #[test]
    fn test_contextual_binding_beats_global() {
        let bindings = vec![
            binding("enter", "submit", None),
            binding("enter", "newline", Some("editor")),
        ];
        let keystroke = Keystroke::parse("enter").unwrap();

        let in_editor = vec![node(1, None), node(2, Some("editor"))];
        assert_eq!(
            resolve_binding(&bindings, &keystroke, &in_editor),
            Some("newline".to_owned())
        );

        let outside = vec![node(1, None), node(3, Some("sidebar"))];
        assert_eq!(
            resolve_binding(&bindings, &keystroke, &outside),
            Some("submit".to_owned())
        );
    }

    #[test]
    fn test_deeper_context_wins() {
        let bindings = vec![
            binding("ctrl-k", "pane_action", Some("pane")),
            binding("ctrl-k", "editor_action", Some("editor")),
        ];
        let keystroke = Keystroke::parse("ctrl-k").unwrap();
        let path = vec![node(1, Some("pane")), node(2, Some("editor"))];

        assert_eq!(
            resolve_binding(&bindings, &keystroke, &path),
            Some("editor_action".to_owned())
        );
    }

    #[test]
    fn test_contextual_binding_requires_context_on_path() {
        let bindings = vec![binding("escape", "dismiss", Some("modal"))];
        let keystroke = Keystroke::parse("escape").unwrap();
        let path = vec![node(1, None)];

        assert_eq!(resolve_binding(&bindings, &keystroke, &path), None);
    }

    #[test]
    fn test_later_binding_overrides_at_equal_rank() {
        let bindings = vec![
            binding("ctrl-s", "save", None),
            binding("ctrl-s", "save_all", None),
        ];
        let keystroke = Keystroke::parse("ctrl-s").unwrap();

        assert_eq!(
            resolve_binding(&bindings, &keystroke, &[]),
            Some("save_all".to_owned())
        );
    }

    #[test]
    fn test_click_streak_extends_within_window() {
        let origin = point(100.0, 100.0);
        let first = ClickStreak {
            at: Duration::from_millis(1000),
            position: origin,
            button: MouseButton::Left,
            count: 1,
        };

        // Close in time and space: double click.
        assert_eq!(
            next_click_count(
                Some(first),
                Duration::from_millis(1200),
                point(102.0, 101.0),
                MouseButton::Left,
            ),
            2
        );
        // Too late.
        assert_eq!(
            next_click_count(
                Some(first),
                Duration::from_millis(1600),
                origin,
                MouseButton::Left,
            ),
            1
        );
        // Too far.
        assert_eq!(
            next_click_count(
                Some(first),
                Duration::from_millis(1100),
                point(120.0, 100.0),
                MouseButton::Left,
            ),
            1
        );
        // Different button.
        assert_eq!(
            next_click_count(
                Some(first),
                Duration::from_millis(1100),
                origin,
                MouseButton::Right,
            ),
            1
        );
        assert_eq!(
            next_click_count(None, Duration::ZERO, origin, MouseButton::Left),
            1
        );
    }

    #[test]
    fn test_thumb_under_picks_deepest_region() {
        let outer = ScrollHandle::new();
        outer.update_geometry(bounds(0.0, 0.0, 400.0, 400.0), size(400.0, 1200.0));
        outer.set_thumbs(Some(bounds(392.0, 0.0, 8.0, 133.0)), None);

        let inner = ScrollHandle::new();
        inner.update_geometry(bounds(50.0, 50.0, 200.0, 200.0), size(200.0, 600.0));
        inner.set_thumbs(Some(bounds(242.0, 50.0, 8.0, 66.0)), None);

        let mut outer_node = node(1, None);
        outer_node.scroll = Some(outer.clone());
        let mut inner_node = node(2, None);
        inner_node.scroll = Some(inner.clone());
        let path = vec![outer_node, inner_node];

        // Inside the inner thumb.
        let (hit, drag) = thumb_under(&path, point(245.0, 60.0)).unwrap();
        assert!(hit.ptr_eq(&inner));
        assert_eq!(drag.axis, Axis::Vertical);
        assert_eq!(drag.thumb_length, 66.0);
        assert_eq!(drag.max_scroll, 400.0);

        // Inside the outer thumb only.
        let (hit, drag) = thumb_under(&path, point(395.0, 10.0)).unwrap();
        assert!(hit.ptr_eq(&outer));
        assert_eq!(drag.track_length, 400.0);

        // On neither thumb.
        assert!(thumb_under(&path, point(100.0, 100.0)).is_none());
    }
}
