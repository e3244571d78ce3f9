//! Hit testing.
//!
//! During prepaint, interactive elements register hit nodes; the finished
//! tree is immutable and consulted by next frame's dispatcher. Children are
//! stored topmost-first (insertion order reversed when a node closes, since
//! later siblings paint on top), and deferred overlays become extra roots
//! ahead of the main tree, higher priority first. A query descends by
//! containment: at each level the first node containing the point wins, and
//! the walk stops when no child contains it.

use std::collections::HashSet;
use std::rc::Rc;

use crate::element::GlobalElementId;
use crate::input::dispatch::EventCtx;
use crate::input::{
    ActionEvent, ClickEvent, KeyEvent, MouseEvent, MouseMoveEvent, ScrollWheelEvent, TextEvent,
};
use crate::types::{Bounds, Point};
use crate::window::focus::FocusId;
use crate::window::scroll::ScrollHandle;

pub(crate) type MouseHandler = Rc<dyn Fn(&MouseEvent, &mut EventCtx)>;
pub(crate) type MouseMoveHandler = Rc<dyn Fn(&MouseMoveEvent, &mut EventCtx)>;
pub(crate) type ClickHandler = Rc<dyn Fn(&ClickEvent, &mut EventCtx)>;
pub(crate) type KeyHandler = Rc<dyn Fn(&KeyEvent, &mut EventCtx)>;
pub(crate) type TextHandler = Rc<dyn Fn(&TextEvent, &mut EventCtx)>;
pub(crate) type ScrollWheelHandler = Rc<dyn Fn(&ScrollWheelEvent, &mut EventCtx)>;
pub(crate) type HoverHandler = Rc<dyn Fn(bool, &mut EventCtx)>;
pub(crate) type ActionHandler = Rc<dyn Fn(&ActionEvent, &mut EventCtx)>;

/// Event handlers attached to one hit node.
#[derive(Default, Clone)]
pub(crate) struct HandlerSet {
    pub mouse_down: Vec<MouseHandler>,
    pub mouse_up: Vec<MouseHandler>,
    pub mouse_move: Vec<MouseMoveHandler>,
    pub click: Vec<ClickHandler>,
    pub key_down: Vec<KeyHandler>,
    pub key_up: Vec<KeyHandler>,
    pub text: Vec<TextHandler>,
    pub scroll_wheel: Vec<ScrollWheelHandler>,
    pub hover: Vec<HoverHandler>,
    /// `(action name, handler)` pairs matched against resolved bindings.
    pub actions: Vec<(String, ActionHandler)>,
}

impl HandlerSet {
    pub fn is_empty(&self) -> bool {
        self.mouse_down.is_empty()
            && self.mouse_up.is_empty()
            && self.mouse_move.is_empty()
            && self.click.is_empty()
            && self.key_down.is_empty()
            && self.key_up.is_empty()
            && self.text.is_empty()
            && self.scroll_wheel.is_empty()
            && self.hover.is_empty()
            && self.actions.is_empty()
    }
}

/// Everything the dispatcher needs from one node, cloneable off the tree.
#[derive(Clone)]
pub(crate) struct HitNodeData {
    pub element: GlobalElementId,
    pub bounds: Bounds,
    pub handlers: HandlerSet,
    pub focus: Option<FocusId>,
    /// Focus on the down event instead of the synthesized click.
    pub focus_on_press: bool,
    pub scroll: Option<ScrollHandle>,
    pub key_context: Option<String>,
}

pub(crate) struct HitTestNode {
    pub data: HitNodeData,
    pub children: Vec<HitTestNode>,
}

// =============================================================================
// Builder
// =============================================================================

/// Which root list a finished top-level node joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HitScope {
    Main,
    Overlay { priority: i32 },
}

pub(crate) struct HitTreeBuilder {
    stack: Vec<HitTestNode>,
    main_roots: Vec<HitTestNode>,
    overlay_roots: Vec<(i32, u32, HitTestNode)>,
    overlay_seq: u32,
    scope: HitScope,
    suppressed: bool,
}

impl HitTreeBuilder {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            main_roots: Vec::new(),
            overlay_roots: Vec::new(),
            overlay_seq: 0,
            scope: HitScope::Main,
            suppressed: false,
        }
    }

    pub fn clear(&mut self) {
        self.stack.clear();
        self.main_roots.clear();
        self.overlay_roots.clear();
        self.overlay_seq = 0;
        self.scope = HitScope::Main;
        self.suppressed = false;
    }

    pub fn set_scope(&mut self, scope: HitScope) {
        self.scope = scope;
    }

    /// While suppressed, node registration is ignored entirely. Tooltips
    /// prepaint under suppression so they never intercept their own hover.
    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    pub fn begin_node(&mut self, data: HitNodeData) {
        if self.suppressed {
            return;
        }
        self.stack.push(HitTestNode {
            data,
            children: Vec::new(),
        });
    }

    pub fn end_node(&mut self) {
        if self.suppressed {
            return;
        }
        let Some(mut node) = self.stack.pop() else {
            log::error!("hit node closed without a matching begin");
            return;
        };
        // Later siblings paint on top; test them first.
        node.children.reverse();
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.attach_root(node),
        }
    }

    fn attach_root(&mut self, node: HitTestNode) {
        match self.scope {
            HitScope::Main => self.main_roots.push(node),
            HitScope::Overlay { priority } => {
                let seq = self.overlay_seq;
                self.overlay_seq += 1;
                self.overlay_roots.push((priority, seq, node));
            }
        }
    }

    /// Seal the frame's tree. Overlay roots come first, highest priority
    /// first; within a priority, the later-painted overlay is tested first.
    pub fn finish(&mut self) -> HitTestTree {
        while let Some(mut node) = self.stack.pop() {
            log::error!("hit node left open at frame end");
            node.children.reverse();
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => self.attach_root(node),
            }
        }

        let mut overlays = std::mem::take(&mut self.overlay_roots);
        overlays.sort_by_key(|(priority, seq, _)| (*priority, *seq));

        let mut roots: Vec<HitTestNode> =
            overlays.into_iter().rev().map(|(_, _, node)| node).collect();
        let mut main = std::mem::take(&mut self.main_roots);
        main.reverse();
        roots.extend(main);

        self.clear();
        HitTestTree { roots }
    }
}

// =============================================================================
// Tree
// =============================================================================

pub(crate) struct HitTestTree {
    roots: Vec<HitTestNode>,
}

impl HitTestTree {
    pub fn empty() -> Self {
        Self { roots: Vec::new() }
    }

    /// Containment-descent path from a root to the deepest node containing
    /// the point, root first. Empty when the point hits nothing.
    pub fn hit_path(&self, point: Point) -> Vec<HitNodeData> {
        let mut path = Vec::new();
        let mut level = &self.roots;
        loop {
            let Some(node) = level.iter().find(|node| node.data.bounds.contains(point)) else {
                break;
            };
            path.push(node.data.clone());
            level = &node.children;
        }
        path
    }

    /// Path from a root to the node carrying the given focus id.
    pub fn path_to_focus(&self, focus: FocusId) -> Vec<HitNodeData> {
        let mut path = Vec::new();
        if !find_focus(&self.roots, focus, &mut path) {
            path.clear();
        }
        path
    }

    /// All focus ids present in the tree, for end-of-frame pruning.
    pub fn collect_focus_ids(&self) -> HashSet<FocusId> {
        let mut ids = HashSet::new();
        collect_focus(&self.roots, &mut ids);
        ids
    }

    pub fn node_count(&self) -> usize {
        fn count(nodes: &[HitTestNode]) -> usize {
            nodes.iter().map(|node| 1 + count(&node.children)).sum()
        }
        count(&self.roots)
    }
}

fn find_focus(nodes: &[HitTestNode], focus: FocusId, path: &mut Vec<HitNodeData>) -> bool {
    for node in nodes {
        path.push(node.data.clone());
        if node.data.focus == Some(focus) {
            return true;
        }
        if find_focus(&node.children, focus, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn collect_focus(nodes: &[HitTestNode], ids: &mut HashSet<FocusId>) {
    for node in nodes {
        if let Some(focus) = node.data.focus {
            ids.insert(focus);
        }
        collect_focus(&node.children, ids);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bounds;

    fn node(id: u32, rect: Bounds) -> HitNodeData {
        HitNodeData {
            element: GlobalElementId(id),
            bounds: rect,
            handlers: HandlerSet::default(),
            focus: None,
            focus_on_press: false,
            scroll: None,
            key_context: None,
        }
    }

    fn path_ids(path: &[HitNodeData]) -> Vec<u32> {
        path.iter().map(|data| data.element.0).collect()
    }

    #[test]
    fn test_later_sibling_wins_overlap() {
        let mut builder = HitTreeBuilder::new();
        builder.begin_node(node(0, bounds(0.0, 0.0, 100.0, 100.0)));
        builder.begin_node(node(1, bounds(10.0, 10.0, 50.0, 50.0)));
        builder.end_node();
        builder.begin_node(node(2, bounds(30.0, 30.0, 50.0, 50.0)));
        builder.end_node();
        builder.end_node();
        let tree = builder.finish();

        // (40, 40) is inside both children; the later sibling paints on top.
        assert_eq!(path_ids(&tree.hit_path(Point::new(40.0, 40.0))), vec![0, 2]);
        // (15, 15) only hits the first child.
        assert_eq!(path_ids(&tree.hit_path(Point::new(15.0, 15.0))), vec![0, 1]);
    }

    #[test]
    fn test_descent_stops_at_containment() {
        let mut builder = HitTreeBuilder::new();
        builder.begin_node(node(0, bounds(0.0, 0.0, 50.0, 50.0)));
        // Child sticks out of its parent; the overhang is unreachable.
        builder.begin_node(node(1, bounds(40.0, 40.0, 50.0, 50.0)));
        builder.end_node();
        builder.end_node();
        let tree = builder.finish();

        assert_eq!(path_ids(&tree.hit_path(Point::new(45.0, 45.0))), vec![0, 1]);
        assert!(tree.hit_path(Point::new(80.0, 80.0)).is_empty());
    }

    #[test]
    fn test_overlay_roots_test_before_main() {
        let mut builder = HitTreeBuilder::new();
        builder.begin_node(node(0, bounds(0.0, 0.0, 200.0, 200.0)));
        builder.end_node();

        builder.set_scope(HitScope::Overlay { priority: 1 });
        builder.begin_node(node(10, bounds(50.0, 50.0, 40.0, 40.0)));
        builder.end_node();

        builder.set_scope(HitScope::Overlay { priority: 5 });
        builder.begin_node(node(20, bounds(50.0, 50.0, 40.0, 40.0)));
        builder.end_node();

        let tree = builder.finish();

        // Inside every root: the highest-priority overlay wins.
        assert_eq!(path_ids(&tree.hit_path(Point::new(60.0, 60.0))), vec![20]);
        // Outside the overlays, the main tree still answers.
        assert_eq!(path_ids(&tree.hit_path(Point::new(5.0, 5.0))), vec![0]);
    }

    #[test]
    fn test_suppressed_registration_is_ignored() {
        let mut builder = HitTreeBuilder::new();
        builder.set_suppressed(true);
        builder.begin_node(node(7, bounds(0.0, 0.0, 100.0, 100.0)));
        builder.end_node();
        builder.set_suppressed(false);
        let tree = builder.finish();

        assert_eq!(tree.node_count(), 0);
        assert!(tree.hit_path(Point::new(10.0, 10.0)).is_empty());
    }

    #[test]
    fn test_focus_collection_and_path() {
        let mut builder = HitTreeBuilder::new();
        let mut root = node(0, bounds(0.0, 0.0, 100.0, 100.0));
        root.focus = Some(FocusId(1));
        builder.begin_node(root);
        let mut child = node(1, bounds(10.0, 10.0, 20.0, 20.0));
        child.focus = Some(FocusId(2));
        builder.begin_node(child);
        builder.end_node();
        builder.end_node();
        let tree = builder.finish();

        let ids = tree.collect_focus_ids();
        assert!(ids.contains(&FocusId(1)));
        assert!(ids.contains(&FocusId(2)));

        assert_eq!(path_ids(&tree.path_to_focus(FocusId(2))), vec![0, 1]);
        assert!(tree.path_to_focus(FocusId(9)).is_empty());
    }
}
