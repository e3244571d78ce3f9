//! Flexbox layout engine.
//!
//! A thin wrapper around a [`taffy::TaffyTree`] that hands out [`LayoutId`]s
//! during the layout-request phase and absolute window bounds after
//! [`LayoutEngine::compute_layout`]. The tree is rebuilt from scratch every
//! frame; nothing in here survives a call to [`LayoutEngine::clear`].

use std::collections::HashMap;

use smallvec::SmallVec;
use taffy::TaffyTree;

use crate::error::{Result, UiError};
use crate::style::Style;
use crate::types::{Bounds, Point, Size};

/// Available space per axis handed to measure callbacks, straight from the
/// solver.
pub use taffy::AvailableSpace;

/// Identifier of one node in the frame's layout tree. Valid only until the
/// next [`LayoutEngine::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutId(pub(crate) taffy::NodeId);

/// Measure callback for leaf nodes whose size depends on content (text,
/// images). Receives the known dimensions and the available space per axis,
/// returns the content size.
pub type MeasureFn =
    Box<dyn FnMut(taffy::Size<Option<f32>>, taffy::Size<AvailableSpace>) -> Size>;

/// Per-frame layout solver.
pub struct LayoutEngine {
    tree: TaffyTree<MeasureFn>,
    absolute_bounds: HashMap<LayoutId, Bounds>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            tree: TaffyTree::new(),
            absolute_bounds: HashMap::default(),
        }
    }

    /// Create a layout node with the given style and children.
    pub fn request_layout(&mut self, style: &Style, children: &[LayoutId]) -> Result<LayoutId> {
        let taffy_style = style.to_taffy();
        let node = if children.is_empty() {
            self.tree.new_leaf(taffy_style).map_err(solver_error)?
        } else {
            let child_nodes: SmallVec<[taffy::NodeId; 8]> =
                children.iter().map(|id| id.0).collect();
            self.tree
                .new_with_children(taffy_style, &child_nodes)
                .map_err(solver_error)?
        };
        Ok(LayoutId(node))
    }

    /// Create a leaf whose size is determined by a measure callback.
    pub fn request_measured_layout(&mut self, style: &Style, measure: MeasureFn) -> Result<LayoutId> {
        let node = self
            .tree
            .new_leaf_with_context(style.to_taffy(), measure)
            .map_err(solver_error)?;
        Ok(LayoutId(node))
    }

    /// Solve the tree rooted at `root` within the given available size.
    /// Invalidates any cached absolute bounds.
    pub fn compute_layout(&mut self, root: LayoutId, available: Size) -> Result<()> {
        self.absolute_bounds.clear();
        self.tree
            .compute_layout_with_measure(
                root.0,
                taffy::Size {
                    width: AvailableSpace::Definite(available.width),
                    height: AvailableSpace::Definite(available.height),
                },
                |known, avail, _node, context, _style| {
                    if let (Some(width), Some(height)) = (known.width, known.height) {
                        return taffy::Size { width, height };
                    }
                    let Some(measure) = context else {
                        return taffy::Size::ZERO;
                    };
                    let measured = measure(known, avail);
                    taffy::Size {
                        width: known.width.unwrap_or(measured.width),
                        height: known.height.unwrap_or(measured.height),
                    }
                },
            )
            .map_err(solver_error)
    }

    /// Absolute bounds of a node in window coordinates, walking up through
    /// parents and caching every hop.
    pub fn layout_bounds(&mut self, id: LayoutId) -> Result<Bounds> {
        if let Some(bounds) = self.absolute_bounds.get(&id) {
            return Ok(*bounds);
        }

        let layout = self.tree.layout(id.0).map_err(solver_error)?;
        let mut bounds = Bounds {
            origin: Point::new(layout.location.x, layout.location.y),
            size: Size {
                width: layout.size.width,
                height: layout.size.height,
            },
        };

        if let Some(parent) = self.tree.parent(id.0) {
            let parent_bounds = self.layout_bounds(LayoutId(parent))?;
            bounds.origin = bounds.origin + parent_bounds.origin;
        }

        self.absolute_bounds.insert(id, bounds);
        Ok(bounds)
    }

    /// Content size of a node as reported by the solver, which can exceed the
    /// node's own size when children overflow it.
    pub fn content_size(&self, id: LayoutId) -> Result<Size> {
        let layout = self.tree.layout(id.0).map_err(solver_error)?;
        Ok(Size {
            width: layout.content_size.width,
            height: layout.content_size.height,
        })
    }

    /// Number of live nodes, for diagnostics.
    pub fn node_count(&self) -> usize {
        self.tree.total_node_count()
    }

    /// Drop every node and cached bound. Called at the start of each frame.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.absolute_bounds.clear();
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn solver_error(err: taffy::TaffyError) -> UiError {
    UiError::lifecycle(format!("layout solver error: {err}"))
}

// =============================================================================
// Tests
// =============================================================================
