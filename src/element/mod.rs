//! Element protocol.
//!
//! Elements are short-lived: a view's render builds a fresh tree every frame
//! and the tree dies with the frame. Each element passes through three phases
//! in order. `request_layout` builds solver nodes bottom-up, `prepaint` walks
//! top-down with solved bounds registering hitboxes and frame metadata, and
//! `paint` pushes primitives. [`AnyElement`] erases the concrete type and
//! enforces the phase order; a failing element is contained to its subtree
//! (logged, replaced by a zero-size placeholder) instead of poisoning the
//! frame.

mod block;
mod canvas;
mod deferred;
mod image;
mod label;
pub(crate) mod state;

pub use block::{block, Block};
pub use canvas::{canvas, Canvas};
pub use deferred::{deferred, Deferred};
pub use image::{image, Image, ImageSource};
pub use label::{label, Label};

use crate::app::App;
use crate::error::Result;
use crate::layout::LayoutId;
use crate::style::Style;
use crate::types::{Bounds, Point};
use crate::window::Window;

/// Frame-scoped element identity: the element's position in the preorder
/// traversal of the tree. Stable across frames as long as the tree shape
/// before the element does not change; the element state arena additionally
/// fingerprints stored state to catch collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalElementId(pub u32);

/// One node in the element tree.
pub trait Element: 'static {
    /// State carried from the layout request into later phases.
    type RequestState;
    /// State produced by prepaint and consumed by paint.
    type PrepaintState;

    /// Create this element's layout node, children first.
    fn request_layout(
        &mut self,
        id: GlobalElementId,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<(LayoutId, Self::RequestState)>;

    /// Runs top-down once bounds are solved. Registers hitboxes, tab stops,
    /// tooltips, scroll geometry, and deferred draws.
    fn prepaint(
        &mut self,
        id: GlobalElementId,
        bounds: Bounds,
        request: &mut Self::RequestState,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<Self::PrepaintState>;

    /// Push primitives for this element and its children.
    fn paint(
        &mut self,
        id: GlobalElementId,
        bounds: Bounds,
        request: &mut Self::RequestState,
        prepaint: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<()>;
}

/// Anything that can become an element. Every element type implements this
/// for itself; string types become labels.
pub trait IntoElement {
    type Element: Element;

    fn into_element(self) -> Self::Element;

    fn into_any(self) -> AnyElement
    where
        Self: Sized,
    {
        AnyElement::new(self.into_element())
    }
}

impl IntoElement for &str {
    type Element = Label;

    fn into_element(self) -> Label {
        label(self)
    }
}

impl IntoElement for String {
    type Element = Label;

    fn into_element(self) -> Label {
        label(self)
    }
}

// =============================================================================
// AnyElement
// =============================================================================

enum Phase<E: Element> {
    Start,
    Requested {
        layout_id: LayoutId,
        request: E::RequestState,
    },
    Prepainted {
        bounds: Bounds,
        request: E::RequestState,
        prepaint: E::PrepaintState,
    },
    Painted,
    Failed,
}

struct Erased<E: Element> {
    element: E,
    id: Option<GlobalElementId>,
    phase: Phase<E>,
}

trait ErasedElement {
    fn request_layout(&mut self, window: &mut Window, cx: &mut App) -> Result<LayoutId>;
    fn prepaint(&mut self, window: &mut Window, cx: &mut App);
    fn paint(&mut self, window: &mut Window, cx: &mut App);
    fn bounds(&self) -> Option<Bounds>;
    fn failed(&self) -> bool;
}

impl<E: Element> ErasedElement for Erased<E> {
    fn request_layout(&mut self, window: &mut Window, cx: &mut App) -> Result<LayoutId> {
        let id = window.allocate_element_id();
        self.id = Some(id);
        match self.element.request_layout(id, window, cx) {
            Ok((layout_id, request)) => {
                self.phase = Phase::Requested { layout_id, request };
                Ok(layout_id)
            }
            Err(err) => {
                log::error!("element {:?} failed to request layout: {err}", id);
                self.phase = Phase::Failed;
                // The subtree is gone, but the parent still needs a node to
                // lay out the remaining siblings.
                window.request_layout(&Style::deferred_placeholder(), &[])
            }
        }
    }

    fn prepaint(&mut self, window: &mut Window, cx: &mut App) {
        let id = match self.id {
            Some(id) => id,
            None => {
                log::error!("prepaint before request_layout");
                self.phase = Phase::Failed;
                return;
            }
        };
        match std::mem::replace(&mut self.phase, Phase::Failed) {
            Phase::Requested {
                layout_id,
                mut request,
            } => {
                let bounds = match window.layout_bounds(layout_id) {
                    Ok(bounds) => bounds,
                    Err(err) => {
                        log::error!("element {:?} lost its layout node: {err}", id);
                        return;
                    }
                };
                match self.element.prepaint(id, bounds, &mut request, window, cx) {
                    Ok(prepaint) => {
                        self.phase = Phase::Prepainted {
                            bounds,
                            request,
                            prepaint,
                        };
                    }
                    Err(err) => {
                        log::error!("element {:?} failed to prepaint: {err}", id);
                    }
                }
            }
            Phase::Failed => {}
            _ => log::error!("element {:?} prepainted out of order", id),
        }
    }

    fn paint(&mut self, window: &mut Window, cx: &mut App) {
        let Some(id) = self.id else {
            return;
        };
        match std::mem::replace(&mut self.phase, Phase::Failed) {
            Phase::Prepainted {
                bounds,
                mut request,
                mut prepaint,
            } => {
                match self
                    .element
                    .paint(id, bounds, &mut request, &mut prepaint, window, cx)
                {
                    Ok(()) => self.phase = Phase::Painted,
                    Err(err) => {
                        log::error!("element {:?} failed to paint: {err}", id);
                    }
                }
            }
            Phase::Failed => {}
            _ => log::error!("element {:?} painted out of order", id),
        }
    }

    fn bounds(&self) -> Option<Bounds> {
        match &self.phase {
            Phase::Prepainted { bounds, .. } => Some(*bounds),
            _ => None,
        }
    }

    fn failed(&self) -> bool {
        matches!(self.phase, Phase::Failed)
    }
}

/// A type-erased element plus its phase state.
pub struct AnyElement {
    inner: Box<dyn ErasedElement>,
}

impl AnyElement {
    pub fn new<E: Element>(element: E) -> Self {
        Self {
            inner: Box::new(Erased {
                element,
                id: None,
                phase: Phase::Start,
            }),
        }
    }

    /// Assign this element its frame id and build its layout node. Inner
    /// failures are contained: the error is logged and a zero-size
    /// placeholder node is returned in place of the subtree.
    pub fn request_layout(&mut self, window: &mut Window, cx: &mut App) -> Result<LayoutId> {
        self.inner.request_layout(window, cx)
    }

    /// Prepaint with solver bounds, offset by the window's current element
    /// offset. No-op for failed subtrees.
    pub fn prepaint(&mut self, window: &mut Window, cx: &mut App) {
        self.inner.prepaint(window, cx);
    }

    /// Prepaint with the element's origin pinned to `origin`. Used for
    /// elements positioned outside normal flow (deferred overlays,
    /// tooltips).
    pub fn prepaint_at(&mut self, origin: Point, window: &mut Window, cx: &mut App) {
        window.with_element_offset(origin, |window| self.inner.prepaint(window, cx));
    }

    /// Paint the element at its prepainted bounds. No-op for failed
    /// subtrees.
    pub fn paint(&mut self, window: &mut Window, cx: &mut App) {
        self.inner.paint(window, cx);
    }

    /// Absolute bounds recorded at prepaint.
    pub fn bounds(&self) -> Option<Bounds> {
        self.inner.bounds()
    }

    pub fn failed(&self) -> bool {
        self.inner.failed()
    }
}

/// An `AnyElement` can sit anywhere a typed element can. The inner erasure
/// allocates its own frame id and tracks its own phase, so the delegating
/// impl ignores the outer one.
impl Element for AnyElement {
    type RequestState = ();
    type PrepaintState = ();

    fn request_layout(
        &mut self,
        _id: GlobalElementId,
        window: &mut Window,
        cx: &mut App,
    ) -> Result<(LayoutId, ())> {
        Ok((self.inner.request_layout(window, cx)?, ()))
    }

    fn prepaint(
        &mut self,
        _id: GlobalElementId,
        _bounds: Bounds,
        _request: &mut (),
        window: &mut Window,
        cx: &mut App,
    ) -> Result<()> {
        self.inner.prepaint(window, cx);
        Ok(())
    }

    fn paint(
        &mut self,
        _id: GlobalElementId,
        _bounds: Bounds,
        _request: &mut (),
        _prepaint: &mut (),
        window: &mut Window,
        cx: &mut App,
    ) -> Result<()> {
        self.inner.paint(window, cx);
        Ok(())
    }
}

impl IntoElement for AnyElement {
    type Element = AnyElement;

    fn into_element(self) -> AnyElement {
        self
    }

    fn into_any(self) -> AnyElement {
        self
    }
}
