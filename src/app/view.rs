//! Views.
//!
//! A view is an entity that knows how to render itself into an element tree.
//! [`AnyView`] erases the concrete type behind a monomorphized function
//! pointer so windows can hold any root.

use crate::app::entities::{EntityId, Handle};
use crate::app::{App, Ctx};
use crate::element::AnyElement;
use crate::error::Result;
use crate::window::Window;

/// Implemented by entity types that produce an element tree.
pub trait Render: 'static + Sized {
    fn render(&mut self, window: &mut Window, cx: &mut Ctx<Self>) -> AnyElement;
}

/// Type-erased reference to a renderable entity.
#[derive(Clone, Copy)]
pub struct AnyView {
    entity: EntityId,
    render_fn: fn(EntityId, &mut Window, &mut App) -> Result<AnyElement>,
}

impl AnyView {
    pub fn entity_id(&self) -> EntityId {
        self.entity
    }

    /// Run the view's render under an entity update.
    pub(crate) fn render(&self, window: &mut Window, app: &mut App) -> Result<AnyElement> {
        (self.render_fn)(self.entity, window, app)
    }
}

impl<V: Render> From<Handle<V>> for AnyView {
    fn from(handle: Handle<V>) -> Self {
        Self {
            entity: handle.entity_id(),
            render_fn: render_view::<V>,
        }
    }
}

fn render_view<V: Render>(
    entity: EntityId,
    window: &mut Window,
    app: &mut App,
) -> Result<AnyElement> {
    let handle = Handle::<V>::from_raw(entity);
    app.update_entity(&handle, |view, cx| view.render(window, cx))
}
