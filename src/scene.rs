//! Paint output.
//!
//! Elements paint by pushing primitives into the frame's [`Scene`]. Each
//! primitive lands in a band: band 0 is the main tree, the active tooltip
//! sits just above it, deferred overlays get bands above that in priority
//! order, and the debug overlay paints last. Within a band, primitives keep
//! insertion order, so painters' algorithm holds.

use crate::types::{Bounds, Edges, Point, Rgba, Size};

/// Band reserved for the main (non-deferred) element tree.
pub const BAND_MAIN: u32 = 0;
/// Band reserved for the active tooltip, the lowest overlay layer.
pub const BAND_TOOLTIP: u32 = 1;
/// First band handed to deferred overlays; entry `i` in ascending priority
/// order paints into `BAND_OVERLAY + i`.
pub const BAND_OVERLAY: u32 = 2;
/// Band reserved for the debug overlay, above everything else.
pub const BAND_DEBUG: u32 = u32::MAX;

// =============================================================================
// Primitives
// =============================================================================

/// A filled, optionally bordered, optionally rounded rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub bounds: Bounds,
    pub background: Rgba,
    pub border_color: Rgba,
    pub border_widths: Edges,
    pub corner_radius: f32,
}

/// A drop shadow painted behind a quad.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub bounds: Bounds,
    pub color: Rgba,
    pub corner_radius: f32,
    pub blur_radius: f32,
}

/// A run of text at a baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub origin: Point,
    pub text: String,
    pub color: Rgba,
    pub font_size: f32,
}

/// A textured rectangle referencing an uploaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub bounds: Bounds,
    pub image_id: u64,
    pub corner_radius: f32,
}

/// A stroked polyline through the given points.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<Point>,
    pub color: Rgba,
    pub thickness: f32,
}

/// A horizontal underline, origin at its left end.
#[derive(Debug, Clone, PartialEq)]
pub struct Underline {
    pub origin: Point,
    pub width: f32,
    pub color: Rgba,
    pub thickness: f32,
}

/// One paint command. The optional mask is the clip rectangle in effect when
/// the primitive was pushed; `None` means unclipped.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Quad(Quad),
    Shadow(Shadow),
    TextRun(TextRun),
    Sprite(Sprite),
    Path(Path),
    Underline(Underline),
}

impl Primitive {
    /// The window-space rectangle this primitive covers, ignoring blur.
    pub fn bounds(&self) -> Bounds {
        match self {
            Primitive::Quad(quad) => quad.bounds,
            Primitive::Shadow(shadow) => shadow.bounds,
            Primitive::TextRun(run) => Bounds {
                origin: run.origin,
                size: Size::ZERO,
            },
            Primitive::Sprite(sprite) => sprite.bounds,
            Primitive::Path(path) => {
                let Some(first) = path.points.first() else {
                    return Bounds::ZERO;
                };
                let mut min = *first;
                let mut max = *first;
                for p in &path.points[1..] {
                    min.x = min.x.min(p.x);
                    min.y = min.y.min(p.y);
                    max.x = max.x.max(p.x);
                    max.y = max.y.max(p.y);
                }
                Bounds {
                    origin: min,
                    size: Size::new(max.x - min.x, max.y - min.y),
                }
            }
            Primitive::Underline(underline) => Bounds {
                origin: underline.origin,
                size: Size::new(underline.width, underline.thickness),
            },
        }
    }

}

// =============================================================================
// Scene
// =============================================================================

#[derive(Debug, Clone)]
struct Command {
    band: u32,
    mask: Option<Bounds>,
    primitive: Primitive,
}

/// The accumulated paint commands for one frame.
pub struct Scene {
    band: u32,
    clip_stack: Vec<Bounds>,
    commands: Vec<Command>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            band: BAND_MAIN,
            clip_stack: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Reset for a new frame, keeping allocations.
    pub fn clear(&mut self) {
        self.band = BAND_MAIN;
        self.clip_stack.clear();
        self.commands.clear();
    }

    /// Select the band subsequent pushes land in.
    pub fn set_band(&mut self, band: u32) {
        self.band = band;
    }

    #[inline]
    pub fn band(&self) -> u32 {
        self.band
    }

    /// Push a clip rectangle in window coordinates. The effective mask is the
    /// intersection of the whole stack; a disjoint push yields an empty mask,
    /// not an error.
    pub fn push_clip(&mut self, bounds: Bounds) {
        let clipped = match self.clip_stack.last() {
            Some(current) => current.intersect(&bounds),
            None => bounds,
        };
        self.clip_stack.push(clipped);
    }

    pub fn pop_clip(&mut self) {
        self.clip_stack.pop();
    }

    /// The clip rectangle in effect right now, if any.
    pub fn current_mask(&self) -> Option<Bounds> {
        self.clip_stack.last().copied()
    }

    pub fn push_quad(&mut self, quad: Quad) {
        self.push(Primitive::Quad(quad));
    }

    pub fn push_shadow(&mut self, shadow: Shadow) {
        self.push(Primitive::Shadow(shadow));
    }

    pub fn push_text(&mut self, run: TextRun) {
        self.push(Primitive::TextRun(run));
    }

    pub fn push_sprite(&mut self, sprite: Sprite) {
        self.push(Primitive::Sprite(sprite));
    }

    pub fn push_path(&mut self, path: Path) {
        self.push(Primitive::Path(path));
    }

    pub fn push_underline(&mut self, underline: Underline) {
        self.push(Primitive::Underline(underline));
    }

    fn push(&mut self, primitive: Primitive) {
        self.commands.push(Command {
            band: self.band,
            mask: self.current_mask(),
            primitive,
        });
    }

    /// Sort commands into band order. Insertion order is preserved within a
    /// band. Call once after the frame finishes painting.
    pub fn finish(&mut self) {
        self.commands.sort_by_key(|command| command.band);
    }

    /// All primitives in draw order. Only meaningful after [`Scene::finish`].
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.commands.iter().map(|command| &command.primitive)
    }

    /// Primitives together with their clip masks, in draw order.
    pub fn masked_primitives(&self) -> impl Iterator<Item = (Option<Bounds>, &Primitive)> {
        self.commands
            .iter()
            .map(|command| (command.mask, &command.primitive))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
