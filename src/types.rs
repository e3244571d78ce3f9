//! Core types for ember-ui.
//!
//! Geometry and color primitives that everything builds on. All geometry is
//! in logical pixels as `f32`; the renderer applies any device scaling.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

// =============================================================================
// Point
// =============================================================================

/// A 2D point (or vector) in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Shorthand constructor for [`Point`].
pub const fn point(x: f32, y: f32) -> Point {
    Point { x, y }
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise scale.
    #[inline]
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Component-wise clamp into `[min, max]`.
    #[inline]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self {
            x: self.x.clamp(min.x, max.x),
            y: self.y.clamp(min.y, max.y),
        }
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign for Point {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

// =============================================================================
// Size
// =============================================================================

/// A 2D extent in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Shorthand constructor for [`Size`].
pub const fn size(width: f32, height: f32) -> Size {
    Size { width, height }
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Component-wise max against another size.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

impl Sub for Size {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            width: self.width - rhs.width,
            height: self.height - rhs.height,
        }
    }
}

// =============================================================================
// Bounds
// =============================================================================

/// An axis-aligned rectangle: origin (top-left) plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub origin: Point,
    pub size: Size,
}

/// Shorthand constructor for [`Bounds`].
pub const fn bounds(x: f32, y: f32, width: f32, height: f32) -> Bounds {
    Bounds {
        origin: Point { x, y },
        size: Size { width, height },
    }
}

impl Bounds {
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point {
            x: self.origin.x + self.size.width / 2.0,
            y: self.origin.y + self.size.height / 2.0,
        }
    }

    /// Top-left corner of the rectangle directly below this one.
    #[inline]
    pub fn bottom_left(&self) -> Point {
        Point {
            x: self.origin.x,
            y: self.bottom(),
        }
    }

    /// Whether a point falls inside (edges inclusive on the origin side).
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x && p.x < self.right() && p.y >= self.origin.y && p.y < self.bottom()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Intersection with another rectangle; empty when they do not overlap.
    pub fn intersect(&self, other: &Bounds) -> Bounds {
        let x1 = self.origin.x.max(other.origin.x);
        let y1 = self.origin.y.max(other.origin.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        Bounds {
            origin: Point { x: x1, y: y1 },
            size: Size {
                width: (x2 - x1).max(0.0),
                height: (y2 - y1).max(0.0),
            },
        }
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x1 = self.origin.x.min(other.origin.x);
        let y1 = self.origin.y.min(other.origin.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Bounds {
            origin: Point { x: x1, y: y1 },
            size: Size {
                width: x2 - x1,
                height: y2 - y1,
            },
        }
    }

    /// Translate by a vector.
    #[inline]
    pub fn translate(&self, delta: Point) -> Bounds {
        Bounds {
            origin: self.origin + delta,
            size: self.size,
        }
    }

    /// Shrink by per-side insets.
    pub fn inset(&self, edges: Edges) -> Bounds {
        Bounds {
            origin: Point {
                x: self.origin.x + edges.left,
                y: self.origin.y + edges.top,
            },
            size: Size {
                width: (self.size.width - edges.left - edges.right).max(0.0),
                height: (self.size.height - edges.top - edges.bottom).max(0.0),
            },
        }
    }
}

// =============================================================================
// Edges
// =============================================================================

/// Per-side values (padding, margin, border widths).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same value on all four sides.
    pub const fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    #[inline]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    #[inline]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Using integers for exact comparison - no floating point epsilon needed.
/// Alpha 255 = fully opaque, 0 = fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Transparent color.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    // Standard colors
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Create from 0xRRGGBB integer format.
    pub const fn from_rgb_int(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xFF) as u8,
            ((rgb >> 8) & 0xFF) as u8,
            (rgb & 0xFF) as u8,
        )
    }

    /// Replace the alpha channel, `alpha` in `0.0..=1.0`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Check if color is fully opaque.
    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Check if color is fully transparent.
    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Parse hex color string (#RGB, #RRGGBB, #RRGGBBAA).
    ///
    /// Returns None for invalid format.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');

        fn hex_digit(c: u8) -> Option<u8> {
            match c {
                b'0'..=b'9' => Some(c - b'0'),
                b'a'..=b'f' => Some(c - b'a' + 10),
                b'A'..=b'F' => Some(c - b'A' + 10),
                _ => None,
            }
        }

        fn hex_byte(s: &[u8], i: usize) -> Option<u8> {
            let high = hex_digit(s[i])?;
            let low = hex_digit(s[i + 1])?;
            Some((high << 4) | low)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            // #RGB -> expand to #RRGGBB
            3 => {
                let r = hex_digit(bytes[0])?;
                let g = hex_digit(bytes[1])?;
                let b = hex_digit(bytes[2])?;
                Some(Self::rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
            }
            // #RRGGBB
            6 => {
                let r = hex_byte(bytes, 0)?;
                let g = hex_byte(bytes, 2)?;
                let b = hex_byte(bytes, 4)?;
                Some(Self::rgb(r, g, b))
            }
            // #RRGGBBAA
            8 => {
                let r = hex_byte(bytes, 0)?;
                let g = hex_byte(bytes, 2)?;
                let b = hex_byte(bytes, 4)?;
                let a = hex_byte(bytes, 6)?;
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Alpha blend src over dst (Porter-Duff "over" operation).
    #[inline]
    pub fn blend(src: Self, dst: Self) -> Self {
        if src.is_opaque() {
            return src;
        }
        if src.is_transparent() {
            return dst;
        }

        let sa = src.a as i32;
        let inv_sa = 255 - sa;
        let da = dst.a as i32;

        // out_a = src_a + dst_a * (1 - src_a)
        let out_a = sa + (da * inv_sa) / 255;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }

        // out_rgb = (src_rgb * src_a + dst_rgb * dst_a * (1 - src_a)) / out_a
        let blend_channel = |s: u8, d: u8| -> u8 {
            let v = ((s as i32 * sa) + (d as i32 * da * inv_sa / 255)) / out_a;
            v.clamp(0, 255) as u8
        };

        Self {
            r: blend_channel(src.r, dst.r),
            g: blend_channel(src.g, dst.g),
            b: blend_channel(src.b, dst.b),
            a: out_a.clamp(0, 255) as u8,
        }
    }

    /// Linear interpolation between two colors.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;
        let mix = |x: u8, y: u8| ((x as f32 * inv_t) + (y as f32 * t)) as u8;

        Self {
            r: mix(a.r, b.r),
            g: mix(a.g, b.g),
            b: mix(a.b, b.b),
            a: mix(a.a, b.a),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Geometry tests
    // =========================================================================

    #[test]
    fn test_bounds_contains() {
        let b = bounds(10.0, 10.0, 100.0, 50.0);

        assert!(b.contains(point(10.0, 10.0)));
        assert!(b.contains(point(50.0, 30.0)));
        assert!(b.contains(point(109.9, 59.9)));

        // Right/bottom edges are exclusive
        assert!(!b.contains(point(110.0, 30.0)));
        assert!(!b.contains(point(50.0, 60.0)));
        assert!(!b.contains(point(9.9, 10.0)));
    }

    #[test]
    fn test_bounds_intersect() {
        let a = bounds(0.0, 0.0, 100.0, 100.0);
        let b = bounds(50.0, 50.0, 100.0, 100.0);

        let i = a.intersect(&b);
        assert_eq!(i, bounds(50.0, 50.0, 50.0, 50.0));

        // Disjoint rects intersect to empty
        let c = bounds(200.0, 200.0, 10.0, 10.0);
        assert!(a.intersect(&c).is_empty());
    }

    #[test]
    fn test_bounds_union() {
        let a = bounds(0.0, 0.0, 10.0, 10.0);
        let b = bounds(20.0, 5.0, 10.0, 10.0);

        let u = a.union(&b);
        assert_eq!(u, bounds(0.0, 0.0, 30.0, 15.0));

        // Union with empty is identity
        assert_eq!(a.union(&Bounds::ZERO), a);
        assert_eq!(Bounds::ZERO.union(&b), b);
    }

    #[test]
    fn test_bounds_inset() {
        let b = bounds(0.0, 0.0, 100.0, 100.0);
        let inner = b.inset(Edges::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(inner, bounds(40.0, 10.0, 40.0, 60.0));

        // Over-inset clamps to zero size
        let tiny = bounds(0.0, 0.0, 10.0, 10.0);
        let collapsed = tiny.inset(Edges::all(20.0));
        assert!(collapsed.is_empty());
    }

    #[test]
    fn test_point_distance() {
        assert_eq!(point(0.0, 0.0).distance(point(3.0, 4.0)), 5.0);
        assert_eq!(point(1.0, 1.0).distance(point(1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_point_clamp() {
        let p = point(-50.0, 99999.0);
        let clamped = p.clamp(Point::ZERO, point(100.0, 100.0));
        assert_eq!(clamped, point(0.0, 100.0));
    }

    #[test]
    fn test_edges_sums() {
        let e = Edges::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(e.horizontal(), 6.0);
        assert_eq!(e.vertical(), 4.0);
        assert!(Edges::ZERO.is_zero());
        assert!(!e.is_zero());
    }

    // =========================================================================
    // Rgba tests
    // =========================================================================

    #[test]
    fn test_rgba_from_rgb_int() {
        let red = Rgba::from_rgb_int(0xff0000);
        assert_eq!(red, Rgba::rgb(255, 0, 0));

        let slate = Rgba::from_rgb_int(0x28303d);
        assert_eq!(slate, Rgba::rgb(40, 48, 61));
    }

    #[test]
    fn test_rgba_from_hex() {
        assert_eq!(Rgba::from_hex("#ff0000").unwrap(), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::from_hex("#fff").unwrap(), Rgba::rgb(255, 255, 255));
        assert_eq!(
            Rgba::from_hex("#ff000080").unwrap(),
            Rgba::new(255, 0, 0, 128)
        );
        assert_eq!(Rgba::from_hex("0000ff").unwrap(), Rgba::rgb(0, 0, 255));

        assert!(Rgba::from_hex("#gg0000").is_none());
        assert!(Rgba::from_hex("#ffff").is_none());
        assert!(Rgba::from_hex("").is_none());
    }

    #[test]
    fn test_rgba_blend_opaque_and_transparent() {
        let red = Rgba::rgb(255, 0, 0);
        let blue = Rgba::rgb(0, 0, 255);

        // Opaque source wins outright
        assert_eq!(Rgba::blend(red, blue), red);

        // Transparent source leaves dst
        assert_eq!(Rgba::blend(Rgba::TRANSPARENT, blue), blue);
    }

    #[test]
    fn test_rgba_blend_half() {
        let half_red = Rgba::new(255, 0, 0, 128);
        let white = Rgba::WHITE;

        let out = Rgba::blend(half_red, white);
        assert!(out.r > 200);
        assert!(out.g > 100 && out.g < 140);
        assert!(out.b > 100 && out.b < 140);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn test_rgba_lerp() {
        let black = Rgba::BLACK;
        let white = Rgba::WHITE;

        assert_eq!(Rgba::lerp(black, white, 0.0), black);
        assert_eq!(Rgba::lerp(black, white, 1.0), white);

        let mid = Rgba::lerp(black, white, 0.5);
        assert!(mid.r > 120 && mid.r < 135);
    }

    #[test]
    fn test_rgba_with_alpha() {
        let c = Rgba::rgb(10, 20, 30).with_alpha(0.5);
        assert_eq!(c.r, 10);
        assert!(c.a == 127 || c.a == 128);

        assert_eq!(Rgba::RED.with_alpha(2.0).a, 255);
        assert_eq!(Rgba::RED.with_alpha(-1.0).a, 0);
    }
}
