//! Element styling.
//!
//! [`Style`] carries both the layout properties handed to the solver and the
//! paint properties (colors, radius, shadow) consumed during painting. The
//! solver side converts to `taffy::Style`; visual semantics beyond that
//! conversion are the solver's business, not ours.

use taffy::{
    AlignItems as TaffyAlignItems, AlignSelf as TaffyAlignSelf, Dimension as TaffyDimension,
    Display as TaffyDisplay, FlexDirection as TaffyFlexDirection, FlexWrap as TaffyFlexWrap,
    JustifyContent as TaffyJustifyContent, LengthPercentage, LengthPercentageAuto,
    Overflow as TaffyOverflow, Position as TaffyPosition,
};

use crate::types::{Edges, Point, Rgba, Size};

// =============================================================================
// Dimension
// =============================================================================

/// A dimension value that can be absolute pixels, a percentage of the
/// parent, or content-determined.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Auto-size based on content.
    #[default]
    Auto,
    /// Absolute size in logical pixels.
    Px(f32),
    /// Percentage of parent size (0-100).
    Percent(f32),
}

impl Dimension {
    fn to_taffy(self) -> TaffyDimension {
        match self {
            Dimension::Auto => TaffyDimension::Auto,
            Dimension::Px(v) => TaffyDimension::Length(v),
            Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
        }
    }

    fn to_taffy_lpa(self) -> LengthPercentageAuto {
        match self {
            Dimension::Auto => LengthPercentageAuto::Auto,
            Dimension::Px(v) => LengthPercentageAuto::Length(v),
            Dimension::Percent(p) => LengthPercentageAuto::Percent(p / 100.0),
        }
    }
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        Dimension::Px(value)
    }
}

/// Per-side dimensions, used for absolute-position insets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Inset {
    pub top: Dimension,
    pub right: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,
}

impl Inset {
    pub const AUTO: Self = Self {
        top: Dimension::Auto,
        right: Dimension::Auto,
        bottom: Dimension::Auto,
        left: Dimension::Auto,
    };
}

// =============================================================================
// Flex enums
// =============================================================================

/// Whether a node participates in layout at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Flex,
    /// Node and subtree take no space and are not painted.
    Hidden,
}

/// Position scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Relative,
    Absolute,
}

/// Flex direction for container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
    RowReverse,
    ColumnReverse,
}

/// Flex wrap behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

/// Justify content (main axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Align items (cross axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

/// Overflow behavior on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    /// Clip children to the padding box.
    Hidden,
    /// Clip and expose a scroll offset.
    Scroll,
}

impl Overflow {
    /// Whether children are clipped to this node.
    #[inline]
    pub fn clips(&self) -> bool {
        matches!(self, Overflow::Hidden | Overflow::Scroll)
    }
}

// =============================================================================
// Box shadow
// =============================================================================

/// A drop shadow painted behind the node's quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShadow {
    pub color: Rgba,
    pub offset: Point,
    pub blur_radius: f32,
}

// =============================================================================
// Style
// =============================================================================

/// The full style of one element: layout inputs plus paint properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    // Layout
    pub display: Display,
    pub position: Position,
    pub inset: Inset,
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Dimension,
    pub justify_content: JustifyContent,
    pub align_items: Option<AlignItems>,
    pub align_self: Option<AlignItems>,
    /// Gap between children: `width` is the column gap, `height` the row gap.
    pub gap: Size,
    pub padding: Edges,
    pub margin: Edges,
    pub border_widths: Edges,
    pub overflow: Overflow,

    // Paint
    pub background: Option<Rgba>,
    pub border_color: Option<Rgba>,
    pub corner_radius: f32,
    pub shadow: Option<BoxShadow>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            display: Display::Flex,
            position: Position::Relative,
            inset: Inset::AUTO,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Dimension::Auto,
            justify_content: JustifyContent::FlexStart,
            align_items: None,
            align_self: None,
            gap: Size::ZERO,
            padding: Edges::ZERO,
            margin: Edges::ZERO,
            border_widths: Edges::ZERO,
            overflow: Overflow::Visible,
            background: None,
            border_color: None,
            corner_radius: 0.0,
            shadow: None,
        }
    }
}

impl Style {
    /// Style for the zero-size placeholder a deferred element leaves in the
    /// main tree.
    pub(crate) fn deferred_placeholder() -> Self {
        Self {
            width: Dimension::Px(0.0),
            height: Dimension::Px(0.0),
            flex_grow: 0.0,
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    /// Convert the layout half of this style to a `taffy::Style`.
    pub(crate) fn to_taffy(&self) -> taffy::Style {
        taffy::Style {
            display: match self.display {
                Display::Flex => TaffyDisplay::Flex,
                Display::Hidden => TaffyDisplay::None,
            },
            position: match self.position {
                Position::Relative => TaffyPosition::Relative,
                Position::Absolute => TaffyPosition::Absolute,
            },
            inset: taffy::Rect {
                top: self.inset.top.to_taffy_lpa(),
                right: self.inset.right.to_taffy_lpa(),
                bottom: self.inset.bottom.to_taffy_lpa(),
                left: self.inset.left.to_taffy_lpa(),
            },
            size: taffy::Size {
                width: self.width.to_taffy(),
                height: self.height.to_taffy(),
            },
            min_size: taffy::Size {
                width: self.min_width.to_taffy(),
                height: self.min_height.to_taffy(),
            },
            max_size: taffy::Size {
                width: self.max_width.to_taffy(),
                height: self.max_height.to_taffy(),
            },
            flex_direction: match self.flex_direction {
                FlexDirection::Row => TaffyFlexDirection::Row,
                FlexDirection::Column => TaffyFlexDirection::Column,
                FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
                FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
            },
            flex_wrap: match self.flex_wrap {
                FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
                FlexWrap::Wrap => TaffyFlexWrap::Wrap,
                FlexWrap::WrapReverse => TaffyFlexWrap::WrapReverse,
            },
            flex_grow: self.flex_grow,
            flex_shrink: self.flex_shrink,
            flex_basis: self.flex_basis.to_taffy(),
            justify_content: Some(match self.justify_content {
                JustifyContent::FlexStart => TaffyJustifyContent::FlexStart,
                JustifyContent::Center => TaffyJustifyContent::Center,
                JustifyContent::FlexEnd => TaffyJustifyContent::FlexEnd,
                JustifyContent::SpaceBetween => TaffyJustifyContent::SpaceBetween,
                JustifyContent::SpaceAround => TaffyJustifyContent::SpaceAround,
                JustifyContent::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
            }),
            align_items: self.align_items.map(to_taffy_align),
            align_self: self.align_self.map(|a| match to_taffy_align(a) {
                TaffyAlignItems::Stretch => TaffyAlignSelf::Stretch,
                TaffyAlignItems::FlexStart => TaffyAlignSelf::FlexStart,
                TaffyAlignItems::Center => TaffyAlignSelf::Center,
                TaffyAlignItems::FlexEnd => TaffyAlignSelf::FlexEnd,
                _ => TaffyAlignSelf::Baseline,
            }),
            gap: taffy::Size {
                width: LengthPercentage::Length(self.gap.width),
                height: LengthPercentage::Length(self.gap.height),
            },
            padding: taffy::Rect {
                top: LengthPercentage::Length(self.padding.top),
                right: LengthPercentage::Length(self.padding.right),
                bottom: LengthPercentage::Length(self.padding.bottom),
                left: LengthPercentage::Length(self.padding.left),
            },
            margin: taffy::Rect {
                top: LengthPercentageAuto::Length(self.margin.top),
                right: LengthPercentageAuto::Length(self.margin.right),
                bottom: LengthPercentageAuto::Length(self.margin.bottom),
                left: LengthPercentageAuto::Length(self.margin.left),
            },
            border: taffy::Rect {
                top: LengthPercentage::Length(self.border_widths.top),
                right: LengthPercentage::Length(self.border_widths.right),
                bottom: LengthPercentage::Length(self.border_widths.bottom),
                left: LengthPercentage::Length(self.border_widths.left),
            },
            overflow: taffy::Point {
                x: to_taffy_overflow(self.overflow),
                y: to_taffy_overflow(self.overflow),
            },
            ..Default::default()
        }
    }
}

fn to_taffy_align(a: AlignItems) -> TaffyAlignItems {
    match a {
        AlignItems::Stretch => TaffyAlignItems::Stretch,
        AlignItems::FlexStart => TaffyAlignItems::FlexStart,
        AlignItems::Center => TaffyAlignItems::Center,
        AlignItems::FlexEnd => TaffyAlignItems::FlexEnd,
        AlignItems::Baseline => TaffyAlignItems::Baseline,
    }
}

fn to_taffy_overflow(o: Overflow) -> TaffyOverflow {
    match o {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Clip,
        Overflow::Scroll => TaffyOverflow::Scroll,
    }
}

// =============================================================================
// Tests
// =============================================================================
