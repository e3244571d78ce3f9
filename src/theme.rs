//! Built-in chrome colors.
//!
//! Elements take their colors from [`Style`](crate::style::Style); the theme
//! only covers runtime-drawn chrome: scrollbars, tooltips, and the debug
//! overlay, plus the defaults text falls back to.

use crate::types::Rgba;

/// Colors and base metrics for runtime-drawn chrome.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Rgba,
    pub text: Rgba,
    pub text_muted: Rgba,
    pub accent: Rgba,
    pub tooltip_background: Rgba,
    pub tooltip_text: Rgba,
    pub scrollbar_track: Rgba,
    pub scrollbar_thumb: Rgba,
    pub scrollbar_thumb_hover: Rgba,
    pub debug_background: Rgba,
    pub debug_text: Rgba,
    /// Default font size in logical pixels.
    pub font_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Rgba::from_rgb_int(0x1e1e2e),
            text: Rgba::from_rgb_int(0xcdd6f4),
            text_muted: Rgba::from_rgb_int(0x7f849c),
            accent: Rgba::from_rgb_int(0x89b4fa),
            tooltip_background: Rgba::from_rgb_int(0x313244),
            tooltip_text: Rgba::from_rgb_int(0xcdd6f4),
            scrollbar_track: Rgba::from_rgb_int(0x1e1e2e).with_alpha(0.0),
            scrollbar_thumb: Rgba::from_rgb_int(0x585b70),
            scrollbar_thumb_hover: Rgba::from_rgb_int(0x6c7086),
            debug_background: Rgba::new(0, 0, 0, 200),
            debug_text: Rgba::from_rgb_int(0xa6e3a1),
            font_size: 14.0,
        }
    }

    pub fn light() -> Self {
        Self {
            background: Rgba::from_rgb_int(0xeff1f5),
            text: Rgba::from_rgb_int(0x4c4f69),
            text_muted: Rgba::from_rgb_int(0x8c8fa1),
            accent: Rgba::from_rgb_int(0x1e66f5),
            tooltip_background: Rgba::from_rgb_int(0xccd0da),
            tooltip_text: Rgba::from_rgb_int(0x4c4f69),
            scrollbar_track: Rgba::from_rgb_int(0xeff1f5).with_alpha(0.0),
            scrollbar_thumb: Rgba::from_rgb_int(0x9ca0b0),
            scrollbar_thumb_hover: Rgba::from_rgb_int(0x7c7f93),
            debug_background: Rgba::new(255, 255, 255, 200),
            debug_text: Rgba::from_rgb_int(0x179299),
            font_size: 14.0,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
