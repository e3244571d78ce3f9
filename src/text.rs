//! Text measurement.
//!
//! The runtime does not rasterize glyphs itself; it only needs sizes, so the
//! text system is a trait with a monospace default implementation. Widths are
//! computed from Unicode display columns, which keeps CJK and other wide
//! scripts honest.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::types::Size;

/// Measured line layout of a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<String>,
    pub size: Size,
}

/// Source of text metrics for measurement and painting.
pub trait TextSystem {
    /// Horizontal advance of one display column at the given font size.
    fn advance(&self, font_size: f32) -> f32;

    /// Height of one line at the given font size.
    fn line_height(&self, font_size: f32) -> f32;

    /// Size of the text without wrapping. Honors embedded newlines.
    fn measure(&self, text: &str, font_size: f32) -> Size;

    /// Break text into painted lines, wrapping at `wrap_width` when given.
    fn layout(&self, text: &str, font_size: f32, wrap_width: Option<f32>) -> TextLayout;
}

// =============================================================================
// Monospace metrics
// =============================================================================

/// Fixed-pitch metrics: every display column has the same advance, derived
/// from the font size by constant ratios.
pub struct MonospaceTextSystem {
    advance_ratio: f32,
    line_height_ratio: f32,
}

impl MonospaceTextSystem {
    pub const fn new() -> Self {
        Self {
            advance_ratio: 0.6,
            line_height_ratio: 1.25,
        }
    }
}

impl Default for MonospaceTextSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSystem for MonospaceTextSystem {
    #[inline]
    fn advance(&self, font_size: f32) -> f32 {
        font_size * self.advance_ratio
    }

    #[inline]
    fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_height_ratio
    }

    fn measure(&self, text: &str, font_size: f32) -> Size {
        let advance = self.advance(font_size);
        let mut columns = 0usize;
        let mut line_count = 0usize;
        for line in text.split('\n') {
            columns = columns.max(UnicodeWidthStr::width(line));
            line_count += 1;
        }
        Size {
            width: columns as f32 * advance,
            height: line_count.max(1) as f32 * self.line_height(font_size),
        }
    }

    fn layout(&self, text: &str, font_size: f32, wrap_width: Option<f32>) -> TextLayout {
        let advance = self.advance(font_size);
        // Small epsilon so a width of exactly N columns doesn't floor to N-1
        // from f32 rounding.
        let max_columns = wrap_width
            .map(|w| ((w / advance + 0.001).floor() as usize).max(1))
            .unwrap_or(usize::MAX);

        let mut lines = Vec::new();
        for raw_line in text.split('\n') {
            wrap_line(raw_line, max_columns, &mut lines);
        }
        if lines.is_empty() {
            lines.push(String::new());
        }

        let widest = lines
            .iter()
            .map(|line| UnicodeWidthStr::width(line.as_str()))
            .max()
            .unwrap_or(0);

        TextLayout {
            size: Size {
                width: widest as f32 * advance,
                height: lines.len() as f32 * self.line_height(font_size),
            },
            lines,
        }
    }
}

/// Greedy word wrap on display columns. Words wider than a full line are
/// split mid-word.
fn wrap_line(line: &str, max_columns: usize, out: &mut Vec<String>) {
    if UnicodeWidthStr::width(line) <= max_columns {
        out.push(line.to_string());
        return;
    }

    let mut current = String::new();
    let mut current_width = 0usize;

    for word in line.split(' ') {
        let word_width = UnicodeWidthStr::width(word);
        let separator = usize::from(!current.is_empty());

        if current_width + separator + word_width <= max_columns {
            if separator == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += separator + word_width;
            continue;
        }

        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width <= max_columns {
            current.push_str(word);
            current_width = word_width;
        } else {
            // Word longer than a line: hard-break on character columns.
            for ch in word.chars() {
                let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
                if current_width + ch_width > max_columns && !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(ch);
                current_width += ch_width;
            }
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}

// =============================================================================
// Tests
// =============================================================================
