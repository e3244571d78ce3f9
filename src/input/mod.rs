//! Input model.
//!
//! The platform queues raw [`PlatformInput`] events on the window between
//! frames; the dispatcher drains them at the start of the next frame against
//! the hit-test tree built by the previous one. Handlers receive the richer
//! event payloads defined here (click counts, resolved wheel pixels), which
//! the dispatcher synthesizes.

pub(crate) mod dispatch;
pub(crate) mod hit_test;

pub use dispatch::EventCtx;

use std::fmt;

use bitflags::bitflags;

use crate::types::{Point, Size};

bitflags! {
    /// Keyboard modifier state carried by every input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const CTRL  = 1 << 0;
        const ALT   = 1 << 1;
        const SHIFT = 1 << 2;
        const META  = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A wheel step, either in device pixels or abstract lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDelta {
    Pixels(Point),
    Lines(Point),
}

impl ScrollDelta {
    /// Resolve to pixels. Line deltas scale by the configured lines per
    /// notch and the default line height.
    pub fn to_pixels(self, line_height: f32, wheel_lines: u32) -> Point {
        match self {
            ScrollDelta::Pixels(pixels) => pixels,
            ScrollDelta::Lines(lines) => lines.scale(line_height * wheel_lines as f32),
        }
    }
}

// =============================================================================
// Keystrokes
// =============================================================================

/// A key plus modifiers, e.g. `ctrl-shift-k`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keystroke {
    pub key: String,
    pub modifiers: Modifiers,
}

impl Keystroke {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// Parse `modifier-...-key` notation. Modifiers are `ctrl`, `alt`,
    /// `shift`, and `cmd`/`meta`/`super`; the final component is the key.
    /// Returns `None` for an empty key or an unknown modifier.
    pub fn parse(source: &str) -> Option<Self> {
        let mut modifiers = Modifiers::empty();
        let mut rest = source;
        loop {
            match rest.split_once('-') {
                Some((head, tail)) if !tail.is_empty() => {
                    match head {
                        "ctrl" => modifiers |= Modifiers::CTRL,
                        "alt" => modifiers |= Modifiers::ALT,
                        "shift" => modifiers |= Modifiers::SHIFT,
                        "cmd" | "meta" | "super" => modifiers |= Modifiers::META,
                        _ => return None,
                    }
                    rest = tail;
                }
                _ => break,
            }
        }
        if rest.is_empty() {
            return None;
        }
        Some(Self {
            key: rest.to_ascii_lowercase(),
            modifiers,
        })
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(Modifiers::CTRL) {
            write!(f, "ctrl-")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            write!(f, "alt-")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            write!(f, "shift-")?;
        }
        if self.modifiers.contains(Modifiers::META) {
            write!(f, "cmd-")?;
        }
        write!(f, "{}", self.key)
    }
}

// =============================================================================
// Raw input
// =============================================================================

/// One raw event from the platform, latched on the window until the next
/// frame.
#[derive(Debug, Clone)]
pub enum PlatformInput {
    MouseDown {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    MouseUp {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    MouseMove {
        position: Point,
        modifiers: Modifiers,
    },
    ScrollWheel {
        position: Point,
        delta: ScrollDelta,
        modifiers: Modifiers,
    },
    KeyDown {
        keystroke: Keystroke,
    },
    KeyUp {
        keystroke: Keystroke,
    },
    Text {
        text: String,
    },
    CompositionStart,
    CompositionUpdate {
        text: String,
    },
    CompositionEnd {
        text: String,
    },
    Resized {
        size: Size,
    },
}

// =============================================================================
// Handler payloads
// =============================================================================

/// Payload for mouse button handlers. On a press, `click_count` is the
/// position in the current multi-click streak.
#[derive(Debug, Clone, Copy)]
pub struct MouseEvent {
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub click_count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct MouseMoveEvent {
    pub position: Point,
    pub modifiers: Modifiers,
}

/// A synthesized click: press and release landed on the same element.
#[derive(Debug, Clone, Copy)]
pub struct ClickEvent {
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    pub click_count: u32,
}

/// Wheel input with the delta already resolved to pixels.
#[derive(Debug, Clone, Copy)]
pub struct ScrollWheelEvent {
    pub position: Point,
    pub delta: Point,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub keystroke: Keystroke,
}

/// Committed or in-flight text input routed to the focused element.
#[derive(Debug, Clone)]
pub struct TextEvent {
    pub text: String,
    /// True while the text is an uncommitted composition preview.
    pub composing: bool,
}

/// A key binding resolved to its action name.
#[derive(Debug, Clone)]
pub struct ActionEvent {
    pub name: String,
}

// =============================================================================
// Tests
// =============================================================================
