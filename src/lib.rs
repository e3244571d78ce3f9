//! # ember-ui
//!
//! Retained-mode GPU UI runtime.
//!
//! State lives in entities owned by a single-threaded [`App`]; views render
//! entity state into short-lived element trees; windows drive those trees
//! through a fixed frame protocol and hand the finished scene to a
//! [`Platform`] for presentation.
//!
//! A frame is a straight line:
//! ```text
//! input dispatch → effect flush → render → layout → prepaint → paint → present
//! ```
//!
//! Reentrancy is handled by leasing rather than locks: entity and window
//! state move out of their slots while a callback runs, and any access to
//! the leased object fails with [`UiError::Leased`]. Cross-entity reactions
//! (notifications, events, focus changes) go through an effect queue drained
//! at the end of the outermost update and at frame boundaries.
//!
//! ## Modules
//!
//! - [`types`] - Geometry and color primitives (Point, Bounds, Rgba)
//! - [`app`] - Entity store, effect queue, windows, platform services
//! - [`element`] - Element protocol and the built-in elements
//! - [`window`] - Frame protocol, focus, tab stops, scrolling
//! - [`input`] - Raw events, keystrokes, hit testing, dispatch
//! - [`scene`] - Paint primitives and the banded display list

pub mod app;
pub mod config;
pub mod element;
pub mod error;
pub mod input;
pub mod layout;
pub mod platform;
pub mod scene;
pub mod style;
pub mod text;
pub mod theme;
pub mod types;
pub mod window;

// Re-export commonly used items
pub use types::*;

pub use app::{
    AnyView, App, Ctx, EntityId, Handle, ObserverHandle, ReleaseHandle, Render, SubscriberHandle,
    TaskHandle, WindowId,
};

pub use window::{FocusHandle, FocusId, ScrollHandle, TabStop, Window};

pub use element::{
    block, canvas, deferred, image, label, AnyElement, Block, Canvas, Deferred, Element,
    GlobalElementId, Image, ImageSource, IntoElement, Label,
};

pub use input::{
    // Raw events
    Keystroke, Modifiers, MouseButton, PlatformInput, ScrollDelta,
    // Handler payloads
    ActionEvent, ClickEvent, EventCtx, KeyEvent, MouseEvent, MouseMoveEvent, ScrollWheelEvent,
    TextEvent,
};

pub use style::{
    AlignItems, BoxShadow, Dimension, Display, FlexDirection, FlexWrap, JustifyContent, Overflow,
    Position, Style,
};

pub use layout::{AvailableSpace, LayoutId, MeasureFn};

pub use scene::{Path, Primitive, Quad, Scene, Shadow, Sprite, TextRun, Underline};

pub use text::{MonospaceTextSystem, TextLayout, TextSystem};

pub use platform::{CapturedFrame, Platform, TestPlatform};

pub use config::RuntimeConfig;
pub use error::{ObjectKind, Result, UiError};
pub use theme::Theme;
