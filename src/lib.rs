//! Floating Labels
//!
//! Transient text overlays painted on top of a finished frame: damage
//! numbers, tooltips, short notices. Labels can drift, fade out and expire.
//! They are grouped into a stack of contexts so a dialog can show its own
//! labels while the screen underneath keeps its labels frozen.
//!
//! # Module Organization
//!
//! - `surface` - pixel surfaces, colors and rectangles (software buffer,
//!   optional SDL2 backend)
//! - `text` - text rendering through the built-in bitmap font
//! - `label` - a single label: animation, compositing, draw and undraw
//! - `registry` / `context` - label storage and the context stack
//! - `service` - the per-frame driver game code talks to
//! - `config` - JSON configuration for default style and viewport
//! - `clock` - millisecond time sources

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod label;
pub mod registry;
pub mod service;
pub mod surface;
pub mod text;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LabelConfig;
pub use context::{ContextId, ContextStack};
pub use error::{ConfigError, RenderError, SurfaceError};
pub use label::{Anchor, FloatingLabel, LabelSurface, NORMAL_COLOR};
pub use registry::{LabelHandle, LabelRegistry};
pub use service::{LabelContext, LabelService};
pub use surface::{Color, PixelBuffer, Rect, Surface};
pub use text::{Alignment, BitmapFont, FontSize, TextRenderer, TextStyle};

#[cfg(feature = "sdl")]
pub use surface::SdlSurface;
