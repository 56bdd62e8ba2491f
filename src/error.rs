//! Error types for the floating label system
//!
//! Nothing in here ever reaches the caller of the label service: rendering
//! and allocation failures are logged and the affected label simply draws
//! less (or nothing) that frame. The enums exist so the backends can say
//! precisely what went wrong before the label layer absorbs it.

use std::io;

/// Errors raised by a pixel surface backend
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// The backend could not allocate a surface of the requested size
    #[error("could not allocate a {width}x{height} surface")]
    Allocation { width: u32, height: u32 },

    /// Any other backend failure (SDL reports these as strings)
    #[error("surface backend error: {0}")]
    Backend(String),
}

/// Errors raised while rasterizing label text
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Nothing visible is left once markup and the trailing newline are gone
    #[error("text is empty")]
    EmptyText,

    /// The maximum width/height cannot hold a single glyph
    #[error("a {max_width}x{max_height} box cannot hold any text")]
    BoxTooSmall { max_width: u32, max_height: u32 },

    /// The target surface could not be created or written
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Errors raised while loading label configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
