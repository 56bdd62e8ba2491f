//! Pixel surfaces
//!
//! Labels never talk to a display directly. Everything they need from the
//! pixel layer goes through the [`Surface`] trait: allocate a buffer, fill
//! it, blend or copy it onto another one, and tweak its alpha channel.
//!
//! # Backends
//!
//! - [`PixelBuffer`] - plain RGBA8 software buffer, always available
//! - `SdlSurface` - SDL2 software surface (enable the `sdl` feature)
//!
//! # Clipping
//!
//! Every write is clipped to the destination bounds. Blend and copy also
//! take an optional clip rectangle in destination coordinates; pixels
//! outside it are never touched. Draw and undraw rely on this: whatever a
//! clipped draw can change, the matching clipped undraw restores.

#[cfg(test)]
pub(crate) mod limited;
pub mod pixel_buffer;
#[cfg(feature = "sdl")]
pub mod sdl;

pub use pixel_buffer::PixelBuffer;
#[cfg(feature = "sdl")]
pub use sdl::SdlSurface;

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;

/// RGBA color, straight (non-premultiplied) alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }
}

/// Integer rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Rect { x, y, w, h }
    }

    /// The `{0, 0, 0, 0}` rectangle handed out for unknown labels
    pub const fn empty() -> Self {
        Rect::new(0, 0, 0, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// One past the last column, saturating at `i32::MAX`
    pub fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.w)
    }

    /// One past the last row, saturating at `i32::MAX`
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.h)
    }

    /// Overlap of two rectangles, `None` when they do not overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect::new(left, top, right.abs_diff(left), bottom.abs_diff(top)))
    }
}

/// A pixel buffer the label system can composite into and onto
///
/// Implementations own their pixels.
pub trait Surface: Sized {
    /// Allocates a fully transparent surface
    fn create(width: u32, height: u32) -> Result<Self, SurfaceError>;

    /// Independent copy of this surface (fading works on a fresh copy every frame)
    fn duplicate(&self) -> Result<Self, SurfaceError>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// `{0, 0, width, height}`
    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    /// Overwrites `rect` (or the whole surface) with `color`, alpha included
    fn fill_rect(&mut self, rect: Option<Rect>, color: Color) -> Result<(), SurfaceError>;

    /// Alpha-blends `self` onto `dst` with its top-left corner at `(x, y)`
    fn blend_onto(&self, dst: &mut Self, x: i32, y: i32, clip: Option<Rect>) -> Result<(), SurfaceError>;

    /// Copies `self` onto `dst` at `(x, y)`, replacing pixels bit for bit
    fn copy_onto(&self, dst: &mut Self, x: i32, y: i32, clip: Option<Rect>) -> Result<(), SurfaceError>;

    /// Copies the region of `self` starting at `(x, y)` with the size of `dst`
    /// into `dst`, replacing pixels bit for bit
    ///
    /// Parts of the region outside `self` leave the matching `dst` pixels alone.
    fn copy_region_into(&self, x: i32, y: i32, dst: &mut Self) -> Result<(), SurfaceError>;

    /// Multiplies every pixel's alpha by `factor`, saturating at 255
    fn scale_alpha(&mut self, factor: f32);

    /// Adds `delta` to every pixel's alpha, clamped to `0..=255`
    fn add_alpha(&mut self, delta: i32);

    /// A blurred black silhouette of this surface, same size
    fn shadow(&self) -> Result<Self, SurfaceError>;
}
