//! Software surface with a configurable allocation limit
//!
//! Wraps [`PixelBuffer`] so tests can make allocation or duplication fail
//! and watch the label layer fall back. Limits are per thread, so tests
//! running in parallel do not see each other's settings.

use std::cell::Cell;

use super::{Color, PixelBuffer, Rect, Surface};
use crate::error::SurfaceError;

thread_local! {
    static MAX_PIXELS: Cell<u32> = const { Cell::new(u32::MAX) };
    static DUPLICATE_FAILS: Cell<bool> = const { Cell::new(false) };
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LimitedSurface(pub(crate) PixelBuffer);

impl LimitedSurface {
    /// `create` fails for anything with more than `max` pixels
    pub(crate) fn limit_pixels(max: u32) {
        MAX_PIXELS.with(|limit| limit.set(max));
    }

    pub(crate) fn fail_duplicates(fail: bool) {
        DUPLICATE_FAILS.with(|flag| flag.set(fail));
    }
}

impl Surface for LimitedSurface {
    fn create(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width.saturating_mul(height) > MAX_PIXELS.with(Cell::get) {
            return Err(SurfaceError::Allocation { width, height });
        }
        PixelBuffer::create(width, height).map(LimitedSurface)
    }

    fn duplicate(&self) -> Result<Self, SurfaceError> {
        if DUPLICATE_FAILS.with(Cell::get) {
            return Err(SurfaceError::Backend("duplication disabled".to_string()));
        }
        Ok(self.clone())
    }

    fn width(&self) -> u32 {
        self.0.width()
    }

    fn height(&self) -> u32 {
        self.0.height()
    }

    fn fill_rect(&mut self, rect: Option<Rect>, color: Color) -> Result<(), SurfaceError> {
        self.0.fill_rect(rect, color)
    }

    fn blend_onto(&self, dst: &mut Self, x: i32, y: i32, clip: Option<Rect>) -> Result<(), SurfaceError> {
        self.0.blend_onto(&mut dst.0, x, y, clip)
    }

    fn copy_onto(&self, dst: &mut Self, x: i32, y: i32, clip: Option<Rect>) -> Result<(), SurfaceError> {
        self.0.copy_onto(&mut dst.0, x, y, clip)
    }

    fn copy_region_into(&self, x: i32, y: i32, dst: &mut Self) -> Result<(), SurfaceError> {
        self.0.copy_region_into(x, y, &mut dst.0)
    }

    fn scale_alpha(&mut self, factor: f32) {
        self.0.scale_alpha(factor);
    }

    fn add_alpha(&mut self, delta: i32) {
        self.0.add_alpha(delta);
    }

    fn shadow(&self) -> Result<Self, SurfaceError> {
        self.0.shadow().map(LimitedSurface)
    }
}
