//! SDL2 surface backend
//!
//! Wraps an SDL software surface in RGBA32 format (byte order R, G, B, A on
//! every platform). Blending goes through `SDL_BlitSurface`; the raw copies
//! that undraw depends on are done row by row on the locked pixels so no
//! blend mode or color key can get in the way.

use sdl2::pixels::{Color as SdlColor, PixelFormatEnum};
use sdl2::rect::Rect as SdlRect;
use sdl2::render::BlendMode;
use sdl2::surface::Surface as RawSurface;

use super::{Color, PixelBuffer, Rect, Surface};
use crate::error::SurfaceError;

const FORMAT: PixelFormatEnum = PixelFormatEnum::RGBA32;
const BYTES_PER_PIXEL: usize = 4;

impl From<Color> for SdlColor {
    fn from(color: Color) -> Self {
        SdlColor::RGBA(color.r, color.g, color.b, color.a)
    }
}

impl From<Rect> for SdlRect {
    fn from(rect: Rect) -> Self {
        SdlRect::new(rect.x, rect.y, rect.w, rect.h)
    }
}

/// An owned SDL surface usable as a label surface or frame
pub struct SdlSurface {
    raw: RawSurface<'static>,
}

impl SdlSurface {
    /// Takes over an existing SDL surface, converting it to RGBA32
    pub fn from_raw(raw: RawSurface<'static>) -> Result<Self, SurfaceError> {
        let mut raw = if raw.pixel_format_enum() == FORMAT {
            raw
        } else {
            raw.convert_format(FORMAT).map_err(SurfaceError::Backend)?
        };
        raw.set_blend_mode(BlendMode::Blend).map_err(SurfaceError::Backend)?;
        Ok(SdlSurface { raw })
    }

    pub fn as_raw(&self) -> &RawSurface<'static> {
        &self.raw
    }

    fn to_pixel_buffer(&self) -> PixelBuffer {
        let width = self.raw.width();
        let pitch = self.raw.pitch() as usize;
        let mut buffer = PixelBuffer::new(width, self.raw.height());

        self.raw.with_lock(|pixels| {
            for y in 0..self.raw.height() as usize {
                for x in 0..width as usize {
                    let i = y * pitch + x * BYTES_PER_PIXEL;
                    let color = Color::rgba(pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]);
                    buffer.set_pixel(x as i32, y as i32, color);
                }
            }
        });

        buffer
    }

    fn from_pixel_buffer(buffer: &PixelBuffer) -> Result<Self, SurfaceError> {
        let mut surface = Self::create(buffer.width(), buffer.height())?;
        let pitch = surface.raw.pitch() as usize;
        let width = buffer.width() as usize;

        surface.raw.with_lock_mut(|pixels| {
            for (n, color) in buffer.pixels().iter().enumerate() {
                let i = (n / width) * pitch + (n % width) * BYTES_PER_PIXEL;
                pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&[color.r, color.g, color.b, color.a]);
            }
        });

        Ok(surface)
    }

    fn for_each_alpha(&mut self, f: impl Fn(u8) -> u8) {
        let width = self.raw.width() as usize;
        let height = self.raw.height() as usize;
        let pitch = self.raw.pitch() as usize;

        self.raw.with_lock_mut(|pixels| {
            for y in 0..height {
                for x in 0..width {
                    let i = y * pitch + x * BYTES_PER_PIXEL + 3;
                    pixels[i] = f(pixels[i]);
                }
            }
        });
    }

    /// Raw row copy of `area` (in `src` coordinates) to `dst` at `(dst_x, dst_y)`
    ///
    /// Callers clip `area` so both sides stay in bounds.
    fn copy_rows(src: &RawSurface<'static>, area: Rect, dst: &mut RawSurface<'static>, dst_x: i32, dst_y: i32) {
        let src_pitch = src.pitch() as usize;
        let dst_pitch = dst.pitch() as usize;
        let row_bytes = area.w as usize * BYTES_PER_PIXEL;

        src.with_lock(|src_pixels| {
            dst.with_lock_mut(|dst_pixels| {
                for row in 0..area.h as usize {
                    let s = (area.y as usize + row) * src_pitch + area.x as usize * BYTES_PER_PIXEL;
                    let d = (dst_y as usize + row) * dst_pitch + dst_x as usize * BYTES_PER_PIXEL;
                    dst_pixels[d..d + row_bytes].copy_from_slice(&src_pixels[s..s + row_bytes]);
                }
            });
        });
    }
}

impl Surface for SdlSurface {
    fn create(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::Allocation { width, height });
        }
        let raw = RawSurface::new(width, height, FORMAT).map_err(|e| {
            log::error!("SDL surface allocation failed: {}", e);
            SurfaceError::Allocation { width, height }
        })?;
        let mut surface = SdlSurface::from_raw(raw)?;
        surface.fill_rect(None, Color::TRANSPARENT)?;
        Ok(surface)
    }

    fn duplicate(&self) -> Result<Self, SurfaceError> {
        let raw = self.raw.convert_format(FORMAT).map_err(SurfaceError::Backend)?;
        SdlSurface::from_raw(raw)
    }

    fn width(&self) -> u32 {
        self.raw.width()
    }

    fn height(&self) -> u32 {
        self.raw.height()
    }

    fn fill_rect(&mut self, rect: Option<Rect>, color: Color) -> Result<(), SurfaceError> {
        self.raw
            .fill_rect(rect.map(SdlRect::from), color.into())
            .map_err(SurfaceError::Backend)
    }

    fn blend_onto(&self, dst: &mut Self, x: i32, y: i32, clip: Option<Rect>) -> Result<(), SurfaceError> {
        let previous = dst.raw.clip_rect();
        dst.raw.set_clip_rect(clip.map(SdlRect::from));

        let target = SdlRect::new(x, y, self.width(), self.height());
        let result = self.raw.blit(None::<SdlRect>, &mut dst.raw, target);

        dst.raw.set_clip_rect(previous);
        result.map(|_| ()).map_err(SurfaceError::Backend)
    }

    fn copy_onto(&self, dst: &mut Self, x: i32, y: i32, clip: Option<Rect>) -> Result<(), SurfaceError> {
        let Some(mut area) = Rect::new(x, y, self.width(), self.height()).intersection(&dst.bounds()) else {
            return Ok(());
        };
        if let Some(clip) = clip {
            match area.intersection(&clip) {
                Some(clipped) => area = clipped,
                None => return Ok(()),
            }
        }

        let src_area = Rect::new(area.x - x, area.y - y, area.w, area.h);
        Self::copy_rows(&self.raw, src_area, &mut dst.raw, area.x, area.y);
        Ok(())
    }

    fn copy_region_into(&self, x: i32, y: i32, dst: &mut Self) -> Result<(), SurfaceError> {
        let region = Rect::new(x, y, dst.width(), dst.height());
        let Some(area) = region.intersection(&self.bounds()) else {
            return Ok(());
        };

        Self::copy_rows(&self.raw, area, &mut dst.raw, area.x - x, area.y - y);
        Ok(())
    }

    fn scale_alpha(&mut self, factor: f32) {
        self.for_each_alpha(|a| (a as f32 * factor).round().clamp(0.0, 255.0) as u8);
    }

    fn add_alpha(&mut self, delta: i32) {
        self.for_each_alpha(|a| (a as i32 + delta).clamp(0, 255) as u8);
    }

    fn shadow(&self) -> Result<Self, SurfaceError> {
        let shadow = self.to_pixel_buffer().shadow()?;
        SdlSurface::from_pixel_buffer(&shadow)
    }
}
