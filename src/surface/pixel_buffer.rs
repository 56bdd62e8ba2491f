//! Software RGBA surface
//!
//! The default backend: a row-major `Vec<Color>`. Blending follows SDL's
//! `BLENDMODE_BLEND` rules so labels look the same as on the SDL backend:
//!
//! ```text
//! dstRGB = srcRGB * srcA + dstRGB * (1 - srcA)
//! dstA   = srcA + dstA * (1 - srcA)
//! ```

use super::{Color, Rect, Surface};
use crate::error::SurfaceError;

/// Radius of the box blur behind shadow-style labels
const SHADOW_RADIUS: i32 = 2;

/// Alpha blend a single channel
/// Uses the fast approximation (x + 1 + (x >> 8)) >> 8 instead of x / 255,
/// which is exact at alpha 0 and 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let alpha = alpha as u32;
    let result = src as u32 * alpha + dst as u32 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

#[inline]
fn blend_pixel(src: Color, dst: Color) -> Color {
    Color {
        r: blend_channel(src.r, dst.r, src.a),
        g: blend_channel(src.g, dst.g, src.a),
        b: blend_channel(src.b, dst.b, src.a),
        a: blend_channel(255, dst.a, src.a),
    }
}

/// RGBA8 pixel buffer for software compositing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<Color>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Creates a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Creates a buffer with every pixel set to `color`
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        PixelBuffer {
            pixels: vec![color; width as usize * height as usize],
            width,
            height,
        }
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Reads one pixel, `None` when out of bounds
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.in_bounds(x, y) {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Writes one pixel, ignored when out of bounds
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.pixels[idx] = color;
        }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Destination area a `w`x`h` source placed at `(x, y)` may write to
    fn write_area(&self, x: i32, y: i32, w: u32, h: u32, clip: Option<Rect>) -> Option<Rect> {
        let area = Rect::new(x, y, w, h).intersection(&self.bounds())?;
        match clip {
            Some(clip) => area.intersection(&clip),
            None => Some(area),
        }
    }

    /// Shared walk for blend and copy: calls `op(src, dst)` for each
    /// destination pixel inside the write area
    fn composite_onto(
        &self,
        dst: &mut PixelBuffer,
        x: i32,
        y: i32,
        clip: Option<Rect>,
        op: impl Fn(Color, Color) -> Color,
    ) {
        let Some(area) = dst.write_area(x, y, self.width, self.height, clip) else {
            return;
        };

        for dy in area.y..area.bottom() {
            for dx in area.x..area.right() {
                let src = self.pixels[self.index(dx - x, dy - y)];
                let idx = dst.index(dx, dy);
                dst.pixels[idx] = op(src, dst.pixels[idx]);
            }
        }
    }

    /// Box blur of the alpha channel along one axis
    fn blur_alpha(alpha: &[u8], width: usize, height: usize, horizontal: bool) -> Vec<u8> {
        let window = (SHADOW_RADIUS * 2 + 1) as u32;
        let mut out = vec![0u8; alpha.len()];

        for y in 0..height {
            for x in 0..width {
                let mut sum = 0u32;
                for offset in -SHADOW_RADIUS..=SHADOW_RADIUS {
                    let (sx, sy) = if horizontal {
                        (x as i32 + offset, y as i32)
                    } else {
                        (x as i32, y as i32 + offset)
                    };
                    if sx >= 0 && sy >= 0 && (sx as usize) < width && (sy as usize) < height {
                        sum += alpha[sy as usize * width + sx as usize] as u32;
                    }
                }
                out[y * width + x] = (sum / window) as u8;
            }
        }

        out
    }
}

impl Surface for PixelBuffer {
    fn create(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::Allocation { width, height });
        }
        Ok(PixelBuffer::new(width, height))
    }

    fn duplicate(&self) -> Result<Self, SurfaceError> {
        Ok(self.clone())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, rect: Option<Rect>, color: Color) -> Result<(), SurfaceError> {
        let area = match rect {
            Some(rect) => match rect.intersection(&self.bounds()) {
                Some(area) => area,
                None => return Ok(()),
            },
            None => self.bounds(),
        };

        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let idx = self.index(x, y);
                self.pixels[idx] = color;
            }
        }
        Ok(())
    }

    fn blend_onto(&self, dst: &mut Self, x: i32, y: i32, clip: Option<Rect>) -> Result<(), SurfaceError> {
        self.composite_onto(dst, x, y, clip, blend_pixel);
        Ok(())
    }

    fn copy_onto(&self, dst: &mut Self, x: i32, y: i32, clip: Option<Rect>) -> Result<(), SurfaceError> {
        self.composite_onto(dst, x, y, clip, |src, _| src);
        Ok(())
    }

    fn copy_region_into(&self, x: i32, y: i32, dst: &mut Self) -> Result<(), SurfaceError> {
        let region = Rect::new(x, y, dst.width, dst.height);
        let Some(area) = region.intersection(&self.bounds()) else {
            return Ok(());
        };

        for sy in area.y..area.bottom() {
            for sx in area.x..area.right() {
                let idx = dst.index(sx - x, sy - y);
                dst.pixels[idx] = self.pixels[self.index(sx, sy)];
            }
        }
        Ok(())
    }

    fn scale_alpha(&mut self, factor: f32) {
        for pixel in &mut self.pixels {
            pixel.a = (pixel.a as f32 * factor).round().clamp(0.0, 255.0) as u8;
        }
    }

    fn add_alpha(&mut self, delta: i32) {
        for pixel in &mut self.pixels {
            pixel.a = (pixel.a as i32 + delta).clamp(0, 255) as u8;
        }
    }

    fn shadow(&self) -> Result<Self, SurfaceError> {
        let width = self.width as usize;
        let height = self.height as usize;
        let alpha: Vec<u8> = self.pixels.iter().map(|p| p.a).collect();

        let blurred = Self::blur_alpha(&alpha, width, height, true);
        let blurred = Self::blur_alpha(&blurred, width, height, false);

        Ok(PixelBuffer {
            pixels: blurred.into_iter().map(|a| Color::BLACK.with_alpha(a)).collect(),
            width: self.width,
            height: self.height,
        })
    }
}
