//! Building a label's composited surface
//!
//! Text is rendered once, then put on one of two backgrounds:
//!
//! - **boxed** (background alpha > 0): a filled box `border` pixels larger
//!   than the text on every side, text on top
//! - **shadow** (background alpha == 0): a blurred black silhouette of the
//!   text, 2 pixels of margin on every side, crisp text on top
//!
//! Any failure after the text itself rendered falls back to the bare text.

use super::FloatingLabel;
use crate::error::SurfaceError;
use crate::surface::{Color, Surface};
use crate::text::{Alignment, TextRenderer, TextStyle};

/// Alpha boost for text going onto a box. Blending onto an opaque box
/// darkens the anti-aliased edges; this restores their brightness.
const BOX_TEXT_ALPHA_BOOST: f32 = 1.13;

/// Where the text sits inside the shadow surface
const SHADOW_OFFSET: i32 = 2;

impl<S: Surface> FloatingLabel<S> {
    /// The style handed to the text renderer
    ///
    /// Lines are always laid out left-aligned; label alignment is applied to
    /// the whole surface through its x position instead.
    pub(crate) fn text_style(&self) -> TextStyle {
        TextStyle {
            font_size: self.font_size,
            alignment: Alignment::Left,
            color: self.color,
            max_width: self.width.or(self.clip_rect.map(|clip| clip.w)),
            max_height: self.height.or(self.clip_rect.map(|clip| clip.h)),
            ellipsize: true,
            characters_per_line: None,
            markup: self.use_markup,
        }
    }

    /// Renders and composites the surface, `None` if the text did not render
    pub(crate) fn compose<R: TextRenderer<S>>(&self, renderer: &mut R) -> Option<S> {
        // A single trailing newline would only add an empty line
        let text = self.text.strip_suffix('\n').unwrap_or(&self.text);

        let foreground = match renderer.render(&self.text_style(), text) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("could not create floating label's text '{}': {}", self.text, e);
                return None;
            }
        };

        if self.bg_alpha != 0 {
            Some(boxed(foreground, self.bg_color.with_alpha(self.bg_alpha), self.border))
        } else {
            Some(shadowed(foreground))
        }
    }
}

fn boxed<S: Surface>(mut foreground: S, background_color: Color, border: u32) -> S {
    let mut background = match S::create(foreground.width() + border * 2, foreground.height() + border * 2) {
        Ok(surface) => surface,
        Err(e) => {
            log::error!("could not create tooltip box: {}", e);
            return foreground;
        }
    };

    if let Err(e) = background.fill_rect(None, background_color) {
        log::error!("could not fill tooltip box: {}", e);
        return foreground;
    }

    foreground.scale_alpha(BOX_TEXT_ALPHA_BOOST);

    match foreground.blend_onto(&mut background, border as i32, border as i32, None) {
        Ok(()) => background,
        Err(e) => {
            log::error!("could not draw text onto tooltip box: {}", e);
            foreground
        }
    }
}

fn shadowed<S: Surface>(foreground: S) -> S {
    match shadow_behind(&foreground) {
        Ok(surface) => surface,
        Err(e) => {
            log::error!("could not create floating label's shadow: {}", e);
            foreground
        }
    }
}

fn shadow_behind<S: Surface>(foreground: &S) -> Result<S, SurfaceError> {
    let margin = SHADOW_OFFSET as u32 * 2;
    let mut background = S::create(foreground.width() + margin, foreground.height() + margin)?;

    foreground.blend_onto(&mut background, SHADOW_OFFSET, SHADOW_OFFSET, None)?;
    let mut background = background.shadow()?;
    foreground.blend_onto(&mut background, SHADOW_OFFSET, SHADOW_OFFSET, None)?;

    Ok(background)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::surface::limited::LimitedSurface;
    use crate::surface::{PixelBuffer, Rect};
    use crate::text::{BitmapFont, FontSize};

    fn label(text: &str) -> FloatingLabel<PixelBuffer> {
        FloatingLabel::new(text)
            .with_font_size(FontSize::Tiny)
            .with_color(Color::WHITE)
    }

    /// Renderer that always fails
    struct Broken;

    impl TextRenderer<PixelBuffer> for Broken {
        fn render(&mut self, _style: &TextStyle, _text: &str) -> Result<PixelBuffer, RenderError> {
            Err(RenderError::EmptyText)
        }
    }

    #[test]
    fn test_shadow_style_adds_margin() {
        let surface = label("I").compose(&mut BitmapFont::new()).unwrap();

        assert_eq!((surface.width(), surface.height()), (9, 11));
        // Crisp text at the (2, 2) offset
        assert_eq!(surface.get_pixel(2, 2), Some(Color::WHITE));
        // Shadow bleeds into the margin
        let corner = surface.get_pixel(0, 0).unwrap();
        assert_eq!((corner.r, corner.g, corner.b), (0, 0, 0));
        assert!(corner.a > 0 && corner.a < 255);
    }

    #[test]
    fn test_boxed_style_fills_background() {
        let surface = label("I")
            .with_background(Color::rgb(0, 0, 255), 255)
            .with_border(3)
            .compose(&mut BitmapFont::new())
            .unwrap();

        assert_eq!((surface.width(), surface.height()), (11, 13));
        assert_eq!(surface.get_pixel(0, 0), Some(Color::rgb(0, 0, 255)));
        assert_eq!(surface.get_pixel(3, 3), Some(Color::WHITE));
        // 'I' row 1 is 00100, so (3, 4) shows the box
        assert_eq!(surface.get_pixel(3, 4), Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn test_boxed_style_keeps_translucent_box() {
        let surface = label("I")
            .with_background(Color::BLACK, 100)
            .compose(&mut BitmapFont::new())
            .unwrap();

        assert_eq!((surface.width(), surface.height()), (5, 7));
        assert_eq!(surface.get_pixel(1, 1), Some(Color::BLACK.with_alpha(100)));
        assert_eq!(surface.get_pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_trailing_newline_is_ignored_once() {
        let mut font = BitmapFont::new();
        let plain = label("AB").compose(&mut font).unwrap();
        let trailing = label("AB\n").compose(&mut font).unwrap();
        let doubled = label("AB\n\n").compose(&mut font).unwrap();

        assert_eq!(plain, trailing);
        assert!(doubled.height() > plain.height());
    }

    #[test]
    fn test_failed_render_composes_nothing() {
        assert!(label("A").compose(&mut Broken).is_none());
    }

    fn limited_label(text: &str) -> FloatingLabel<LimitedSurface> {
        FloatingLabel::new(text)
            .with_font_size(FontSize::Tiny)
            .with_color(Color::WHITE)
    }

    /// The bare 5x7 text of "I"
    fn plain_i(font: &mut BitmapFont) -> LimitedSurface {
        font.render(&limited_label("I").text_style(), "I").unwrap()
    }

    #[test]
    fn test_boxed_style_falls_back_to_text_when_box_fails() {
        let mut font = BitmapFont::new();

        // Room for the 5x7 text, not for the 11x13 box
        LimitedSurface::limit_pixels(5 * 7);
        let surface = limited_label("I")
            .with_background(Color::rgb(0, 0, 255), 255)
            .with_border(3)
            .compose(&mut font);
        LimitedSurface::limit_pixels(u32::MAX);

        assert_eq!(surface, Some(plain_i(&mut font)));
    }

    #[test]
    fn test_shadow_style_falls_back_to_text_when_shadow_fails() {
        let mut font = BitmapFont::new();

        // Room for the 5x7 text, not for the 9x11 shadow
        LimitedSurface::limit_pixels(5 * 7);
        let surface = limited_label("I").compose(&mut font);
        LimitedSurface::limit_pixels(u32::MAX);

        assert_eq!(surface, Some(plain_i(&mut font)));

        let full = limited_label("I").compose(&mut font).unwrap();
        assert_eq!((full.width(), full.height()), (9, 11));
    }

    #[test]
    fn test_max_size_falls_back_to_clip_rect() {
        let style = label("A").with_clip_rect(Rect::new(0, 0, 300, 200)).text_style();
        assert_eq!(style.max_width, Some(300));
        assert_eq!(style.max_height, Some(200));
        assert_eq!(style.alignment, Alignment::Left);

        let style = label("A")
            .with_clip_rect(Rect::new(0, 0, 300, 200))
            .with_max_size(Some(40), None)
            .text_style();
        assert_eq!(style.max_width, Some(40));
        assert_eq!(style.max_height, Some(200));

        assert_eq!(label("A").text_style().max_width, None);
    }
}
