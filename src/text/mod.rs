//! Text rasterization
//!
//! Labels hand their text and a [`TextStyle`] to a [`TextRenderer`] and get
//! back a surface with the glyphs on a transparent background. Everything
//! else (shadow, tooltip box, fading) happens in the label layer.
//!
//! # Available Renderers
//!
//! - [`BitmapFont`] - procedural 5x7 pixel font, no font files needed

pub mod bitmap;
pub mod markup;

pub use bitmap::BitmapFont;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::surface::{Color, Surface};

/// Nominal font sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Tiny,
    #[default]
    Small,
    Normal,
    Large,
    XLarge,
}

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Everything a renderer needs to know besides the text itself
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: FontSize,
    /// Alignment of lines within the rendered block
    pub alignment: Alignment,
    pub color: Color,
    /// `None` = unbounded
    pub max_width: Option<u32>,
    /// `None` = unbounded
    pub max_height: Option<u32>,
    /// Cut overlong lines with "..." at the end
    pub ellipsize: bool,
    /// Hard wrap after this many characters, `None` = unlimited
    pub characters_per_line: Option<u32>,
    /// Interpret the text as markup
    pub markup: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font_size: FontSize::default(),
            alignment: Alignment::Left,
            color: Color::WHITE,
            max_width: None,
            max_height: None,
            ellipsize: true,
            characters_per_line: None,
            markup: false,
        }
    }
}

/// Turns a string into pixels
pub trait TextRenderer<S: Surface> {
    fn render(&mut self, style: &TextStyle, text: &str) -> Result<S, RenderError>;
}

impl<S: Surface, R: TextRenderer<S> + ?Sized> TextRenderer<S> for &mut R {
    fn render(&mut self, style: &TextStyle, text: &str) -> Result<S, RenderError> {
        (**self).render(style, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_serde_names() {
        let size: FontSize = serde_json::from_str("\"x_large\"").unwrap();
        assert_eq!(size, FontSize::XLarge);
        assert_eq!(serde_json::to_string(&FontSize::Tiny).unwrap(), "\"tiny\"");
    }

    #[test]
    fn test_default_alignment_is_center() {
        assert_eq!(Alignment::default(), Alignment::Center);
        assert_eq!(TextStyle::default().alignment, Alignment::Left);
    }
}
