//! Bitmap Text Rendering
//!
//! Procedural text rendering using a 5x7 bitmap font. Each lit font pixel is
//! a `scale`x`scale` square filled onto a transparent surface, so the output
//! is crisp at every font size and needs no font files.
//!
//! # Layout
//!
//! - glyph advance: `(5 + char_spacing) * scale`
//! - line height: `(7 + line_spacing) * scale`
//! - the trailing spacing after the last glyph/line is not part of the surface

use super::markup;
use super::{Alignment, FontSize, TextRenderer, TextStyle};
use crate::error::RenderError;
use crate::surface::{Rect, Surface};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const ELLIPSIS: &str = "...";

/// 5x7 bitmap patterns (1 = pixel on), case-insensitive
fn glyph(c: char) -> &'static [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => &[0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => &[0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => &[0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => &[0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => &[0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => &[0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => &[0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => &[0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'J' => &[0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => &[0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => &[0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => &[0b10001, 0b11011, 0b10101, 0b10001, 0b10001, 0b10001, 0b10001],
        'N' => &[0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => &[0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => &[0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => &[0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => &[0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
        'T' => &[0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => &[0b10001, 0b10001, 0b10001, 0b10001, 0b10101, 0b11011, 0b10001],
        'X' => &[0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => &[0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => &[0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => &[0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => &[0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => &[0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => &[0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => &[0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => &[0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => &[0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => &[0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => &[0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => &[0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => &[0b00000, 0b00000, 0b00100, 0b00000, 0b00100, 0b00000, 0b00000],
        ';' => &[0b00000, 0b00000, 0b00100, 0b00000, 0b00100, 0b00100, 0b01000],
        ',' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100, 0b01000],
        '\'' => &[0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '"' => &[0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '?' => &[0b01110, 0b10001, 0b00001, 0b00110, 0b00100, 0b00000, 0b00100],
        '%' => &[0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '=' => &[0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '*' => &[0b00000, 0b10101, 0b01110, 0b11111, 0b01110, 0b10101, 0b00000],
        '#' => &[0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
        '/' => &[0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        '<' => &[0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010],
        '>' => &[0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000],
        '-' => &[0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '+' => &[0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '.' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        '!' => &[0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '(' => &[0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => &[0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        ' ' => &[0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        _ => &[0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111], // Full block for unknown
    }
}

/// Procedural 5x7 font renderer
#[derive(Debug, Clone)]
pub struct BitmapFont {
    /// Empty font pixels between glyphs
    pub char_spacing: u32,

    /// Empty font pixels between lines
    pub line_spacing: u32,
}

impl Default for BitmapFont {
    fn default() -> Self {
        BitmapFont {
            char_spacing: 1,
            line_spacing: 1,
        }
    }
}

impl BitmapFont {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen pixels per font pixel
    pub fn scale(size: FontSize) -> u32 {
        match size {
            FontSize::Tiny => 1,
            FontSize::Small => 2,
            FontSize::Normal => 3,
            FontSize::Large => 4,
            FontSize::XLarge => 5,
        }
    }

    fn advance(&self, scale: u32) -> u32 {
        (GLYPH_WIDTH + self.char_spacing) * scale
    }

    fn line_height(&self, scale: u32) -> u32 {
        (GLYPH_HEIGHT + self.line_spacing) * scale
    }

    /// Pixel width of a line of `chars` glyphs
    fn line_width(&self, chars: usize, scale: u32) -> u32 {
        (chars as u32 * self.advance(scale)).saturating_sub(self.char_spacing * scale)
    }

    /// Splits, wraps and truncates the text into the lines that will be drawn
    fn layout(&self, style: &TextStyle, text: &str) -> Result<Vec<Vec<char>>, RenderError> {
        let scale = Self::scale(style.font_size);

        let mut lines: Vec<Vec<char>> = Vec::new();
        for line in text.split('\n') {
            let chars: Vec<char> = line.chars().collect();
            match style.characters_per_line {
                Some(per_line) if per_line > 0 && !chars.is_empty() => {
                    lines.extend(chars.chunks(per_line as usize).map(|chunk| chunk.to_vec()));
                }
                _ => lines.push(chars),
            }
        }

        // A glyph fits when its pixels do, the trailing spacing may hang over
        let max_chars = style
            .max_width
            .map(|w| ((w + self.char_spacing * scale) / self.advance(scale)) as usize);
        let max_lines = style
            .max_height
            .map(|h| ((h + self.line_spacing * scale) / self.line_height(scale)) as usize);

        if max_chars == Some(0) || max_lines == Some(0) {
            return Err(RenderError::BoxTooSmall {
                max_width: style.max_width.unwrap_or(u32::MAX),
                max_height: style.max_height.unwrap_or(u32::MAX),
            });
        }

        if let Some(max_lines) = max_lines {
            if lines.len() > max_lines {
                lines.truncate(max_lines);
                if style.ellipsize {
                    if let Some(last) = lines.last_mut() {
                        last.extend(ELLIPSIS.chars());
                    }
                }
            }
        }

        if let Some(max_chars) = max_chars {
            for line in &mut lines {
                if line.len() > max_chars {
                    line.truncate(max_chars);
                    if style.ellipsize {
                        let keep = max_chars.saturating_sub(ELLIPSIS.len());
                        line.truncate(keep);
                        line.extend(ELLIPSIS.chars().take(max_chars - keep));
                    }
                }
            }
        }

        if lines.iter().all(|line| line.is_empty()) {
            return Err(RenderError::EmptyText);
        }

        Ok(lines)
    }

    fn draw_glyph<S: Surface>(&self, surface: &mut S, c: char, x: i32, y: i32, scale: u32, style: &TextStyle) -> Result<(), RenderError> {
        let pixel = scale as i32;

        for (row, &pattern_row) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH as i32 {
                if (pattern_row >> (GLYPH_WIDTH as i32 - 1 - col)) & 1 == 1 {
                    let rect = Rect::new(x + col * pixel, y + row as i32 * pixel, scale, scale);
                    surface.fill_rect(Some(rect), style.color)?;
                }
            }
        }

        Ok(())
    }
}

impl<S: Surface> TextRenderer<S> for BitmapFont {
    fn render(&mut self, style: &TextStyle, text: &str) -> Result<S, RenderError> {
        let text = markup::visible_text(text, style.markup);
        let lines = self.layout(style, &text)?;

        let scale = Self::scale(style.font_size);
        let longest = lines.iter().map(Vec::len).max().unwrap_or(0);
        let width = self.line_width(longest, scale);
        let height = (lines.len() as u32 * self.line_height(scale)).saturating_sub(self.line_spacing * scale);

        let mut surface = S::create(width, height)?;

        for (row, line) in lines.iter().enumerate() {
            let line_width = self.line_width(line.len(), scale);
            let x = match style.alignment {
                Alignment::Left => 0,
                Alignment::Center => ((width - line_width) / 2) as i32,
                Alignment::Right => (width - line_width) as i32,
            };
            let y = row as i32 * self.line_height(scale) as i32;

            for (i, &c) in line.iter().enumerate() {
                if c != ' ' {
                    self.draw_glyph(&mut surface, c, x + (i as u32 * self.advance(scale)) as i32, y, scale, style)?;
                }
            }
        }

        Ok(surface)
    }
}
