//! Built-in 5x7 pixel font
//!
//! Text is turned into [`UiQuad`]s, one per horizontal run of lit pixels, so
//! menus and score labels need no texture atlas.

use glam::{Vec2, Vec4};

use super::rect::UiQuad;

pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;
/// Horizontal advance per character, including one pixel of spacing
pub const ADVANCE: usize = GLYPH_WIDTH + 1;

/// Rows top to bottom, bit 4 is the leftmost pixel
#[rustfmt::skip]
pub fn glyph(c: char) -> [u8; GLYPH_HEIGHT] {
    match c.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        ' ' => [0; GLYPH_HEIGHT],
        _ => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
    }
}

/// Width of `text` in font pixels
#[must_use]
pub fn text_width(text: &str) -> usize {
    let count = text.chars().count();
    if count == 0 { 0 } else { count * ADVANCE - 1 }
}

/// Size of one font pixel in menu space for a glyph `height` units tall,
/// kept square on screen
#[must_use]
pub fn pixel_size(height: f32, viewport: Vec2) -> Vec2 {
    let y = height / GLYPH_HEIGHT as f32;
    Vec2::new(y * viewport.y / viewport.x.max(1.0), y)
}

/// Quads for `text` with its top-left corner at `origin`
pub fn layout_text(text: &str, origin: Vec2, pixel: Vec2, color: Vec4) -> Vec<UiQuad> {
    let mut quads = Vec::new();
    for (index, c) in text.chars().enumerate() {
        let left = origin.x + (index * ADVANCE) as f32 * pixel.x;
        for (row, bits) in glyph(c).iter().enumerate() {
            let top = origin.y - row as f32 * pixel.y;
            let mut column = 0;
            while column < GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - column)) == 0 {
                    column += 1;
                    continue;
                }
                let start = column;
                while column < GLYPH_WIDTH && bits & (1 << (GLYPH_WIDTH - 1 - column)) != 0 {
                    column += 1;
                }
                quads.push(UiQuad::new(
                    Vec2::new(left + start as f32 * pixel.x, top - pixel.y),
                    Vec2::new(left + column as f32 * pixel.x, top),
                    color,
                ));
            }
        }
    }
    quads
}

/// Quads for `text` centered on `center`
pub fn layout_text_centered(text: &str, center: Vec2, pixel: Vec2, color: Vec4) -> Vec<UiQuad> {
    let size = Vec2::new(text_width(text) as f32, GLYPH_HEIGHT as f32) * pixel;
    let origin = Vec2::new(center.x - size.x * 0.5, center.y + size.y * 0.5);
    layout_text(text, origin, pixel, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("A"), 5);
        assert_eq!(text_width("NEW GAME"), 47);
    }

    #[test]
    fn test_runs_are_merged() {
        // 'T' is one five pixel bar on top and a single pixel stem below
        let quads = layout_text("T", Vec2::new(0.0, 7.0), Vec2::ONE, Vec4::ONE);
        assert_eq!(quads.len(), GLYPH_HEIGHT);
        assert_eq!(quads[0].min, Vec2::new(0.0, 6.0));
        assert_eq!(quads[0].max, Vec2::new(5.0, 7.0));
        assert_eq!(quads[1].min, Vec2::new(2.0, 5.0));
        assert_eq!(quads[1].max, Vec2::new(3.0, 6.0));
    }

    #[test]
    fn test_space_and_case() {
        assert!(layout_text(" ", Vec2::ZERO, Vec2::ONE, Vec4::ONE).is_empty());
        assert_eq!(glyph('a'), glyph('A'));
    }

    #[test]
    fn test_centered_text_is_symmetric() {
        let quads = layout_text_centered("O", Vec2::new(10.0, 10.0), Vec2::ONE, Vec4::ONE);
        let min_x = quads.iter().map(|q| q.min.x).fold(f32::MAX, f32::min);
        let max_x = quads.iter().map(|q| q.max.x).fold(f32::MIN, f32::max);
        assert!((min_x - 7.5).abs() < 1e-6);
        assert!((max_x - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_size_is_square_on_screen() {
        let pixel = pixel_size(0.07, Vec2::new(1600.0, 800.0));
        assert!((pixel.y - 0.01).abs() < 1e-6);
        assert!((pixel.x * 1600.0 - pixel.y * 800.0).abs() < 1e-6);
    }
}
