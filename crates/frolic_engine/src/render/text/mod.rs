//! Text layout
//!
//! Lays a string out on a monospace bitmap font: every glyph occupies one
//! cell `size` pixels tall, lines break on `\n` and optionally wrap at a
//! maximum width.

use crate::assets::FontData;
use crate::foundation::math::{vec2, Rect, Vec2};

/// One positioned glyph
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphQuad {
    /// Character
    pub ch: char,
    /// Top-left corner relative to the text's top-left
    pub pos: Vec2,
    /// Cell size
    pub size: Vec2,
    /// Texture region, `None` when the font lacks the glyph
    pub region: Option<Rect>,
}

/// Laid-out text block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    /// Glyphs in reading order (whitespace omitted)
    pub glyphs: Vec<GlyphQuad>,
    /// Block width
    pub width: f32,
    /// Block height
    pub height: f32,
}

impl TextLayout {
    /// Block size
    pub fn size(&self) -> Vec2 {
        vec2(self.width, self.height)
    }
}

/// Lay out `text` with glyphs `size` pixels tall
///
/// Glyph width follows the font's aspect ratio; without a font cells are square.
pub fn layout(text: &str, size: f32, font: Option<&FontData>, wrap: Option<f32>) -> TextLayout {
    let glyph_w = font.map_or(size, |f| size * f.glyph_width / f.glyph_height.max(f32::EPSILON));
    let max_cols = wrap
        .filter(|w| *w > 0.0 && glyph_w > 0.0)
        .map(|w| ((w / glyph_w).floor() as usize).max(1));

    let mut lines: Vec<Vec<char>> = Vec::new();
    for line in text.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        match max_cols {
            Some(cols) if chars.len() > cols => lines.extend(chars.chunks(cols).map(<[char]>::to_vec)),
            _ => lines.push(chars),
        }
    }

    let mut glyphs = Vec::new();
    let mut widest = 0;
    for (row, line) in lines.iter().enumerate() {
        widest = widest.max(line.len());
        for (col, &ch) in line.iter().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            glyphs.push(GlyphQuad {
                ch,
                pos: vec2(col as f32 * glyph_w, row as f32 * size),
                size: vec2(glyph_w, size),
                region: font.and_then(|f| f.glyph_region(ch)),
            });
        }
    }

    TextLayout {
        glyphs,
        width: widest as f32 * glyph_w,
        height: lines.len() as f32 * size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureId;
    use approx::assert_relative_eq;

    #[test]
    fn test_layout_lines() {
        let text = layout("ab\ncde", 10.0, None, None);
        assert_relative_eq!(text.width, 30.0);
        assert_relative_eq!(text.height, 20.0);
        assert_eq!(text.glyphs.len(), 5);
        assert_eq!(text.glyphs[2].pos, vec2(0.0, 10.0));
    }

    #[test]
    fn test_layout_wraps_and_uses_font_aspect() {
        let font = FontData::grid(TextureId(0), "abcdef", 48.0, 16.0, 6.0, 8.0);
        let text = layout("abcdef", 16.0, Some(&font), Some(40.0));
        // glyphs are 12 wide, so three fit in 40
        assert_relative_eq!(text.width, 36.0);
        assert_relative_eq!(text.height, 32.0);
        assert!(text.glyphs.iter().all(|g| g.region.is_some()));
    }

    #[test]
    fn test_whitespace_has_no_glyph() {
        let text = layout("a b", 8.0, None, None);
        assert_eq!(text.glyphs.len(), 2);
        assert_relative_eq!(text.width, 24.0);
    }
}
