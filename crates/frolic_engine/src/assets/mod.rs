//! Asset records
//!
//! Assets arrive already decoded: the host uploads textures to its renderer
//! and registers the resulting handles together with frame rectangles,
//! glyph maps and audio samples here. Lookups by name that miss return
//! [`GameError::NotFound`].

use crate::error::{GameError, ResourceKind};
use crate::foundation::math::{vec2, Rect, Vec2};
use std::collections::HashMap;

/// Opaque renderer texture handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Named frame range of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteAnim {
    /// First frame index
    pub from: usize,
    /// Last frame index, inclusive
    pub to: usize,
}

/// Decoded sprite: a texture plus frame regions
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteData {
    /// Texture the frames live on
    pub texture: TextureId,
    /// Frame width in pixels
    pub width: f32,
    /// Frame height in pixels
    pub height: f32,
    /// Frame regions in texture (uv) space
    pub frames: Vec<Rect>,
    /// Named animations
    pub anims: HashMap<String, SpriteAnim>,
}

impl SpriteData {
    /// Sprite whose texture is cut into an `x_slices` by `y_slices` grid
    pub fn sliced(texture: TextureId, tex_width: f32, tex_height: f32, x_slices: usize, y_slices: usize) -> Self {
        let xs = x_slices.max(1);
        let ys = y_slices.max(1);
        let (fw, fh) = (1.0 / xs as f32, 1.0 / ys as f32);
        let frames = (0..ys)
            .flat_map(|j| (0..xs).map(move |i| Rect::from_size(i as f32 * fw, j as f32 * fh, fw, fh)))
            .collect();
        Self {
            texture,
            width: tex_width / xs as f32,
            height: tex_height / ys as f32,
            frames,
            anims: HashMap::new(),
        }
    }

    /// Builder: add a named animation
    pub fn with_anim(mut self, name: impl Into<String>, from: usize, to: usize) -> Self {
        self.anims.insert(name.into(), SpriteAnim { from, to });
        self
    }

    /// Frame size in pixels
    pub fn size(&self) -> Vec2 {
        vec2(self.width, self.height)
    }
}

/// Decoded bitmap font laid out on a regular grid
#[derive(Debug, Clone, PartialEq)]
pub struct FontData {
    /// Font texture
    pub texture: TextureId,
    /// Glyph to top-left uv offset
    pub glyphs: HashMap<char, Vec2>,
    /// Glyph cell size in uv space
    pub cell: Vec2,
    /// Glyph size in pixels
    pub glyph_width: f32,
    /// Glyph height in pixels
    pub glyph_height: f32,
}

impl FontData {
    /// Font whose glyphs fill the texture row by row, `glyph_width` x `glyph_height` each
    pub fn grid(
        texture: TextureId,
        chars: &str,
        tex_width: f32,
        tex_height: f32,
        glyph_width: f32,
        glyph_height: f32,
    ) -> Self {
        let cols = (tex_width / glyph_width).floor().max(1.0) as usize;
        let cell = vec2(glyph_width / tex_width, glyph_height / tex_height);
        let glyphs = chars
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let (col, row) = (i % cols, i / cols);
                (c, vec2(col as f32 * cell.x, row as f32 * cell.y))
            })
            .collect();
        Self {
            texture,
            glyphs,
            cell,
            glyph_width,
            glyph_height,
        }
    }

    /// Region of a glyph in uv space
    pub fn glyph_region(&self, c: char) -> Option<Rect> {
        self.glyphs
            .get(&c)
            .map(|uv| Rect::from_size(uv.x, uv.y, self.cell.x, self.cell.y))
    }
}

/// Decoded audio samples
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoundBuffer {
    /// Samples per second
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
    /// Interleaved samples
    pub samples: Vec<f32>,
}

impl SoundBuffer {
    /// Length in seconds
    pub fn duration(&self) -> f32 {
        let frames = self.samples.len() as f32 / f32::from(self.channels.max(1));
        frames / self.sample_rate.max(1) as f32
    }
}

/// Store of decoded assets, keyed by name
#[derive(Debug, Default)]
pub struct Assets {
    sprites: HashMap<String, SpriteData>,
    fonts: HashMap<String, FontData>,
    sounds: HashMap<String, SoundBuffer>,
}

impl Assets {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sprite
    pub fn add_sprite(&mut self, name: impl Into<String>, sprite: SpriteData) {
        let name = name.into();
        log::debug!("Registered sprite '{name}' ({} frames)", sprite.frames.len());
        self.sprites.insert(name, sprite);
    }

    /// Register a font
    pub fn add_font(&mut self, name: impl Into<String>, font: FontData) {
        self.fonts.insert(name.into(), font);
    }

    /// Register a sound
    pub fn add_sound(&mut self, name: impl Into<String>, sound: SoundBuffer) {
        self.sounds.insert(name.into(), sound);
    }

    /// Look up a sprite
    pub fn sprite(&self, name: &str) -> Result<&SpriteData, GameError> {
        self.sprites
            .get(name)
            .ok_or_else(|| GameError::not_found(ResourceKind::Sprite, name))
    }

    /// Look up a font
    pub fn font(&self, name: &str) -> Result<&FontData, GameError> {
        self.fonts
            .get(name)
            .ok_or_else(|| GameError::not_found(ResourceKind::Font, name))
    }

    /// Look up a sound
    pub fn sound(&self, name: &str) -> Result<&SoundBuffer, GameError> {
        self.sounds
            .get(name)
            .ok_or_else(|| GameError::not_found(ResourceKind::Sound, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sliced_sprite_frames() {
        let sprite = SpriteData::sliced(TextureId(1), 64.0, 32.0, 4, 2).with_anim("run", 0, 3);
        assert_eq!(sprite.frames.len(), 8);
        assert_relative_eq!(sprite.width, 16.0);
        assert_relative_eq!(sprite.height, 16.0);
        assert_eq!(sprite.frames[5], Rect::from_size(0.25, 0.5, 0.25, 0.5));
        assert_eq!(sprite.anims["run"], SpriteAnim { from: 0, to: 3 });
    }

    #[test]
    fn test_grid_font_regions() {
        let font = FontData::grid(TextureId(2), "abcd", 16.0, 16.0, 8.0, 8.0);
        assert_eq!(font.glyph_region('c'), Some(Rect::from_size(0.0, 0.5, 0.5, 0.5)));
        assert_eq!(font.glyph_region('z'), None);
    }

    #[test]
    fn test_missing_assets_are_not_found() {
        let assets = Assets::new();
        let err = assets.sprite("hero").unwrap_err();
        assert!(matches!(
            err,
            GameError::NotFound {
                kind: ResourceKind::Sprite,
                ..
            }
        ));
        assert!(assets.sound("jump").is_err());
    }

    #[test]
    fn test_sound_duration() {
        let sound = SoundBuffer {
            sample_rate: 10,
            channels: 2,
            samples: vec![0.0; 40],
        };
        assert_relative_eq!(sound.duration(), 2.0);
    }
}
