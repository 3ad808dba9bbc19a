//! Game assets
//!
//! Textures live in the host renderer; the game only registers the sprite
//! layouts and handles it draws with.

use frolic_engine::assets::{Assets, FontData, SoundBuffer, SpriteData, TextureId};
use frolic_engine::config::{Config, ConfigError};
use frolic_engine::level::LevelFile;

/// Texture handles
pub mod textures {
    use super::TextureId;

    /// Player sheet, 4x1 frames of 16x16
    pub const PLAYER: TextureId = TextureId(1);
    /// Tile sheet
    pub const TILES: TextureId = TextureId(2);
    /// Bitmap font
    pub const FONT: TextureId = TextureId(3);
}

/// Characters in the bitmap font, row by row
const FONT_CHARS: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// Built-in level
pub const LEVEL_1: &str = r#"(
    tile_width: 16.0,
    tile_height: 16.0,
    pos: [16.0, 64.0],
    rows: [
        "                            ",
        "      $$         $$$        ",
        "     ====       =====    $  ",
        "                        === ",
        "  @        ^                ",
        "=========  ====   ==========",
    ],
    tiles: {
        "=": [{"sprite": "ground", "area": true, "solid": true}],
        "$": ["coin", {"sprite": "coin", "area": true}],
        "^": ["danger", {"sprite": "spike", "area": true}],
    },
)"#;

/// Register every sprite, font and sound
pub fn load() -> Assets {
    let mut assets = Assets::new();
    assets.add_sprite(
        "player",
        SpriteData::sliced(textures::PLAYER, 64.0, 16.0, 4, 1)
            .with_anim("idle", 0, 0)
            .with_anim("run", 1, 3),
    );
    for (i, name) in ["ground", "coin", "spike", "enemy"].into_iter().enumerate() {
        let mut tile = SpriteData::sliced(textures::TILES, 64.0, 16.0, 4, 1);
        tile.frames = vec![tile.frames[i]];
        assets.add_sprite(name, tile);
    }
    assets.add_font("font", FontData::grid(textures::FONT, FONT_CHARS, 128.0, 48.0, 8.0, 8.0));
    assets.add_sound("coin", beep(880.0, 0.1));
    assets.add_sound("hit", beep(110.0, 0.3));
    log::info!("Registered game assets");
    assets
}

/// Load the level file at `path`, or the built-in level
pub fn level(path: Option<&str>) -> Result<LevelFile, ConfigError> {
    match path {
        Some(path) => {
            log::info!("Loading level from {path}");
            LevelFile::load_from_file(path)
        }
        None => LevelFile::from_ron_str(LEVEL_1),
    }
}

/// Square-wave tone
fn beep(freq: f32, seconds: f32) -> SoundBuffer {
    let sample_rate = 22_050;
    let count = (seconds * sample_rate as f32) as usize;
    let samples = (0..count)
        .map(|i| {
            let phase = (i as f32 * freq / sample_rate as f32).fract();
            if phase < 0.5 { 0.25 } else { -0.25 }
        })
        .collect();
    SoundBuffer {
        sample_rate,
        channels: 1,
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_level_parses() {
        let level = level(None).unwrap();
        assert_eq!(level.rows.len(), 6);
        assert!(level.conf().is_ok());
    }

    #[test]
    fn test_assets_are_registered() {
        let assets = load();
        assert_eq!(assets.sprite("player").unwrap().frames.len(), 4);
        assert_eq!(assets.sprite("spike").unwrap().frames.len(), 1);
        assert!(assets.font("font").is_ok());
        let coin = assets.sound("coin").unwrap();
        assert!((coin.duration() - 0.1).abs() < 0.01);
    }
}
