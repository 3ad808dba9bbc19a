//! Game configuration, loaded from `platformer.toml` when present

use frolic_engine::config::Config;
use serde::{Deserialize, Serialize};
use frolic_engine::input::KeyCode;
use frolic_engine::EngineConfig;

/// Game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Engine settings
    pub engine: EngineConfig,

    /// Gameplay settings
    pub gameplay: GameplayConfig,

    /// Controls settings
    pub controls: ControlsConfig,

    /// Headless run settings
    pub run: RunConfig,
}

impl Config for GameConfig {}

/// Gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Horizontal player speed in pixels per second
    pub move_speed: f32,

    /// Player jump impulse
    pub jump_force: f32,

    /// Enemy patrol speed
    pub enemy_speed: f32,

    /// Falling below this y loses the game
    pub fall_limit: f32,

    /// Level file; the built-in level when unset
    pub level: Option<String>,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            move_speed: 120.0,
            jump_force: 420.0,
            enemy_speed: 40.0,
            fall_limit: 640.0,
            level: None,
        }
    }
}

/// Controls configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Move left key
    pub left_key: String,

    /// Move right key
    pub right_key: String,

    /// Jump key
    pub jump_key: String,

    /// Debug inspector toggle key
    pub debug_key: String,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            left_key: "Left".to_string(),
            right_key: "Right".to_string(),
            jump_key: "Space".to_string(),
            debug_key: "F1".to_string(),
        }
    }
}

/// Parsed key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Move left
    pub left: KeyCode,
    /// Move right
    pub right: KeyCode,
    /// Jump
    pub jump: KeyCode,
    /// Toggle the inspector
    pub debug: KeyCode,
}

impl ControlsConfig {
    /// Parse the key names
    pub fn keys(&self) -> Result<Controls, String> {
        Ok(Controls {
            left: self.left_key.parse()?,
            right: self.right_key.parse()?,
            jump: self.jump_key.parse()?,
            debug: self.debug_key.parse()?,
        })
    }
}

/// Headless run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Frames to simulate
    pub frames: u64,

    /// Seconds per frame
    pub frame_time: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_time: 1.0 / 60.0,
        }
    }
}
