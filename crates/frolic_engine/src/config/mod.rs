//! Configuration system
//!
//! Any serde type implementing [`Config`] can be loaded from and saved to
//! `.toml` or `.ron` files. [`EngineConfig`] holds the engine-wide settings.

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Color;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            Self::from_toml_str(&contents)
        } else if path.ends_with(".ron") {
            Self::from_ron_str(&contents)
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Parse from TOML text
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse from RON text
    fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from file, falling back to defaults when the file is missing
    fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {path}, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logical screen width
    pub width: f32,

    /// Logical screen height
    pub height: f32,

    /// Initial gravity of every new scene
    pub gravity: f32,

    /// Maximum number of entries kept in the on-screen log
    pub log_max: usize,

    /// Start with the debug inspector and log enabled
    pub debug: bool,

    /// Background color passed to the renderer each frame
    pub clear_color: Color,

    /// Seed for the engine RNG (camera shake, helpers); random when unset
    pub rng_seed: Option<u64>,

    /// Font asset used by the debug overlay
    pub debug_font: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            gravity: 980.0,
            log_max: 8,
            debug: false,
            clear_color: Color::BLACK,
            rng_seed: None,
            debug_font: None,
        }
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_from_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            width = 320.0
            height = 240.0
            gravity = 1200.0
            rng_seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.width, 320.0);
        assert_eq!(config.gravity, 1200.0);
        assert_eq!(config.rng_seed, Some(7));
        // Unset fields fall back to defaults
        assert_eq!(config.log_max, 8);
    }

    #[test]
    fn test_engine_config_from_ron() {
        let config =
            EngineConfig::from_ron_str("(width: 800.0, debug: true, debug_font: Some(\"mono\"))")
                .unwrap();
        assert_eq!(config.width, 800.0);
        assert!(config.debug);
        assert_eq!(config.debug_font.as_deref(), Some("mono"));
    }

    #[test]
    fn test_unsupported_format() {
        let err = EngineConfig::default().save_to_file("settings.ini").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = EngineConfig::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
