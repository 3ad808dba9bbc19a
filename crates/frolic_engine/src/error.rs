//! Engine and game-code error types

use crate::config::ConfigError;
use std::fmt;
use thiserror::Error;

/// Kind of named resource a lookup can fail on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Declared scene
    Scene,
    /// Sprite asset
    Sprite,
    /// Font asset
    Font,
    /// Sound asset
    Sound,
    /// Sprite animation
    Anim,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Scene => "scene",
            ResourceKind::Sprite => "sprite",
            ResourceKind::Font => "font",
            ResourceKind::Sound => "sound",
            ResourceKind::Anim => "anim",
        };
        f.write_str(name)
    }
}

/// Errors raised by or surfaced to game code
#[derive(Error, Debug)]
pub enum GameError {
    /// A resource referenced by name does not exist
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was looked up
        kind: ResourceKind,
        /// The name that failed
        name: String,
    },

    /// A composition argument had the wrong shape
    #[error("Invalid component: {0}")]
    InvalidComponent(String),

    /// Error raised by a game callback
    #[error("{0}")]
    Script(String),

    /// Configuration or level file error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl GameError {
    /// Build a [`GameError::NotFound`]
    pub fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Build a [`GameError::Script`] from any message
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script(message.into())
    }
}

/// Result type returned by every game callback
pub type HookResult = Result<(), GameError>;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A callback failed or panicked during a tick; the loop is halted
    #[error("Fatal error in frame {frame} ({phase}): {message}")]
    FatalTick {
        /// Frame number the failure happened in
        frame: u64,
        /// Scheduler phase that was running
        phase: String,
        /// Error or panic message
        message: String,
    },

    /// A scene name was never declared
    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    /// The frame loop was halted by an earlier fatal error
    #[error("Game loop halted")]
    Halted,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
