//! # Frolic Engine
//!
//! A small 2D game-object and scene runtime.
//!
//! ## Features
//!
//! - **Game objects**: open bags of components, fields and tags
//! - **Tag-scoped events**: per-object behaviours plus scene-wide handlers
//!   addressed by tag
//! - **Collision**: axis-aligned areas with enter/overlap queries and solid
//!   resolution
//! - **Platformer bodies**: gravity, jumping and grounding
//! - **Scenes**: named scenes with timers, a camera, layers and deferred
//!   switching
//! - **Grid levels**: text-map levels from code or RON/TOML files
//! - **Debug overlay**: area outlines, an object inspector and an on-screen
//!   log
//!
//! Windowing, GPU and audio devices stay outside the crate behind the
//! [`RenderBackend`](render::RenderBackend) and
//! [`AudioBackend`](audio::AudioBackend) traits; headless implementations are
//! included.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frolic_engine::prelude::*;
//! use frolic_engine::render::HeadlessBackend;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut game = Game::headless(EngineConfig::default(), Assets::new());
//!     game.scene("main", |scene, _args| {
//!         let player = scene.add([pos(40.0, 0.0), rect(16.0, 16.0), area_auto(), body(), "player".into()])?;
//!         scene.add([pos(0.0, 200.0), rect(640.0, 16.0), area_auto(), solid()])?;
//!         scene.key_press(KeyCode::Space, move |scene| {
//!             if scene.is_grounded(player) {
//!                 scene.jump_default(player);
//!             }
//!             Ok(())
//!         });
//!         Ok(())
//!     });
//!     game.go_now("main", Vec::new())?;
//!
//!     let mut backend = HeadlessBackend::new(640.0, 480.0);
//!     for _ in 0..60 {
//!         game.frame(1.0 / 60.0, InputSnapshot::new(), &mut backend)?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

pub mod foundation;
pub mod config;
pub mod error;
pub mod object;
pub mod components;
pub mod scene;
pub mod physics;
pub mod render;
pub mod input;
pub mod assets;
pub mod audio;
pub mod game;
pub mod level;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use error::{EngineError, GameError};
pub use game::Game;
pub use scene::Scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::Assets,
        components::*,
        config::{Config, EngineConfig},
        error::{EngineError, GameError, HookResult},
        foundation::math::{vec2, Color, Origin, Rect, Vec2},
        game::{DebugFlags, FrameStatus, Game},
        input::{ButtonState, InputSnapshot, KeyCode, MouseButton},
        level::{Level, LevelConf, LevelFile},
        object::{Component, EventKey, GameObject, Lifecycle, ObjectId, TagFilter, Value},
        physics::{BodyConf, Side},
        scene::{FramePhase, Scene},
    };
}
