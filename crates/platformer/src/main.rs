//! Headless platformer demo
//!
//! Runs the game for a fixed number of frames with a scripted player that
//! holds right and jumps at regular intervals, then logs the outcome.
//! Settings come from `platformer.toml` next to the binary when present.

mod assets;
mod components;
mod config;

use crate::components::{enemy, player, score_label};
use crate::config::{Controls, GameConfig, GameplayConfig};
use frolic_engine::audio::{NullAudio, PlayParams};
use frolic_engine::foundation::logging;
use frolic_engine::input::InputManager;
use frolic_engine::prelude::*;
use frolic_engine::render::{Drawable, HeadlessBackend};

const CONFIG_PATH: &str = "platformer.toml";

/// Scene data key of the score
const SCORE: &str = "score";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = GameConfig::load_or_default(CONFIG_PATH)?;
    let controls = config.controls.keys()?;
    let level = assets::level(config.gameplay.level.as_deref())?;

    let mut game = Game::new(config.engine.clone(), assets::load(), Box::new(NullAudio::new()));
    declare_main(&mut game, config.gameplay.clone(), controls, level);
    game.scene("win", |scene, args| {
        let score = args.first().and_then(Value::as_f32).unwrap_or_default();
        scene.add([text(format!("you win! score: {score}")), pos(200.0, 200.0)])?;
        scene.log(format!("Level cleared with {score} points"));
        Ok(())
    });
    game.go_now("main", Vec::new())?;

    let mut input = InputManager::new();
    let mut backend = HeadlessBackend::new(config.engine.width, config.engine.height);
    for frame in 0..config.run.frames {
        autopilot(&mut input, frame, controls);
        let snapshot = input.snapshot();
        if snapshot.key_pressed(controls.debug) {
            game.debug_mut().flags.toggle(DebugFlags::SHOW_AREAS);
        }
        if game.frame(config.run.frame_time, snapshot, &mut backend)? == FrameStatus::Halted {
            break;
        }
    }

    log::info!(
        "Ran {} frames, ended in scene '{}', {} quads submitted",
        game.frame_count(),
        game.current_name().unwrap_or("none"),
        backend.quads().len()
    );
    Ok(())
}

/// Hold right, tap jump every 40 frames
fn autopilot(input: &mut InputManager, frame: u64, controls: Controls) {
    if frame == 0 {
        input.handle_key_input(controls.right, true, false);
    }
    match frame % 40 {
        0 => input.handle_key_input(controls.jump, true, false),
        5 => input.handle_key_input(controls.jump, false, false),
        _ => {}
    }
}

fn declare_main(game: &mut Game, gameplay: GameplayConfig, controls: Controls, level: LevelFile) {
    game.scene("main", move |scene, _args| {
        scene.layers(&["game", "ui"], "game");
        scene.cam_ignore(&["ui"]);
        scene.set_data(SCORE, 0);

        let map = scene.add_level_file(&level)?;
        let start = level
            .rows
            .iter()
            .enumerate()
            .find_map(|(y, row)| row.find('@').map(|x| vec2(x as f32, y as f32)))
            .unwrap_or_else(Vec2::zeros);
        let at = map.get_pos(start);
        let hero = scene.add([player(at.x, at.y, gameplay.jump_force)])?;
        let patrol_at = map.get_pos(vec2(20.0, 5.0));
        scene.add([enemy(patrol_at.x, patrol_at.y, gameplay.enemy_speed)])?;
        scene.add([score_label(0)])?;

        let speed = gameplay.move_speed;
        scene.key_down(controls.left, move |scene| {
            let dt = scene.dt();
            if let Some(obj) = scene.obj_mut(hero) {
                obj.pos.x -= speed * dt;
            }
            Ok(())
        });
        scene.key_down(controls.right, move |scene| {
            let dt = scene.dt();
            if let Some(obj) = scene.obj_mut(hero) {
                obj.pos.x += speed * dt;
            }
            Ok(())
        });
        scene.key_press(controls.jump, move |scene| {
            if scene.is_grounded(hero) {
                scene.jump_default(hero);
            }
            Ok(())
        });
        scene.on("grounded", "player", |scene, id, _| scene.play_anim(id, "idle", true));
        scene.on("headbump", "player", |scene, _, _| {
            scene.shake(4.0);
            Ok(())
        });

        scene.overlaps("player", "coin", |scene, _, coin| {
            scene.destroy(coin)?;
            scene.play("coin", &PlayParams::default());
            let score = scene.data(SCORE).and_then(Value::as_f32).unwrap_or_default() + 1.0;
            scene.set_data(SCORE, score);
            for label in scene.get("score") {
                if let Some(Drawable::Text(state)) = scene.obj_mut(label).and_then(|obj| obj.drawable.as_mut()) {
                    state.text = format!("score: {score}");
                }
            }
            if scene.get("coin").is_empty() {
                scene.go("win", vec![score.into()]);
            }
            Ok(())
        });
        scene.collides("player", "danger", |scene, _, _| {
            scene.play("hit", &PlayParams::default());
            scene.log("Ouch! Restarting the level");
            scene.reload();
            Ok(())
        });

        let fall_limit = gameplay.fall_limit;
        scene.action("player", move |scene, id| {
            let Some(at) = scene.obj(id).map(|obj| obj.pos) else {
                return Ok(());
            };
            scene.cam_pos(at);
            if at.y > fall_limit {
                scene.log("Fell off the world");
                scene.reload();
            }
            Ok(())
        });
        Ok(())
    });
}
