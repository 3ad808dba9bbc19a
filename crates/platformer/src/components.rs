//! Game-specific components

use frolic_engine::prelude::*;
use frolic_engine::render::TextConf;

/// Field holding the patrol direction of an enemy
pub const DIR_FIELD: &str = "dir";

/// Field holding the patrol origin of an enemy
pub const HOME_FIELD: &str = "home";

/// The player: animated sprite, auto area and a platformer body
pub fn player(x: f32, y: f32, jump_force: f32) -> Component {
    Component::many([
        sprite("player"),
        pos(x, y),
        origin(Origin::Bot),
        area_auto(),
        body_with(BodyConf {
            jump_force,
            ..BodyConf::default()
        }),
        tag("player"),
    ])
}

/// Walks back and forth `range` pixels either side of where it was added
pub fn patrol(speed: f32, range: f32) -> Component {
    Component::new()
        .field(DIR_FIELD, 1.0)
        .on_add(|scene, id| {
            if let Some(obj) = scene.obj_mut(id) {
                let home = obj.pos.x;
                obj.set_field(HOME_FIELD, home);
            }
            Ok(())
        })
        .on_update(move |scene, id| {
            let dt = scene.dt();
            let Some(obj) = scene.obj_mut(id) else {
                return Ok(());
            };
            let home = obj.field(HOME_FIELD).and_then(Value::as_f32).unwrap_or(obj.pos.x);
            let mut dir = obj.field(DIR_FIELD).and_then(Value::as_f32).unwrap_or(1.0);
            obj.pos.x += dir * speed * dt;
            if (obj.pos.x - home).abs() > range {
                obj.pos.x = home + range * dir;
                dir = -dir;
            }
            obj.set_field(DIR_FIELD, dir);
            Ok(())
        })
}

/// Patrolling enemy that stands on the ground
pub fn enemy(x: f32, y: f32, speed: f32) -> Component {
    Component::many([
        sprite("enemy"),
        pos(x, y),
        origin(Origin::Bot),
        area_auto(),
        body(),
        tag("danger"),
        tag("enemy"),
        patrol(speed, 32.0),
    ])
}

/// Screen-space score label
pub fn score_label(score: i32) -> Component {
    Component::many([
        text_with(
            format!("score: {score}"),
            TextConf {
                size: 8.0,
                font: Some("font".to_string()),
                width: None,
            },
        ),
        pos(8.0, 8.0),
        layer("ui"),
        tag("score"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patrol_turns_at_range() {
        let mut scene = Scene::headless("test");
        let id = scene.add([pos(100.0, 0.0), patrol(10.0, 5.0)]).unwrap();
        for _ in 0..7 {
            scene.step(0.1).unwrap();
        }
        let obj = scene.obj(id).unwrap();
        assert_eq!(obj.field(DIR_FIELD).and_then(Value::as_f32), Some(-1.0));
        assert!(obj.pos.x <= 105.0);
    }

    #[test]
    fn test_player_is_tagged_and_has_a_body() {
        let mut scene = Scene::headless("test");
        let id = scene.add([player(10.0, 10.0, 300.0)]).unwrap();
        let obj = scene.obj(id).unwrap();
        assert!(obj.is("player"));
        assert_eq!(obj.body.as_ref().map(|b| b.jump_force), Some(300.0));
    }
}
