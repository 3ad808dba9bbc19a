//! Platformer body: gravity, platform tracking and jumping

use crate::error::HookResult;
use crate::object::{ObjectId, Value};
use crate::physics::resolve::{Side, SOLID_TAG};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};

/// Default jump impulse
pub const DEFAULT_JUMP_FORCE: f32 = 480.0;

/// Default maximum fall speed
pub const DEFAULT_MAX_VEL: f32 = 960.0;

/// Tolerance for a body to keep resting on its platform
const REST_EPSILON: f32 = 0.01;

/// Body options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConf {
    /// Impulse applied by [`Scene::jump_default`]
    pub jump_force: f32,
    /// Fall speed cap
    pub max_vel: f32,
}

impl Default for BodyConf {
    fn default() -> Self {
        Self {
            jump_force: DEFAULT_JUMP_FORCE,
            max_vel: DEFAULT_MAX_VEL,
        }
    }
}

/// Platformer body state
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Vertical velocity, positive is down
    pub vel_y: f32,
    /// Default jump impulse
    pub jump_force: f32,
    /// Fall speed cap
    pub max_vel: f32,
    cur_platform: Option<ObjectId>,
}

impl Body {
    /// Body at rest
    pub fn new(conf: BodyConf) -> Self {
        Self {
            vel_y: 0.0,
            jump_force: conf.jump_force,
            max_vel: conf.max_vel,
            cur_platform: None,
        }
    }

    /// Platform the body stands on
    pub fn platform(&self) -> Option<ObjectId> {
        self.cur_platform
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new(BodyConf::default())
    }
}

impl Scene {
    /// Whether `id` rests on `platform`: touching or overlapping vertically
    /// with a positive horizontal overlap, on the same layer
    fn rests_on(&self, id: ObjectId, platform: ObjectId) -> bool {
        let (Some(me), Some(them)) = (self.obj(id), self.obj(platform)) else {
            return false;
        };
        if !self.same_layer(me, them) {
            return false;
        }
        match (self.world_area_of(me), self.world_area_of(them)) {
            (Some(a), Some(b)) => a.rests_on(&b, REST_EPSILON),
            _ => false,
        }
    }

    /// First solid whose top the body's bottom edge sits on
    fn next_platform(&self, id: ObjectId) -> Option<ObjectId> {
        let me = self.obj(id)?;
        let feet = self.world_area_of(me)?;
        self.get(SOLID_TAG).into_iter().find(|&other| {
            other != id
                && self.rests_on(id, other)
                && self
                    .world_area(other)
                    .is_some_and(|top| (feet.p2.y - top.p1.y).abs() <= REST_EPSILON)
        })
    }

    /// One tick of body integration
    pub(crate) fn step_body(&mut self, id: ObjectId) -> HookResult {
        let dt = self.dt();
        let gravity = self.gravity();
        let Some(mut body) = self.obj(id).and_then(|obj| obj.body.clone()) else {
            return Ok(());
        };

        if let Some(obj) = self.obj_mut(id) {
            obj.pos.y += body.vel_y * dt;
        }
        let contacts = self.resolve(id);

        let mut just_left = None;
        if let Some(platform) = body.cur_platform {
            match self.current_id(platform) {
                Some(p) if self.rests_on(id, p) => body.cur_platform = Some(p),
                // walked onto a neighbouring solid: still the same landing
                _ => match self.next_platform(id) {
                    Some(next) => body.cur_platform = Some(next),
                    None => {
                        body.cur_platform = None;
                        just_left = Some(platform);
                    }
                },
            }
        }

        let mut events = Vec::new();
        if body.cur_platform.is_none() {
            body.vel_y = (body.vel_y + gravity * dt).min(body.max_vel);
            for contact in &contacts {
                match contact.side {
                    Side::Bottom if body.vel_y > 0.0 => {
                        body.cur_platform = Some(contact.other);
                        body.vel_y = 0.0;
                        if just_left != Some(contact.other) {
                            events.push(("grounded", contact.other));
                        }
                    }
                    Side::Top if body.vel_y < 0.0 => {
                        body.vel_y = 0.0;
                        events.push(("headbump", contact.other));
                    }
                    _ => {}
                }
            }
        }

        if let Some(obj) = self.obj_mut(id) {
            obj.body = Some(body);
        }
        for (event, other) in events {
            self.trigger(id, event, &[Value::Object(other)])?;
        }
        Ok(())
    }

    /// Whether the body stands on a platform
    pub fn is_grounded(&self, id: ObjectId) -> bool {
        self.obj(id)
            .and_then(|obj| obj.body.as_ref())
            .is_some_and(|body| body.cur_platform.is_some())
    }

    /// Leave the platform with an upward impulse
    pub fn jump(&mut self, id: ObjectId, force: f32) {
        if let Some(body) = self.obj_mut(id).and_then(|obj| obj.body.as_mut()) {
            body.cur_platform = None;
            body.vel_y = -force;
        }
    }

    /// Jump with the body's configured force
    pub fn jump_default(&mut self, id: ObjectId) {
        let force = self
            .obj(id)
            .and_then(|obj| obj.body.as_ref())
            .map(|body| body.jump_force);
        if let Some(force) = force {
            self.jump(id, force);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{area, body, pos, solid};
    use crate::foundation::math::{vec2, Vec2};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn world() -> (Scene, ObjectId, ObjectId) {
        let mut scene = Scene::headless("test");
        let floor = scene
            .add([pos(0.0, 100.0), area(Vec2::zeros(), vec2(200.0, 20.0)), solid()])
            .unwrap();
        let player = scene
            .add([pos(50.0, 60.0), area(Vec2::zeros(), vec2(10.0, 10.0)), body(), "player".into()])
            .unwrap();
        (scene, floor, player)
    }

    #[test]
    fn test_grounded_fires_once() {
        let (mut scene, floor, player) = world();
        let landings = Rc::new(RefCell::new(Vec::new()));
        let log = landings.clone();
        scene.on("grounded", "player", move |_, _, args| {
            log.borrow_mut().push(args[0].clone());
            Ok(())
        });

        for _ in 0..120 {
            scene.step(1.0 / 60.0).unwrap();
        }

        assert_eq!(*landings.borrow(), vec![Value::Object(floor)]);
        assert!(scene.is_grounded(player));
        let obj = scene.obj(player).unwrap();
        assert_relative_eq!(obj.pos.y, 90.0, epsilon = 1e-3);
        assert_relative_eq!(obj.body.as_ref().unwrap().vel_y, 0.0);
    }

    #[test]
    fn test_walking_across_tiles_grounds_once() {
        let mut scene = Scene::headless("test");
        for i in 0..10 {
            scene
                .add([pos(i as f32 * 16.0, 100.0), area(Vec2::zeros(), vec2(16.0, 16.0)), solid()])
                .unwrap();
        }
        let player = scene
            .add([pos(0.0, 90.0), area(Vec2::zeros(), vec2(10.0, 10.0)), body(), "player".into()])
            .unwrap();
        scene.action("player", |scene, id| {
            if let Some(obj) = scene.obj_mut(id) {
                obj.pos.x += 1.0;
            }
            Ok(())
        });
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        scene.on("grounded", "player", move |_, _, _| {
            *c.borrow_mut() += 1;
            Ok(())
        });

        for _ in 0..120 {
            scene.step(1.0 / 60.0).unwrap();
            if *count.borrow() > 0 {
                assert!(scene.is_grounded(player));
            }
        }

        assert_eq!(*count.borrow(), 1);
        let obj = scene.obj(player).unwrap();
        assert!(obj.pos.x > 100.0);
        assert_relative_eq!(obj.pos.y, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_fall_speed_is_capped() {
        let mut scene = Scene::headless("test");
        let id = scene.add([pos(0.0, 0.0), body()]).unwrap();
        for _ in 0..10 {
            scene.step(0.5).unwrap();
        }
        let vel = scene.obj(id).unwrap().body.as_ref().unwrap().vel_y;
        assert_relative_eq!(vel, DEFAULT_MAX_VEL);
    }

    #[test]
    fn test_jump_leaves_platform_and_lands_again() {
        let (mut scene, _, player) = world();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        scene.on("grounded", "player", move |_, _, _| {
            *c.borrow_mut() += 1;
            Ok(())
        });

        for _ in 0..60 {
            scene.step(1.0 / 60.0).unwrap();
        }
        scene.jump_default(player);
        assert!(!scene.is_grounded(player));
        scene.step(1.0 / 60.0).unwrap();
        assert!(scene.obj(player).unwrap().pos.y < 90.0);

        for _ in 0..120 {
            scene.step(1.0 / 60.0).unwrap();
        }
        assert!(scene.is_grounded(player));
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_headbump_stops_jump() {
        let mut scene = Scene::headless("test");
        let ceiling = scene
            .add([pos(0.0, 0.0), area(Vec2::zeros(), vec2(100.0, 10.0)), solid()])
            .unwrap();
        let player = scene
            .add([pos(10.0, 14.0), area(Vec2::zeros(), vec2(10.0, 10.0)), body()])
            .unwrap();
        let bumps = Rc::new(RefCell::new(Vec::new()));
        let b = bumps.clone();
        scene.on("headbump", "*", move |_, _, args| {
            b.borrow_mut().push(args[0].clone());
            Ok(())
        });

        scene.jump(player, 600.0);
        scene.step(0.01).unwrap();

        assert_eq!(*bumps.borrow(), vec![Value::Object(ceiling)]);
        let obj = scene.obj(player).unwrap();
        assert_relative_eq!(obj.pos.y, 10.0, epsilon = 1e-3);
        assert_relative_eq!(obj.body.as_ref().unwrap().vel_y, 0.0);
    }

    #[test]
    fn test_platform_destroyed_starts_fall() {
        let (mut scene, floor, player) = world();
        for _ in 0..60 {
            scene.step(1.0 / 60.0).unwrap();
        }
        assert!(scene.is_grounded(player));
        scene.destroy(floor).unwrap();
        scene.step(1.0 / 60.0).unwrap();
        assert!(!scene.is_grounded(player));
        assert!(scene.obj(player).unwrap().body.as_ref().unwrap().vel_y > 0.0);
    }
}
