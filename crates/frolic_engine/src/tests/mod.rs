//! Whole-scene behaviour tests

use crate::components::{area, body, pos, solid};
use crate::foundation::math::{vec2, Vec2};
use crate::level::LevelConf;
use crate::object::ObjectId;
use crate::scene::Scene;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;

const DT: f32 = 1.0 / 60.0;

fn boxed(scene: &mut Scene, at: Vec2, size: Vec2, tag: &str) -> ObjectId {
    scene
        .add([pos(at.x, at.y), area(Vec2::zeros(), size), tag.into()])
        .unwrap()
}

/// Whole-pixel box so separation is exact
fn random_box(rng: &mut StdRng) -> (Vec2, Vec2) {
    let mut n = |lo: i32, hi: i32| rng.gen_range(lo..hi) as f32;
    (vec2(n(-20, 20), n(-20, 20)), vec2(n(1, 20), n(1, 20)))
}

#[test]
fn test_collision_queries_are_symmetric() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut scene = Scene::headless("test");
    for _ in 0..200 {
        let (p1, s1) = random_box(&mut rng);
        let (p2, s2) = random_box(&mut rng);
        let a = boxed(&mut scene, p1, s1, "a");
        let b = boxed(&mut scene, p2, s2, "b");
        assert_eq!(scene.is_collided(a, b), scene.is_collided(b, a));
        assert_eq!(scene.is_overlapped(a, b), scene.is_overlapped(b, a));
        scene.destroy_all("*").unwrap();
    }
}

#[test]
fn test_destroy_twice_is_a_no_op() {
    let mut scene = Scene::headless("test");
    let destroyed = Rc::new(RefCell::new(0));
    let d = destroyed.clone();
    scene.on_destroy("foo", move |_, _| {
        *d.borrow_mut() += 1;
        Ok(())
    });
    let id = scene.add(["foo"]).unwrap();

    scene.destroy(id).unwrap();
    scene.destroy(id).unwrap();
    assert_eq!(*destroyed.borrow(), 1);
    assert!(!scene.exists(id));
}

#[test]
fn test_tag_checks_require_every_tag() {
    let mut scene = Scene::headless("test");
    let id = scene.add(["foo"]).unwrap();
    let obj = scene.obj(id).unwrap();
    assert!(obj.is("foo"));
    assert!(!obj.is_all(&["foo", "bar"]));
    assert!(scene.get(["foo", "bar"]).is_empty());

    scene.obj_mut(id).unwrap().add_tag("bar");
    assert!(scene.obj(id).unwrap().is_all(&["foo", "bar"]));
    assert_eq!(scene.get(["foo", "bar"]), vec![id]);
}

#[test]
fn test_resolve_separates_a_single_pair() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let mut scene = Scene::headless("test");
        let (p1, s1) = random_box(&mut rng);
        let (p2, s2) = random_box(&mut rng);
        let mover = boxed(&mut scene, p1, s1, "solid");
        let wall = boxed(&mut scene, p2, s2, "solid");

        scene.resolve(mover);
        let a = scene.world_area(mover).unwrap();
        let b = scene.world_area(wall).unwrap();
        assert!(!a.intersects(&b), "{a:?} still intersects {b:?}");
    }
}

#[test]
fn test_collide_fires_once_per_touching_interval() {
    let mut scene = Scene::headless("test");
    boxed(&mut scene, vec2(0.0, 0.0), vec2(10.0, 10.0), "a");
    let b = boxed(&mut scene, vec2(-30.0, 0.0), vec2(10.0, 10.0), "b");
    scene.action("b", |scene, id| {
        if let Some(obj) = scene.obj_mut(id) {
            obj.pos.x += 2.0;
        }
        Ok(())
    });
    let hits = Rc::new(RefCell::new(0));
    let h = hits.clone();
    scene.collides("a", "b", move |_, _, _| {
        *h.borrow_mut() += 1;
        Ok(())
    });

    for _ in 0..40 {
        scene.step(DT).unwrap();
    }
    // passed all the way through
    assert!(scene.obj(b).unwrap().pos.x > 10.0);
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn test_falling_body_grounds_once() {
    let mut scene = Scene::headless("test");
    let player = scene
        .add([pos(0.0, 0.0), area(Vec2::zeros(), vec2(10.0, 10.0)), body(), "player".into()])
        .unwrap();
    scene
        .add([pos(-50.0, 40.0), area(Vec2::zeros(), vec2(100.0, 10.0)), solid()])
        .unwrap();
    let grounded = Rc::new(RefCell::new(0));
    let g = grounded.clone();
    scene.on("grounded", "player", move |_, _, _| {
        *g.borrow_mut() += 1;
        Ok(())
    });

    for _ in 0..120 {
        scene.step(DT).unwrap();
    }
    assert_eq!(*grounded.borrow(), 1);
    assert!(scene.is_grounded(player));
    let obj = scene.obj(player).unwrap();
    assert_eq!(obj.body.as_ref().unwrap().vel_y, 0.0);
    approx::assert_relative_eq!(obj.pos.y, 30.0, epsilon = 1e-3);
}

#[test]
fn test_overlapping_pair_collides_on_first_tick() {
    let mut scene = Scene::headless("test");
    let a = boxed(&mut scene, vec2(0.0, 0.0), vec2(10.0, 10.0), "a");
    let b = boxed(&mut scene, vec2(5.0, 5.0), vec2(10.0, 10.0), "b");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = seen.clone();
    scene.collides("a", "b", move |_, x, y| {
        s.borrow_mut().push((x, y));
        Ok(())
    });

    scene.step(DT).unwrap();
    assert_eq!(*seen.borrow(), vec![(a, b)]);
}

#[test]
fn test_wait_fires_once_when_time_runs_out() {
    let mut scene = Scene::headless("test");
    let fired = Rc::new(RefCell::new(Vec::new()));
    let f = fired.clone();
    scene.wait(2.0, move |scene| {
        f.borrow_mut().push(scene.frame_count());
        Ok(())
    });

    for _ in 0..8 {
        scene.step(0.25).unwrap();
    }
    assert_eq!(*fired.borrow(), vec![8]);

    for _ in 0..8 {
        scene.step(0.25).unwrap();
    }
    assert_eq!(fired.borrow().len(), 1);
}

#[test]
fn test_level_places_symbols_on_the_grid() {
    let mut scene = Scene::headless("test");
    let conf = LevelConf::new(10.0, 10.0)
        .tile('@', || vec!["a".into()])
        .tile('=', || vec!["b".into()]);
    let level = scene.add_level(&["@="], conf).unwrap();

    let a = scene.get("a")[0];
    let b = scene.get("b")[0];
    assert_eq!(level.grid_pos(&scene, a), Some(vec2(0.0, 0.0)));
    assert_eq!(level.grid_pos(&scene, b), Some(vec2(1.0, 0.0)));
    assert_eq!(scene.obj(a).unwrap().pos, vec2(0.0, 0.0));
    assert_eq!(scene.obj(b).unwrap().pos, vec2(10.0, 0.0));
}
