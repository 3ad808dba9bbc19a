//! Collision detection between object areas
//!
//! Areas are axis-aligned: the local rectangle is scaled and translated into
//! world space, rotation is not applied. Two areas collide when they share a
//! layer and intersect with positive area. Enter detection tracks, per
//! registered check and per other object, whether the pair touched on the
//! previous check; callbacks fire only on the transition into contact.

use crate::error::HookResult;
use crate::foundation::math::{Rect, Vec2};
use crate::object::{GameObject, Lifecycle, ObjectId, TagFilter};
use crate::scene::Scene;
use std::collections::HashSet;

/// Collision area component
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Area {
    /// Explicit local rectangle
    Rect(Rect),
    /// Derived from the drawable's size and the object's origin
    Auto,
}

/// Which registry a contact check belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    /// Blocking contact (`collides`)
    Collide,
    /// Trigger-style contact (`overlaps`)
    Overlap,
}

/// Callback receiving this object and the other one
pub type ContactCallback = Box<dyn FnMut(&mut Scene, ObjectId, ObjectId) -> HookResult>;

impl Scene {
    /// World-space area of an object
    pub fn world_area(&self, id: ObjectId) -> Option<Rect> {
        self.world_area_of(self.obj(id)?)
    }

    pub(crate) fn world_area_of(&self, obj: &GameObject) -> Option<Rect> {
        let local = match obj.area? {
            Area::Rect(rect) => rect,
            Area::Auto => obj.origin.local_rect(self.drawable_size(obj)?),
        };
        Some(Rect::new(
            obj.pos + local.p1.component_mul(&obj.scale),
            obj.pos + local.p2.component_mul(&obj.scale),
        ))
    }

    /// Whether two objects are on the same effective layer
    pub fn same_layer(&self, a: &GameObject, b: &GameObject) -> bool {
        self.layers.effective(a) == self.layers.effective(b)
    }

    fn areas_touch(&self, a: ObjectId, b: ObjectId) -> bool {
        if a == b {
            return false;
        }
        let (Some(oa), Some(ob)) = (self.obj(a), self.obj(b)) else {
            return false;
        };
        if !self.same_layer(oa, ob) {
            return false;
        }
        match (self.world_area_of(oa), self.world_area_of(ob)) {
            (Some(ra), Some(rb)) => ra.intersects(&rb),
            _ => false,
        }
    }

    /// Blocking contact test, symmetric
    pub fn is_collided(&self, a: ObjectId, b: ObjectId) -> bool {
        self.areas_touch(a, b)
    }

    /// Trigger contact test, symmetric
    pub fn is_overlapped(&self, a: ObjectId, b: ObjectId) -> bool {
        self.areas_touch(a, b)
    }

    /// Whether a world point lies inside the object's area, edges included
    pub fn has_pt(&self, id: ObjectId, pt: Vec2) -> bool {
        self.world_area(id).is_some_and(|area| area.contains(pt))
    }

    /// Whether the mouse is over the object
    ///
    /// Objects on camera-ignored layers are tested against the raw mouse
    /// position, others against the camera-space one.
    pub fn is_hovered(&self, id: ObjectId) -> bool {
        let Some(obj) = self.obj(id) else {
            return false;
        };
        let ignored = self.camera.ignores(self.layers.effective(obj));
        let pt = if ignored {
            self.input.mouse_pos
        } else {
            self.camera.mouse_pos()
        };
        self.has_pt(id, pt)
    }

    /// Whether the object was clicked this frame
    pub fn is_clicked(&self, id: ObjectId) -> bool {
        self.input.mouse.is_pressed() && self.is_hovered(id)
    }

    /// Run an edge-triggered contact check of `id` against `filter`
    pub(crate) fn check_contacts(
        &mut self,
        id: ObjectId,
        check: u64,
        kind: ContactKind,
        filter: &TagFilter,
        cb: &mut ContactCallback,
    ) -> HookResult {
        let others = self.get(filter.clone());
        for &other in &others {
            if !self.exists(id) {
                break;
            }
            if other == id || !self.exists(other) {
                continue;
            }
            let touching = match kind {
                ContactKind::Collide => self.is_collided(id, other),
                ContactKind::Overlap => self.is_overlapped(id, other),
            };
            let Some(obj) = self.obj_mut(id) else {
                break;
            };
            let tracked = obj.contacts.contains(kind, check, other);
            if touching && !tracked {
                obj.contacts.set_mut(kind).insert((check, other));
                cb(self, id, other)?;
            } else if !touching && tracked {
                obj.contacts.set_mut(kind).remove(&(check, other));
            }
        }

        // objects that stopped matching the filter are no longer touching
        let matching: HashSet<ObjectId> = others.into_iter().filter_map(|o| self.current_id(o)).collect();
        if let Some(obj) = self.obj_mut(id) {
            obj.contacts
                .set_mut(kind)
                .retain(|(c, other)| *c != check || matching.contains(other));
        }
        Ok(())
    }

    fn register_contacts(
        &mut self,
        kind: ContactKind,
        tag: TagFilter,
        other: TagFilter,
        mut cb: ContactCallback,
    ) {
        let check = self.next_check_id();
        self.on(Lifecycle::Update, tag, move |scene, id, _| {
            scene.check_contacts(id, check, kind, &other, &mut cb)
        });
    }

    /// Call `cb(a, b)` when an object tagged `t1` starts colliding with one tagged `t2`
    pub fn collides(
        &mut self,
        t1: impl Into<TagFilter>,
        t2: impl Into<TagFilter>,
        cb: impl FnMut(&mut Scene, ObjectId, ObjectId) -> HookResult + 'static,
    ) {
        self.register_contacts(ContactKind::Collide, t1.into(), t2.into(), Box::new(cb));
    }

    /// Call `cb(a, b)` when an object tagged `t1` starts overlapping one tagged `t2`
    pub fn overlaps(
        &mut self,
        t1: impl Into<TagFilter>,
        t2: impl Into<TagFilter>,
        cb: impl FnMut(&mut Scene, ObjectId, ObjectId) -> HookResult + 'static,
    ) {
        self.register_contacts(ContactKind::Overlap, t1.into(), t2.into(), Box::new(cb));
    }

    fn register_obj_contacts(
        &mut self,
        id: ObjectId,
        kind: ContactKind,
        other: TagFilter,
        mut cb: ContactCallback,
    ) {
        let check = self.next_check_id();
        if let Some(obj) = self.obj_mut(id) {
            obj.on_lifecycle(Lifecycle::Update, move |scene, me| {
                scene.check_contacts(me, check, kind, &other, &mut cb)
            });
        }
    }

    /// Per-object form of [`Scene::collides`]
    pub fn obj_collides(
        &mut self,
        id: ObjectId,
        tag: impl Into<TagFilter>,
        cb: impl FnMut(&mut Scene, ObjectId, ObjectId) -> HookResult + 'static,
    ) {
        self.register_obj_contacts(id, ContactKind::Collide, tag.into(), Box::new(cb));
    }

    /// Per-object form of [`Scene::overlaps`]
    pub fn obj_overlaps(
        &mut self,
        id: ObjectId,
        tag: impl Into<TagFilter>,
        cb: impl FnMut(&mut Scene, ObjectId, ObjectId) -> HookResult + 'static,
    ) {
        self.register_obj_contacts(id, ContactKind::Overlap, tag.into(), Box::new(cb));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{area, layer, pos, rect, area_auto, origin, scale};
    use crate::foundation::math::{vec2, Origin};
    use crate::input::{ButtonState, InputSnapshot};
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    fn boxed(scene: &mut Scene, x: f32, y: f32, w: f32, h: f32, tag: &str) -> ObjectId {
        scene
            .add([pos(x, y), area(vec2(0.0, 0.0), vec2(w, h)), tag.into()])
            .unwrap()
    }

    #[test]
    fn test_world_area_applies_scale_and_pos() {
        let mut scene = Scene::headless("test");
        let id = scene
            .add([pos(10.0, 20.0), scale(2.0, 3.0), area(vec2(-1.0, -1.0), vec2(1.0, 1.0))])
            .unwrap();
        let area = scene.world_area(id).unwrap();
        assert_eq!(area, Rect::new(vec2(8.0, 17.0), vec2(12.0, 23.0)));
    }

    #[test]
    fn test_auto_area_follows_drawable_and_origin() {
        let mut scene = Scene::headless("test");
        let id = scene
            .add([pos(50.0, 50.0), rect(20.0, 10.0), origin(Origin::Center), area_auto()])
            .unwrap();
        assert_eq!(
            scene.world_area(id),
            Some(Rect::new(vec2(40.0, 45.0), vec2(60.0, 55.0)))
        );
    }

    #[test]
    fn test_collision_is_symmetric() {
        let mut scene = Scene::headless("test");
        let cases = [
            (0.0, 0.0, 5.0, 5.0),
            (10.0, 0.0, 10.0, 10.0),
            (9.9, 9.9, 1.0, 1.0),
            (-3.0, 4.0, 30.0, 2.0),
        ];
        let fixed = boxed(&mut scene, 0.0, 0.0, 10.0, 10.0, "a");
        for (x, y, w, h) in cases {
            let other = boxed(&mut scene, x, y, w, h, "b");
            assert_eq!(scene.is_collided(fixed, other), scene.is_collided(other, fixed));
            assert_eq!(scene.is_overlapped(fixed, other), scene.is_overlapped(other, fixed));
        }
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let mut scene = Scene::headless("test");
        let a = boxed(&mut scene, 0.0, 0.0, 10.0, 10.0, "a");
        let b = boxed(&mut scene, 10.0, 0.0, 10.0, 10.0, "b");
        assert!(!scene.is_collided(a, b));
        assert!(!scene.is_collided(a, a));
    }

    #[test]
    fn test_layers_gate_collision() {
        let mut scene = Scene::headless("test");
        scene.layers(&["bg", "game"], "game");
        let a = boxed(&mut scene, 0.0, 0.0, 10.0, 10.0, "a");
        let b = scene
            .add([pos(5.0, 5.0), area(vec2(0.0, 0.0), vec2(10.0, 10.0)), layer("bg")])
            .unwrap();
        let c = scene
            .add([pos(5.0, 5.0), area(vec2(0.0, 0.0), vec2(10.0, 10.0)), layer("game")])
            .unwrap();
        assert!(!scene.is_collided(a, b));
        // explicit default layer equals the implicit one
        assert!(scene.is_collided(a, c));
    }

    #[test]
    fn test_has_pt_and_hover() {
        let mut scene = Scene::headless("test");
        let id = boxed(&mut scene, 0.0, 0.0, 10.0, 10.0, "a");
        assert!(scene.has_pt(id, vec2(10.0, 10.0)));
        assert!(!scene.has_pt(id, vec2(10.1, 5.0)));

        scene.set_input(InputSnapshot::new().with_mouse(vec2(4.0, 4.0), ButtonState::Pressed));
        scene.update_camera();
        assert!(scene.is_hovered(id));
        assert!(scene.is_clicked(id));
    }

    fn counter() -> (Rc<RefCell<u32>>, impl FnMut(&mut Scene, ObjectId, ObjectId) -> HookResult) {
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        (count, move |_: &mut Scene, _: ObjectId, _: ObjectId| {
            *c.borrow_mut() += 1;
            Ok(())
        })
    }

    #[test]
    fn test_overlap_fires_again_after_separation() {
        let mut scene = Scene::headless("test");
        let a = boxed(&mut scene, 0.0, 0.0, 10.0, 10.0, "a");
        let b = boxed(&mut scene, 5.0, 5.0, 10.0, 10.0, "b");
        let (hits, cb) = counter();
        scene.overlaps("a", "b", cb);

        scene.step(DT).unwrap();
        scene.step(DT).unwrap();
        assert_eq!(*hits.borrow(), 1);
        assert!(scene.obj(a).unwrap().is_tracking(ContactKind::Overlap, b));

        scene.obj_mut(b).unwrap().pos = vec2(50.0, 50.0);
        scene.step(DT).unwrap();
        assert!(!scene.obj(a).unwrap().is_tracking(ContactKind::Overlap, b));

        scene.obj_mut(b).unwrap().pos = vec2(5.0, 5.0);
        scene.step(DT).unwrap();
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn test_destroy_forgets_contacts() {
        let mut scene = Scene::headless("test");
        let a = boxed(&mut scene, 0.0, 0.0, 10.0, 10.0, "a");
        let b = boxed(&mut scene, 5.0, 5.0, 10.0, 10.0, "b");
        let (hits, cb) = counter();
        scene.overlaps("a", "b", cb);

        scene.step(DT).unwrap();
        assert!(scene.obj(a).unwrap().is_tracking(ContactKind::Overlap, b));
        scene.destroy(b).unwrap();
        assert!(!scene.obj(a).unwrap().is_tracking(ContactKind::Overlap, b));

        let b2 = boxed(&mut scene, 5.0, 5.0, 10.0, 10.0, "b");
        scene.step(DT).unwrap();
        assert_eq!(*hits.borrow(), 2);
        assert!(scene.obj(a).unwrap().is_tracking(ContactKind::Overlap, b2));
    }

    #[test]
    fn test_obj_collides_per_object() {
        let mut scene = Scene::headless("test");
        let a1 = boxed(&mut scene, 0.0, 0.0, 10.0, 10.0, "a");
        let a2 = boxed(&mut scene, 8.0, 8.0, 10.0, 10.0, "a");
        let b = boxed(&mut scene, 5.0, 5.0, 10.0, 10.0, "b");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s1 = seen.clone();
        scene.obj_collides(a1, "b", move |_, me, other| {
            s1.borrow_mut().push(("collide", me, other));
            Ok(())
        });
        let s2 = seen.clone();
        scene.obj_overlaps(a2, "b", move |_, me, other| {
            s2.borrow_mut().push(("overlap", me, other));
            Ok(())
        });

        for _ in 0..3 {
            scene.step(DT).unwrap();
        }
        let mut seen = seen.borrow().clone();
        seen.sort();
        assert_eq!(seen, vec![("collide", a1, b), ("overlap", a2, b)]);

        let first = scene.obj(a1).unwrap();
        assert!(first.is_tracking(ContactKind::Collide, b));
        assert!(!first.is_tracking(ContactKind::Overlap, b));
        let second = scene.obj(a2).unwrap();
        assert!(second.is_tracking(ContactKind::Overlap, b));
        assert!(!second.is_tracking(ContactKind::Collide, b));
        // b registered nothing of its own
        assert!(!scene.obj(b).unwrap().is_tracking(ContactKind::Collide, a1));
    }

    #[test]
    fn test_untagged_while_touching_fires_again_when_retagged() {
        let mut scene = Scene::headless("test");
        let a = boxed(&mut scene, 0.0, 0.0, 10.0, 10.0, "a");
        let b = boxed(&mut scene, 5.0, 5.0, 10.0, 10.0, "b");
        let (hits, cb) = counter();
        scene.collides("a", "b", cb);

        scene.step(DT).unwrap();
        assert_eq!(*hits.borrow(), 1);

        scene.obj_mut(b).unwrap().rm_tag("b");
        scene.step(DT).unwrap();
        assert!(!scene.obj(a).unwrap().is_tracking(ContactKind::Collide, b));

        scene.obj_mut(b).unwrap().add_tag("b");
        scene.step(DT).unwrap();
        assert_eq!(*hits.borrow(), 2);
    }
}
