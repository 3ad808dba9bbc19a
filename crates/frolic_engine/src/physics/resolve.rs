//! Push-out resolution against solid objects

use crate::foundation::math::vec2;
use crate::object::ObjectId;
use crate::scene::Scene;
use std::fmt;

/// Tag marking objects that block resolving objects
pub const SOLID_TAG: &str = "solid";

/// Side of the resolving object that touched the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Left edge
    Left,
    /// Right edge
    Right,
    /// Top edge
    Top,
    /// Bottom edge
    Bottom,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Top => "top",
            Side::Bottom => "bottom",
        })
    }
}

/// One resolved contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// The solid that was pushed out of
    pub other: ObjectId,
    /// Side of the resolving object that touched it
    pub side: Side,
}

impl Scene {
    /// Push `id` out of every intersecting solid on its layer
    ///
    /// Solids are visited in id order; for each one the smallest of the four
    /// penetration depths is applied, ties going to left, right, top, bottom
    /// in that order.
    pub fn resolve(&mut self, id: ObjectId) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let Some(id) = self.current_id(id) else {
            return contacts;
        };
        for other in self.get(SOLID_TAG) {
            if other == id {
                continue;
            }
            let (Some(me), Some(them)) = (self.obj(id), self.obj(other)) else {
                continue;
            };
            if !self.same_layer(me, them) {
                continue;
            }
            let (Some(a1), Some(a2)) = (self.world_area_of(me), self.world_area_of(them)) else {
                continue;
            };
            if !a1.intersects(&a2) {
                continue;
            }

            let dis_left = a1.p2.x - a2.p1.x;
            let dis_right = a2.p2.x - a1.p1.x;
            let dis_top = a1.p2.y - a2.p1.y;
            let dis_bottom = a2.p2.y - a1.p1.y;

            let candidates = [
                (dis_left, Side::Right, vec2(-dis_left, 0.0)),
                (dis_right, Side::Left, vec2(dis_right, 0.0)),
                (dis_top, Side::Bottom, vec2(0.0, -dis_top)),
                (dis_bottom, Side::Top, vec2(0.0, dis_bottom)),
            ];
            let (_, side, push) = candidates
                .into_iter()
                .fold(candidates[0], |best, c| if c.0 < best.0 { c } else { best });

            if let Some(me) = self.obj_mut(id) {
                me.pos += push;
            }
            contacts.push(Contact { other, side });
        }
        contacts
    }
}
