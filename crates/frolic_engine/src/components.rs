//! Built-in component constructors
//!
//! Each constructor returns a [`Component`] ready to be passed to
//! [`Scene::add`](crate::scene::Scene::add):
//!
//! ```rust,no_run
//! use frolic_engine::prelude::*;
//!
//! let mut scene = Scene::headless("main");
//! let player = scene.add([
//!     sprite("hero"),
//!     pos(40.0, 80.0),
//!     area_auto(),
//!     body(),
//!     "player".into(),
//! ]);
//! ```

use crate::foundation::math::{vec2, Color, Origin, Rect, Vec2};
use crate::object::component::{Component, Field};
use crate::physics::body::{Body, BodyConf};
use crate::physics::collision::Area;
use crate::physics::resolve::SOLID_TAG;
use crate::render::drawable::{Drawable, SpriteConf, SpriteState, TextConf, TextState};

/// World position
pub fn pos(x: f32, y: f32) -> Component {
    Field::Pos(vec2(x, y)).into()
}

/// Non-uniform scale
pub fn scale(x: f32, y: f32) -> Component {
    Field::Scale(vec2(x, y)).into()
}

/// Rotation in radians
pub fn rotate(angle: f32) -> Component {
    Field::Angle(angle).into()
}

/// Tint color
pub fn color(color: Color) -> Component {
    Field::Color(color).into()
}

/// Drawable anchor
pub fn origin(origin: Origin) -> Component {
    Field::Origin(origin).into()
}

/// Draw and collision layer
pub fn layer(name: impl Into<String>) -> Component {
    Field::Layer(name.into()).into()
}

/// Collision area with local corners `p1` and `p2`
pub fn area(p1: Vec2, p2: Vec2) -> Component {
    Field::Area(Area::Rect(Rect::new(p1, p2))).into()
}

/// Collision area matching the drawable's size and origin
pub fn area_auto() -> Component {
    Field::Area(Area::Auto).into()
}

/// Blocks objects resolving against solids
pub fn solid() -> Component {
    SOLID_TAG.into()
}

/// Platformer body with default settings
pub fn body() -> Component {
    body_with(BodyConf::default())
}

/// Platformer body
pub fn body_with(conf: BodyConf) -> Component {
    Field::Body(Body::new(conf)).into()
}

/// Sprite drawable with default settings
pub fn sprite(name: impl Into<String>) -> Component {
    sprite_with(name, SpriteConf::default())
}

/// Sprite drawable
pub fn sprite_with(name: impl Into<String>, conf: SpriteConf) -> Component {
    Field::Drawable(Drawable::Sprite(SpriteState::new(name, conf))).into()
}

/// Text drawable with default settings
pub fn text(content: impl Into<String>) -> Component {
    text_with(content, TextConf::default())
}

/// Text drawable
pub fn text_with(content: impl Into<String>, conf: TextConf) -> Component {
    Field::Drawable(Drawable::Text(TextState::new(content, conf))).into()
}

/// Solid-colored rectangle drawable
pub fn rect(width: f32, height: f32) -> Component {
    Field::Drawable(Drawable::Rect { width, height }).into()
}

/// Tag component
pub fn tag(name: impl Into<String>) -> Component {
    Component::new().tag(name)
}

/// Hidden from the draw phase
pub fn hidden() -> Component {
    Field::Hidden(true).into()
}

/// Skipped by the update phase
pub fn paused() -> Component {
    Field::Paused(true).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::GameObject;

    #[test]
    fn test_builtins_fill_slots() {
        let mut obj = GameObject::new();
        for c in [
            pos(1.0, 2.0),
            scale(2.0, 2.0),
            rotate(0.5),
            color(Color::RED),
            origin(Origin::Center),
            layer("ui"),
            area_auto(),
            solid(),
            body(),
            rect(3.0, 4.0),
            tag("wall"),
        ] {
            obj.use_component(c);
        }
        assert_eq!(obj.pos, vec2(1.0, 2.0));
        assert_eq!(obj.scale, vec2(2.0, 2.0));
        assert_eq!(obj.angle, 0.5);
        assert_eq!(obj.color, Color::RED);
        assert_eq!(obj.origin, Origin::Center);
        assert_eq!(obj.layer.as_deref(), Some("ui"));
        assert_eq!(obj.area, Some(Area::Auto));
        assert!(obj.is_all(&["solid", "wall"]));
        assert_eq!(obj.body, Some(Body::default()));
        assert_eq!(obj.drawable, Some(Drawable::Rect { width: 3.0, height: 4.0 }));
    }

    #[test]
    fn test_later_drawable_replaces_earlier() {
        let mut obj = GameObject::new();
        obj.use_component(rect(1.0, 1.0));
        obj.use_component(text("hi"));
        assert!(matches!(obj.drawable, Some(Drawable::Text(ref t)) if t.text == "hi"));
    }
}
