//! Components: composable bundles of fields, tags and behaviours

use super::{Behavior, EventHandler, GameObject, Lifecycle, ObjectId, Value};
use crate::components;
use crate::error::{GameError, HookResult};
use crate::foundation::math::{vec2, Color, Origin, Vec2};
use crate::physics::body::{Body, BodyConf};
use crate::physics::collision::Area;
use crate::render::drawable::Drawable;
use crate::scene::Scene;
use std::collections::BTreeMap;
use std::fmt;

/// Assignment to one object slot or user field
#[derive(Debug, Clone)]
pub enum Field {
    /// Position
    Pos(Vec2),
    /// Scale
    Scale(Vec2),
    /// Rotation angle in radians
    Angle(f32),
    /// Tint
    Color(Color),
    /// Drawable anchor
    Origin(Origin),
    /// Layer name
    Layer(String),
    /// Collision area
    Area(Area),
    /// Platformer body
    Body(Body),
    /// Drawable
    Drawable(Drawable),
    /// Hidden flag
    Hidden(bool),
    /// Paused flag
    Paused(bool),
    /// Free-form user field
    Custom(String, Value),
}

impl Field {
    fn assign(self, obj: &mut GameObject) {
        match self {
            Field::Pos(p) => obj.pos = p,
            Field::Scale(s) => obj.scale = s,
            Field::Angle(a) => obj.angle = a,
            Field::Color(c) => obj.color = c,
            Field::Origin(o) => obj.origin = o,
            Field::Layer(l) => obj.layer = Some(l),
            Field::Area(a) => obj.area = Some(a),
            Field::Body(b) => obj.body = Some(b),
            Field::Drawable(d) => obj.drawable = Some(d),
            Field::Hidden(h) => obj.hidden = h,
            Field::Paused(p) => obj.paused = p,
            Field::Custom(name, value) => obj.set_field(name, value),
        }
    }
}

/// A bundle composable onto a game object
///
/// Fields are assigned (later compositions overwrite earlier ones), tags are
/// added and behaviours are appended to the object's lifecycle lists.
#[derive(Default)]
pub struct Component {
    fields: Vec<Field>,
    tags: Vec<String>,
    behaviors: Vec<(Lifecycle, Behavior)>,
    handlers: Vec<(String, EventHandler)>,
    parts: Vec<Component>,
}

impl Component {
    /// Empty component
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot assignment
    pub fn with(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a free-form user field
    pub fn field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(Field::Custom(name.into(), value.into()))
    }

    /// Add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a lifecycle behaviour
    pub fn on(
        mut self,
        lc: Lifecycle,
        behavior: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) -> Self {
        self.behaviors.push((lc, Box::new(behavior)));
        self
    }

    /// Add an `add` behaviour
    pub fn on_add(self, behavior: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static) -> Self {
        self.on(Lifecycle::Add, behavior)
    }

    /// Add an `update` behaviour
    pub fn on_update(
        self,
        behavior: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) -> Self {
        self.on(Lifecycle::Update, behavior)
    }

    /// Add a `draw` behaviour
    pub fn on_draw(self, behavior: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static) -> Self {
        self.on(Lifecycle::Draw, behavior)
    }

    /// Add a `destroy` behaviour
    pub fn on_destroy(
        self,
        behavior: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) -> Self {
        self.on(Lifecycle::Destroy, behavior)
    }

    /// Add a debug info hook; report entries with [`Scene::report`]
    pub fn on_debug_info(
        self,
        behavior: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) -> Self {
        self.on(Lifecycle::DebugInfo, behavior)
    }

    /// Add a handler for a custom object event
    pub fn on_event(
        mut self,
        event: impl Into<String>,
        handler: impl FnMut(&mut Scene, ObjectId, &[Value]) -> HookResult + 'static,
    ) -> Self {
        self.handlers.push((event.into(), Box::new(handler)));
        self
    }

    /// Compose several components into one, in order
    pub fn many(parts: impl IntoIterator<Item = Component>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whether composing this is a no-op
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.tags.is_empty()
            && self.behaviors.is_empty()
            && self.handlers.is_empty()
            && self.parts.iter().all(Component::is_empty)
    }

    pub(crate) fn apply_to(self, obj: &mut GameObject) {
        for field in self.fields {
            field.assign(obj);
        }
        for tag in self.tags {
            obj.add_tag(tag);
        }
        for (lc, behavior) in self.behaviors {
            obj.behaviors.push(lc, behavior);
        }
        for (event, handler) in self.handlers {
            obj.behaviors.push_handler(event, handler);
        }
        for part in self.parts {
            part.apply_to(obj);
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("fields", &self.fields)
            .field("tags", &self.tags)
            .field("behaviors", &self.behaviors.len())
            .field("handlers", &self.handlers.len())
            .field("parts", &self.parts)
            .finish()
    }
}

impl From<Field> for Component {
    fn from(field: Field) -> Self {
        Component::new().with(field)
    }
}

impl From<&str> for Component {
    fn from(tag: &str) -> Self {
        Component::new().tag(tag)
    }
}

impl From<String> for Component {
    fn from(tag: String) -> Self {
        Component::new().tag(tag)
    }
}

impl From<Vec<Component>> for Component {
    fn from(parts: Vec<Component>) -> Self {
        Component::many(parts)
    }
}

impl From<Option<Component>> for Component {
    fn from(component: Option<Component>) -> Self {
        component.unwrap_or_default()
    }
}

/// Compose a data-described component onto `obj`
pub(crate) fn compose_value(obj: &mut GameObject, value: Value, errors: &mut Vec<GameError>) {
    match value {
        Value::Null => {}
        Value::Str(tag) => {
            obj.add_tag(tag);
        }
        Value::List(items) => {
            for item in items {
                compose_value(obj, item, errors);
            }
        }
        Value::Map(map) => {
            for (key, entry) in map {
                match builtin(&key, &entry) {
                    Ok(Some(component)) => component.apply_to(obj),
                    Ok(None) => obj.set_field(key, entry),
                    Err(err) => {
                        log::warn!("Skipping component entry '{key}': {err}");
                        errors.push(err);
                    }
                }
            }
        }
        other => {
            let err = GameError::InvalidComponent(format!(
                "expected a map, tag or list, got {other:?}"
            ));
            log::warn!("{err}");
            errors.push(err);
        }
    }
}

fn invalid(key: &str, value: &Value) -> GameError {
    GameError::InvalidComponent(format!("bad value for '{key}': {value:?}"))
}

fn color_from(items: &[Value]) -> Option<Color> {
    let c: Option<Vec<f32>> = items.iter().map(Value::as_f32).collect();
    match c?.as_slice() {
        [r, g, b] => Some(Color::rgb(*r, *g, *b)),
        [r, g, b, a] => Some(Color::rgba(*r, *g, *b, *a)),
        _ => None,
    }
}

/// Map a recognised key to its built-in component; `Ok(None)` for user fields
fn builtin(key: &str, value: &Value) -> Result<Option<Component>, GameError> {
    let bad = || invalid(key, value);
    let component = match key {
        "pos" => {
            let p = value.as_vec2().ok_or_else(bad)?;
            components::pos(p.x, p.y)
        }
        "scale" => match value {
            Value::Num(s) => components::scale(*s as f32, *s as f32),
            _ => {
                let s = value.as_vec2().ok_or_else(bad)?;
                components::scale(s.x, s.y)
            }
        },
        "angle" => components::rotate(value.as_f32().ok_or_else(bad)?),
        "color" => components::color(value.as_list().and_then(color_from).ok_or_else(bad)?),
        "origin" => {
            let origin = value
                .as_str()
                .and_then(|s| s.parse::<Origin>().ok())
                .ok_or_else(bad)?;
            components::origin(origin)
        }
        "layer" => components::layer(value.as_str().ok_or_else(bad)?),
        "area" => match value {
            Value::Bool(true) => components::area_auto(),
            Value::Bool(false) => Component::new(),
            Value::List(items) => {
                let n: Option<Vec<f32>> = items.iter().map(Value::as_f32).collect();
                match n.ok_or_else(bad)?.as_slice() {
                    [x1, y1, x2, y2] => components::area(vec2(*x1, *y1), vec2(*x2, *y2)),
                    _ => return Err(bad()),
                }
            }
            _ => return Err(bad()),
        },
        "solid" => {
            if value.as_bool().ok_or_else(bad)? {
                components::solid()
            } else {
                Component::new()
            }
        }
        "body" => match value {
            Value::Bool(true) => components::body(),
            Value::Bool(false) => Component::new(),
            Value::Map(conf) => {
                let mut body = BodyConf::default();
                if let Some(v) = conf.get("jump_force") {
                    body.jump_force = v.as_f32().ok_or_else(bad)?;
                }
                if let Some(v) = conf.get("max_vel") {
                    body.max_vel = v.as_f32().ok_or_else(bad)?;
                }
                components::body_with(body)
            }
            _ => return Err(bad()),
        },
        "rect" => {
            let size = value.as_vec2().ok_or_else(bad)?;
            components::rect(size.x, size.y)
        }
        "sprite" => components::sprite(value.as_str().ok_or_else(bad)?),
        "text" => components::text(value.as_str().ok_or_else(bad)?),
        "hidden" => Component::from(Field::Hidden(value.as_bool().ok_or_else(bad)?)),
        "paused" => Component::from(Field::Paused(value.as_bool().ok_or_else(bad)?)),
        "tags" => {
            let tags: Option<Vec<&str>> =
                value.as_list().ok_or_else(bad)?.iter().map(Value::as_str).collect();
            tags.ok_or_else(bad)?
                .into_iter()
                .fold(Component::new(), Component::tag)
        }
        _ => return Ok(None),
    };
    Ok(Some(component))
}

/// Build a data-described component from key/value pairs
pub fn bundle<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
    )
}
