//! Game object model
//!
//! A game object is a bag of typed component slots (position, area, body,
//! drawable, ...), an open map of user fields, a tag list and per-instance
//! behaviour lists keyed by [`Lifecycle`] event. Objects are owned by a
//! [`Scene`](crate::scene::Scene) and addressed by [`ObjectId`].

pub mod component;
pub mod value;

pub use component::{Component, Field};
pub use value::Value;

use crate::error::{GameError, HookResult};
use crate::foundation::math::{vec2, Color, Origin, Vec2};
use crate::physics::body::Body;
use crate::physics::collision::{Area, ContactKind};
use crate::render::drawable::Drawable;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Identity of an object inside its scene
///
/// Assigned from a monotonically increasing per-scene counter on insertion
/// and never reused. Ascending id order is insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric id
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle events every object can carry behaviours for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lifecycle {
    /// Fired once on insertion into a scene
    Add,
    /// Fired every unpaused tick
    Update,
    /// Fired every tick the object is not hidden
    Draw,
    /// Fired once on destruction
    Destroy,
    /// Fired when the debug inspector collects info about the object
    DebugInfo,
}

impl Lifecycle {
    /// All lifecycle events
    pub const ALL: [Lifecycle; 5] = [
        Lifecycle::Add,
        Lifecycle::Update,
        Lifecycle::Draw,
        Lifecycle::Destroy,
        Lifecycle::DebugInfo,
    ];

    /// Event name
    pub fn name(self) -> &'static str {
        match self {
            Lifecycle::Add => "add",
            Lifecycle::Update => "update",
            Lifecycle::Draw => "draw",
            Lifecycle::Destroy => "destroy",
            Lifecycle::DebugInfo => "debugInfo",
        }
    }

    /// Parse an event name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lc| lc.name() == name)
    }
}

/// Key of an event: a lifecycle event or a custom named one
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// Built-in lifecycle event
    Lifecycle(Lifecycle),
    /// Custom event such as `"grounded"`
    Custom(String),
}

impl From<Lifecycle> for EventKey {
    fn from(lc: Lifecycle) -> Self {
        EventKey::Lifecycle(lc)
    }
}

impl From<&str> for EventKey {
    fn from(name: &str) -> Self {
        Lifecycle::from_name(name).map_or_else(|| EventKey::Custom(name.to_string()), EventKey::Lifecycle)
    }
}

impl From<String> for EventKey {
    fn from(name: String) -> Self {
        EventKey::from(name.as_str())
    }
}

/// Lifecycle behaviour; the id is the object the behaviour is bound to
pub type Behavior = Box<dyn FnMut(&mut Scene, ObjectId) -> HookResult>;

/// Handler for a custom object event with its arguments
pub type EventHandler = Box<dyn FnMut(&mut Scene, ObjectId, &[Value]) -> HookResult>;

/// Tag filter used by queries and tag-scoped event registration
///
/// `"*"` matches every object; a list matches objects carrying every tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    /// Wildcard
    Any,
    /// Every listed tag must be present
    All(Vec<String>),
}

impl TagFilter {
    /// Whether `obj` passes the filter
    pub fn matches(&self, obj: &GameObject) -> bool {
        match self {
            TagFilter::Any => true,
            TagFilter::All(tags) => tags.iter().all(|t| obj.is(t)),
        }
    }
}

impl From<&str> for TagFilter {
    fn from(tag: &str) -> Self {
        if tag == "*" {
            TagFilter::Any
        } else {
            TagFilter::All(vec![tag.to_string()])
        }
    }
}

impl From<String> for TagFilter {
    fn from(tag: String) -> Self {
        TagFilter::from(tag.as_str())
    }
}

impl From<&[&str]> for TagFilter {
    fn from(tags: &[&str]) -> Self {
        TagFilter::All(tags.iter().map(|t| (*t).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TagFilter {
    fn from(tags: [&str; N]) -> Self {
        TagFilter::from(&tags[..])
    }
}

impl From<Vec<String>> for TagFilter {
    fn from(tags: Vec<String>) -> Self {
        TagFilter::All(tags)
    }
}

impl From<&TagFilter> for TagFilter {
    fn from(filter: &TagFilter) -> Self {
        filter.clone()
    }
}

/// Per-instance behaviour lists
#[derive(Default)]
pub(crate) struct Behaviors {
    lifecycle: HashMap<Lifecycle, Vec<Behavior>>,
    events: HashMap<String, Vec<EventHandler>>,
}

impl Behaviors {
    pub(crate) fn push(&mut self, lc: Lifecycle, behavior: Behavior) {
        self.lifecycle.entry(lc).or_default().push(behavior);
    }

    pub(crate) fn push_handler(&mut self, event: String, handler: EventHandler) {
        self.events.entry(event).or_default().push(handler);
    }

    /// Take a lifecycle list out for dispatch
    pub(crate) fn take(&mut self, lc: Lifecycle) -> Vec<Behavior> {
        self.lifecycle.remove(&lc).unwrap_or_default()
    }

    /// Put a taken list back ahead of anything registered meanwhile
    pub(crate) fn restore(&mut self, lc: Lifecycle, mut list: Vec<Behavior>) {
        if let Some(added) = self.lifecycle.remove(&lc) {
            list.extend(added);
        }
        if !list.is_empty() {
            self.lifecycle.insert(lc, list);
        }
    }

    pub(crate) fn take_handlers(&mut self, event: &str) -> Vec<EventHandler> {
        self.events.remove(event).unwrap_or_default()
    }

    pub(crate) fn restore_handlers(&mut self, event: &str, mut list: Vec<EventHandler>) {
        if let Some(added) = self.events.remove(event) {
            list.extend(added);
        }
        if !list.is_empty() {
            self.events.insert(event.to_string(), list);
        }
    }

    pub(crate) fn count(&self, lc: Lifecycle) -> usize {
        self.lifecycle.get(&lc).map_or(0, Vec::len)
    }
}

/// Per-other-object collide/overlap state for enter detection
///
/// Entries are keyed by the registration that tracks them, so two checks
/// against the same pair fire independently.
#[derive(Debug, Default)]
pub(crate) struct Contacts {
    colliding: HashSet<(u64, ObjectId)>,
    overlapping: HashSet<(u64, ObjectId)>,
}

impl Contacts {
    fn set(&self, kind: ContactKind) -> &HashSet<(u64, ObjectId)> {
        match kind {
            ContactKind::Collide => &self.colliding,
            ContactKind::Overlap => &self.overlapping,
        }
    }

    pub(crate) fn set_mut(&mut self, kind: ContactKind) -> &mut HashSet<(u64, ObjectId)> {
        match kind {
            ContactKind::Collide => &mut self.colliding,
            ContactKind::Overlap => &mut self.overlapping,
        }
    }

    pub(crate) fn contains(&self, kind: ContactKind, check: u64, other: ObjectId) -> bool {
        self.set(kind).contains(&(check, other))
    }

    pub(crate) fn touches(&self, kind: ContactKind, other: ObjectId) -> bool {
        self.set(kind).iter().any(|(_, id)| *id == other)
    }

    pub(crate) fn forget(&mut self, other: ObjectId) {
        self.colliding.retain(|(_, id)| *id != other);
        self.overlapping.retain(|(_, id)| *id != other);
    }

    pub(crate) fn rename(&mut self, old: ObjectId, new: ObjectId) {
        for set in [&mut self.colliding, &mut self.overlapping] {
            let moved: Vec<u64> = set.iter().filter(|(_, id)| *id == old).map(|(c, _)| *c).collect();
            for check in moved {
                set.remove(&(check, old));
                set.insert((check, new));
            }
        }
    }
}

/// A game object
///
/// Built-in component kinds live in typed slots; anything else a component
/// brings is stored in the open field map. Composition is last-wins: a later
/// component silently overwrites a slot or field set by an earlier one.
pub struct GameObject {
    id: Option<ObjectId>,
    tags: Vec<String>,

    /// World position
    pub pos: Vec2,
    /// Non-uniform scale
    pub scale: Vec2,
    /// Rotation in radians (ignored by collision)
    pub angle: f32,
    /// Tint color
    pub color: Color,
    /// Drawable anchor
    pub origin: Origin,
    /// Named layer; `None` means the scene default layer
    pub layer: Option<String>,
    /// Collision area
    pub area: Option<Area>,
    /// Platformer body state
    pub body: Option<Body>,
    /// What the object draws
    pub drawable: Option<Drawable>,
    /// Suppresses draw dispatch
    pub hidden: bool,
    /// Suppresses update dispatch
    pub paused: bool,

    fields: BTreeMap<String, Value>,
    pub(crate) behaviors: Behaviors,
    pub(crate) contacts: Contacts,
}

impl GameObject {
    /// Fresh object record, not yet inserted anywhere
    pub fn new() -> Self {
        Self {
            id: None,
            tags: Vec::new(),
            pos: Vec2::zeros(),
            scale: vec2(1.0, 1.0),
            angle: 0.0,
            color: Color::WHITE,
            origin: Origin::TopLeft,
            layer: None,
            area: None,
            body: None,
            drawable: None,
            hidden: false,
            paused: false,
            fields: BTreeMap::new(),
            behaviors: Behaviors::default(),
            contacts: Contacts::default(),
        }
    }

    /// Current id, `None` when not inserted or destroyed
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Option<ObjectId>) {
        self.id = id;
    }

    /// Whether the object lives in a scene pool
    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    /// Tags in insertion order
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Tag membership; `"*"` always matches
    pub fn is(&self, tag: &str) -> bool {
        tag == "*" || self.tags.iter().any(|t| t == tag)
    }

    /// True only if every tag is present
    pub fn is_all(&self, tags: &[&str]) -> bool {
        tags.iter().all(|t| self.is(t))
    }

    /// Filter match
    pub fn matches(&self, filter: &TagFilter) -> bool {
        filter.matches(self)
    }

    /// Add a tag, returns false if it was already present
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Remove a tag, returns whether it was present
    pub fn rm_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        before != self.tags.len()
    }

    /// User field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Set a user field, overwriting any previous value
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Remove a user field
    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// All user fields
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Compose a component onto this object
    pub fn use_component(&mut self, component: impl Into<Component>) {
        component.into().apply_to(self);
    }

    /// Compose a data-described component
    ///
    /// Invalid entries are skipped and returned; the rest still compose.
    pub fn use_value(&mut self, value: Value) -> Vec<GameError> {
        let mut errors = Vec::new();
        component::compose_value(self, value, &mut errors);
        errors
    }

    /// Append a lifecycle behaviour
    pub fn on_lifecycle(
        &mut self,
        lc: Lifecycle,
        behavior: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) {
        self.behaviors.push(lc, Box::new(behavior));
    }

    /// Append an update behaviour
    pub fn action(&mut self, behavior: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static) {
        self.on_lifecycle(Lifecycle::Update, behavior);
    }

    /// Register a handler for an object event
    ///
    /// Lifecycle names register a lifecycle behaviour (arguments are empty);
    /// any other name is a custom event raised with [`Scene::trigger`].
    pub fn on(
        &mut self,
        event: impl Into<EventKey>,
        mut handler: impl FnMut(&mut Scene, ObjectId, &[Value]) -> HookResult + 'static,
    ) {
        match event.into() {
            EventKey::Lifecycle(lc) => {
                self.behaviors
                    .push(lc, Box::new(move |scene, id| handler(scene, id, &[])));
            }
            EventKey::Custom(name) => self.behaviors.push_handler(name, Box::new(handler)),
        }
    }

    /// Number of behaviours registered for a lifecycle event
    pub fn behavior_count(&self, lc: Lifecycle) -> usize {
        self.behaviors.count(lc)
    }

    /// Whether any enter check currently records `other` as touching
    pub fn is_tracking(&self, kind: ContactKind, other: ObjectId) -> bool {
        self.contacts.touches(kind, other)
    }
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("tags", &self.tags)
            .field("pos", &self.pos)
            .field("layer", &self.layer)
            .field("area", &self.area)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
