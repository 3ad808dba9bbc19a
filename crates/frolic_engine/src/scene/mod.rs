//! Scene: the object pool and everything scoped to it
//!
//! A scene exclusively owns its objects, keyed by ids drawn from a
//! monotonically increasing counter, so ascending key order is insertion
//! order. It also owns the tag-scoped event registries, timers, camera,
//! layers, gravity and free-form user data. Queries return snapshots, so the
//! pool can be mutated freely while iterating over an earlier result.
//!
//! ## Ids and `readd`
//!
//! `readd` moves an object to a fresh, larger id. Every earlier id of the
//! object forwards straight to the live one, so ids held by game code keep
//! resolving in a single lookup until the object is destroyed, which drops
//! all of its aliases.

pub mod camera;
pub mod events;
pub mod layers;
pub mod scheduler;
pub mod timers;

pub use camera::Camera;
pub use events::{Action, EventKey, TagHandler};
pub use layers::Layers;
pub use scheduler::FramePhase;
pub use timers::{TimerCallback, TimerId};

use crate::assets::Assets;
use crate::audio::{AudioBackend, AudioControl, NullAudio, PlayParams};
use crate::config::EngineConfig;
use crate::error::{GameError, HookResult};
use crate::foundation::logging::{LogEntry, LogLevel, RollingLog};
use crate::foundation::math::{vec2, Vec2};
use crate::foundation::time::FrameClock;
use crate::input::InputSnapshot;
use crate::object::{Component, GameObject, Lifecycle, ObjectId, TagFilter, Value};
use crate::render::DrawQueue;
use events::EventRegistry;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use timers::TimerTable;

/// Collaborators shared by the game and all of its scenes
pub struct Services {
    /// Decoded assets
    pub assets: Assets,
    /// Audio output
    pub audio: RefCell<Box<dyn AudioBackend>>,
    /// On-screen rolling log
    pub log: RefCell<RollingLog>,
    /// Engine settings
    pub config: EngineConfig,
}

impl Services {
    /// Bundle the collaborators
    pub fn new(config: EngineConfig, assets: Assets, audio: Box<dyn AudioBackend>) -> Self {
        Self {
            log: RefCell::new(RollingLog::new(config.log_max)),
            assets,
            audio: RefCell::new(audio),
            config,
        }
    }

    /// No assets and silent audio
    pub fn headless(config: EngineConfig) -> Self {
        Self::new(config, Assets::new(), Box::new(NullAudio::new()))
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Scene switch requested from game code, applied at the next tick boundary
#[derive(Debug, Clone, PartialEq)]
pub enum SceneRequest {
    /// Switch to a declared scene
    Go(String, Vec<Value>),
    /// Rebuild the current scene from scratch
    Reload,
}

/// A scene and its object pool
pub struct Scene {
    name: String,
    objects: BTreeMap<ObjectId, GameObject>,
    moved: HashMap<ObjectId, ObjectId>,
    destroying: HashSet<ObjectId>,
    next_id: u64,
    next_check: u64,

    pub(crate) events: EventRegistry,
    pub(crate) timers: TimerTable,
    pub(crate) camera: Camera,
    pub(crate) layers: Layers,
    pub(crate) input: InputSnapshot,
    pub(crate) gfx: DrawQueue,
    pub(crate) rng: StdRng,

    gravity: f32,
    data: BTreeMap<String, Value>,
    clock: FrameClock,
    screen: Vec2,
    services: Rc<Services>,
    request: Option<SceneRequest>,
    info: Vec<(String, String)>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>, services: Rc<Services>) -> Self {
        let config = &services.config;
        let screen = vec2(config.width, config.height);
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            name: name.into(),
            objects: BTreeMap::new(),
            moved: HashMap::new(),
            destroying: HashSet::new(),
            next_id: 0,
            next_check: 0,
            events: EventRegistry::default(),
            timers: TimerTable::default(),
            camera: Camera::new(screen),
            layers: Layers::default(),
            input: InputSnapshot::new(),
            gfx: DrawQueue::new(),
            rng,
            gravity: config.gravity,
            data: BTreeMap::new(),
            clock: FrameClock::new(),
            screen,
            services,
            request: None,
            info: Vec::new(),
        }
    }

    /// Scene with default settings, no assets and silent audio
    pub fn headless(name: impl Into<String>) -> Self {
        let config = EngineConfig {
            rng_seed: Some(0),
            ..EngineConfig::default()
        };
        Self::new(name, Rc::new(Services::headless(config)))
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared collaborators
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Shared collaborators, as an owned handle
    ///
    /// Lets callers keep borrowing assets while mutating the scene.
    pub fn services_rc(&self) -> Rc<Services> {
        Rc::clone(&self.services)
    }

    /// Log a recoverable error and show it in the rolling log
    pub fn report_error(&self, err: &GameError) {
        log::warn!("{err}");
        self.services.log.borrow_mut().push(LogEntry {
            level: LogLevel::Error,
            message: err.to_string(),
        });
    }

    /// Append a message to the rolling log
    pub fn log(&self, message: impl Into<String>) {
        self.services.log.borrow_mut().info(message);
    }

    fn alloc_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fresh id for a contact registration
    pub(crate) fn next_check_id(&mut self) -> u64 {
        self.next_check += 1;
        self.next_check
    }

    /// Build an object from components and insert it
    ///
    /// Fires the object's `add` behaviours, then matching scene `add` handlers.
    pub fn add<I>(&mut self, components: I) -> Result<ObjectId, GameError>
    where
        I: IntoIterator,
        I::Item: Into<Component>,
    {
        let mut obj = GameObject::new();
        for component in components {
            obj.use_component(component);
        }
        self.insert(obj)
    }

    /// Build an object from a data description and insert it
    ///
    /// Malformed entries are reported and skipped.
    pub fn add_value(&mut self, value: Value) -> Result<ObjectId, GameError> {
        let mut obj = GameObject::new();
        for err in obj.use_value(value) {
            self.report_error(&err);
        }
        self.insert(obj)
    }

    /// Insert a composed object and fire its `add` event
    pub(crate) fn insert(&mut self, mut obj: GameObject) -> Result<ObjectId, GameError> {
        let id = self.alloc_id();
        obj.set_id(Some(id));
        log::debug!("Adding object {id} to scene '{}' with tags {:?}", self.name, obj.tags());
        self.objects.insert(id, obj);
        self.init_drawable(id)?;
        self.trigger(id, Lifecycle::Add, &[])?;
        Ok(id)
    }

    /// Snapshot of the ids of live objects matching `filter`, in insertion order
    pub fn get(&self, filter: impl Into<TagFilter>) -> Vec<ObjectId> {
        let filter = filter.into();
        self.objects
            .iter()
            .filter(|(_, obj)| filter.matches(obj))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Run `cb` on a snapshot of the matching objects, in insertion order
    ///
    /// Objects destroyed by an earlier call are skipped.
    pub fn every(
        &mut self,
        filter: impl Into<TagFilter>,
        mut cb: impl FnMut(&mut Scene, ObjectId) -> HookResult,
    ) -> HookResult {
        for id in self.get(filter) {
            if let Some(id) = self.current_id(id) {
                cb(self, id)?;
            }
        }
        Ok(())
    }

    /// [`Scene::every`] in reverse insertion order
    pub fn rev_every(
        &mut self,
        filter: impl Into<TagFilter>,
        mut cb: impl FnMut(&mut Scene, ObjectId) -> HookResult,
    ) -> HookResult {
        for id in self.get(filter).into_iter().rev() {
            if let Some(id) = self.current_id(id) {
                cb(self, id)?;
            }
        }
        Ok(())
    }

    /// Destroy an object
    ///
    /// No-op for objects that no longer exist. Fires `destroy` behaviours and
    /// handlers, removes the object and drops every other object's contact
    /// state for it. The object is removed even if a handler fails.
    pub fn destroy(&mut self, id: ObjectId) -> HookResult {
        let Some(id) = self.current_id(id) else {
            return Ok(());
        };
        if !self.destroying.insert(id) {
            return Ok(());
        }
        let result = self.trigger(id, Lifecycle::Destroy, &[]);
        self.destroying.remove(&id);

        if let Some(mut obj) = self.objects.remove(&id) {
            obj.set_id(None);
            log::debug!("Destroyed object {id} in scene '{}'", self.name);
        }
        self.moved.retain(|_, to| *to != id);
        for other in self.objects.values_mut() {
            other.contacts.forget(id);
        }
        result
    }

    /// Destroy every object matching `filter`
    pub fn destroy_all(&mut self, filter: impl Into<TagFilter>) -> HookResult {
        for id in self.get(filter) {
            self.destroy(id)?;
        }
        Ok(())
    }

    /// Move an object to a fresh id, putting it last in draw order and first
    /// in update order
    ///
    /// The old id keeps resolving to the object.
    pub fn readd(&mut self, id: ObjectId) -> Option<ObjectId> {
        let old = self.current_id(id)?;
        let mut obj = self.objects.remove(&old)?;
        let new = self.alloc_id();
        obj.set_id(Some(new));
        self.objects.insert(new, obj);
        // keep every alias one hop from the live id
        for to in self.moved.values_mut() {
            if *to == old {
                *to = new;
            }
        }
        self.moved.insert(old, new);
        if self.destroying.remove(&old) {
            self.destroying.insert(new);
        }
        for other in self.objects.values_mut() {
            other.contacts.rename(old, new);
        }
        Some(new)
    }

    /// Current id of an object, following `readd` moves
    pub fn current_id(&self, id: ObjectId) -> Option<ObjectId> {
        let cur = self.moved.get(&id).copied().unwrap_or(id);
        self.objects.contains_key(&cur).then_some(cur)
    }

    /// Whether the object is alive in this scene
    pub fn exists(&self, id: ObjectId) -> bool {
        self.current_id(id).is_some()
    }

    /// Borrow an object
    pub fn obj(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&self.current_id(id)?)
    }

    /// Mutably borrow an object
    pub fn obj_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        let id = self.current_id(id)?;
        self.objects.get_mut(&id)
    }

    /// Object at exactly this id, without following moves
    pub(crate) fn obj_exact(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    /// Ids of every live object, ascending
    pub(crate) fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    /// Scaled seconds since the last tick
    pub fn dt(&self) -> f32 {
        self.clock.delta_time()
    }

    /// Scaled seconds this scene has run
    pub fn time(&self) -> f32 {
        self.clock.total_time()
    }

    /// Ticks this scene has run
    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    pub(crate) fn advance_clock(&mut self, dt: f32) {
        self.clock.advance(dt);
    }

    pub(crate) fn hold_clock(&mut self) {
        self.clock.hold();
    }

    /// Logical screen size
    pub fn screen_size(&self) -> Vec2 {
        self.screen
    }

    /// Downward acceleration applied to bodies
    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Set the downward acceleration applied to bodies
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    /// User data entry
    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Mutable user data entry
    pub fn data_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Store a user data entry, returning the previous one
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    /// Input snapshot of the current tick
    pub fn input(&self) -> &InputSnapshot {
        &self.input
    }

    /// Replace the input snapshot and refresh the camera-space mouse
    pub fn set_input(&mut self, input: InputSnapshot) {
        self.input = input;
        self.camera.refresh_mouse(self.input.mouse_pos);
    }

    /// Raw mouse position in screen space
    pub fn mouse_pos(&self) -> Vec2 {
        self.input.mouse_pos
    }

    /// Switch to another declared scene at the next tick boundary
    pub fn go(&mut self, name: impl Into<String>, args: Vec<Value>) {
        self.request = Some(SceneRequest::Go(name.into(), args));
    }

    /// Rebuild this scene at the next tick boundary
    pub fn reload(&mut self) {
        self.request = Some(SceneRequest::Reload);
    }

    pub(crate) fn take_request(&mut self) -> Option<SceneRequest> {
        self.request.take()
    }

    /// Play a sound asset
    ///
    /// Unknown sounds and backend failures are reported and yield `None`.
    pub fn play(&self, sound: &str, params: &PlayParams) -> Option<Box<dyn AudioControl>> {
        let buffer = match self.services.assets.sound(sound) {
            Ok(buffer) => buffer,
            Err(err) => {
                self.report_error(&err);
                return None;
            }
        };
        match self.services.audio.borrow_mut().play(buffer, params) {
            Ok(control) => Some(control),
            Err(err) => {
                log::warn!("Failed to play '{sound}': {err}");
                self.services.log.borrow_mut().push(LogEntry {
                    level: LogLevel::Error,
                    message: format!("Failed to play '{sound}': {err}"),
                });
                None
            }
        }
    }

    /// Master volume
    pub fn volume(&self) -> f32 {
        self.services.audio.borrow().volume()
    }

    /// Set the master volume
    pub fn set_volume(&self, volume: f32) {
        self.services.audio.borrow_mut().set_volume(volume);
    }

    /// Add a line to the debug info being collected; only meaningful inside
    /// a `debugInfo` behaviour
    pub fn report(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.info.push((key.into(), value.to_string()));
    }

    /// Collect an object's debug info
    ///
    /// Starts with its id, tags and position, then whatever its `debugInfo`
    /// behaviours and handlers report.
    pub fn debug_info(&mut self, id: ObjectId) -> Result<Vec<(String, String)>, GameError> {
        let Some(obj) = self.obj(id) else {
            return Ok(Vec::new());
        };
        let mut lines = vec![
            ("id".to_string(), id.to_string()),
            ("tags".to_string(), obj.tags().join(", ")),
            ("pos".to_string(), format!("({:.1}, {:.1})", obj.pos.x, obj.pos.y)),
        ];
        self.info.clear();
        let result = self.trigger(id, Lifecycle::DebugInfo, &[]);
        lines.append(&mut self.info);
        result.map(|()| lines)
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("objects", &self.objects.len())
            .field("timers", &self.timers.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::pos;
    use crate::error::ResourceKind;
    use crate::object::component::bundle;
    use std::cell::RefCell;

    #[test]
    fn test_ids_increase_and_are_never_reused() {
        let mut scene = Scene::headless("test");
        let a = scene.add(["a"]).unwrap();
        let b = scene.add(["b"]).unwrap();
        assert!(b > a);
        scene.destroy(b).unwrap();
        let c = scene.add(["c"]).unwrap();
        assert!(c > b);
    }

    #[test]
    fn test_add_tags_and_is() {
        let mut scene = Scene::headless("test");
        let id = scene.add([pos(0.0, 0.0), "foo".into()]).unwrap();
        let obj = scene.obj(id).unwrap();
        assert!(obj.is("foo"));
        assert!(!obj.is_all(&["foo", "bar"]));
        assert!(obj.exists());
    }

    #[test]
    fn test_get_is_a_snapshot() {
        let mut scene = Scene::headless("test");
        let ids: Vec<_> = (0..3).map(|_| scene.add(["enemy"]).unwrap()).collect();
        scene.add(["player"]).unwrap();

        let snapshot = scene.get("enemy");
        assert_eq!(snapshot, ids);
        scene.destroy_all("enemy").unwrap();
        assert_eq!(snapshot.len(), 3);
        assert!(scene.get("enemy").is_empty());
        assert_eq!(scene.get("*").len(), 1);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut scene = Scene::headless("test");
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        scene.on_destroy("*", move |_, _| {
            *c.borrow_mut() += 1;
            Ok(())
        });
        let id = scene.add(["x"]).unwrap();
        scene.destroy(id).unwrap();
        scene.destroy(id).unwrap();
        assert_eq!(*count.borrow(), 1);
        assert!(!scene.exists(id));
    }

    #[test]
    fn test_destroy_from_own_destroy_handler() {
        let mut scene = Scene::headless("test");
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        scene.on_destroy("*", move |scene, id| {
            *c.borrow_mut() += 1;
            scene.destroy(id)
        });
        let id = scene.add(["x"]).unwrap();
        scene.destroy(id).unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_readd_moves_to_end_and_old_id_follows() {
        let mut scene = Scene::headless("test");
        let a = scene.add(["a"]).unwrap();
        let b = scene.add(["b"]).unwrap();
        let a2 = scene.readd(a).unwrap();

        assert!(a2 > b);
        assert_eq!(scene.get("*"), vec![b, a2]);
        assert_eq!(scene.current_id(a), Some(a2));
        assert!(scene.obj(a).unwrap().is("a"));

        scene.destroy(a).unwrap();
        assert!(!scene.exists(a2));
        assert!(!scene.exists(a));
    }

    #[test]
    fn test_repeated_readd_keeps_aliases_one_hop() {
        let mut scene = Scene::headless("test");
        let first = scene.add(["a"]).unwrap();
        let other = scene.add(["b"]).unwrap();
        let mut ids = vec![first];
        for _ in 0..1000 {
            let next = scene.readd(*ids.last().unwrap()).unwrap();
            ids.push(next);
        }
        let live = *ids.last().unwrap();

        assert_eq!(scene.moved.len(), 1000);
        assert!(scene.moved.values().all(|to| *to == live));
        assert_eq!(scene.current_id(first), Some(live));
        assert_eq!(scene.current_id(ids[500]), Some(live));

        scene.destroy(first).unwrap();
        assert!(scene.moved.is_empty());
        assert!(ids.iter().all(|id| !scene.exists(*id)));
        assert!(scene.exists(other));
    }

    #[test]
    fn test_every_skips_objects_destroyed_mid_iteration() {
        let mut scene = Scene::headless("test");
        let ids: Vec<_> = (0..3).map(|_| scene.add(["e"]).unwrap()).collect();
        let visited = Rc::new(RefCell::new(Vec::new()));
        let v = visited.clone();
        let last = ids[2];
        scene
            .every("e", move |scene, id| {
                v.borrow_mut().push(id);
                scene.destroy(last)
            })
            .unwrap();
        assert_eq!(*visited.borrow(), vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_add_value_reports_invalid_entries() {
        let mut scene = Scene::headless("test");
        let id = scene
            .add_value(Value::List(vec![
                bundle([("pos", Value::List(vec![1.into(), 2.into()])), ("hp", 3.into())]),
                Value::from(true),
                "hero".into(),
            ]))
            .unwrap();
        let obj = scene.obj(id).unwrap();
        assert!(obj.is("hero"));
        assert_eq!(obj.field("hp").and_then(Value::as_f64), Some(3.0));
        assert!(scene.services().log.borrow().has_errors());
    }

    #[test]
    fn test_missing_sound_is_reported() {
        let scene = Scene::headless("test");
        assert!(scene.play("boom", &PlayParams::default()).is_none());
        let log = scene.services().log.borrow();
        let entry = log.entries().next().unwrap();
        assert_eq!(entry.message, GameError::not_found(ResourceKind::Sound, "boom").to_string());
    }

    #[test]
    fn test_scene_requests() {
        let mut scene = Scene::headless("test");
        scene.go("lose", vec![Value::from(10)]);
        assert_eq!(
            scene.take_request(),
            Some(SceneRequest::Go("lose".into(), vec![Value::from(10)]))
        );
        assert_eq!(scene.take_request(), None);
    }

    #[test]
    fn test_debug_info_collects_reports() {
        let mut scene = Scene::headless("test");
        let id = scene
            .add([Component::new().on_debug_info(|scene, _| {
                scene.report("hp", 7);
                Ok(())
            })])
            .unwrap();
        let info = scene.debug_info(id).unwrap();
        assert_eq!(info.last(), Some(&("hp".to_string(), "7".to_string())));
        assert_eq!(info[0], ("id".to_string(), id.to_string()));
    }
}
