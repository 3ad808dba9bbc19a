//! Event dispatch
//!
//! Two tiers: every object carries its own behaviour lists, and the scene
//! keeps tag-scoped handler lists keyed by event. Dispatch on an object
//! always runs the object's own behaviours first, then the scene handlers
//! whose tag filter the object matches. Global actions and render callbacks
//! run once per tick, not per object.
//!
//! Lists are taken out of their owner for the duration of a dispatch and put
//! back afterwards, so callbacks get full mutable access to the scene and may
//! register further callbacks; those are appended and run from the next
//! dispatch on.

pub use crate::object::EventKey;

use super::Scene;
use crate::error::HookResult;
use crate::foundation::math::Vec2;
use crate::input::{ButtonState, KeyCode};
use crate::object::{Lifecycle, ObjectId, TagFilter, Value};
use std::collections::HashMap;
use std::mem;

/// Scene-level handler for an object event
pub type TagHandler = Box<dyn FnMut(&mut Scene, ObjectId, &[Value]) -> HookResult>;

/// Global per-tick callback
pub type Action = Box<dyn FnMut(&mut Scene) -> HookResult>;

pub(crate) struct TagEntry {
    filter: TagFilter,
    cb: TagHandler,
}

/// Scene-level registries
#[derive(Default)]
pub(crate) struct EventRegistry {
    tagged: HashMap<EventKey, Vec<TagEntry>>,
    actions: Vec<Action>,
    renders: Vec<Action>,
}

impl EventRegistry {
    fn push(&mut self, key: EventKey, filter: TagFilter, cb: TagHandler) {
        self.tagged.entry(key).or_default().push(TagEntry { filter, cb });
    }

    fn take(&mut self, key: &EventKey) -> Vec<TagEntry> {
        self.tagged.remove(key).unwrap_or_default()
    }

    fn restore(&mut self, key: &EventKey, mut list: Vec<TagEntry>) {
        if let Some(added) = self.tagged.remove(key) {
            list.extend(added);
        }
        if !list.is_empty() {
            self.tagged.insert(key.clone(), list);
        }
    }

    /// Number of scene handlers for an event
    pub(crate) fn count(&self, key: &EventKey) -> usize {
        self.tagged.get(key).map_or(0, Vec::len)
    }

    fn restore_list(slot: &mut Vec<Action>, mut list: Vec<Action>) {
        list.append(slot);
        *slot = list;
    }
}

impl Scene {
    /// Register a scene handler for `event` on objects matching `tag`
    ///
    /// Lifecycle handlers get an empty argument list; custom events get the
    /// arguments passed to [`Scene::trigger`].
    pub fn on(
        &mut self,
        event: impl Into<EventKey>,
        tag: impl Into<TagFilter>,
        cb: impl FnMut(&mut Scene, ObjectId, &[Value]) -> HookResult + 'static,
    ) {
        self.events.push(event.into(), tag.into(), Box::new(cb));
    }

    fn on_lifecycle(
        &mut self,
        lc: Lifecycle,
        tag: TagFilter,
        mut cb: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) {
        self.on(lc, tag, move |scene, id, _| cb(scene, id));
    }

    /// Run `cb` every tick for each object matching `tag`
    pub fn action(
        &mut self,
        tag: impl Into<TagFilter>,
        cb: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) {
        self.on_lifecycle(Lifecycle::Update, tag.into(), cb);
    }

    /// Run `cb` during the draw dispatch of each object matching `tag`
    pub fn render(
        &mut self,
        tag: impl Into<TagFilter>,
        cb: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) {
        self.on_lifecycle(Lifecycle::Draw, tag.into(), cb);
    }

    /// Run `cb` when an object matching `tag` is added
    pub fn on_add(
        &mut self,
        tag: impl Into<TagFilter>,
        cb: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) {
        self.on_lifecycle(Lifecycle::Add, tag.into(), cb);
    }

    /// Run `cb` when an object matching `tag` is destroyed
    pub fn on_destroy(
        &mut self,
        tag: impl Into<TagFilter>,
        cb: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) {
        self.on_lifecycle(Lifecycle::Destroy, tag.into(), cb);
    }

    /// Run `cb` once per tick after the object updates
    pub fn action_all(&mut self, cb: impl FnMut(&mut Scene) -> HookResult + 'static) {
        self.events.actions.push(Box::new(cb));
    }

    /// Run `cb` once per tick after the objects draw
    pub fn render_all(&mut self, cb: impl FnMut(&mut Scene) -> HookResult + 'static) {
        self.events.renders.push(Box::new(cb));
    }

    /// Number of scene handlers registered for an event
    pub fn handler_count(&self, event: impl Into<EventKey>) -> usize {
        self.events.count(&event.into())
    }

    /// Raise an event on an object
    ///
    /// Runs the object's own behaviours or handlers for the event, then the
    /// scene handlers whose tag filter the object matches.
    pub fn trigger(&mut self, id: ObjectId, event: impl Into<EventKey>, args: &[Value]) -> HookResult {
        let key = event.into();
        let Some(id) = self.current_id(id) else {
            return Ok(());
        };
        match &key {
            EventKey::Lifecycle(lc) => self.run_behaviors(id, *lc)?,
            EventKey::Custom(name) => self.run_obj_handlers(id, name, args)?,
        }
        match self.current_id(id) {
            Some(id) => self.run_tag_handlers(id, &key, args),
            None => Ok(()),
        }
    }

    fn run_behaviors(&mut self, id: ObjectId, lc: Lifecycle) -> HookResult {
        let Some(obj) = self.obj_mut(id) else {
            return Ok(());
        };
        let mut list = obj.behaviors.take(lc);
        let result = list.iter_mut().try_for_each(|behavior| match self.current_id(id) {
            Some(cur) => behavior(self, cur),
            None => Ok(()),
        });
        if let Some(obj) = self.obj_mut(id) {
            obj.behaviors.restore(lc, list);
        }
        result
    }

    fn run_obj_handlers(&mut self, id: ObjectId, event: &str, args: &[Value]) -> HookResult {
        let Some(obj) = self.obj_mut(id) else {
            return Ok(());
        };
        let mut list = obj.behaviors.take_handlers(event);
        let result = list.iter_mut().try_for_each(|handler| match self.current_id(id) {
            Some(cur) => handler(self, cur, args),
            None => Ok(()),
        });
        if let Some(obj) = self.obj_mut(id) {
            obj.behaviors.restore_handlers(event, list);
        }
        result
    }

    fn run_tag_handlers(&mut self, id: ObjectId, key: &EventKey, args: &[Value]) -> HookResult {
        let mut list = self.events.take(key);
        let result = list.iter_mut().try_for_each(|entry| {
            let Some(cur) = self.current_id(id) else {
                return Ok(());
            };
            if self.obj(cur).is_some_and(|obj| entry.filter.matches(obj)) {
                (entry.cb)(self, cur, args)
            } else {
                Ok(())
            }
        });
        self.events.restore(key, list);
        result
    }

    /// Run global actions in registration order
    pub(crate) fn run_actions(&mut self) -> HookResult {
        let mut list = mem::take(&mut self.events.actions);
        let result = list.iter_mut().try_for_each(|action| action(self));
        EventRegistry::restore_list(&mut self.events.actions, list);
        result
    }

    /// Run global render callbacks in registration order
    pub(crate) fn run_renders(&mut self) -> HookResult {
        let mut list = mem::take(&mut self.events.renders);
        let result = list.iter_mut().try_for_each(|render| render(self));
        EventRegistry::restore_list(&mut self.events.renders, list);
        result
    }

    /// Run `cb` every tick the key is held
    pub fn key_down(&mut self, key: KeyCode, mut cb: impl FnMut(&mut Scene) -> HookResult + 'static) {
        self.action_all(move |scene| {
            if scene.input.key_down(key) {
                cb(scene)?;
            }
            Ok(())
        });
    }

    /// Run `cb` when the key goes down
    pub fn key_press(&mut self, key: KeyCode, mut cb: impl FnMut(&mut Scene) -> HookResult + 'static) {
        self.action_all(move |scene| {
            if scene.input.key_pressed(key) {
                cb(scene)?;
            }
            Ok(())
        });
    }

    /// Run `cb` when the key goes down or auto-repeats
    pub fn key_press_rep(
        &mut self,
        key: KeyCode,
        mut cb: impl FnMut(&mut Scene) -> HookResult + 'static,
    ) {
        self.action_all(move |scene| {
            if scene.input.key_pressed_rep(key) {
                cb(scene)?;
            }
            Ok(())
        });
    }

    /// Run `cb` when the key goes up
    pub fn key_release(
        &mut self,
        key: KeyCode,
        mut cb: impl FnMut(&mut Scene) -> HookResult + 'static,
    ) {
        self.action_all(move |scene| {
            if scene.input.key_released(key) {
                cb(scene)?;
            }
            Ok(())
        });
    }

    /// Run `cb` for every character typed this tick
    pub fn char_input(&mut self, mut cb: impl FnMut(&mut Scene, char) -> HookResult + 'static) {
        self.action_all(move |scene| {
            let chars = scene.input.chars.clone();
            chars.into_iter().try_for_each(|c| cb(scene, c))
        });
    }

    fn on_mouse(
        &mut self,
        when: fn(ButtonState) -> bool,
        mut cb: impl FnMut(&mut Scene, Vec2) -> HookResult + 'static,
    ) {
        self.action_all(move |scene| {
            if when(scene.input.mouse) {
                let pos = scene.mouse_world_pos();
                cb(scene, pos)?;
            }
            Ok(())
        });
    }

    /// Run `cb` with the camera-space mouse position every tick the button is held
    pub fn mouse_down(&mut self, cb: impl FnMut(&mut Scene, Vec2) -> HookResult + 'static) {
        self.on_mouse(ButtonState::is_down, cb);
    }

    /// Run `cb` when the button goes down
    pub fn mouse_click(&mut self, cb: impl FnMut(&mut Scene, Vec2) -> HookResult + 'static) {
        self.on_mouse(ButtonState::is_pressed, cb);
    }

    /// Run `cb` when the button goes up
    pub fn mouse_release(&mut self, cb: impl FnMut(&mut Scene, Vec2) -> HookResult + 'static) {
        self.on_mouse(ButtonState::is_released, cb);
    }

    /// Run `cb` when an object matching `tag` is clicked
    pub fn clicks(
        &mut self,
        tag: impl Into<TagFilter>,
        mut cb: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) {
        self.action(tag, move |scene, id| {
            if scene.is_clicked(id) {
                cb(scene, id)?;
            }
            Ok(())
        });
    }

    /// Run `cb` every tick the mouse is over an object matching `tag`
    pub fn hovers(
        &mut self,
        tag: impl Into<TagFilter>,
        mut cb: impl FnMut(&mut Scene, ObjectId) -> HookResult + 'static,
    ) {
        self.action(tag, move |scene, id| {
            if scene.is_hovered(id) {
                cb(scene, id)?;
            }
            Ok(())
        });
    }
}
