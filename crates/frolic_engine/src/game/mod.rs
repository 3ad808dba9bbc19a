//! Game loop
//!
//! [`Game`] owns the declared scenes and drives the current one, one
//! [`Game::frame`] per display refresh. Scene switches requested during a
//! tick are applied at the start of the next one. A callback that fails or
//! panics halts the loop for good: the error is logged, shown in the rolling
//! log, and every later frame returns [`FrameStatus::Halted`].

mod overlay;

use crate::assets::Assets;
use crate::audio::{AudioBackend, NullAudio};
use crate::config::EngineConfig;
use crate::error::{EngineError, GameError, HookResult, ResourceKind};
use crate::foundation::logging::{LogEntry, LogLevel};
use crate::foundation::time::FrameClock;
use crate::input::InputSnapshot;
use crate::object::Value;
use crate::render::RenderBackend;
use crate::scene::{FramePhase, Scene, SceneRequest, Services};
use bitflags::bitflags;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Scene builder, run when a scene is first entered or reloaded
pub type SceneInit = Box<dyn FnMut(&mut Scene, &[Value]) -> HookResult>;

bitflags! {
    /// Debug overlay toggles
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DebugFlags: u8 {
        /// Show the hovered object's debug info
        const INSPECT = 1 << 0;
        /// Always show the rolling log, not only when it holds errors
        const SHOW_LOG = 1 << 1;
        /// Outline collision areas
        const SHOW_AREAS = 1 << 2;
    }
}

/// Debug controls
#[derive(Debug, Clone, PartialEq)]
pub struct DebugState {
    /// Overlay toggles
    pub flags: DebugFlags,
    paused: bool,
    step: bool,
}

impl DebugState {
    fn new(enabled: bool) -> Self {
        let flags = if enabled {
            DebugFlags::INSPECT | DebugFlags::SHOW_LOG
        } else {
            DebugFlags::empty()
        };
        Self {
            flags,
            paused: false,
            step: false,
        }
    }

    /// Whether the simulation is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop running timers and updates; the scene keeps drawing
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        self.paused = false;
        self.step = false;
    }

    /// Run exactly one simulation tick on the next frame while paused
    pub fn step_frame(&mut self) {
        self.step = true;
    }
}

/// Outcome of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A tick ran
    Ran,
    /// No scene is current; nothing ran
    Idle,
    /// An earlier fatal error stopped the loop
    Halted,
}

struct SceneSlot {
    scene: Scene,
    args: Vec<Value>,
}

/// Scene registry and frame loop
pub struct Game {
    services: Rc<Services>,
    declared: HashMap<String, SceneInit>,
    scenes: HashMap<String, SceneSlot>,
    current: Option<String>,
    pending: Option<SceneRequest>,
    clock: FrameClock,
    debug: DebugState,
    halted: bool,
}

impl Game {
    /// Create a game around its collaborators
    pub fn new(config: EngineConfig, assets: Assets, audio: Box<dyn AudioBackend>) -> Self {
        log::info!("Creating game ({}x{})", config.width, config.height);
        let debug = DebugState::new(config.debug);
        Self {
            services: Rc::new(Services::new(config, assets, audio)),
            declared: HashMap::new(),
            scenes: HashMap::new(),
            current: None,
            pending: None,
            clock: FrameClock::new(),
            debug,
            halted: false,
        }
    }

    /// Game with silent audio
    pub fn headless(config: EngineConfig, assets: Assets) -> Self {
        Self::new(config, assets, Box::new(NullAudio::new()))
    }

    /// Shared collaborators
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Declare a scene
    pub fn scene(
        &mut self,
        name: impl Into<String>,
        init: impl FnMut(&mut Scene, &[Value]) -> HookResult + 'static,
    ) {
        let name = name.into();
        if self.declared.insert(name.clone(), Box::new(init)).is_some() {
            log::warn!("Scene '{name}' declared twice, keeping the last declaration");
        }
    }

    /// Switch scenes at the start of the next frame
    ///
    /// A scene entered before keeps its objects; see [`Game::reload`].
    pub fn go(&mut self, name: impl Into<String>, args: Vec<Value>) {
        self.pending = Some(SceneRequest::Go(name.into(), args));
    }

    /// Switch scenes now
    pub fn go_now(&mut self, name: &str, args: Vec<Value>) -> Result<(), EngineError> {
        self.apply(SceneRequest::Go(name.to_string(), args))
    }

    /// Rebuild the current scene at the start of the next frame
    pub fn reload(&mut self) {
        self.pending = Some(SceneRequest::Reload);
    }

    /// Rebuild the current scene now, with the arguments it was entered with
    pub fn reload_now(&mut self) -> Result<(), EngineError> {
        self.apply(SceneRequest::Reload)
    }

    /// Name of the current scene
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The current scene
    pub fn current_scene(&self) -> Option<&Scene> {
        let name = self.current.as_ref()?;
        self.scenes.get(name).map(|slot| &slot.scene)
    }

    /// The current scene, mutably
    pub fn current_scene_mut(&mut self) -> Option<&mut Scene> {
        let name = self.current.as_ref()?;
        self.scenes.get_mut(name).map(|slot| &mut slot.scene)
    }

    /// Debug controls
    pub fn debug(&self) -> &DebugState {
        &self.debug
    }

    /// Mutable debug controls
    pub fn debug_mut(&mut self) -> &mut DebugState {
        &mut self.debug
    }

    /// Set the simulation speed multiplier
    pub fn set_time_scale(&mut self, scale: f32) {
        self.clock.set_time_scale(scale);
    }

    /// Simulation speed multiplier
    pub fn time_scale(&self) -> f32 {
        self.clock.time_scale()
    }

    /// Append a message to the rolling log
    pub fn log(&self, message: impl Into<String>) {
        self.services.log.borrow_mut().info(message);
    }

    /// Whether a fatal error stopped the loop
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    fn apply(&mut self, request: SceneRequest) -> Result<(), EngineError> {
        if self.halted {
            return Err(EngineError::Halted);
        }
        let (name, args, rebuild) = match request {
            SceneRequest::Go(name, args) => (name, args, false),
            SceneRequest::Reload => {
                let Some(name) = self.current.clone() else {
                    log::warn!("Reload requested with no current scene");
                    return Ok(());
                };
                let args = self.scenes.get(&name).map(|slot| slot.args.clone()).unwrap_or_default();
                (name, args, true)
            }
        };

        let Some(init) = self.declared.get_mut(&name) else {
            let err = GameError::not_found(ResourceKind::Scene, &name);
            log::warn!("{err}");
            self.services.log.borrow_mut().push(LogEntry {
                level: LogLevel::Error,
                message: err.to_string(),
            });
            return Err(EngineError::SceneNotFound(name));
        };

        if !rebuild && self.scenes.contains_key(&name) {
            log::info!("Switching to scene '{name}'");
            self.current = Some(name);
            return Ok(());
        }

        log::info!("Entering scene '{name}'");
        let mut scene = Scene::new(name.clone(), Rc::clone(&self.services));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| init(&mut scene, &args)));
        self.scenes.insert(name.clone(), SceneSlot { scene, args });
        self.current = Some(name);
        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(self.fatal("init", err.to_string())),
            Err(payload) => Err(self.fatal("init", panic_message(payload.as_ref()))),
        }
    }

    fn fatal(&mut self, phase: &str, message: String) -> EngineError {
        let err = EngineError::FatalTick {
            frame: self.clock.frame_count(),
            phase: phase.to_string(),
            message,
        };
        log::error!("{err}");
        self.services.log.borrow_mut().push(LogEntry {
            level: LogLevel::Error,
            message: err.to_string(),
        });
        self.halted = true;
        err
    }

    /// Run one tick of the current scene and submit its frame
    ///
    /// `dt` is the real time since the previous frame in seconds; it is
    /// multiplied by the time scale before reaching the scene.
    pub fn frame(
        &mut self,
        dt: f32,
        input: InputSnapshot,
        backend: &mut dyn RenderBackend,
    ) -> Result<FrameStatus, EngineError> {
        if self.halted {
            return Ok(FrameStatus::Halted);
        }
        let dt = self.clock.advance(dt);

        if let Some(request) = self.pending.take() {
            match self.apply(request) {
                Ok(()) | Err(EngineError::SceneNotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }

        let Some(name) = self.current.clone() else {
            return Ok(FrameStatus::Idle);
        };
        let paused = self.debug.paused && !std::mem::take(&mut self.debug.step);
        let flags = self.debug.flags;
        let frame = self.clock.frame_count();
        let Some(slot) = self.scenes.get_mut(&name) else {
            return Ok(FrameStatus::Idle);
        };
        let scene = &mut slot.scene;

        scene.set_input(input);
        if paused {
            scene.hold_tick();
        } else {
            scene.begin_tick(dt);
        }
        for phase in FramePhase::ALL {
            if paused && phase.pausable() {
                continue;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                scene.run_phase(phase)?;
                if phase == FramePhase::Draw {
                    overlay::draw(scene, flags, paused)?;
                }
                Ok::<(), GameError>(())
            }));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };
            scene.gfx.clear();
            log::debug!("Tick {frame} of scene '{name}' failed in {phase}");
            return Err(self.fatal(&phase.to_string(), message));
        }

        backend.frame_start(self.services.config.clear_color);
        scene.gfx.flush(backend);
        backend.frame_end();

        if let Some(request) = scene.take_request() {
            self.pending = Some(request);
        }
        Ok(FrameStatus::Ran)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{pos, rect};
    use crate::object::Component;
    use crate::render::HeadlessBackend;
    use std::cell::RefCell;

    fn game() -> Game {
        let config = EngineConfig {
            rng_seed: Some(1),
            ..EngineConfig::default()
        };
        Game::headless(config, Assets::new())
    }

    fn run(game: &mut Game, backend: &mut HeadlessBackend) -> Result<FrameStatus, EngineError> {
        game.frame(1.0 / 60.0, InputSnapshot::new(), backend)
    }

    #[test]
    fn test_frame_draws_current_scene() {
        let mut game = game();
        game.scene("main", |scene, _| {
            scene.add([pos(10.0, 10.0), rect(5.0, 5.0)])?;
            Ok(())
        });
        game.go_now("main", Vec::new()).unwrap();

        let mut backend = HeadlessBackend::new(640.0, 480.0);
        assert_eq!(run(&mut game, &mut backend).unwrap(), FrameStatus::Ran);
        assert_eq!(backend.quads().len(), 1);
        assert_eq!(backend.frames(), 1);
        assert_eq!(backend.depth(), 0);
    }

    #[test]
    fn test_no_scene_is_idle() {
        let mut game = game();
        let mut backend = HeadlessBackend::new(640.0, 480.0);
        assert_eq!(run(&mut game, &mut backend).unwrap(), FrameStatus::Idle);
    }

    #[test]
    fn test_failing_callback_halts_loop() {
        let mut game = game();
        let ticks = Rc::new(RefCell::new(0));
        let t = ticks.clone();
        game.scene("main", move |scene, _| {
            let t = t.clone();
            scene.action_all(move |scene| {
                *t.borrow_mut() += 1;
                if scene.frame_count() == 2 {
                    return Err(GameError::script("boom"));
                }
                Ok(())
            });
            Ok(())
        });
        game.go_now("main", Vec::new()).unwrap();
        let mut backend = HeadlessBackend::new(640.0, 480.0);

        assert_eq!(run(&mut game, &mut backend).unwrap(), FrameStatus::Ran);
        let err = run(&mut game, &mut backend).unwrap_err();
        assert!(matches!(err, EngineError::FatalTick { ref phase, ref message, .. } if phase == "update" && message == "boom"));
        assert_eq!(run(&mut game, &mut backend).unwrap(), FrameStatus::Halted);
        assert_eq!(*ticks.borrow(), 2);
        assert!(game.is_halted());
        assert!(game.services().log.borrow().has_errors());
        // the failed tick never reached the backend
        assert_eq!(backend.frames(), 1);
    }

    #[test]
    fn test_panicking_callback_halts_loop() {
        let mut game = game();
        game.scene("main", |scene, _| {
            scene.add([Component::new().on_draw(|_, _| panic!("draw exploded"))])?;
            Ok(())
        });
        game.go_now("main", Vec::new()).unwrap();
        let mut backend = HeadlessBackend::new(640.0, 480.0);

        let err = run(&mut game, &mut backend).unwrap_err();
        assert!(err.to_string().contains("draw exploded"));
        assert_eq!(run(&mut game, &mut backend).unwrap(), FrameStatus::Halted);
    }

    #[test]
    fn test_scene_switch_is_deferred_and_keeps_state() {
        let mut game = game();
        game.scene("a", |scene, _| {
            scene.add(["thing"])?;
            scene.key_press(crate::input::KeyCode::Space, |scene| {
                scene.go("b", vec![Value::from(3)]);
                Ok(())
            });
            Ok(())
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        game.scene("b", move |_, args| {
            s.borrow_mut().push(args.to_vec());
            Ok(())
        });
        game.go_now("a", Vec::new()).unwrap();
        let mut backend = HeadlessBackend::new(640.0, 480.0);

        let press = InputSnapshot::new().with_key(crate::input::KeyCode::Space, crate::input::ButtonState::Pressed);
        game.frame(0.016, press, &mut backend).unwrap();
        assert_eq!(game.current_name(), Some("a"));
        run(&mut game, &mut backend).unwrap();
        assert_eq!(game.current_name(), Some("b"));
        assert_eq!(*seen.borrow(), vec![vec![Value::from(3)]]);

        game.go_now("a", Vec::new()).unwrap();
        assert_eq!(game.current_scene().unwrap().get("thing").len(), 1);
    }

    #[test]
    fn test_reload_rebuilds_scene() {
        let mut game = game();
        game.scene("main", |scene, _| {
            scene.add(["thing"])?;
            Ok(())
        });
        game.go_now("main", Vec::new()).unwrap();
        game.current_scene_mut().unwrap().add(["extra"]).unwrap();
        game.reload_now().unwrap();
        let scene = game.current_scene().unwrap();
        assert_eq!(scene.len(), 1);
        assert!(scene.get("extra").is_empty());
    }

    #[test]
    fn test_unknown_scene_is_reported() {
        let mut game = game();
        let err = game.go_now("nowhere", Vec::new()).unwrap_err();
        assert!(matches!(err, EngineError::SceneNotFound(ref n) if n == "nowhere"));
        assert!(!game.is_halted());
        assert!(game.services().log.borrow().has_errors());
    }

    #[test]
    fn test_pause_and_step_frame() {
        let mut game = game();
        let ticks = Rc::new(RefCell::new(0));
        let t = ticks.clone();
        game.scene("main", move |scene, _| {
            let t = t.clone();
            scene.action_all(move |_| {
                *t.borrow_mut() += 1;
                Ok(())
            });
            Ok(())
        });
        game.go_now("main", Vec::new()).unwrap();
        let mut backend = HeadlessBackend::new(640.0, 480.0);

        game.debug_mut().pause();
        run(&mut game, &mut backend).unwrap();
        assert_eq!(*ticks.borrow(), 0);
        game.debug_mut().step_frame();
        run(&mut game, &mut backend).unwrap();
        run(&mut game, &mut backend).unwrap();
        assert_eq!(*ticks.borrow(), 1);
        game.debug_mut().resume();
        run(&mut game, &mut backend).unwrap();
        assert_eq!(*ticks.borrow(), 2);
        // paused frames still draw
        assert_eq!(backend.frames(), 4);
    }

    #[test]
    fn test_paused_frames_hold_shake() {
        let mut game = game();
        game.scene("main", |scene, _| {
            scene.shake(10.0);
            Ok(())
        });
        game.go_now("main", Vec::new()).unwrap();
        let mut backend = HeadlessBackend::new(640.0, 480.0);

        run(&mut game, &mut backend).unwrap();
        let shake = game.current_scene().unwrap().camera().shake;
        assert!(shake > 0.0 && shake < 10.0);

        game.debug_mut().pause();
        for _ in 0..30 {
            run(&mut game, &mut backend).unwrap();
        }
        let scene = game.current_scene().unwrap();
        assert_eq!(scene.dt(), 0.0);
        assert_eq!(scene.camera().shake, shake);

        game.debug_mut().resume();
        run(&mut game, &mut backend).unwrap();
        assert!(game.current_scene().unwrap().camera().shake < shake);
    }

    #[test]
    fn test_time_scale_slows_scene_clock() {
        let mut game = game();
        game.scene("main", |_, _| Ok(()));
        game.go_now("main", Vec::new()).unwrap();
        game.set_time_scale(0.5);
        let mut backend = HeadlessBackend::new(640.0, 480.0);
        game.frame(0.2, InputSnapshot::new(), &mut backend).unwrap();
        approx::assert_relative_eq!(game.current_scene().unwrap().dt(), 0.1);
    }
}
