//! Per-tick phases of a scene
//!
//! A tick runs [`FramePhase::Timers`], [`FramePhase::Update`],
//! [`FramePhase::Camera`] and [`FramePhase::Draw`] in that order. The game
//! loop drives them one at a time so it can tell which phase failed;
//! [`Scene::step`] runs a whole simulation tick for headless use.

use super::Scene;
use crate::error::HookResult;
use crate::object::Lifecycle;
use std::fmt;

/// Phase of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramePhase {
    /// Due timers fire
    Timers,
    /// Objects update in reverse insertion order, then global actions
    Update,
    /// Camera matrix, shake decay and camera-space mouse
    Camera,
    /// Objects draw in insertion order, then global renders
    Draw,
}

impl FramePhase {
    /// Phases in execution order
    pub const ALL: [FramePhase; 4] = [
        FramePhase::Timers,
        FramePhase::Update,
        FramePhase::Camera,
        FramePhase::Draw,
    ];

    /// Whether the phase is skipped while the game is paused
    pub fn pausable(self) -> bool {
        matches!(self, FramePhase::Timers | FramePhase::Update)
    }
}

impl fmt::Display for FramePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FramePhase::Timers => "timers",
            FramePhase::Update => "update",
            FramePhase::Camera => "camera",
            FramePhase::Draw => "draw",
        })
    }
}

impl Scene {
    /// Run one phase of the current tick
    pub fn run_phase(&mut self, phase: FramePhase) -> HookResult {
        match phase {
            FramePhase::Timers => self.run_timers(),
            FramePhase::Update => self.update_phase(),
            FramePhase::Camera => {
                self.update_camera();
                Ok(())
            }
            FramePhase::Draw => self.draw_phase(),
        }
    }

    /// Start a tick lasting `dt` seconds
    pub fn begin_tick(&mut self, dt: f32) {
        self.advance_clock(dt);
    }

    /// Start a frame that does not advance the simulation
    ///
    /// `dt()` reads zero until the next [`Scene::begin_tick`], so phases that
    /// still run while paused do not move time-based state.
    pub fn hold_tick(&mut self) {
        self.hold_clock();
    }

    /// Advance the simulation by one tick without drawing
    pub fn step(&mut self, dt: f32) -> HookResult {
        self.begin_tick(dt);
        self.run_phase(FramePhase::Timers)?;
        self.run_phase(FramePhase::Update)?;
        self.run_phase(FramePhase::Camera)
    }

    fn update_phase(&mut self) -> HookResult {
        for id in self.ids().into_iter().rev() {
            // exact lookup: an object readded this tick is not visited twice
            match self.obj_exact(id) {
                Some(obj) if !obj.paused => {}
                _ => continue,
            }
            self.tick_drawable(id)?;
            self.step_body(id)?;
            self.trigger(id, Lifecycle::Update, &[])?;
        }
        self.run_actions()
    }

    fn draw_phase(&mut self) -> HookResult {
        for id in self.ids() {
            let ignored = match self.obj_exact(id) {
                Some(obj) if !obj.hidden => self.camera.ignores(self.layers.effective(obj)),
                _ => continue,
            };
            self.gfx.push_transform();
            if !ignored {
                self.gfx.push_matrix(*self.camera.matrix());
            }
            self.draw_drawable(id);
            let result = self.trigger(id, Lifecycle::Draw, &[]);
            self.gfx.pop_transform();
            result?;
        }
        self.run_renders()
    }
}
