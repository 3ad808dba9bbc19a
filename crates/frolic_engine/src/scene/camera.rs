//! Scene camera
//!
//! The camera matrix maps world space to screen space:
//!
//! ```text
//! T(center) * S(scale) * R(angle) * T(-center) * T(center - pos + shake)
//! ```
//!
//! so a camera at the screen center with unit scale and no rotation is the
//! identity. Shake is a magnitude decaying toward zero every tick, turned
//! into an offset of that length in a random direction.

use super::Scene;
use crate::foundation::math::{dir, lerp, rotation, scaling, transform_point, translation, Mat3, Vec2};
use rand::Rng;
use std::f32::consts::TAU;

/// Shake decay rate per second
const SHAKE_DECAY: f32 = 5.0;

/// Camera state
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World point shown at the screen center
    pub pos: Vec2,
    /// Zoom
    pub scale: Vec2,
    /// Rotation in radians
    pub angle: f32,
    /// Current shake magnitude in pixels
    pub shake: f32,
    ignore: Vec<String>,
    matrix: Mat3,
    mouse_pos: Vec2,
}

impl Camera {
    /// Camera centered on a screen of `screen` size
    pub fn new(screen: Vec2) -> Self {
        Self {
            pos: screen / 2.0,
            scale: Vec2::new(1.0, 1.0),
            angle: 0.0,
            shake: 0.0,
            ignore: Vec::new(),
            matrix: Mat3::identity(),
            mouse_pos: Vec2::zeros(),
        }
    }

    /// World-to-screen transform computed on the last update
    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    /// Mouse position in world space
    pub fn mouse_pos(&self) -> Vec2 {
        self.mouse_pos
    }

    /// Whether objects on `layer` are drawn and hit-tested in screen space
    pub fn ignores(&self, layer: Option<&str>) -> bool {
        layer.is_some_and(|layer| self.ignore.iter().any(|l| l == layer))
    }

    /// Layers exempt from the camera transform
    pub fn ignored_layers(&self) -> &[String] {
        &self.ignore
    }

    /// Recompute the matrix for this tick and decay the shake
    fn update(&mut self, screen: Vec2, dt: f32, shake_dir: f32, raw_mouse: Vec2) {
        let center = screen / 2.0;
        let offset = dir(shake_dir) * self.shake;
        self.shake = lerp(self.shake, 0.0, (SHAKE_DECAY * dt).min(1.0));
        self.matrix = translation(center)
            * scaling(self.scale)
            * rotation(self.angle)
            * translation(-center)
            * translation(center - self.pos + offset);
        self.refresh_mouse(raw_mouse);
    }

    pub(crate) fn refresh_mouse(&mut self, raw_mouse: Vec2) {
        self.mouse_pos = self
            .matrix
            .try_inverse()
            .map_or(raw_mouse, |inverse| transform_point(&inverse, raw_mouse));
    }
}

impl Scene {
    /// Camera state
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Point the camera at a world position
    pub fn cam_pos(&mut self, pos: Vec2) {
        self.camera.pos = pos;
    }

    /// Set the camera zoom
    pub fn cam_scale(&mut self, scale: Vec2) {
        self.camera.scale = scale;
    }

    /// Set the camera rotation in radians
    pub fn cam_rot(&mut self, angle: f32) {
        self.camera.angle = angle;
    }

    /// Start shaking with the given magnitude
    pub fn shake(&mut self, intensity: f32) {
        self.camera.shake = intensity.max(0.0);
    }

    /// Exempt layers from the camera transform (UI layers)
    pub fn cam_ignore(&mut self, layers: &[&str]) {
        self.camera.ignore = layers.iter().map(ToString::to_string).collect();
    }

    /// Mouse position in world space
    pub fn mouse_world_pos(&self) -> Vec2 {
        self.camera.mouse_pos()
    }

    /// Camera phase of a tick
    pub(crate) fn update_camera(&mut self) {
        let shake_dir = if self.camera.shake > 0.0 {
            self.rng.gen_range(0.0..TAU)
        } else {
            0.0
        };
        let (screen, dt, mouse) = (self.screen_size(), self.dt(), self.input.mouse_pos);
        self.camera.update(screen, dt, shake_dir, mouse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::vec2;
    use crate::input::{ButtonState, InputSnapshot};
    use approx::assert_relative_eq;

    #[test]
    fn test_centered_camera_is_identity() {
        let mut scene = Scene::headless("test");
        scene.update_camera();
        assert_relative_eq!(*scene.camera().matrix(), Mat3::identity());
    }

    #[test]
    fn test_camera_pos_offsets_mouse() {
        let mut scene = Scene::headless("test");
        let center = scene.screen_size() / 2.0;
        scene.cam_pos(center + vec2(100.0, 50.0));
        scene.set_input(InputSnapshot::new().with_mouse(vec2(10.0, 10.0), ButtonState::Up));
        scene.update_camera();

        assert_relative_eq!(scene.mouse_world_pos(), vec2(110.0, 60.0), epsilon = 1e-4);
        assert_relative_eq!(scene.mouse_pos(), vec2(10.0, 10.0));
    }

    #[test]
    fn test_zoom_is_about_screen_center() {
        let mut scene = Scene::headless("test");
        let center = scene.screen_size() / 2.0;
        scene.cam_scale(vec2(2.0, 2.0));
        scene.update_camera();

        let m = scene.camera().matrix();
        assert_relative_eq!(transform_point(m, center), center, epsilon = 1e-4);
        assert_relative_eq!(
            transform_point(m, center + vec2(10.0, 0.0)),
            center + vec2(20.0, 0.0),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_shake_decays_toward_zero() {
        let mut scene = Scene::headless("test");
        scene.shake(12.0);
        scene.advance_clock(0.1);
        scene.update_camera();
        assert_relative_eq!(scene.camera().shake, 6.0, epsilon = 1e-4);

        for _ in 0..60 {
            scene.advance_clock(0.1);
            scene.update_camera();
        }
        assert!(scene.camera().shake < 1e-6);
    }

    #[test]
    fn test_ignored_layers() {
        let mut scene = Scene::headless("test");
        scene.cam_ignore(&["ui"]);
        assert!(scene.camera().ignores(Some("ui")));
        assert!(!scene.camera().ignores(Some("game")));
        assert!(!scene.camera().ignores(None));
    }
}
