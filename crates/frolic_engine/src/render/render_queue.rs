//! # Draw Queue
//!
//! Collects the draw commands issued during the draw phase of a tick. The
//! queue is replayed onto the [`RenderBackend`] once the phase completes, so
//! a tick that fails halfway never submits a partial frame.

use super::{Quad, RenderBackend};
use crate::foundation::math::{Mat3, Vec2};

/// Single rendering instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Save the transform
    PushTransform,
    /// Restore the transform
    PopTransform,
    /// Multiply by a matrix
    PushMatrix(Mat3),
    /// Translate
    PushTranslate(Vec2),
    /// Scale
    PushScale(Vec2),
    /// Rotate by radians
    PushRotate(f32),
    /// Draw a quad
    Quad(Quad),
}

/// Ordered command list for one frame
#[derive(Debug, Default)]
pub struct DrawQueue {
    commands: Vec<DrawCommand>,
    depth: usize,
}

impl DrawQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Save the transform
    pub fn push_transform(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::PushTransform);
    }

    /// Restore the transform; unmatched pops are dropped
    pub fn pop_transform(&mut self) {
        if self.depth == 0 {
            log::warn!("Unbalanced pop_transform ignored");
            return;
        }
        self.depth -= 1;
        self.commands.push(DrawCommand::PopTransform);
    }

    /// Multiply by a matrix
    pub fn push_matrix(&mut self, m: Mat3) {
        self.commands.push(DrawCommand::PushMatrix(m));
    }

    /// Translate
    pub fn push_translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::PushTranslate(offset));
    }

    /// Scale
    pub fn push_scale(&mut self, scale: Vec2) {
        self.commands.push(DrawCommand::PushScale(scale));
    }

    /// Rotate
    pub fn push_rotate(&mut self, angle: f32) {
        self.commands.push(DrawCommand::PushRotate(angle));
    }

    /// Draw a quad
    pub fn draw_quad(&mut self, quad: Quad) {
        self.commands.push(DrawCommand::Quad(quad));
    }

    /// Recorded commands
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop everything recorded
    pub fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
    }

    /// Replay onto a backend and empty the queue
    ///
    /// Transform scopes left open are closed so the backend stack stays balanced.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend) {
        for command in self.commands.drain(..) {
            match command {
                DrawCommand::PushTransform => backend.push_transform(),
                DrawCommand::PopTransform => backend.pop_transform(),
                DrawCommand::PushMatrix(m) => backend.push_matrix(&m),
                DrawCommand::PushTranslate(v) => backend.push_translate(v),
                DrawCommand::PushScale(v) => backend.push_scale(v),
                DrawCommand::PushRotate(a) => backend.push_rotate(a),
                DrawCommand::Quad(quad) => backend.draw_quad(&quad),
            }
        }
        for _ in 0..self.depth {
            backend.pop_transform();
        }
        self.depth = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    #[test]
    fn test_flush_replays_and_balances() {
        let mut queue = DrawQueue::new();
        queue.push_transform();
        queue.push_transform();
        queue.draw_quad(Quad::new(1.0, 1.0));
        queue.pop_transform();
        queue.pop_transform();
        queue.pop_transform();
        queue.push_transform();
        assert_eq!(queue.len(), 6);

        let mut backend = HeadlessBackend::new(10.0, 10.0);
        queue.flush(&mut backend);
        assert!(queue.is_empty());
        assert_eq!(backend.quads().len(), 1);
        assert_eq!(backend.depth(), 0);
    }
}
