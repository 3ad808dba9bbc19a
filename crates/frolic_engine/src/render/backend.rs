//! Backend abstraction traits for the rendering system
//!
//! The engine never talks to a graphics API. Each frame it replays its
//! [`DrawQueue`](super::DrawQueue) onto a [`RenderBackend`], which owns the
//! transform stack and turns quads into batched GPU work.

use super::Quad;
use crate::foundation::math::{rotation, scaling, transform_point, translation, Color, Mat3, Rect, Vec2};

/// Draw-primitive surface the engine renders through
pub trait RenderBackend {
    /// Logical screen size
    fn screen_size(&self) -> Vec2;

    /// Begin a frame
    fn frame_start(&mut self, _clear_color: Color) {}

    /// Save the current transform
    fn push_transform(&mut self);

    /// Restore the last saved transform
    fn pop_transform(&mut self);

    /// Multiply the current transform by `m`
    fn push_matrix(&mut self, m: &Mat3);

    /// Translate the current transform
    fn push_translate(&mut self, offset: Vec2) {
        self.push_matrix(&translation(offset));
    }

    /// Scale the current transform
    fn push_scale(&mut self, scale: Vec2) {
        self.push_matrix(&scaling(scale));
    }

    /// Rotate the current transform
    fn push_rotate(&mut self, angle: f32) {
        self.push_matrix(&rotation(angle));
    }

    /// Draw a quad under the current transform
    fn draw_quad(&mut self, quad: &Quad);

    /// Map a point through the current transform
    fn to_device(&self, pt: Vec2) -> Vec2;

    /// Submit the frame
    fn frame_end(&mut self);
}

/// A quad as the headless backend saw it
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnQuad {
    /// The submitted quad
    pub quad: Quad,
    /// Transform current at submission
    pub transform: Mat3,
}

impl DrawnQuad {
    /// Device-space corners
    pub fn corners(&self) -> [Vec2; 4] {
        self.quad.corners().map(|c| transform_point(&self.transform, c))
    }

    /// Device-space bounding box
    pub fn bounds(&self) -> Rect {
        let corners = self.corners();
        corners[1..].iter().fold(Rect::new(corners[0], corners[0]), |r, c| {
            Rect::new(r.p1.inf(c), r.p2.sup(c))
        })
    }
}

/// Backend that records resolved quads instead of drawing them
#[derive(Debug)]
pub struct HeadlessBackend {
    size: Vec2,
    stack: Vec<Mat3>,
    current: Mat3,
    quads: Vec<DrawnQuad>,
    frames: u64,
    clear_color: Color,
}

impl HeadlessBackend {
    /// Headless surface of the given logical size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            stack: Vec::new(),
            current: Mat3::identity(),
            quads: Vec::new(),
            frames: 0,
            clear_color: Color::BLACK,
        }
    }

    /// Quads drawn in the last frame
    pub fn quads(&self) -> &[DrawnQuad] {
        &self.quads
    }

    /// Completed frames
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Clear color of the last frame
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Transform stack depth; zero between balanced frames
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl RenderBackend for HeadlessBackend {
    fn screen_size(&self) -> Vec2 {
        self.size
    }

    fn frame_start(&mut self, clear_color: Color) {
        self.clear_color = clear_color;
        self.quads.clear();
        self.stack.clear();
        self.current = Mat3::identity();
    }

    fn push_transform(&mut self) {
        self.stack.push(self.current);
    }

    fn pop_transform(&mut self) {
        match self.stack.pop() {
            Some(m) => self.current = m,
            None => log::warn!("pop_transform on an empty stack"),
        }
    }

    fn push_matrix(&mut self, m: &Mat3) {
        self.current *= m;
    }

    fn draw_quad(&mut self, quad: &Quad) {
        self.quads.push(DrawnQuad {
            quad: quad.clone(),
            transform: self.current,
        });
    }

    fn to_device(&self, pt: Vec2) -> Vec2 {
        transform_point(&self.current, pt)
    }

    fn frame_end(&mut self) {
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::vec2;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_stack() {
        let mut backend = HeadlessBackend::new(100.0, 100.0);
        backend.frame_start(Color::WHITE);
        backend.push_transform();
        backend.push_translate(vec2(10.0, 5.0));
        backend.push_scale(vec2(2.0, 2.0));
        let p = backend.to_device(vec2(1.0, 1.0));
        assert_relative_eq!(p.x, 12.0);
        assert_relative_eq!(p.y, 7.0);

        backend.pop_transform();
        assert_eq!(backend.to_device(vec2(1.0, 1.0)), vec2(1.0, 1.0));
        assert_eq!(backend.depth(), 0);
    }

    #[test]
    fn test_records_quads_with_transform() {
        let mut backend = HeadlessBackend::new(100.0, 100.0);
        backend.frame_start(Color::BLACK);
        backend.push_translate(vec2(5.0, 0.0));
        let mut quad = Quad::new(4.0, 2.0);
        quad.pos = vec2(1.0, 1.0);
        backend.draw_quad(&quad);
        backend.frame_end();

        assert_eq!(backend.frames(), 1);
        let bounds = backend.quads()[0].bounds();
        assert_relative_eq!(bounds.p1.x, 6.0);
        assert_relative_eq!(bounds.p2.x, 10.0);
        assert_relative_eq!(bounds.p2.y, 3.0);
    }
}
