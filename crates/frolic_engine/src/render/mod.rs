//! # Rendering Facade
//!
//! The engine describes each frame as a list of transform operations and
//! textured or colored quads. Batching, shaders and device projection belong
//! to the host's [`RenderBackend`]; [`HeadlessBackend`] records the resolved
//! output for tests and tools.
//!
//! ## Architecture
//!
//! - **Quad**: one colored/textured rectangle with its own local transform
//! - **DrawQueue**: commands recorded during the draw phase of a tick
//! - **Drawable**: the rect/sprite/text component an object draws with
//! - **text**: monospace bitmap text layout

pub mod backend;
pub mod drawable;
pub mod render_queue;
pub mod text;

pub use backend::{DrawnQuad, HeadlessBackend, RenderBackend};
pub use drawable::{Drawable, SpriteConf, SpriteState, TextConf, TextState};
pub use render_queue::{DrawCommand, DrawQueue};

use crate::assets::TextureId;
use crate::foundation::math::{rotation, scaling, transform_point, translation, vec2, Color, Mat3, Origin, Rect, Vec2};

/// A rectangle to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    /// Anchor position
    pub pos: Vec2,
    /// Width before scaling
    pub width: f32,
    /// Height before scaling
    pub height: f32,
    /// Scale around the anchor
    pub scale: Vec2,
    /// Rotation around the anchor, radians
    pub rot: f32,
    /// Tint
    pub color: Color,
    /// Which point of the quad sits at `pos`
    pub origin: Origin,
    /// Texture, `None` for a solid color
    pub texture: Option<TextureId>,
    /// Texture region in uv space
    pub region: Rect,
    /// Layer depth in `[0, 1]`
    pub z: f32,
}

impl Quad {
    /// Untextured white quad at the origin
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::zeros(),
            width,
            height,
            scale: vec2(1.0, 1.0),
            rot: 0.0,
            color: Color::WHITE,
            origin: Origin::TopLeft,
            texture: None,
            region: Rect::unit(),
            z: 0.0,
        }
    }

    /// Transform from quad-local to parent space
    pub fn local_transform(&self) -> Mat3 {
        translation(self.pos) * rotation(self.rot) * scaling(self.scale)
    }

    /// Corners in parent space: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        let local = self.origin.local_rect(vec2(self.width, self.height));
        let m = self.local_transform();
        [
            local.p1,
            vec2(local.p2.x, local.p1.y),
            local.p2,
            vec2(local.p1.x, local.p2.y),
        ]
        .map(|c| transform_point(&m, c))
    }
}
