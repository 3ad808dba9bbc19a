//! Math utilities and types
//!
//! Provides the 2D math types used by the object model, the collision engine
//! and the camera. Vectors and matrices are nalgebra aliases with value
//! semantics; every operation returns a new value.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::str::FromStr;

pub use nalgebra::{Matrix3, Point2, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3x3 homogeneous matrix used for 2D transforms
pub type Mat3 = Matrix3<f32>;

/// Shorthand constructor for [`Vec2`]
pub fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

/// Linear interpolation between `a` and `b`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Unit vector pointing at `angle` radians
pub fn dir(angle: f32) -> Vec2 {
    vec2(angle.cos(), angle.sin())
}

/// Wrap an angle into `[0, TAU)`
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

/// Apply a homogeneous 2D transform to a point
pub fn transform_point(m: &Mat3, p: Vec2) -> Vec2 {
    m.transform_point(&Point2::from(p)).coords
}

/// Translation matrix
pub fn translation(v: Vec2) -> Mat3 {
    Mat3::new_translation(&v)
}

/// Non-uniform scaling matrix
pub fn scaling(v: Vec2) -> Mat3 {
    Mat3::new_nonuniform_scaling(&v)
}

/// Rotation matrix, angle in radians
pub fn rotation(angle: f32) -> Mat3 {
    Mat3::new_rotation(angle)
}

/// Axis-aligned rectangle defined by its min (`p1`) and max (`p2`) corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner
    pub p1: Vec2,
    /// Maximum corner
    pub p2: Vec2,
}

impl Rect {
    /// Create a rectangle from two arbitrary corners (normalised to min/max)
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            p1: vec2(a.x.min(b.x), a.y.min(b.y)),
            p2: vec2(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Create a rectangle from a top-left corner and a size
    pub fn from_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(vec2(x, y), vec2(x + width, y + height))
    }

    /// The unit rectangle `(0,0)-(1,1)`, the full texture region
    pub fn unit() -> Self {
        Self::from_size(0.0, 0.0, 1.0, 1.0)
    }

    /// Width of the rectangle
    pub fn width(&self) -> f32 {
        self.p2.x - self.p1.x
    }

    /// Height of the rectangle
    pub fn height(&self) -> f32 {
        self.p2.y - self.p1.y
    }

    /// Size as a vector
    pub fn size(&self) -> Vec2 {
        self.p2 - self.p1
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }

    /// Point containment, edges included
    pub fn contains(&self, pt: Vec2) -> bool {
        pt.x >= self.p1.x && pt.x <= self.p2.x && pt.y >= self.p1.y && pt.y <= self.p2.y
    }

    /// Intersection with a strictly positive area
    pub fn intersects(&self, other: &Rect) -> bool {
        self.p2.x > other.p1.x
            && self.p1.x < other.p2.x
            && self.p2.y > other.p1.y
            && self.p1.y < other.p2.y
    }

    /// Vertical contact or overlap (edges count, within `eps`) while the
    /// horizontal spans overlap with positive length
    pub fn rests_on(&self, other: &Rect, eps: f32) -> bool {
        self.p2.x > other.p1.x
            && self.p1.x < other.p2.x
            && self.p2.y >= other.p1.y - eps
            && self.p1.y <= other.p2.y + eps
    }

    /// Translate by an offset
    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect {
            p1: self.p1 + offset,
            p2: self.p2 + offset,
        }
    }
}

/// RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    /// Opaque red
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    /// Opaque green
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    /// Opaque blue
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    /// Opaque yellow
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);

    /// Opaque color
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color with alpha
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Anchor point of a drawable relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Top-left corner (default)
    #[default]
    TopLeft,
    /// Middle of the top edge
    Top,
    /// Top-right corner
    TopRight,
    /// Middle of the left edge
    Left,
    /// Center
    Center,
    /// Middle of the right edge
    Right,
    /// Bottom-left corner
    BotLeft,
    /// Middle of the bottom edge
    Bot,
    /// Bottom-right corner
    BotRight,
}

impl Origin {
    /// Offset in `[-1, 1]` on both axes, `(-1, -1)` being top-left
    pub fn offset(self) -> Vec2 {
        match self {
            Origin::TopLeft => vec2(-1.0, -1.0),
            Origin::Top => vec2(0.0, -1.0),
            Origin::TopRight => vec2(1.0, -1.0),
            Origin::Left => vec2(-1.0, 0.0),
            Origin::Center => vec2(0.0, 0.0),
            Origin::Right => vec2(1.0, 0.0),
            Origin::BotLeft => vec2(-1.0, 1.0),
            Origin::Bot => vec2(0.0, 1.0),
            Origin::BotRight => vec2(1.0, 1.0),
        }
    }

    /// Local rectangle covered by a `size` box anchored at this origin
    pub fn local_rect(self, size: Vec2) -> Rect {
        let top_left = -(self.offset() + vec2(1.0, 1.0)).component_mul(&size) * 0.5;
        Rect::new(top_left, top_left + size)
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "topleft" => Ok(Origin::TopLeft),
            "top" => Ok(Origin::Top),
            "topright" => Ok(Origin::TopRight),
            "left" => Ok(Origin::Left),
            "center" => Ok(Origin::Center),
            "right" => Ok(Origin::Right),
            "botleft" => Ok(Origin::BotLeft),
            "bot" => Ok(Origin::Bot),
            "botright" => Ok(Origin::BotRight),
            other => Err(format!("unknown origin '{other}'")),
        }
    }
}
