//! Named depth layers
//!
//! Layers order drawing and gate collision: objects on different effective
//! layers never collide. An object without a layer is on the default layer.

use super::Scene;
use crate::object::GameObject;

/// Declared layers and the default one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layers {
    names: Vec<String>,
    default: Option<String>,
}

impl Layers {
    /// Layers back to front, with the layer objects without one are on
    pub fn new(names: &[&str], default: &str) -> Self {
        Self {
            names: names.iter().map(ToString::to_string).collect(),
            default: Some(default.to_string()),
        }
    }

    /// Declared layer names, back to front
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Layer of objects that do not name one
    pub fn default_layer(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// The object's layer, or the default one
    pub fn effective<'a>(&'a self, obj: &'a GameObject) -> Option<&'a str> {
        obj.layer.as_deref().or(self.default.as_deref())
    }

    /// Normalized depth in `(0, 1]`; 0 for undeclared layers
    pub fn depth(&self, layer: Option<&str>) -> f32 {
        layer
            .and_then(|layer| self.names.iter().position(|name| name == layer))
            .map_or(0.0, |index| (index + 1) as f32 / self.names.len() as f32)
    }
}

impl Scene {
    /// Declare the scene's layers, back to front
    pub fn layers(&mut self, names: &[&str], default: &str) {
        if !names.contains(&default) {
            log::warn!("Default layer '{default}' is not one of {names:?}");
        }
        self.layers = Layers::new(names, default);
    }

    /// Declared layers
    pub fn layer_info(&self) -> &Layers {
        &self.layers
    }

    /// Draw depth of an object
    pub fn layer_depth(&self, obj: &GameObject) -> f32 {
        self.layers.depth(self.layers.effective(obj))
    }
}
