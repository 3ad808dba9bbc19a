//! Grid levels
//!
//! A level is a list of text rows. Each character is looked up in the
//! level's tile table; the components it maps to are added at
//! `pos + (column * tile_width, row * tile_height)` and the object remembers
//! its grid position in the `grid_pos` field.
//!
//! Tile tables come from code ([`LevelConf`]) or from RON/TOML files
//! ([`LevelFile`]):
//!
//! ```ron
//! (
//!     tile_width: 16.0,
//!     tile_height: 16.0,
//!     rows: ["     $ ", "=======",],
//!     tiles: {
//!         "=": [{"rect": [16, 16], "area": true, "solid": true}],
//!         "$": ["coin", {"rect": [8, 8], "area": true}],
//!     },
//! )
//! ```

use crate::components::pos;
use crate::config::{Config, Deserialize, Serialize};
use crate::error::{GameError, HookResult};
use crate::foundation::math::{vec2, Vec2};
use crate::object::{Component, GameObject, ObjectId, Value};
use crate::scene::Scene;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Field holding an object's grid position
pub const GRID_POS_FIELD: &str = "grid_pos";

/// Components for a tile symbol
pub type TileFn = Box<dyn Fn() -> Vec<Component>>;

/// Fallback for symbols without a tile entry
pub type AnyTileFn = Box<dyn Fn(char) -> Option<Vec<Component>>>;

enum Tile {
    Components(TileFn),
    Data(Vec<Value>),
}

/// Level layout and tile table
pub struct LevelConf {
    /// Cell width in pixels
    pub tile_width: f32,
    /// Cell height in pixels
    pub tile_height: f32,
    /// World position of the top-left cell
    pub pos: Vec2,
    tiles: HashMap<char, Tile>,
    any: Option<AnyTileFn>,
}

impl LevelConf {
    /// Empty tile table with the given cell size
    pub fn new(tile_width: f32, tile_height: f32) -> Self {
        Self {
            tile_width,
            tile_height,
            pos: Vec2::zeros(),
            tiles: HashMap::new(),
            any: None,
        }
    }

    /// Offset the whole level
    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    /// Map a symbol to components
    pub fn tile(mut self, symbol: char, tile: impl Fn() -> Vec<Component> + 'static) -> Self {
        self.tiles.insert(symbol, Tile::Components(Box::new(tile)));
        self
    }

    /// Map a symbol to data-described components
    pub fn tile_data(mut self, symbol: char, values: Vec<Value>) -> Self {
        self.tiles.insert(symbol, Tile::Data(values));
        self
    }

    /// Handle symbols without a tile entry
    pub fn any(mut self, tile: impl Fn(char) -> Option<Vec<Component>> + 'static) -> Self {
        self.any = Some(Box::new(tile));
        self
    }
}

impl fmt::Debug for LevelConf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut symbols: Vec<char> = self.tiles.keys().copied().collect();
        symbols.sort_unstable();
        f.debug_struct("LevelConf")
            .field("tile_width", &self.tile_width)
            .field("tile_height", &self.tile_height)
            .field("pos", &self.pos)
            .field("symbols", &symbols)
            .field("any", &self.any.is_some())
            .finish()
    }
}

/// A spawned level
#[derive(Debug)]
pub struct Level {
    conf: LevelConf,
    columns: usize,
    rows: usize,
    objects: Vec<ObjectId>,
}

impl Level {
    /// Spawn every mapped symbol of `rows` into the scene
    ///
    /// Spaces and symbols with no mapping leave their cell empty.
    pub fn spawn_all(scene: &mut Scene, rows: &[&str], conf: LevelConf) -> Result<Self, GameError> {
        let mut level = Self {
            conf,
            columns: rows.iter().map(|row| row.chars().count()).max().unwrap_or(0),
            rows: rows.len(),
            objects: Vec::new(),
        };
        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                level.spawn(scene, symbol, vec2(x as f32, y as f32))?;
            }
        }
        log::info!(
            "Loaded {}x{} level with {} objects into scene '{}'",
            level.columns,
            level.rows,
            level.objects.len(),
            scene.name()
        );
        Ok(level)
    }

    /// World position of a grid cell
    pub fn get_pos(&self, grid: Vec2) -> Vec2 {
        self.conf.pos + vec2(grid.x * self.conf.tile_width, grid.y * self.conf.tile_height)
    }

    /// Spawn the object for `symbol` at a grid cell
    ///
    /// Returns `None` when the symbol has no mapping.
    pub fn spawn(&mut self, scene: &mut Scene, symbol: char, grid: Vec2) -> Result<Option<ObjectId>, GameError> {
        let mut obj = GameObject::new();
        match self.conf.tiles.get(&symbol) {
            Some(Tile::Components(tile)) => {
                for component in tile() {
                    obj.use_component(component);
                }
            }
            Some(Tile::Data(values)) => {
                for err in obj.use_value(Value::List(values.clone())) {
                    scene.report_error(&err);
                }
            }
            None => match self.conf.any.as_ref().and_then(|any| any(symbol)) {
                Some(components) => {
                    for component in components {
                        obj.use_component(component);
                    }
                }
                None => return Ok(None),
            },
        }
        let at = self.get_pos(grid);
        obj.use_component(pos(at.x, at.y));
        obj.set_field(GRID_POS_FIELD, grid);

        let id = scene.insert(obj)?;
        self.objects.push(id);
        Ok(Some(id))
    }

    /// Level width in pixels
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.conf.tile_width
    }

    /// Level height in pixels
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.conf.tile_height
    }

    /// Objects spawned by this level, including destroyed ones
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Grid position of a level object
    pub fn grid_pos(&self, scene: &Scene, id: ObjectId) -> Option<Vec2> {
        scene.obj(id)?.field(GRID_POS_FIELD)?.as_vec2()
    }

    /// Move a level object to a grid cell
    pub fn set_grid_pos(&self, scene: &mut Scene, id: ObjectId, grid: Vec2) {
        let at = self.get_pos(grid);
        if let Some(obj) = scene.obj_mut(id) {
            obj.set_field(GRID_POS_FIELD, grid);
            obj.pos = at;
        }
    }

    /// Move a level object by whole cells
    pub fn move_by(&self, scene: &mut Scene, id: ObjectId, delta: Vec2) {
        if let Some(grid) = self.grid_pos(scene, id) {
            self.set_grid_pos(scene, id, grid + delta);
        }
    }

    /// Destroy every object this level spawned
    pub fn destroy(&mut self, scene: &mut Scene) -> HookResult {
        for id in self.objects.drain(..) {
            scene.destroy(id)?;
        }
        Ok(())
    }
}

impl Scene {
    /// Spawn a grid level
    pub fn add_level(&mut self, rows: &[&str], conf: LevelConf) -> Result<Level, GameError> {
        Level::spawn_all(self, rows, conf)
    }

    /// Spawn a level loaded from a file
    pub fn add_level_file(&mut self, file: &LevelFile) -> Result<Level, GameError> {
        let conf = file.conf()?;
        let rows: Vec<&str> = file.rows.iter().map(String::as_str).collect();
        Level::spawn_all(self, &rows, conf)
    }
}

/// Level description loadable from RON or TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelFile {
    /// Cell width in pixels
    pub tile_width: f32,
    /// Cell height in pixels
    pub tile_height: f32,
    /// World position of the top-left cell
    pub pos: Vec2,
    /// Map rows, top to bottom
    pub rows: Vec<String>,
    /// Single-character symbol to data-described components
    pub tiles: BTreeMap<String, Vec<Value>>,
}

impl Default for LevelFile {
    fn default() -> Self {
        Self {
            tile_width: 16.0,
            tile_height: 16.0,
            pos: Vec2::zeros(),
            rows: Vec::new(),
            tiles: BTreeMap::new(),
        }
    }
}

impl Config for LevelFile {}

impl LevelFile {
    /// Tile table of this file
    pub fn conf(&self) -> Result<LevelConf, GameError> {
        let mut conf = LevelConf::new(self.tile_width, self.tile_height).with_pos(self.pos);
        for (key, values) in &self.tiles {
            let mut chars = key.chars();
            let (Some(symbol), None) = (chars.next(), chars.next()) else {
                return Err(GameError::InvalidComponent(format!(
                    "tile key '{key}' must be a single character"
                )));
            };
            conf = conf.tile_data(symbol, values.clone());
        }
        Ok(conf)
    }
}
