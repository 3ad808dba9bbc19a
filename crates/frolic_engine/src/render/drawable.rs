//! Drawable components: rectangles, sprites and text
//!
//! An object holds at most one drawable. The scene draws it at the start of
//! the object's draw dispatch and advances sprite animations at the start of
//! its update dispatch.

use super::text;
use super::Quad;
use crate::assets::SpriteData;
use crate::error::{GameError, HookResult, ResourceKind};
use crate::foundation::math::{vec2, Origin, Rect, Vec2};
use crate::object::{GameObject, ObjectId, Value};
use crate::scene::Scene;

/// Seconds per animation frame unless configured
pub const DEFAULT_ANIM_SPEED: f32 = 0.1;

/// Glyph height of text unless configured
pub const DEFAULT_TEXT_SIZE: f32 = 16.0;

/// What an object draws
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// Solid rectangle
    Rect {
        /// Width in pixels
        width: f32,
        /// Height in pixels
        height: f32,
    },
    /// Sprite frame
    Sprite(SpriteState),
    /// Text block
    Text(TextState),
}

/// Animation currently playing
#[derive(Debug, Clone, PartialEq)]
pub struct AnimPlay {
    /// Animation name
    pub name: String,
    /// Restart when the last frame is passed
    pub looping: bool,
    timer: f32,
}

/// Sprite options
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteConf {
    /// Initial frame
    pub frame: usize,
    /// Seconds per frame
    pub anim_speed: f32,
    /// Animation to start looping on add
    pub anim: Option<String>,
    /// Sub-region of the frame to draw, in frame-relative uv space
    pub quad: Rect,
}

impl Default for SpriteConf {
    fn default() -> Self {
        Self {
            frame: 0,
            anim_speed: DEFAULT_ANIM_SPEED,
            anim: None,
            quad: Rect::unit(),
        }
    }
}

/// Sprite drawable state
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteState {
    /// Sprite asset name
    pub name: String,
    /// Current frame index
    pub frame: usize,
    /// Seconds per frame
    pub anim_speed: f32,
    /// Sub-region of the frame to draw
    pub quad: Rect,
    /// Animation playing, if any
    pub cur_anim: Option<AnimPlay>,
    pending_anim: Option<String>,
}

impl SpriteState {
    /// Sprite drawable for asset `name`
    pub fn new(name: impl Into<String>, conf: SpriteConf) -> Self {
        Self {
            name: name.into(),
            frame: conf.frame,
            anim_speed: conf.anim_speed,
            quad: conf.quad,
            cur_anim: None,
            pending_anim: conf.anim,
        }
    }

    /// Start an animation; returns the one it interrupted
    pub fn play(&mut self, anim: &str, looping: bool, data: &SpriteData) -> Result<Option<String>, GameError> {
        let range = data
            .anims
            .get(anim)
            .ok_or_else(|| GameError::not_found(ResourceKind::Anim, anim))?;
        let prev = self.stop();
        self.cur_anim = Some(AnimPlay {
            name: anim.to_string(),
            looping,
            timer: 0.0,
        });
        self.frame = range.from;
        Ok(prev)
    }

    /// Stop the current animation, returning its name
    pub fn stop(&mut self) -> Option<String> {
        self.cur_anim.take().map(|anim| anim.name)
    }

    /// Advance the animation clock; returns the name of an animation that ended
    pub fn tick(&mut self, dt: f32, data: &SpriteData) -> Option<String> {
        let anim = self.cur_anim.as_mut()?;
        let Some(range) = data.anims.get(&anim.name) else {
            return self.stop();
        };
        anim.timer += dt;
        if anim.timer < self.anim_speed {
            return None;
        }
        anim.timer -= self.anim_speed;
        self.frame += 1;
        if self.frame > range.to {
            if anim.looping {
                self.frame = range.from;
            } else {
                self.frame -= 1;
                return self.stop();
            }
        }
        None
    }
}

/// Text options
#[derive(Debug, Clone, PartialEq)]
pub struct TextConf {
    /// Glyph height
    pub size: f32,
    /// Font asset name; the engine debug font when unset
    pub font: Option<String>,
    /// Wrap width
    pub width: Option<f32>,
}

impl Default for TextConf {
    fn default() -> Self {
        Self {
            size: DEFAULT_TEXT_SIZE,
            font: None,
            width: None,
        }
    }
}

/// Text drawable state
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Content
    pub text: String,
    /// Glyph height
    pub size: f32,
    /// Font asset name
    pub font: Option<String>,
    /// Wrap width
    pub width: Option<f32>,
}

impl TextState {
    /// Text drawable
    pub fn new(text: impl Into<String>, conf: TextConf) -> Self {
        Self {
            text: text.into(),
            size: conf.size,
            font: conf.font,
            width: conf.width,
        }
    }
}

fn sprite_state_mut(obj: &mut GameObject) -> Option<&mut SpriteState> {
    match obj.drawable.as_mut() {
        Some(Drawable::Sprite(sprite)) => Some(sprite),
        _ => None,
    }
}

impl Scene {
    fn font_name(&self, state: &TextState) -> Option<String> {
        state
            .font
            .clone()
            .or_else(|| self.services().config.debug_font.clone())
    }

    fn text_layout(&self, state: &TextState) -> text::TextLayout {
        let assets = &self.services().assets;
        let font = self.font_name(state).and_then(|name| assets.font(&name).ok());
        text::layout(&state.text, state.size, font, state.width)
    }

    /// Unscaled size of an object's drawable
    pub fn drawable_size(&self, obj: &GameObject) -> Option<Vec2> {
        match obj.drawable.as_ref()? {
            Drawable::Rect { width, height } => Some(vec2(*width, *height)),
            Drawable::Sprite(sprite) => {
                let data = self.services().assets.sprite(&sprite.name).ok()?;
                Some(data.size().component_mul(&sprite.quad.size()))
            }
            Drawable::Text(state) => Some(self.text_layout(state).size()),
        }
    }

    /// Report missing sprite or font assets and start configured animations
    pub(crate) fn init_drawable(&mut self, id: ObjectId) -> HookResult {
        let Some(obj) = self.obj(id) else {
            return Ok(());
        };
        match obj.drawable.clone() {
            Some(Drawable::Sprite(sprite)) => {
                if let Err(err) = self.services().assets.sprite(&sprite.name) {
                    self.report_error(&err);
                    return Ok(());
                }
                if let Some(anim) = sprite.pending_anim {
                    if let Some(s) = self.obj_mut(id).and_then(sprite_state_mut) {
                        s.pending_anim = None;
                    }
                    self.play_anim(id, &anim, true)?;
                }
            }
            Some(Drawable::Text(state)) => {
                if let Some(name) = self.font_name(&state) {
                    if let Err(err) = self.services().assets.font(&name) {
                        self.report_error(&err);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Play a sprite animation
    ///
    /// Unknown animations are logged and ignored. Fires `animEnd` for an
    /// interrupted animation and `animPlay` for the new one.
    pub fn play_anim(&mut self, id: ObjectId, anim: &str, looping: bool) -> HookResult {
        let Some(name) = self.obj(id).and_then(|obj| match &obj.drawable {
            Some(Drawable::Sprite(sprite)) => Some(sprite.name.clone()),
            _ => None,
        }) else {
            return Ok(());
        };
        let services = self.services_rc();
        let data = match services.assets.sprite(&name) {
            Ok(data) => data,
            Err(err) => {
                self.report_error(&err);
                return Ok(());
            }
        };
        let Some(sprite) = self.obj_mut(id).and_then(sprite_state_mut) else {
            return Ok(());
        };
        match sprite.play(anim, looping, data) {
            Ok(prev) => {
                if let Some(prev) = prev {
                    self.trigger(id, "animEnd", &[Value::from(prev)])?;
                }
                self.trigger(id, "animPlay", &[Value::from(anim)])
            }
            Err(err) => {
                self.report_error(&err);
                Ok(())
            }
        }
    }

    /// Stop the playing sprite animation, firing `animEnd`
    pub fn stop_anim(&mut self, id: ObjectId) -> HookResult {
        let ended = self.obj_mut(id).and_then(sprite_state_mut).and_then(SpriteState::stop);
        match ended {
            Some(name) => self.trigger(id, "animEnd", &[Value::from(name)]),
            None => Ok(()),
        }
    }

    /// Jump to a sprite frame, clamped to the sprite's frame count
    pub fn set_frame(&mut self, id: ObjectId, frame: usize) {
        let services = self.services_rc();
        let Some(sprite) = self.obj_mut(id).and_then(sprite_state_mut) else {
            return;
        };
        match services.assets.sprite(&sprite.name) {
            Ok(data) => sprite.frame = frame.min(data.frames.len().saturating_sub(1)),
            Err(err) => self.report_error(&err),
        }
    }

    /// Current sprite frame
    pub fn frame_of(&self, id: ObjectId) -> Option<usize> {
        match &self.obj(id)?.drawable {
            Some(Drawable::Sprite(sprite)) => Some(sprite.frame),
            _ => None,
        }
    }

    /// Advance the object's sprite animation by this frame's delta
    pub(crate) fn tick_drawable(&mut self, id: ObjectId) -> HookResult {
        let dt = self.dt();
        let services = self.services_rc();
        let Some(sprite) = self.obj_mut(id).and_then(sprite_state_mut) else {
            return Ok(());
        };
        let Ok(data) = services.assets.sprite(&sprite.name) else {
            return Ok(());
        };
        match sprite.tick(dt, data) {
            Some(ended) => self.trigger(id, "animEnd", &[Value::from(ended)]),
            None => Ok(()),
        }
    }

    /// Queue the quads of an object's drawable
    pub(crate) fn draw_drawable(&mut self, id: ObjectId) {
        let Some(obj) = self.obj(id) else {
            return;
        };
        let z = self.layer_depth(obj);
        let mut base = Quad::new(0.0, 0.0);
        base.pos = obj.pos;
        base.scale = obj.scale;
        base.rot = obj.angle;
        base.color = obj.color;
        base.origin = obj.origin;
        base.z = z;

        let quads = match &obj.drawable {
            None => return,
            Some(Drawable::Rect { width, height }) => vec![Quad {
                width: *width,
                height: *height,
                ..base
            }],
            Some(Drawable::Sprite(sprite)) => {
                let Ok(data) = self.services().assets.sprite(&sprite.name) else {
                    return;
                };
                let Some(frame) = data.frames.get(sprite.frame) else {
                    return;
                };
                let region = Rect::from_size(
                    frame.p1.x + sprite.quad.p1.x * frame.width(),
                    frame.p1.y + sprite.quad.p1.y * frame.height(),
                    frame.width() * sprite.quad.width(),
                    frame.height() * sprite.quad.height(),
                );
                vec![Quad {
                    width: data.width * sprite.quad.width(),
                    height: data.height * sprite.quad.height(),
                    texture: Some(data.texture),
                    region,
                    ..base
                }]
            }
            Some(Drawable::Text(state)) => {
                let layout = self.text_layout(state);
                let texture = self
                    .font_name(state)
                    .and_then(|name| self.services().assets.font(&name).ok().map(|f| f.texture));
                let top_left = obj.origin.local_rect(layout.size()).p1;
                let (pos, angle, scale) = (obj.pos, obj.angle, obj.scale);
                let glyphs: Vec<Quad> = layout
                    .glyphs
                    .into_iter()
                    .filter_map(|glyph| {
                        Some(Quad {
                            pos: top_left + glyph.pos,
                            width: glyph.size.x,
                            height: glyph.size.y,
                            scale: vec2(1.0, 1.0),
                            rot: 0.0,
                            origin: Origin::TopLeft,
                            texture,
                            region: glyph.region?,
                            ..base.clone()
                        })
                    })
                    .collect();
                self.gfx.push_transform();
                self.gfx.push_translate(pos);
                self.gfx.push_rotate(angle);
                self.gfx.push_scale(scale);
                for quad in glyphs {
                    self.gfx.draw_quad(quad);
                }
                self.gfx.pop_transform();
                return;
            }
        };
        for quad in quads {
            self.gfx.draw_quad(quad);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::TextureId;

    fn walker() -> SpriteData {
        SpriteData::sliced(TextureId(1), 40.0, 10.0, 4, 1)
            .with_anim("walk", 1, 3)
            .with_anim("blink", 0, 1)
    }

    #[test]
    fn test_looping_anim_wraps() {
        let data = walker();
        let mut sprite = SpriteState::new("hero", SpriteConf::default());
        sprite.play("walk", true, &data).unwrap();
        assert_eq!(sprite.frame, 1);

        for _ in 0..3 {
            assert_eq!(sprite.tick(0.1, &data), None);
        }
        assert_eq!(sprite.frame, 1);
    }

    #[test]
    fn test_one_shot_anim_stops_on_last_frame() {
        let data = walker();
        let mut sprite = SpriteState::new("hero", SpriteConf::default());
        sprite.play("blink", false, &data).unwrap();
        assert_eq!(sprite.tick(0.1, &data), None);
        assert_eq!(sprite.frame, 1);
        assert_eq!(sprite.tick(0.1, &data), Some("blink".to_string()));
        assert_eq!(sprite.frame, 1);
        assert!(sprite.cur_anim.is_none());
    }

    #[test]
    fn test_play_unknown_anim() {
        let mut sprite = SpriteState::new("hero", SpriteConf::default());
        let err = sprite.play("fly", true, &walker()).unwrap_err();
        assert!(matches!(err, GameError::NotFound { kind: ResourceKind::Anim, .. }));
    }

    #[test]
    fn test_play_interrupts_previous() {
        let data = walker();
        let mut sprite = SpriteState::new("hero", SpriteConf::default());
        sprite.play("walk", true, &data).unwrap();
        assert_eq!(sprite.play("blink", true, &data).unwrap(), Some("walk".to_string()));
    }
}
