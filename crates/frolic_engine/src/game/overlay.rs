//! Debug overlay: area outlines, the inspector and the rolling log
//!
//! Drawn in screen space on top of the scene, after the global renders.

use super::DebugFlags;
use crate::error::HookResult;
use crate::foundation::logging::LogLevel;
use crate::foundation::math::{vec2, Color, Rect, Vec2};
use crate::render::text;
use crate::render::Quad;
use crate::scene::Scene;

const TEXT_SIZE: f32 = 12.0;
const PADDING: f32 = 4.0;
const OUTLINE: f32 = 1.0;
const AREA_COLOR: Color = Color::rgb(0.0, 1.0, 1.0);
const HOVER_COLOR: Color = Color::YELLOW;
const PANEL_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 0.8);

pub(super) fn draw(scene: &mut Scene, flags: DebugFlags, paused: bool) -> HookResult {
    if flags.contains(DebugFlags::SHOW_AREAS) {
        draw_areas(scene);
    }
    if flags.contains(DebugFlags::INSPECT) {
        inspect(scene)?;
    }
    if paused {
        let x = scene.screen_size().x - TEXT_SIZE * 6.0 - PADDING * 3.0;
        draw_panel(scene, vec2(x, PADDING), &["PAUSED".to_string()], Color::WHITE);
    }
    let show_log = flags.contains(DebugFlags::SHOW_LOG) || scene.services().log.borrow().has_errors();
    if show_log {
        draw_log(scene);
    }
    Ok(())
}

fn outline(scene: &mut Scene, rect: Rect, color: Color) {
    let (w, h) = (rect.width(), rect.height());
    let edges = [
        Rect::from_size(rect.p1.x, rect.p1.y, w, OUTLINE),
        Rect::from_size(rect.p1.x, rect.p2.y - OUTLINE, w, OUTLINE),
        Rect::from_size(rect.p1.x, rect.p1.y, OUTLINE, h),
        Rect::from_size(rect.p2.x - OUTLINE, rect.p1.y, OUTLINE, h),
    ];
    for edge in edges {
        let mut quad = Quad::new(edge.width(), edge.height());
        quad.pos = edge.p1;
        quad.color = color;
        quad.z = 1.0;
        scene.gfx.draw_quad(quad);
    }
}

fn draw_areas(scene: &mut Scene) {
    for id in scene.get("*") {
        let Some(obj) = scene.obj(id) else {
            continue;
        };
        if obj.hidden {
            continue;
        }
        let Some(area) = scene.world_area_of(obj) else {
            continue;
        };
        let on_camera = !scene.camera().ignores(scene.layer_info().effective(obj));
        let color = if scene.is_hovered(id) { HOVER_COLOR } else { AREA_COLOR };
        let matrix = *scene.camera().matrix();

        scene.gfx.push_transform();
        if on_camera {
            scene.gfx.push_matrix(matrix);
        }
        outline(scene, area, color);
        scene.gfx.pop_transform();
    }
}

/// Show the debug info of the topmost hovered object next to the mouse
fn inspect(scene: &mut Scene) -> HookResult {
    let hovered = scene
        .get("*")
        .into_iter()
        .rev()
        .find(|id| scene.obj(*id).is_some_and(|obj| !obj.hidden) && scene.is_hovered(*id));
    let Some(id) = hovered else {
        return Ok(());
    };
    let lines: Vec<String> = scene
        .debug_info(id)?
        .into_iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect();
    let at = scene.mouse_pos() + vec2(PADDING * 2.0, PADDING * 2.0);
    draw_panel(scene, at, &lines, Color::WHITE);
    Ok(())
}

fn draw_log(scene: &mut Scene) {
    let entries: Vec<(LogLevel, String)> = scene
        .services()
        .log
        .borrow()
        .entries()
        .map(|entry| (entry.level, entry.message.clone()))
        .collect();
    if entries.is_empty() {
        return;
    }
    let height = entries.len() as f32 * TEXT_SIZE + PADDING * 2.0;
    let mut y = scene.screen_size().y - height - PADDING;
    for (level, message) in entries {
        let color = match level {
            LogLevel::Error => Color::RED,
            LogLevel::Info => Color::WHITE,
        };
        draw_panel(scene, vec2(PADDING, y), &[message], color);
        y += TEXT_SIZE;
    }
}

/// Dark box with lines of text, top-left at `at`
fn draw_panel(scene: &mut Scene, at: Vec2, lines: &[String], color: Color) {
    let services = scene.services_rc();
    let font = services
        .config
        .debug_font
        .as_deref()
        .and_then(|name| services.assets.font(name).ok());
    let layout = text::layout(&lines.join("\n"), TEXT_SIZE, font, None);

    let mut panel = Quad::new(layout.width + PADDING * 2.0, layout.height + PADDING * 2.0);
    panel.pos = at;
    panel.color = PANEL_COLOR;
    panel.z = 1.0;
    scene.gfx.draw_quad(panel);

    let texture = font.map(|f| f.texture);
    for glyph in layout.glyphs {
        let Some(region) = glyph.region else {
            continue;
        };
        let mut quad = Quad::new(glyph.size.x, glyph.size.y);
        quad.pos = at + vec2(PADDING, PADDING) + glyph.pos;
        quad.color = color;
        quad.texture = texture;
        quad.region = region;
        quad.z = 1.0;
        scene.gfx.draw_quad(quad);
    }
}
