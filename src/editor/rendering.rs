//! Canvas painting.
//!
//! The map is drawn with egui's background-layer painter so the canvas and the
//! panels share one screen space. Token and structure images are loaded via
//! the `AssetServer` and registered as egui user textures; anything not yet
//! loaded (or missing) is drawn as a coloured rectangle.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiTextureHandle, EguiUserTextures};
use std::collections::{HashMap, HashSet};

use crate::common::WorldRect;
use crate::constants::GRID_SIZE;
use crate::map::{ObjectRef, PlacedObject};
use crate::theme;

use super::state::MapEditor;
use super::tools::tile_color;
use super::viewport::Viewport;

/// Image handles and egui texture ids for object artwork, keyed by asset path
#[derive(Resource, Default)]
pub struct ObjectTextures {
    handles: HashMap<String, Handle<Image>>,
    texture_ids: HashMap<String, egui::TextureId>,
    failed: HashSet<String>,
}

impl ObjectTextures {
    pub fn texture_id(&self, path: &str) -> Option<egui::TextureId> {
        self.texture_ids.get(path).copied()
    }
}

/// Start loading artwork for every object on the map and register finished
/// images with egui. Runs in Update before the egui pass.
pub fn load_object_textures(
    editor: Res<MapEditor>,
    asset_server: Res<AssetServer>,
    mut textures: ResMut<ObjectTextures>,
    mut egui_textures: ResMut<EguiUserTextures>,
) {
    let map = editor.map();
    let wanted: Vec<&str> = map
        .structures
        .iter()
        .map(|s| s.item_path.as_str())
        .chain(map.characters.iter().map(|c| c.image_path.as_str()))
        .filter(|path| !path.is_empty())
        .collect();

    for path in wanted {
        if textures.handles.contains_key(path) || textures.failed.contains(path) {
            continue;
        }
        let handle: Handle<Image> = asset_server.load(path.to_string());
        textures.handles.insert(path.to_string(), handle);
    }

    let pending: Vec<(String, Handle<Image>)> = textures
        .handles
        .iter()
        .filter(|(path, _)| !textures.texture_ids.contains_key(*path))
        .map(|(path, handle)| (path.clone(), handle.clone()))
        .collect();

    for (path, handle) in pending {
        match asset_server.load_state(&handle) {
            LoadState::Loaded => {
                let texture_id = egui_textures.add_image(EguiTextureHandle::Weak(handle.id()));
                textures.texture_ids.insert(path, texture_id);
            }
            LoadState::Failed(err) => {
                debug!("Artwork {} unavailable, using fallback colour: {}", path, err);
                textures.handles.remove(&path);
                textures.failed.insert(path);
            }
            _ => {}
        }
    }
}

fn to_pos(v: Vec2) -> egui::Pos2 {
    egui::pos2(v.x, v.y)
}

fn screen_rect(viewport: &Viewport, rect: WorldRect) -> egui::Rect {
    egui::Rect::from_min_max(
        to_pos(viewport.world_to_screen(rect.min())),
        to_pos(viewport.world_to_screen(rect.max())),
    )
}

fn draw_grid(painter: &egui::Painter, viewport: &Viewport, lines: (Vec<f32>, Vec<f32>)) {
    let clip = painter.clip_rect();
    let stroke = egui::Stroke::new(1.0, theme::bevy_to_egui(theme::GRID_COLOR));
    let origin_stroke = egui::Stroke::new(2.0, theme::bevy_to_egui(theme::GRID_ORIGIN_COLOR));

    let (xs, ys) = lines;
    for x in xs {
        let sx = viewport.world_to_screen(Vec2::new(x, 0.0)).x;
        let s = if x == 0.0 { origin_stroke } else { stroke };
        painter.line_segment([egui::pos2(sx, clip.top()), egui::pos2(sx, clip.bottom())], s);
    }
    for y in ys {
        let sy = viewport.world_to_screen(Vec2::new(0.0, y)).y;
        let s = if y == 0.0 { origin_stroke } else { stroke };
        painter.line_segment([egui::pos2(clip.left(), sy), egui::pos2(clip.right(), sy)], s);
    }
}

fn draw_object(
    painter: &egui::Painter,
    rect: egui::Rect,
    texture: Option<egui::TextureId>,
    fill: egui::Color32,
    rounding: f32,
) {
    match texture {
        Some(id) => {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(id, rect, uv, egui::Color32::WHITE);
        }
        None => {
            painter.rect_filled(rect, rounding, fill);
        }
    }
}

fn outline(painter: &egui::Painter, rect: egui::Rect, selected: bool, hovered: bool) {
    if selected {
        let stroke = egui::Stroke::new(2.0, theme::bevy_to_egui(theme::SELECTION_COLOR));
        painter.rect_stroke(rect.expand(1.0), 2.0, stroke, egui::StrokeKind::Outside);
    } else if hovered {
        let stroke = egui::Stroke::new(1.0, theme::bevy_to_egui(theme::HOVER_COLOR));
        painter.rect_stroke(rect, 2.0, stroke, egui::StrokeKind::Outside);
    }
}

fn draw_tooltip(painter: &egui::Painter, anchor: egui::Pos2, text: String) {
    let galley = painter.layout_no_wrap(
        text,
        egui::FontId::proportional(13.0),
        theme::ui::LABEL_TEXT,
    );
    let rect = egui::Rect::from_min_size(anchor + egui::vec2(8.0, -24.0), galley.size()).expand(4.0);
    painter.rect_filled(rect, 3.0, theme::ui::PANEL_BACKGROUND);
    painter.galley(rect.min + egui::vec2(4.0, 4.0), galley, theme::ui::LABEL_TEXT);
}

/// Paint tiles, grid, objects, the rectangle preview and the hover tooltip.
pub fn draw_canvas(
    mut contexts: EguiContexts,
    mut editor: ResMut<MapEditor>,
    textures: Res<ObjectTextures>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let painter = ctx.layer_painter(egui::LayerId::background());

    let viewport = editor.viewport.clone();
    let show_grid = editor.show_grid;
    let zoom = viewport.scale;

    let cache = editor.visible_tiles();
    for (key, tile) in cache.tiles() {
        let rect = WorldRect::new(key.to_world(), Vec2::splat(GRID_SIZE));
        painter.rect_filled(screen_rect(&viewport, rect), 0.0, tile_color(tile));
    }
    if show_grid {
        draw_grid(&painter, &viewport, cache.grid_lines(GRID_SIZE));
    }

    let hovered = editor.hovered();
    let map = editor.map();
    for structure in &map.structures {
        let rect = screen_rect(&viewport, structure.bounds());
        let fill = theme::parse_hex_or(&structure.color, theme::STRUCTURE_FALLBACK);
        draw_object(
            &painter,
            rect,
            textures.texture_id(&structure.item_path),
            fill,
            2.0 * zoom,
        );
        outline(
            &painter,
            rect,
            structure.is_selected,
            hovered == Some(ObjectRef::Structure(structure.id)),
        );
    }
    for character in &map.characters {
        let rect = screen_rect(&viewport, character.bounds());
        draw_object(
            &painter,
            rect,
            textures.texture_id(&character.image_path),
            theme::bevy_to_egui(theme::CHARACTER_FALLBACK),
            rect.width() / 2.0,
        );
        outline(
            &painter,
            rect,
            character.is_selected,
            hovered == Some(ObjectRef::Character(character.id)),
        );
    }

    if let Some(preview) = editor.selection_rect() {
        let rect = screen_rect(&viewport, preview);
        painter.rect_filled(rect, 0.0, theme::bevy_to_egui(theme::RECT_PREVIEW_FILL));
        painter.rect_stroke(
            rect,
            0.0,
            egui::Stroke::new(1.5, theme::bevy_to_egui(theme::RECT_PREVIEW_OUTLINE)),
            egui::StrokeKind::Inside,
        );
    }

    if !editor.is_dragging()
        && let Some(target) = hovered
    {
        let label = match target {
            ObjectRef::Structure(id) => map
                .structures
                .iter()
                .find(|s| s.id == id)
                .map(|s| (s.name.clone(), s.bounds())),
            ObjectRef::Character(id) => map
                .characters
                .iter()
                .find(|c| c.id == id)
                .map(|c| (format!("{} ({})", c.name, c.class), c.bounds())),
        };
        if let Some((text, bounds)) = label {
            let anchor = to_pos(viewport.world_to_screen(Vec2::new(bounds.max().x, bounds.y)));
            draw_tooltip(&painter, anchor, text);
        }
    }

    Ok(())
}
