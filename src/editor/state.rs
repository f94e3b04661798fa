//! The editor handle.
//!
//! `MapEditor` owns everything one editing session needs: the viewport, the
//! live map, undo/redo history, the interaction mode and the in-progress
//! gesture. The UI and input systems reach it as a Bevy resource; tests build
//! as many independent instances as they like.

use bevy::prelude::*;

use crate::common::WorldRect;
use crate::constants::{
    FALLBACK_CHARACTER_CLASS, GRID_SIZE, MAX_SEARCH_RADIUS, RENDER_PADDING, SNAP_THRESHOLD,
};
use crate::map::{
    class_image_path, CharacterMarker, MapSnapshot, ObjectRef, PlacedObject, StructureTemplate,
    TileKey, TileType,
};
use crate::roster::RosterCharacter;

use super::grid::{snap_vec_floor, TileRenderCache};
use super::history::History;
use super::placement::find_free_cell;
use super::selection::{self, DragState};
use super::tools::InteractionMode;
use super::viewport::Viewport;

/// Pointer gesture currently in progress
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Freehand tile stroke; `recorded` once the pre-stroke snapshot is in history
    Painting { recorded: bool },
    /// Rectangle paint between two world-space corners
    Rectangle { anchor: Vec2, current: Vec2 },
    Dragging(DragState),
}

#[derive(Resource)]
pub struct MapEditor {
    pub viewport: Viewport,
    pub show_grid: bool,
    pub(super) map: MapSnapshot,
    pub(super) history: History,
    pub(super) mode: InteractionMode,
    pub(super) active_tile: TileType,
    pub(super) gesture: Gesture,
    pub(super) hovered: Option<ObjectRef>,
    next_id: u64,
    unsaved_changes: bool,
    render_cache: TileRenderCache,
}

impl Default for MapEditor {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            show_grid: true,
            map: MapSnapshot::default(),
            history: History::default(),
            mode: InteractionMode::default(),
            active_tile: TileType::new("grass"),
            gesture: Gesture::Idle,
            hovered: None,
            next_id: 1,
            unsaved_changes: false,
            render_cache: TileRenderCache::default(),
        }
    }
}

impl MapEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self) -> &MapSnapshot {
        &self.map
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn active_tile(&self) -> &TileType {
        &self.active_tile
    }

    pub fn hovered(&self) -> Option<ObjectRef> {
        self.hovered
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging(_))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    pub fn mark_saved(&mut self) {
        self.unsaved_changes = false;
    }

    /// Push the current map onto the undo stack before a mutation.
    fn record(&mut self) {
        self.history.save(&self.map);
        self.unsaved_changes = true;
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn tile_change_pending(&self, key: TileKey, tile: &TileType) -> bool {
        match self.map.tiles.get(key) {
            Some(existing) => tile.is_eraser() || existing != tile,
            None => !tile.is_eraser(),
        }
    }

    // ---- Tiles ----

    /// Place the active tile at a world position as its own undo step.
    pub fn place_tile(&mut self, world_pos: Vec2) -> bool {
        let tile = self.active_tile.clone();
        self.place_tile_of(world_pos, &tile)
    }

    /// Place a specific tile type at a world position as its own undo step.
    pub fn place_tile_of(&mut self, world_pos: Vec2, tile: &TileType) -> bool {
        let key = TileKey::from_world(world_pos, GRID_SIZE);
        if !self.tile_change_pending(key, tile) {
            return false;
        }
        self.record();
        self.map.tiles.apply(key, tile)
    }

    /// Start a freehand stroke. History is recorded once, at the stroke's first change.
    pub fn begin_stroke(&mut self, world_pos: Vec2) {
        self.gesture = Gesture::Painting { recorded: false };
        self.continue_stroke(world_pos);
    }

    pub fn continue_stroke(&mut self, world_pos: Vec2) {
        let Gesture::Painting { recorded } = self.gesture else {
            return;
        };
        let key = TileKey::from_world(world_pos, GRID_SIZE);
        let tile = self.active_tile.clone();
        if !self.tile_change_pending(key, &tile) {
            return;
        }
        if !recorded {
            self.record();
            self.gesture = Gesture::Painting { recorded: true };
        }
        self.map.tiles.apply(key, &tile);
    }

    /// Paint the active tile over every cell whose top-left lies in the half-open
    /// rectangle spanned by two corners, as one undo step. Returns the number of cells changed.
    pub fn paint_rectangle(&mut self, a: Vec2, b: Vec2) -> usize {
        let tile = self.active_tile.clone();
        let rect = WorldRect::from_corners(a, b);
        let before = self.map.clone();
        let changed = self.map.tiles.paint_rect(rect, GRID_SIZE, &tile);
        if changed > 0 {
            self.history.save(&before);
            self.unsaved_changes = true;
        }
        changed
    }

    pub fn begin_rectangle(&mut self, world_pos: Vec2) {
        self.gesture = Gesture::Rectangle {
            anchor: world_pos,
            current: world_pos,
        };
    }

    pub fn update_rectangle(&mut self, world_pos: Vec2) {
        if let Gesture::Rectangle { current, .. } = &mut self.gesture {
            *current = world_pos;
        }
    }

    pub fn commit_rectangle(&mut self) -> usize {
        let Gesture::Rectangle { anchor, current } = self.gesture else {
            return 0;
        };
        self.gesture = Gesture::Idle;
        self.paint_rectangle(anchor, current)
    }

    /// Preview of the rectangle being painted, in world space.
    pub fn selection_rect(&self) -> Option<WorldRect> {
        match self.gesture {
            Gesture::Rectangle { anchor, current } => {
                Some(WorldRect::from_corners(anchor, current))
            }
            _ => None,
        }
    }

    pub fn set_active_tile(&mut self, tile: TileType) {
        self.active_tile = tile;
    }

    // ---- Objects ----

    fn occupied_rects(&self) -> Vec<WorldRect> {
        self.map
            .structures
            .iter()
            .map(|s| s.bounds())
            .chain(self.map.characters.iter().map(|c| c.bounds()))
            .collect()
    }

    /// Nearest free grid position to the viewport centre for a footprint.
    fn free_spot_near_center(&self, size: Vec2) -> Vec2 {
        let origin = snap_vec_floor(self.viewport.center_world(), GRID_SIZE);
        find_free_cell(origin, size, GRID_SIZE, &self.occupied_rects(), MAX_SEARCH_RADIUS)
    }

    pub fn add_structure(&mut self, template: &StructureTemplate) -> ObjectRef {
        let position = self.free_spot_near_center(template.size());
        self.record();
        let id = self.allocate_id();
        self.map.structures.push(template.instantiate(id, position));
        debug!("Added {} at {:?}", template.name, position);
        ObjectRef::Structure(id)
    }

    /// Place a marker for a roster character. No-op when it is already on the map.
    pub fn add_character(&mut self, character: &RosterCharacter) -> Option<ObjectRef> {
        if self.has_character(&character.id) {
            return None;
        }
        let size = Vec2::splat(GRID_SIZE);
        let position = self.free_spot_near_center(size);
        self.record();
        let id = self.allocate_id();
        let class = if character.class.trim().is_empty() {
            FALLBACK_CHARACTER_CLASS.to_string()
        } else {
            character.class.clone()
        };
        self.map.characters.push(CharacterMarker {
            id,
            character_id: character.id.clone(),
            name: character.name.clone(),
            image_path: class_image_path(&class),
            class,
            position,
            size,
            is_selected: false,
            is_dragging: false,
        });
        debug!("Added marker for {} at {:?}", character.name, position);
        Some(ObjectRef::Character(id))
    }

    pub fn has_character(&self, character_id: &str) -> bool {
        self.map
            .characters
            .iter()
            .any(|c| c.character_id == character_id)
    }

    pub fn select(&mut self, target: ObjectRef) -> bool {
        selection::select(&mut self.map, target)
    }

    pub fn clear_selection(&mut self) {
        selection::clear_selection(&mut self.map);
    }

    pub fn selected(&self) -> Vec<ObjectRef> {
        selection::selected_refs(&self.map)
    }

    pub fn hit_test(&self, world_pos: Vec2) -> Option<ObjectRef> {
        selection::hit_test(&self.map, world_pos)
    }

    /// Update hover state. Returns true when it changed.
    pub fn hover_at(&mut self, world_pos: Vec2) -> bool {
        let hovered = if self.mode == InteractionMode::ObjectSelect {
            self.hit_test(world_pos)
        } else {
            None
        };
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }

    fn object_position(&self, target: ObjectRef) -> Option<Vec2> {
        match target {
            ObjectRef::Structure(id) => self
                .map
                .structures
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.position),
            ObjectRef::Character(id) => self
                .map
                .characters
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.position),
        }
    }

    fn set_dragging_flag(&mut self, target: ObjectRef, dragging: bool) {
        match target {
            ObjectRef::Structure(id) => {
                if let Some(s) = self.map.structures.iter_mut().find(|s| s.id == id) {
                    s.set_dragging(dragging);
                }
            }
            ObjectRef::Character(id) => {
                if let Some(c) = self.map.characters.iter_mut().find(|c| c.id == id) {
                    c.set_dragging(dragging);
                }
            }
        }
    }

    /// Select an object and start dragging it from `world_pos`.
    pub fn begin_drag(&mut self, target: ObjectRef, world_pos: Vec2) -> bool {
        let Some(position) = self.object_position(target) else {
            return false;
        };
        self.record();
        self.select(target);
        self.set_dragging_flag(target, true);
        self.gesture = Gesture::Dragging(DragState {
            target,
            grab_offset: world_pos - position,
            start_position: position,
        });
        true
    }

    pub fn update_drag(&mut self, world_pos: Vec2) -> Option<Vec2> {
        let Gesture::Dragging(drag) = self.gesture else {
            return None;
        };
        selection::update_drag_position(&mut self.map, &drag, world_pos, GRID_SIZE, SNAP_THRESHOLD)
    }

    pub fn end_drag(&mut self) -> Option<Vec2> {
        let Gesture::Dragging(drag) = self.gesture else {
            return None;
        };
        self.gesture = Gesture::Idle;
        selection::finish_drag(&mut self.map, &drag, GRID_SIZE)
    }

    /// Delete the selected objects as one undo step. Returns how many were removed.
    pub fn remove_selected(&mut self) -> usize {
        if self.selected().is_empty() {
            return 0;
        }
        self.record();
        let removed = selection::remove_selected(&mut self.map);
        if let Some(hovered) = self.hovered
            && removed.contains(&hovered)
        {
            self.hovered = None;
        }
        if let Gesture::Dragging(drag) = self.gesture
            && removed.contains(&drag.target)
        {
            self.gesture = Gesture::Idle;
        }
        removed.len()
    }

    // ---- History ----

    fn restore(&mut self, snapshot: MapSnapshot) {
        self.map = snapshot;
        self.map.tiles.touch();
        self.render_cache.invalidate();
        self.hovered = None;
        self.gesture = Gesture::Idle;
        self.unsaved_changes = true;
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(&self.map) else {
            return false;
        };
        self.restore(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.map) else {
            return false;
        };
        self.restore(next);
        true
    }

    // ---- Modes ----

    /// Abandon or finish whatever gesture is in progress.
    pub fn cancel_gesture(&mut self) {
        match self.gesture {
            Gesture::Dragging(_) => {
                self.end_drag();
            }
            Gesture::Rectangle { .. } | Gesture::Painting { .. } => self.gesture = Gesture::Idle,
            Gesture::Idle => {}
        }
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode == self.mode {
            return;
        }
        self.cancel_gesture();
        if self.mode == InteractionMode::ObjectSelect {
            self.clear_selection();
            self.hovered = None;
        }
        self.mode = mode;
    }

    // ---- Whole-map ----

    /// Replace the live map with a loaded one. History does not survive a load.
    pub fn replace_map(&mut self, map: MapSnapshot, next_id: u64) {
        self.map = map;
        self.map.tiles.touch();
        self.next_id = next_id.max(1);
        self.history.clear();
        self.render_cache.invalidate();
        self.hovered = None;
        self.gesture = Gesture::Idle;
        self.unsaved_changes = false;
    }

    /// Start over with an empty map.
    pub fn new_map(&mut self) {
        self.replace_map(MapSnapshot::default(), 1);
    }

    /// Tiles near the viewport, recomputed only when the view or tiles change.
    pub fn visible_tiles(&mut self) -> &TileRenderCache {
        self.render_cache
            .refresh(&self.viewport, &self.map.tiles, RENDER_PADDING);
        &self.render_cache
    }
}

#[cfg(test)]
mod tests;
