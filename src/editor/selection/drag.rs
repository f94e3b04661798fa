//! Drag operations for structures and character markers.

use bevy::math::Vec2;

use crate::editor::grid::{snap_vec_round, snap_vec_threshold};
use crate::map::{CharacterMarker, MapSnapshot, ObjectRef, PlacedObject};

/// Neighbour cells tried, in order, when a dragged character lands on another one.
const NEIGHBOUR_ORDER: [(f32, f32); 4] = [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];

/// In-progress drag of a single object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub target: ObjectRef,
    /// Pointer position relative to the object's top-left when the drag began
    pub grab_offset: Vec2,
    pub start_position: Vec2,
}

fn character_collides(characters: &[CharacterMarker], id: u64, position: Vec2) -> bool {
    let Some(dragged) = characters.iter().find(|c| c.id == id) else {
        return false;
    };
    let footprint = dragged.bounds_at(position);
    characters
        .iter()
        .filter(|c| c.id != id)
        .any(|c| c.bounds().overlaps(&footprint))
}

/// Where a dragged character may go when aiming at `target`: the target itself
/// if free, otherwise the first free neighbour, otherwise nowhere.
fn resolve_character_target(
    characters: &[CharacterMarker],
    id: u64,
    target: Vec2,
    grid_size: f32,
) -> Option<Vec2> {
    if !character_collides(characters, id, target) {
        return Some(target);
    }
    NEIGHBOUR_ORDER
        .iter()
        .map(|(dx, dy)| target + Vec2::new(*dx, *dy) * grid_size)
        .find(|candidate| !character_collides(characters, id, *candidate))
}

/// Move the dragged object toward the pointer, snapping with the threshold bias.
/// Returns the new position, or None when the object could not move.
pub fn update_drag_position(
    map: &mut MapSnapshot,
    drag: &DragState,
    world_pos: Vec2,
    grid_size: f32,
    threshold: f32,
) -> Option<Vec2> {
    let target = snap_vec_threshold(world_pos - drag.grab_offset, grid_size, threshold);
    match drag.target {
        ObjectRef::Structure(id) => {
            let structure = map.structures.iter_mut().find(|s| s.id == id)?;
            structure.set_position(target);
            Some(target)
        }
        ObjectRef::Character(id) => {
            let resolved = resolve_character_target(&map.characters, id, target, grid_size)?;
            let character = map.characters.iter_mut().find(|c| c.id == id)?;
            character.set_position(resolved);
            Some(resolved)
        }
    }
}

/// Final snap when the drag ends. Clears the dragging flag.
pub fn finish_drag(map: &mut MapSnapshot, drag: &DragState, grid_size: f32) -> Option<Vec2> {
    match drag.target {
        ObjectRef::Structure(id) => {
            let structure = map.structures.iter_mut().find(|s| s.id == id)?;
            let snapped = snap_vec_round(structure.position, grid_size);
            structure.set_position(snapped);
            structure.set_dragging(false);
            Some(snapped)
        }
        ObjectRef::Character(id) => {
            let current = map.characters.iter().find(|c| c.id == id)?.position;
            let snapped = snap_vec_round(current, grid_size);
            let collides = character_collides(&map.characters, id, snapped);
            let character = map.characters.iter_mut().find(|c| c.id == id)?;
            if !collides {
                character.set_position(snapped);
            }
            character.set_dragging(false);
            Some(character.position)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::StructureTemplate;

    const G: f32 = 50.0;
    const T: f32 = 10.0;

    fn marker(id: u64, position: Vec2) -> CharacterMarker {
        CharacterMarker {
            id,
            character_id: format!("char-{}", id),
            name: format!("Hero {}", id),
            class: "paladin".to_string(),
            position,
            size: Vec2::splat(G),
            image_path: "tokens/paladin.png".to_string(),
            is_selected: false,
            is_dragging: true,
        }
    }

    fn drag_of(target: ObjectRef, start: Vec2) -> DragState {
        DragState {
            target,
            grab_offset: Vec2::new(20.0, 20.0),
            start_position: start,
        }
    }

    #[test]
    fn test_structure_drag_uses_threshold_snap() {
        let chest = StructureTemplate::by_name("Chest").unwrap();
        let mut map = MapSnapshot {
            structures: vec![chest.instantiate(1, Vec2::ZERO)],
            ..Default::default()
        };
        let drag = drag_of(ObjectRef::Structure(1), Vec2::ZERO);

        // Top-left would be (110, 110): inside the floor zone
        let pos = update_drag_position(&mut map, &drag, Vec2::new(130.0, 130.0), G, T);
        assert_eq!(pos, Some(Vec2::new(100.0, 100.0)));

        // Top-left (142, 145): within the last 10px, snaps up
        let pos = update_drag_position(&mut map, &drag, Vec2::new(162.0, 165.0), G, T);
        assert_eq!(pos, Some(Vec2::new(150.0, 150.0)));
        assert_eq!(map.structures[0].position, Vec2::new(150.0, 150.0));
    }

    #[test]
    fn test_character_drag_free_target() {
        let mut map = MapSnapshot {
            characters: vec![marker(1, Vec2::ZERO), marker(2, Vec2::new(200.0, 0.0))],
            ..Default::default()
        };
        let drag = drag_of(ObjectRef::Character(1), Vec2::ZERO);
        let pos = update_drag_position(&mut map, &drag, Vec2::new(120.0, 20.0), G, T);
        assert_eq!(pos, Some(Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn test_character_drag_nudges_right_first() {
        let mut map = MapSnapshot {
            characters: vec![marker(1, Vec2::ZERO), marker(2, Vec2::new(100.0, 100.0))],
            ..Default::default()
        };
        let drag = drag_of(ObjectRef::Character(1), Vec2::ZERO);
        let pos = update_drag_position(&mut map, &drag, Vec2::new(120.0, 120.0), G, T);
        assert_eq!(pos, Some(Vec2::new(150.0, 100.0)));
    }

    #[test]
    fn test_character_drag_nudge_order() {
        // Right neighbour taken, so the left one is used
        let mut map = MapSnapshot {
            characters: vec![
                marker(1, Vec2::new(-200.0, 0.0)),
                marker(2, Vec2::new(100.0, 100.0)),
                marker(3, Vec2::new(150.0, 100.0)),
            ],
            ..Default::default()
        };
        let drag = drag_of(ObjectRef::Character(1), Vec2::new(-200.0, 0.0));
        let pos = update_drag_position(&mut map, &drag, Vec2::new(120.0, 120.0), G, T);
        assert_eq!(pos, Some(Vec2::new(50.0, 100.0)));
    }

    #[test]
    fn test_character_drag_blocked_stays_put() {
        let mut map = MapSnapshot {
            characters: vec![
                marker(1, Vec2::new(-200.0, 0.0)),
                marker(2, Vec2::new(100.0, 100.0)),
                marker(3, Vec2::new(150.0, 100.0)),
                marker(4, Vec2::new(50.0, 100.0)),
                marker(5, Vec2::new(100.0, 150.0)),
                marker(6, Vec2::new(100.0, 50.0)),
            ],
            ..Default::default()
        };
        let drag = drag_of(ObjectRef::Character(1), Vec2::new(-200.0, 0.0));
        let pos = update_drag_position(&mut map, &drag, Vec2::new(120.0, 120.0), G, T);
        assert_eq!(pos, None);
        assert_eq!(map.characters[0].position, Vec2::new(-200.0, 0.0));
    }

    #[test]
    fn test_characters_ignore_structures_when_dragging() {
        let chest = StructureTemplate::by_name("Chest").unwrap();
        let mut map = MapSnapshot {
            structures: vec![chest.instantiate(9, Vec2::new(100.0, 100.0))],
            characters: vec![marker(1, Vec2::ZERO)],
            ..Default::default()
        };
        let drag = drag_of(ObjectRef::Character(1), Vec2::ZERO);
        let pos = update_drag_position(&mut map, &drag, Vec2::new(120.0, 120.0), G, T);
        assert_eq!(pos, Some(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn test_finish_drag_rounds_and_clears_flag() {
        let chest = StructureTemplate::by_name("Chest").unwrap();
        let mut structure = chest.instantiate(1, Vec2::new(130.0, 20.0));
        structure.is_dragging = true;
        let mut map = MapSnapshot {
            structures: vec![structure],
            ..Default::default()
        };
        let drag = drag_of(ObjectRef::Structure(1), Vec2::ZERO);
        assert_eq!(finish_drag(&mut map, &drag, G), Some(Vec2::new(150.0, 0.0)));
        assert!(!map.structures[0].is_dragging);
    }

    #[test]
    fn test_drag_of_missing_object() {
        let mut map = MapSnapshot::default();
        let drag = drag_of(ObjectRef::Structure(42), Vec2::ZERO);
        assert_eq!(update_drag_position(&mut map, &drag, Vec2::ZERO, G, T), None);
        assert_eq!(finish_drag(&mut map, &drag, G), None);
    }
}
