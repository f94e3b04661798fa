//! Hit detection for placed objects.

use bevy::math::Vec2;

use crate::map::{MapSnapshot, ObjectRef, PlacedObject};

/// Topmost object of a collection whose bounding box contains the point.
fn topmost_hit<T: PlacedObject>(items: &[T], world_pos: Vec2) -> Option<u64> {
    items
        .iter()
        .rev()
        .find(|item| item.bounds().contains(world_pos))
        .map(|item| item.id())
}

/// Find the object under a world position.
///
/// Structures are tested before characters; within a collection the
/// last-drawn (topmost) object wins.
pub fn hit_test(map: &MapSnapshot, world_pos: Vec2) -> Option<ObjectRef> {
    topmost_hit(&map.structures, world_pos)
        .map(ObjectRef::Structure)
        .or_else(|| topmost_hit(&map.characters, world_pos).map(ObjectRef::Character))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{CharacterMarker, StructureTemplate};

    fn map_with_overlap() -> MapSnapshot {
        let chest = StructureTemplate::by_name("Chest").unwrap();
        let altar = StructureTemplate::by_name("Altar").unwrap();
        MapSnapshot {
            structures: vec![altar.instantiate(1, Vec2::ZERO), chest.instantiate(2, Vec2::ZERO)],
            characters: vec![CharacterMarker {
                id: 3,
                character_id: "c".to_string(),
                name: "Ryn".to_string(),
                class: "rogue".to_string(),
                position: Vec2::new(50.0, 50.0),
                size: Vec2::splat(50.0),
                image_path: "tokens/rogue.png".to_string(),
                is_selected: false,
                is_dragging: false,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_topmost_structure_wins() {
        let map = map_with_overlap();
        assert_eq!(hit_test(&map, Vec2::new(10.0, 10.0)), Some(ObjectRef::Structure(2)));
    }

    #[test]
    fn test_structures_tested_before_characters() {
        // (60, 60) is inside both the 2x2 altar and the character marker
        let map = map_with_overlap();
        assert_eq!(hit_test(&map, Vec2::new(60.0, 60.0)), Some(ObjectRef::Structure(1)));
    }

    #[test]
    fn test_character_hit() {
        let mut map = map_with_overlap();
        map.structures.clear();
        assert_eq!(hit_test(&map, Vec2::new(60.0, 60.0)), Some(ObjectRef::Character(3)));
    }

    #[test]
    fn test_miss() {
        let map = map_with_overlap();
        assert_eq!(hit_test(&map, Vec2::new(500.0, 500.0)), None);
        // Right/bottom edges are outside
        assert_eq!(hit_test(&map, Vec2::new(100.0, 10.0)), None);
    }
}
