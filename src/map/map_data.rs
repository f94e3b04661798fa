use bevy::log::warn;
use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use crate::constants::{FALLBACK_CHARACTER_CLASS, GRID_SIZE};

use super::placed_item::{class_image_path, CharacterMarker, Structure};
use super::tiles::{TileKey, TileStore, TileType};

/// Everything about a map that is persisted and restored by undo/redo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapSnapshot {
    pub tiles: TileStore,
    pub structures: Vec<Structure>,
    pub characters: Vec<CharacterMarker>,
}

impl MapSnapshot {
    /// Serialized form stored in the `data` field of a map document.
    pub fn to_document_data(&self) -> MapDocumentData {
        MapDocumentData {
            tiles: self
                .tiles
                .iter()
                .map(|(key, tile)| (key.to_string(), Some(tile.as_str().to_string())))
                .collect(),
            structures: self.structures.iter().map(SavedStructure::from).collect(),
            characters: self.characters.iter().map(SavedCharacter::from).collect(),
        }
    }

    /// Rebuild live collections from stored data.
    ///
    /// Malformed tile keys are skipped, duplicate or missing ids are replaced
    /// with fresh ones drawn from `next_id`, markers repeating a character
    /// identity are dropped, and transient flags always start cleared.
    pub fn from_document_data(data: MapDocumentData, next_id: &mut u64) -> Self {
        let mut tiles = TileStore::new();
        let mut skipped_keys = 0usize;
        for (raw_key, tile) in data.tiles {
            let Some(tile) = tile.filter(|t| !t.is_empty()) else {
                continue;
            };
            match raw_key.parse::<TileKey>() {
                Ok(key) if key.is_aligned(GRID_SIZE) => {
                    tiles.insert_raw(key, TileType::new(tile));
                }
                _ => skipped_keys += 1,
            }
        }
        if skipped_keys > 0 {
            warn!("Skipped {} malformed tile keys while loading map", skipped_keys);
        }

        let mut used_ids = HashSet::new();
        let mut claim_id = |requested: u64, next_id: &mut u64| -> u64 {
            let id = if requested != 0 && !used_ids.contains(&requested) {
                requested
            } else {
                while used_ids.contains(next_id) || *next_id == 0 {
                    *next_id += 1;
                }
                *next_id
            };
            used_ids.insert(id);
            *next_id = (*next_id).max(id + 1);
            id
        };

        let structures = data
            .structures
            .into_iter()
            .map(|saved| Structure {
                id: claim_id(saved.id, next_id),
                name: saved.name,
                position: Vec2::new(saved.x, saved.y),
                size: Vec2::new(saved.width, saved.height),
                color: saved.color,
                item_path: saved.item_path,
                is_selected: false,
                is_dragging: false,
            })
            .collect();

        let mut seen_characters = HashSet::new();
        let mut characters = Vec::new();
        for saved in data.characters {
            if !seen_characters.insert(saved.character_id.clone()) {
                warn!("Dropping duplicate marker for character {}", saved.character_id);
                continue;
            }
            let class = if saved.class.trim().is_empty() {
                FALLBACK_CHARACTER_CLASS.to_string()
            } else {
                saved.class
            };
            characters.push(CharacterMarker {
                id: claim_id(saved.id, next_id),
                image_path: class_image_path(&class),
                character_id: saved.character_id,
                name: saved.name,
                class,
                position: Vec2::new(saved.x, saved.y),
                size: Vec2::new(saved.width, saved.height),
                is_selected: false,
                is_dragging: false,
            });
        }

        Self {
            tiles,
            structures,
            characters,
        }
    }
}

fn default_cell_size() -> f32 {
    GRID_SIZE
}

/// `data` payload of a stored map document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDocumentData {
    /// `"x,y"` keys; `null` means explicitly cleared and is treated as absent
    #[serde(default)]
    pub tiles: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub structures: Vec<SavedStructure>,
    #[serde(default)]
    pub characters: Vec<SavedCharacter>,
}

impl MapDocumentData {
    /// Parse stored data without ever failing.
    ///
    /// Each field that does not have the expected shape degrades to an empty
    /// collection, and individual entries that cannot be read are skipped.
    pub fn from_value_lenient(value: &Value) -> Self {
        let mut data = Self::default();

        match value.get("tiles") {
            Some(Value::Object(entries)) => {
                for (key, tile) in entries {
                    match tile {
                        Value::String(label) => {
                            data.tiles.insert(key.clone(), Some(label.clone()));
                        }
                        Value::Null => {
                            data.tiles.insert(key.clone(), None);
                        }
                        _ => {}
                    }
                }
            }
            Some(other) if !other.is_null() => warn!("Map tiles are not an object; ignoring"),
            _ => {}
        }

        data.structures = lenient_array(value.get("structures"), "structures");
        data.characters = lenient_array(value.get("characters"), "characters");
        data
    }
}

fn lenient_array<T: for<'de> Deserialize<'de>>(value: Option<&Value>, field: &str) -> Vec<T> {
    match value {
        Some(Value::Array(entries)) => {
            let parsed: Vec<T> = entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect();
            if parsed.len() != entries.len() {
                warn!(
                    "Skipped {} unreadable {} entries",
                    entries.len() - parsed.len(),
                    field
                );
            }
            parsed
        }
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            warn!("Map {} are not an array; ignoring", field);
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStructure {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_cell_size")]
    pub width: f32,
    #[serde(default = "default_cell_size")]
    pub height: f32,
    #[serde(default)]
    pub color: String,
    #[serde(rename = "itemPath", default)]
    pub item_path: String,
}

impl From<&Structure> for SavedStructure {
    fn from(s: &Structure) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            x: s.position.x,
            y: s.position.y,
            width: s.size.x,
            height: s.size.y,
            color: s.color.clone(),
            item_path: s.item_path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCharacter {
    #[serde(default)]
    pub id: u64,
    pub character_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_cell_size")]
    pub width: f32,
    #[serde(default = "default_cell_size")]
    pub height: f32,
    #[serde(rename = "imagePath", default)]
    pub image_path: String,
}

impl From<&CharacterMarker> for SavedCharacter {
    fn from(c: &CharacterMarker) -> Self {
        Self {
            id: c.id,
            character_id: c.character_id.clone(),
            name: c.name.clone(),
            class: c.class.clone(),
            x: c.position.x,
            y: c.position.y,
            width: c.size.x,
            height: c.size.y,
            image_path: c.image_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_snapshot() -> MapSnapshot {
        let mut tiles = TileStore::new();
        tiles.place(Vec2::new(123.0, 77.0), GRID_SIZE, &TileType::new("wall"));
        tiles.place(Vec2::new(0.0, 0.0), GRID_SIZE, &TileType::new("grass"));
        MapSnapshot {
            tiles,
            structures: vec![Structure {
                id: 3,
                name: "Chest".to_string(),
                position: Vec2::new(50.0, 100.0),
                size: Vec2::splat(50.0),
                color: "#8b5a2b".to_string(),
                item_path: "structures/chest.png".to_string(),
                is_selected: true,
                is_dragging: false,
            }],
            characters: vec![CharacterMarker {
                id: 4,
                character_id: "char-1".to_string(),
                name: "Aria".to_string(),
                class: "wizard".to_string(),
                position: Vec2::new(200.0, 200.0),
                size: Vec2::splat(50.0),
                image_path: "tokens/wizard.png".to_string(),
                is_selected: false,
                is_dragging: true,
            }],
        }
    }

    #[test]
    fn test_document_data_uses_wire_field_names() {
        let value = serde_json::to_value(sample_snapshot().to_document_data()).unwrap();
        assert_eq!(value["tiles"]["100,50"], json!("wall"));
        assert_eq!(value["tiles"]["0,0"], json!("grass"));
        assert_eq!(value["structures"][0]["itemPath"], json!("structures/chest.png"));
        assert_eq!(value["characters"][0]["imagePath"], json!("tokens/wizard.png"));
        assert_eq!(value["characters"][0]["character_id"], json!("char-1"));
        assert!(value["structures"][0].get("is_selected").is_none());
    }

    #[test]
    fn test_rebuild_resets_transient_flags() {
        let original = sample_snapshot();
        let mut next_id = 1;
        let rebuilt = MapSnapshot::from_document_data(original.to_document_data(), &mut next_id);

        assert_eq!(rebuilt.tiles, original.tiles);
        assert!(!rebuilt.structures[0].is_selected);
        assert!(!rebuilt.characters[0].is_dragging);
        assert_eq!(rebuilt.structures[0].id, 3);
        assert_eq!(rebuilt.characters[0].id, 4);
        assert_eq!(next_id, 5);
    }

    #[test]
    fn test_null_tiles_are_absent() {
        let value = json!({ "tiles": { "0,0": null, "50,0": "water" } });
        let data = MapDocumentData::from_value_lenient(&value);
        let mut next_id = 1;
        let snapshot = MapSnapshot::from_document_data(data, &mut next_id);
        assert_eq!(snapshot.tiles.len(), 1);
        assert!(snapshot.tiles.get(TileKey::new(50, 0)).is_some());
    }

    #[test]
    fn test_malformed_shapes_degrade_to_empty() {
        let value = json!({
            "tiles": ["not", "an", "object"],
            "structures": { "oops": true },
            "characters": "nope"
        });
        let data = MapDocumentData::from_value_lenient(&value);
        assert_eq!(data, MapDocumentData::default());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let value = json!({
            "tiles": { "garbage": "wall", "NaN,0": "wall", "13,0": "wall", "50,50": 4, "100,100": "lava" },
            "structures": [ { "x": "left" }, { "id": 9, "x": 0.0, "y": 0.0 } ],
            "characters": [ { "name": "no id" }, { "character_id": "c1", "x": 50.0, "y": 50.0 } ]
        });
        let data = MapDocumentData::from_value_lenient(&value);
        assert_eq!(data.structures.len(), 1);
        assert_eq!(data.characters.len(), 1);

        let mut next_id = 1;
        let snapshot = MapSnapshot::from_document_data(data, &mut next_id);
        assert_eq!(snapshot.tiles.len(), 1);
        assert_eq!(snapshot.structures[0].size, Vec2::splat(GRID_SIZE));
        assert_eq!(snapshot.characters[0].class, FALLBACK_CHARACTER_CLASS);
        assert_eq!(snapshot.characters[0].image_path, "tokens/fighter.png");
    }

    #[test]
    fn test_missing_fields_default() {
        let data = MapDocumentData::from_value_lenient(&json!({}));
        assert!(data.tiles.is_empty());
        assert!(data.structures.is_empty());
        assert!(data.characters.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_reassigned() {
        let value = json!({
            "structures": [
                { "id": 1, "x": 0.0, "y": 0.0 },
                { "id": 1, "x": 50.0, "y": 0.0 },
                { "x": 100.0, "y": 0.0 }
            ]
        });
        let mut next_id = 1;
        let snapshot =
            MapSnapshot::from_document_data(MapDocumentData::from_value_lenient(&value), &mut next_id);
        let ids: HashSet<u64> = snapshot.structures.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&0));
        assert!(snapshot.structures.iter().all(|s| s.id < next_id));
    }

    #[test]
    fn test_duplicate_character_markers_are_dropped() {
        let value = json!({
            "characters": [
                { "character_id": "c1", "x": 0.0, "y": 0.0 },
                { "character_id": "c1", "x": 50.0, "y": 0.0 }
            ]
        });
        let mut next_id = 1;
        let snapshot =
            MapSnapshot::from_document_data(MapDocumentData::from_value_lenient(&value), &mut next_id);
        assert_eq!(snapshot.characters.len(), 1);
        assert_eq!(snapshot.characters[0].position, Vec2::ZERO);
    }

    #[test]
    fn test_image_path_is_normalized_from_class() {
        let value = json!({
            "characters": [
                { "character_id": "c1", "class": "Rogue", "imagePath": "stale.png", "x": 0.0, "y": 0.0 }
            ]
        });
        let mut next_id = 1;
        let snapshot =
            MapSnapshot::from_document_data(MapDocumentData::from_value_lenient(&value), &mut next_id);
        assert_eq!(snapshot.characters[0].class, "Rogue");
        assert_eq!(snapshot.characters[0].image_path, "tokens/rogue.png");
    }
}
