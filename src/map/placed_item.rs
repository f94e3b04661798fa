use bevy::math::Vec2;

use crate::common::WorldRect;
use crate::constants::{FALLBACK_CHARACTER_CLASS, GRID_SIZE};

/// Reference to one placed object in either collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Structure(u64),
    Character(u64),
}

/// Shared behaviour of structures and character markers.
pub trait PlacedObject {
    fn id(&self) -> u64;
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    fn size(&self) -> Vec2;
    fn is_selected(&self) -> bool;
    fn set_selected(&mut self, selected: bool);
    fn is_dragging(&self) -> bool;
    fn set_dragging(&mut self, dragging: bool);

    fn bounds(&self) -> WorldRect {
        WorldRect::new(self.position(), self.size())
    }

    /// Footprint the object would have at another position.
    fn bounds_at(&self, position: Vec2) -> WorldRect {
        WorldRect::new(position, self.size())
    }
}

/// A static placed map object (furniture, chest, door...)
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub id: u64,
    pub name: String,
    /// Top-left corner, grid aligned
    pub position: Vec2,
    pub size: Vec2,
    pub color: String,
    pub item_path: String,
    pub is_selected: bool,
    pub is_dragging: bool,
}

/// A token bound to a roster character
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterMarker {
    pub id: u64,
    pub character_id: String,
    pub name: String,
    pub class: String,
    pub position: Vec2,
    pub size: Vec2,
    pub image_path: String,
    pub is_selected: bool,
    pub is_dragging: bool,
}

macro_rules! impl_placed_object {
    ($ty:ty) => {
        impl PlacedObject for $ty {
            fn id(&self) -> u64 {
                self.id
            }
            fn position(&self) -> Vec2 {
                self.position
            }
            fn set_position(&mut self, position: Vec2) {
                self.position = position;
            }
            fn size(&self) -> Vec2 {
                self.size
            }
            fn is_selected(&self) -> bool {
                self.is_selected
            }
            fn set_selected(&mut self, selected: bool) {
                self.is_selected = selected;
            }
            fn is_dragging(&self) -> bool {
                self.is_dragging
            }
            fn set_dragging(&mut self, dragging: bool) {
                self.is_dragging = dragging;
            }
        }
    };
}

impl_placed_object!(Structure);
impl_placed_object!(CharacterMarker);

/// Catalog entry for the "add structure" palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureTemplate {
    pub name: &'static str,
    /// Footprint in grid cells
    pub cells: (u32, u32),
    pub color: &'static str,
    pub item_path: &'static str,
}

impl StructureTemplate {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.cells.0 as f32 * GRID_SIZE, self.cells.1 as f32 * GRID_SIZE)
    }

    pub fn all() -> &'static [StructureTemplate] {
        &STRUCTURE_TEMPLATES
    }

    pub fn by_name(name: &str) -> Option<&'static StructureTemplate> {
        STRUCTURE_TEMPLATES.iter().find(|t| t.name == name)
    }

    pub fn instantiate(&self, id: u64, position: Vec2) -> Structure {
        Structure {
            id,
            name: self.name.to_string(),
            position,
            size: self.size(),
            color: self.color.to_string(),
            item_path: self.item_path.to_string(),
            is_selected: false,
            is_dragging: false,
        }
    }
}

static STRUCTURE_TEMPLATES: [StructureTemplate; 8] = [
    StructureTemplate { name: "Chest", cells: (1, 1), color: "#8b5a2b", item_path: "structures/chest.png" },
    StructureTemplate { name: "Barrel", cells: (1, 1), color: "#a0522d", item_path: "structures/barrel.png" },
    StructureTemplate { name: "Door", cells: (1, 1), color: "#6b4423", item_path: "structures/door.png" },
    StructureTemplate { name: "Table", cells: (2, 1), color: "#deb887", item_path: "structures/table.png" },
    StructureTemplate { name: "Bed", cells: (1, 2), color: "#b22222", item_path: "structures/bed.png" },
    StructureTemplate { name: "Bookshelf", cells: (2, 1), color: "#654321", item_path: "structures/bookshelf.png" },
    StructureTemplate { name: "Statue", cells: (1, 1), color: "#a9a9a9", item_path: "structures/statue.png" },
    StructureTemplate { name: "Altar", cells: (2, 2), color: "#d4af37", item_path: "structures/altar.png" },
];

/// Character classes with dedicated token art. Anything else uses the fallback class.
static CLASS_TOKENS: [(&str, &str); 12] = [
    ("barbarian", "tokens/barbarian.png"),
    ("bard", "tokens/bard.png"),
    ("cleric", "tokens/cleric.png"),
    ("druid", "tokens/druid.png"),
    ("fighter", "tokens/fighter.png"),
    ("monk", "tokens/monk.png"),
    ("paladin", "tokens/paladin.png"),
    ("ranger", "tokens/ranger.png"),
    ("rogue", "tokens/rogue.png"),
    ("sorcerer", "tokens/sorcerer.png"),
    ("warlock", "tokens/warlock.png"),
    ("wizard", "tokens/wizard.png"),
];

/// Resolve a class label to its canonical (lower-case) form, falling back when
/// empty or unknown.
pub fn normalize_class(class: &str) -> String {
    let lowered = class.trim().to_lowercase();
    if CLASS_TOKENS.iter().any(|(name, _)| *name == lowered) {
        lowered
    } else {
        FALLBACK_CHARACTER_CLASS.to_string()
    }
}

/// Token image for a character class.
pub fn class_image_path(class: &str) -> String {
    let class = normalize_class(class);
    CLASS_TOKENS
        .iter()
        .find(|(name, _)| *name == class)
        .map(|(_, path)| path.to_string())
        .unwrap_or_else(|| format!("tokens/{}.png", FALLBACK_CHARACTER_CLASS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_sizes_are_grid_multiples() {
        for template in StructureTemplate::all() {
            let size = template.size();
            assert_eq!(size.x % GRID_SIZE, 0.0, "{} width", template.name);
            assert_eq!(size.y % GRID_SIZE, 0.0, "{} height", template.name);
        }
    }

    #[test]
    fn test_template_by_name() {
        let chest = StructureTemplate::by_name("Chest").unwrap();
        assert_eq!(chest.size(), Vec2::splat(GRID_SIZE));
        assert!(StructureTemplate::by_name("Spaceship").is_none());
    }

    #[test]
    fn test_instantiate_structure() {
        let table = StructureTemplate::by_name("Table").unwrap();
        let structure = table.instantiate(7, Vec2::new(100.0, 50.0));
        assert_eq!(structure.id, 7);
        assert_eq!(structure.size, Vec2::new(100.0, 50.0));
        assert_eq!(structure.bounds(), WorldRect::new(Vec2::new(100.0, 50.0), Vec2::new(100.0, 50.0)));
        assert!(!structure.is_selected);
        assert!(!structure.is_dragging);
    }

    #[test]
    fn test_class_image_path_known_class() {
        assert_eq!(class_image_path("Wizard"), "tokens/wizard.png");
        assert_eq!(class_image_path(" rogue "), "tokens/rogue.png");
    }

    #[test]
    fn test_class_image_path_falls_back() {
        assert_eq!(class_image_path(""), "tokens/fighter.png");
        assert_eq!(class_image_path("artificer"), "tokens/fighter.png");
        assert_eq!(normalize_class(""), FALLBACK_CHARACTER_CLASS);
    }
}
