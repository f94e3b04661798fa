//! Selection module for the editor.
//!
//! This module handles all selection-related functionality including:
//! - Hit testing against structures and character markers
//! - Mutually exclusive selection across both collections
//! - Drag with snapping and character collision avoidance
//! - Keyboard shortcuts for selected items

mod drag;
mod hit_detection;
mod shortcuts;

pub use drag::{finish_drag, update_drag_position, DragState};
pub use hit_detection::hit_test;
pub use shortcuts::handle_editor_shortcuts;

use crate::map::{MapSnapshot, ObjectRef, PlacedObject};

/// Move the object with `id` to the end of its list so it draws on top.
/// Returns false if no such object exists.
fn bring_to_front<T: PlacedObject>(items: &mut Vec<T>, id: u64) -> bool {
    let Some(index) = items.iter().position(|item| item.id() == id) else {
        return false;
    };
    let item = items.remove(index);
    items.push(item);
    true
}

fn set_all_selected<T: PlacedObject>(items: &mut [T], selected: bool) {
    for item in items.iter_mut() {
        item.set_selected(selected);
    }
}

/// Select one object and deselect everything else in both collections.
/// Returns false (and leaves selection untouched) when the target does not exist.
pub fn select(map: &mut MapSnapshot, target: ObjectRef) -> bool {
    let found = match target {
        ObjectRef::Structure(id) => bring_to_front(&mut map.structures, id),
        ObjectRef::Character(id) => bring_to_front(&mut map.characters, id),
    };
    if !found {
        return false;
    }

    clear_selection(map);
    match target {
        ObjectRef::Structure(_) => {
            if let Some(last) = map.structures.last_mut() {
                last.set_selected(true);
            }
        }
        ObjectRef::Character(_) => {
            if let Some(last) = map.characters.last_mut() {
                last.set_selected(true);
            }
        }
    }
    true
}

pub fn clear_selection(map: &mut MapSnapshot) {
    set_all_selected(&mut map.structures, false);
    set_all_selected(&mut map.characters, false);
}

pub fn selected_refs(map: &MapSnapshot) -> Vec<ObjectRef> {
    map.structures
        .iter()
        .filter(|s| s.is_selected)
        .map(|s| ObjectRef::Structure(s.id))
        .chain(
            map.characters
                .iter()
                .filter(|c| c.is_selected)
                .map(|c| ObjectRef::Character(c.id)),
        )
        .collect()
}

/// Delete every selected object. Returns the references that were removed.
pub fn remove_selected(map: &mut MapSnapshot) -> Vec<ObjectRef> {
    let removed = selected_refs(map);
    map.structures.retain(|s| !s.is_selected);
    map.characters.retain(|c| !c.is_selected);
    removed
}

pub fn contains(map: &MapSnapshot, target: ObjectRef) -> bool {
    match target {
        ObjectRef::Structure(id) => map.structures.iter().any(|s| s.id == id),
        ObjectRef::Character(id) => map.characters.iter().any(|c| c.id == id),
    }
}
