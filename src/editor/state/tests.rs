use super::*;
use crate::constants::MAX_HISTORY;
use crate::map::TileKey;

fn roster_character(id: &str, name: &str, class: &str) -> RosterCharacter {
    RosterCharacter {
        id: id.to_string(),
        owner_id: "owner-1".to_string(),
        name: name.to_string(),
        class: class.to_string(),
        level: 1,
    }
}

fn chest() -> &'static StructureTemplate {
    StructureTemplate::by_name("Chest").unwrap()
}

fn serialized(editor: &MapEditor) -> String {
    serde_json::to_string(&editor.map().to_document_data()).unwrap()
}

fn tile_keys(editor: &MapEditor) -> Vec<String> {
    editor.map().tiles.iter().map(|(k, _)| k.to_string()).collect()
}

#[test]
fn test_place_tile_quantizes_to_cell() {
    let mut editor = MapEditor::new();
    editor.set_active_tile(TileType::new("wall"));
    assert!(editor.place_tile(Vec2::new(123.0, 77.0)));

    assert_eq!(tile_keys(&editor), vec!["100,50".to_string()]);
    assert_eq!(
        editor.map().tiles.get(TileKey::new(100, 50)),
        Some(&TileType::new("wall"))
    );
}

#[test]
fn test_place_tile_is_idempotent_within_a_cell() {
    let mut editor = MapEditor::new();
    editor.place_tile(Vec2::new(101.0, 51.0));
    let after_first = serialized(&editor);
    let undo_depth = editor.history().undo_count();

    // Any point inside the same cell changes nothing
    assert!(!editor.place_tile(Vec2::new(149.0, 99.0)));
    assert!(!editor.place_tile(Vec2::new(100.0, 50.0)));
    assert_eq!(serialized(&editor), after_first);
    assert_eq!(editor.history().undo_count(), undo_depth);
}

#[test]
fn test_eraser_removes_tile() {
    let mut editor = MapEditor::new();
    editor.place_tile(Vec2::new(10.0, 10.0));
    editor.set_active_tile(TileType::eraser());
    assert!(editor.place_tile(Vec2::new(40.0, 40.0)));
    assert!(editor.map().tiles.is_empty());
    // Erasing nothing is not an undo step
    assert!(!editor.place_tile(Vec2::new(40.0, 40.0)));
    assert_eq!(editor.history().undo_count(), 2);
}

#[test]
fn test_rectangle_paints_half_open_range() {
    let mut editor = MapEditor::new();
    editor.set_active_tile(TileType::new("stone"));
    let changed = editor.paint_rectangle(Vec2::new(100.0, 100.0), Vec2::ZERO);
    assert_eq!(changed, 4);
    let mut keys = tile_keys(&editor);
    keys.sort();
    assert_eq!(keys, vec!["0,0", "0,50", "50,0", "50,50"]);
    assert_eq!(editor.history().undo_count(), 1);
}

#[test]
fn test_rectangle_skips_cells_cut_by_the_corners() {
    let mut editor = MapEditor::new();
    editor.set_active_tile(TileType::new("stone"));
    let changed = editor.paint_rectangle(Vec2::new(160.0, 120.0), Vec2::new(20.0, 30.0));
    // Top-lefts in [20, 160) x [30, 120)
    assert_eq!(changed, 6);
    for x in [50, 100, 150] {
        for y in [50, 100] {
            assert!(editor.map().tiles.get(TileKey::new(x, y)).is_some(), "{},{}", x, y);
        }
    }
    assert!(editor.map().tiles.get(TileKey::new(0, 0)).is_none());
    assert!(editor.map().tiles.get(TileKey::new(0, 50)).is_none());
    assert!(editor.map().tiles.get(TileKey::new(150, 150)).is_none());
}

#[test]
fn test_rectangle_gesture_commits_once() {
    let mut editor = MapEditor::new();
    editor.set_mode(InteractionMode::RectanglePaint);
    editor.begin_rectangle(Vec2::new(5.0, 5.0));
    editor.update_rectangle(Vec2::new(60.0, 5.0));
    editor.update_rectangle(Vec2::new(110.0, 60.0));
    assert_eq!(
        editor.selection_rect(),
        Some(WorldRect::from_corners(Vec2::new(5.0, 5.0), Vec2::new(110.0, 60.0)))
    );
    assert_eq!(editor.commit_rectangle(), 2);
    let mut keys = tile_keys(&editor);
    keys.sort();
    assert_eq!(keys, vec!["100,50", "50,50"]);
    assert_eq!(editor.history().undo_count(), 1);
    assert!(editor.selection_rect().is_none());

    editor.undo();
    assert!(editor.map().tiles.is_empty());
}

#[test]
fn test_empty_rectangle_is_not_an_undo_step() {
    let mut editor = MapEditor::new();
    assert_eq!(editor.paint_rectangle(Vec2::new(10.0, 10.0), Vec2::new(40.0, 40.0)), 0);
    assert!(!editor.can_undo());
}

#[test]
fn test_rectangle_leaves_outside_untouched() {
    let mut editor = MapEditor::new();
    editor.set_active_tile(TileType::new("water"));
    editor.place_tile(Vec2::new(-10.0, -10.0));
    editor.place_tile(Vec2::new(210.0, 10.0));
    editor.set_active_tile(TileType::new("sand"));
    editor.paint_rectangle(Vec2::ZERO, Vec2::new(199.0, 49.0));

    assert_eq!(
        editor.map().tiles.get(TileKey::new(-50, -50)),
        Some(&TileType::new("water"))
    );
    assert_eq!(
        editor.map().tiles.get(TileKey::new(200, 0)),
        Some(&TileType::new("water"))
    );
    assert_eq!(editor.map().tiles.len(), 6);
}

#[test]
fn test_freehand_stroke_is_one_undo_step() {
    let mut editor = MapEditor::new();
    editor.begin_stroke(Vec2::new(10.0, 10.0));
    editor.continue_stroke(Vec2::new(60.0, 10.0));
    editor.continue_stroke(Vec2::new(110.0, 10.0));
    editor.continue_stroke(Vec2::new(115.0, 12.0));
    editor.cancel_gesture();

    assert_eq!(editor.map().tiles.len(), 3);
    assert_eq!(editor.history().undo_count(), 1);
    editor.undo();
    assert!(editor.map().tiles.is_empty());
}

#[test]
fn test_undo_redo_inverse_law() {
    let mut editor = MapEditor::new();
    editor.place_tile(Vec2::new(0.0, 0.0));
    editor.add_structure(chest());
    editor.add_character(&roster_character("c1", "Ryn", "rogue"));

    let before = serialized(&editor);
    editor.set_active_tile(TileType::new("lava"));
    editor.paint_rectangle(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0));
    let after = serialized(&editor);
    assert_ne!(before, after);

    assert!(editor.undo());
    assert_eq!(serialized(&editor), before);
    assert!(editor.redo());
    assert_eq!(serialized(&editor), after);
}

#[test]
fn test_undo_redo_walks_a_mixed_sequence() {
    let mut editor = MapEditor::new();
    let mut states = vec![serialized(&editor)];

    editor.place_tile(Vec2::new(0.0, 0.0));
    states.push(serialized(&editor));

    let chest = editor.add_structure(chest());
    states.push(serialized(&editor));

    let ryn = editor
        .add_character(&roster_character("c1", "Ryn", "rogue"))
        .unwrap();
    states.push(serialized(&editor));

    let start = editor.map().characters[0].position;
    let grab = start + Vec2::splat(10.0);
    assert!(editor.begin_drag(ryn, grab));
    editor.update_drag(grab + Vec2::new(150.0, 100.0));
    editor.end_drag();
    assert_eq!(editor.map().characters[0].position, start + Vec2::new(150.0, 100.0));
    states.push(serialized(&editor));

    editor.select(chest);
    assert_eq!(editor.remove_selected(), 1);
    states.push(serialized(&editor));

    editor.set_active_tile(TileType::new("lava"));
    assert!(editor.paint_rectangle(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0)) > 0);
    states.push(serialized(&editor));

    editor.set_active_tile(TileType::eraser());
    assert!(editor.place_tile(Vec2::new(10.0, 10.0)));
    states.push(serialized(&editor));

    let steps = states.len() - 1;
    assert_eq!(editor.history().undo_count(), steps);
    for pair in states.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }

    for expected in states.iter().rev().skip(1) {
        assert!(editor.undo());
        assert_eq!(&serialized(&editor), expected);
    }
    assert!(!editor.undo());
    assert_eq!(serialized(&editor), states[0]);

    for expected in states.iter().skip(1) {
        assert!(editor.redo());
        assert_eq!(&serialized(&editor), expected);
    }
    assert!(!editor.redo());
    assert_eq!(editor.history().redo_count(), 0);
}

#[test]
fn test_new_action_clears_redo() {
    let mut editor = MapEditor::new();
    editor.place_tile(Vec2::ZERO);
    editor.undo();
    assert!(editor.can_redo());
    editor.place_tile(Vec2::new(50.0, 0.0));
    assert!(!editor.can_redo());
}

#[test]
fn test_history_is_capped() {
    let mut editor = MapEditor::new();
    for i in 0..(MAX_HISTORY + 10) {
        editor.place_tile(Vec2::new(i as f32 * 50.0, 0.0));
    }
    assert_eq!(editor.history().undo_count(), MAX_HISTORY);

    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, MAX_HISTORY);
    assert_eq!(editor.map().tiles.len(), 10);
}

#[test]
fn test_two_chests_land_in_different_cells() {
    let mut editor = MapEditor::new();
    let center = snap_vec_floor(editor.viewport.center_world(), GRID_SIZE);

    let first = editor.add_structure(chest());
    let second = editor.add_structure(chest());
    assert_ne!(first, second);

    let structures = &editor.map().structures;
    assert_eq!(structures[0].position, center);
    assert_ne!(structures[1].position, center);
    assert!(!structures[0].bounds().overlaps(&structures[1].bounds()));
    // The first ring is searched right-first
    assert_eq!(structures[1].position, center + Vec2::new(GRID_SIZE, 0.0));
}

#[test]
fn test_structure_avoids_characters() {
    let mut editor = MapEditor::new();
    editor.add_character(&roster_character("c1", "Ryn", "rogue"));
    editor.add_structure(chest());
    let map = editor.map();
    assert!(!map.characters[0].bounds().overlaps(&map.structures[0].bounds()));
}

#[test]
fn test_duplicate_character_add_is_noop() {
    let mut editor = MapEditor::new();
    let ryn = roster_character("c1", "Ryn", "rogue");
    assert!(editor.add_character(&ryn).is_some());
    let before = serialized(&editor);
    let depth = editor.history().undo_count();

    assert!(editor.add_character(&ryn).is_none());
    assert_eq!(serialized(&editor), before);
    assert_eq!(editor.history().undo_count(), depth);
    assert_eq!(editor.map().characters.len(), 1);
}

#[test]
fn test_character_image_from_class() {
    let mut editor = MapEditor::new();
    editor.add_character(&roster_character("c1", "Ryn", "Wizard"));
    editor.add_character(&roster_character("c2", "Bob", ""));
    let characters = &editor.map().characters;
    assert_eq!(characters[0].image_path, "tokens/wizard.png");
    assert_eq!(characters[1].class, "fighter");
    assert_eq!(characters[1].image_path, "tokens/fighter.png");
}

#[test]
fn test_selection_is_mutually_exclusive() {
    let mut editor = MapEditor::new();
    let structure = editor.add_structure(chest());
    let character = editor.add_character(&roster_character("c1", "Ryn", "rogue")).unwrap();

    editor.select(structure);
    editor.select(character);
    assert_eq!(editor.selected(), vec![character]);
    editor.select(structure);
    assert_eq!(editor.selected(), vec![structure]);
    editor.clear_selection();
    assert!(editor.selected().is_empty());
}

#[test]
fn test_drag_snaps_and_is_one_undo_step() {
    let mut editor = MapEditor::new();
    editor.set_mode(InteractionMode::ObjectSelect);
    let target = editor.add_structure(chest());
    let start = editor.map().structures[0].position;

    assert!(editor.begin_drag(target, start + Vec2::new(25.0, 25.0)));
    assert!(editor.is_dragging());
    assert!(editor.map().structures[0].is_dragging);

    editor.update_drag(start + Vec2::new(90.0, 25.0));
    editor.update_drag(start + Vec2::new(140.0, 30.0));
    let end = editor.end_drag().unwrap();

    assert_eq!(end, start + Vec2::new(100.0, 0.0));
    assert!(!editor.map().structures[0].is_dragging);
    assert!(editor.map().structures[0].is_selected);
    assert_eq!(editor.history().undo_count(), 2);

    editor.undo();
    assert_eq!(editor.map().structures[0].position, start);
}

#[test]
fn test_remove_selected() {
    let mut editor = MapEditor::new();
    editor.set_mode(InteractionMode::ObjectSelect);
    let target = editor.add_structure(chest());
    editor.add_structure(chest());

    assert_eq!(editor.remove_selected(), 0);
    let depth = editor.history().undo_count();

    editor.select(target);
    let world = editor.map().structures.last().unwrap().position + Vec2::splat(5.0);
    editor.hover_at(world);
    assert_eq!(editor.hovered(), Some(target));

    assert_eq!(editor.remove_selected(), 1);
    assert_eq!(editor.map().structures.len(), 1);
    assert_eq!(editor.hovered(), None);
    assert_eq!(editor.history().undo_count(), depth + 1);
}

#[test]
fn test_leaving_select_mode_clears_selection() {
    let mut editor = MapEditor::new();
    editor.set_mode(InteractionMode::ObjectSelect);
    let target = editor.add_structure(chest());
    editor.select(target);
    editor.set_mode(InteractionMode::SingleTile);
    assert!(editor.selected().is_empty());
}

#[test]
fn test_hover_only_in_select_mode() {
    let mut editor = MapEditor::new();
    editor.add_structure(chest());
    let world = editor.map().structures[0].position + Vec2::splat(5.0);
    editor.hover_at(world);
    assert_eq!(editor.hovered(), None);

    editor.set_mode(InteractionMode::ObjectSelect);
    assert!(editor.hover_at(world));
    assert!(editor.hovered().is_some());
}

#[test]
fn test_replace_map_clears_history() {
    let mut editor = MapEditor::new();
    editor.place_tile(Vec2::ZERO);
    editor.replace_map(MapSnapshot::default(), 10);
    assert!(!editor.can_undo());
    assert!(!editor.has_unsaved_changes());

    let added = editor.add_structure(chest());
    assert_eq!(added, ObjectRef::Structure(10));
}

#[test]
fn test_undo_refreshes_render_cache() {
    let mut editor = MapEditor::new();
    editor.place_tile(Vec2::new(10.0, 10.0));
    assert_eq!(editor.visible_tiles().tiles().len(), 1);
    editor.undo();
    assert!(editor.visible_tiles().tiles().is_empty());
    editor.redo();
    assert_eq!(editor.visible_tiles().tiles().len(), 1);
}

#[test]
fn test_independent_editors() {
    let mut a = MapEditor::new();
    let b = MapEditor::new();
    a.place_tile(Vec2::ZERO);
    assert_eq!(a.map().tiles.len(), 1);
    assert!(b.map().tiles.is_empty());
}
