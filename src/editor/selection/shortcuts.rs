//! Keyboard shortcuts for the editor.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::editor::params::wants_keyboard;
use crate::editor::state::MapEditor;
use crate::editor::tools::{InteractionMode, TilePaletteEntry};

/// Editor action requested by a key press
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ShortcutAction {
    DeleteSelection,
    Undo,
    Redo,
    ClearSelection,
    SetMode(InteractionMode),
    SelectTile(&'static TilePaletteEntry),
}

/// Resolve the keys pressed this frame to an action.
pub(crate) fn resolve_shortcut(keyboard: &ButtonInput<KeyCode>) -> Option<ShortcutAction> {
    let ctrl = keyboard.any_pressed([
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
    ]);
    let shift = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    if ctrl {
        if keyboard.just_pressed(KeyCode::KeyY)
            || (shift && keyboard.just_pressed(KeyCode::KeyZ))
        {
            return Some(ShortcutAction::Redo);
        }
        if keyboard.just_pressed(KeyCode::KeyZ) {
            return Some(ShortcutAction::Undo);
        }
        // Other chords are left to the OS and egui
        return None;
    }

    if keyboard.any_just_pressed([KeyCode::Delete, KeyCode::Backspace]) {
        return Some(ShortcutAction::DeleteSelection);
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        return Some(ShortcutAction::ClearSelection);
    }
    for key in keyboard.get_just_pressed() {
        if let Some(mode) = InteractionMode::from_key(*key) {
            return Some(ShortcutAction::SetMode(mode));
        }
        if let Some(entry) = TilePaletteEntry::from_key(*key) {
            return Some(ShortcutAction::SelectTile(entry));
        }
    }
    None
}

pub fn handle_editor_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut editor: ResMut<MapEditor>,
    mut contexts: EguiContexts,
) {
    // Don't trigger if typing in UI
    if wants_keyboard(&mut contexts) {
        return;
    }

    let Some(action) = resolve_shortcut(&keyboard) else {
        return;
    };

    match action {
        ShortcutAction::DeleteSelection => {
            let removed = editor.remove_selected();
            if removed > 0 {
                debug!("Deleted {} selected object(s)", removed);
            }
        }
        ShortcutAction::Undo => {
            if editor.undo() {
                debug!("Undo");
            }
        }
        ShortcutAction::Redo => {
            if editor.redo() {
                debug!("Redo");
            }
        }
        ShortcutAction::ClearSelection => {
            editor.cancel_gesture();
            editor.clear_selection();
        }
        ShortcutAction::SetMode(mode) => editor.set_mode(mode),
        ShortcutAction::SelectTile(entry) => editor.set_active_tile(entry.tile_type()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(keys: &[KeyCode]) -> ButtonInput<KeyCode> {
        let mut input = ButtonInput::default();
        for key in keys {
            input.press(*key);
        }
        input
    }

    #[test]
    fn test_undo_and_redo_chords() {
        assert_eq!(
            resolve_shortcut(&press(&[KeyCode::ControlLeft, KeyCode::KeyZ])),
            Some(ShortcutAction::Undo)
        );
        assert_eq!(
            resolve_shortcut(&press(&[KeyCode::ControlLeft, KeyCode::KeyY])),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            resolve_shortcut(&press(&[KeyCode::ControlRight, KeyCode::ShiftLeft, KeyCode::KeyZ])),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            resolve_shortcut(&press(&[KeyCode::Delete])),
            Some(ShortcutAction::DeleteSelection)
        );
        assert_eq!(
            resolve_shortcut(&press(&[KeyCode::Backspace])),
            Some(ShortcutAction::DeleteSelection)
        );
        assert_eq!(
            resolve_shortcut(&press(&[KeyCode::Escape])),
            Some(ShortcutAction::ClearSelection)
        );
        assert_eq!(
            resolve_shortcut(&press(&[KeyCode::KeyR])),
            Some(ShortcutAction::SetMode(InteractionMode::RectanglePaint))
        );
        assert_eq!(
            resolve_shortcut(&press(&[KeyCode::Digit3])),
            Some(ShortcutAction::SelectTile(
                TilePaletteEntry::from_key(KeyCode::Digit3).unwrap()
            ))
        );
    }

    #[test]
    fn test_ctrl_blocks_mode_keys() {
        // Ctrl+S must not switch to select mode
        assert_eq!(resolve_shortcut(&press(&[KeyCode::ControlLeft, KeyCode::KeyS])), None);
    }

    #[test]
    fn test_nothing_pressed() {
        assert_eq!(resolve_shortcut(&ButtonInput::default()), None);
    }
}
