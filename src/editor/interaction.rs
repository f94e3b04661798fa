//! Pointer dispatch for the canvas.
//!
//! Input systems translate Bevy mouse state into `pointer_down`,
//! `pointer_move` and `pointer_up` calls on the [`MapEditor`], which then
//! dispatch on the current interaction mode.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use super::params::{is_cursor_over_ui, CursorParams};
use super::state::{Gesture, MapEditor};
use super::tools::InteractionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    /// Pans the view in every mode
    Secondary,
}

impl PointerButton {
    fn from_mouse(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(PointerButton::Primary),
            MouseButton::Right => Some(PointerButton::Secondary),
            _ => None,
        }
    }
}

impl MapEditor {
    pub fn pointer_down(&mut self, button: PointerButton, screen_pos: Vec2) {
        if button == PointerButton::Secondary {
            self.viewport.begin_pan(screen_pos);
            return;
        }
        // A second primary press while a gesture is live (e.g. focus loss ate the release)
        if self.gesture != Gesture::Idle {
            self.cancel_gesture();
        }

        let world = self.viewport.screen_to_world(screen_pos);
        match self.mode {
            InteractionMode::SingleTile => self.begin_stroke(world),
            InteractionMode::RectanglePaint => self.begin_rectangle(world),
            InteractionMode::ObjectSelect => match self.hit_test(world) {
                Some(target) => {
                    self.begin_drag(target, world);
                }
                None => self.clear_selection(),
            },
        }
    }

    pub fn pointer_move(&mut self, screen_pos: Vec2) {
        if self.viewport.pan_to(screen_pos) {
            return;
        }

        let world = self.viewport.screen_to_world(screen_pos);
        match self.gesture {
            Gesture::Painting { .. } => self.continue_stroke(world),
            Gesture::Rectangle { .. } => self.update_rectangle(world),
            Gesture::Dragging(_) => {
                self.update_drag(world);
            }
            Gesture::Idle => {}
        }
        self.hover_at(world);
    }

    pub fn pointer_up(&mut self, button: PointerButton, screen_pos: Vec2) {
        if button == PointerButton::Secondary {
            self.viewport.end_pan();
            return;
        }

        let world = self.viewport.screen_to_world(screen_pos);
        match self.gesture {
            Gesture::Painting { .. } => self.gesture = Gesture::Idle,
            Gesture::Rectangle { .. } => {
                self.update_rectangle(world);
                let changed = self.commit_rectangle();
                debug!("Rectangle paint changed {} cell(s)", changed);
            }
            Gesture::Dragging(_) => {
                self.end_drag();
            }
            Gesture::Idle => {}
        }
    }
}

/// Feed mouse buttons and cursor movement into the editor.
///
/// Presses over egui panels are ignored; moves and releases are always
/// delivered so gestures that started on the canvas can finish.
pub fn handle_pointer_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    cursor: CursorParams,
    mut editor: ResMut<MapEditor>,
    mut contexts: EguiContexts,
    mut last_cursor: Local<Option<Vec2>>,
) {
    let position = cursor.cursor_screen_pos();
    let over_ui = is_cursor_over_ui(&mut contexts);

    if let Some(pos) = position {
        if !over_ui {
            for button in mouse_button.get_just_pressed() {
                if let Some(button) = PointerButton::from_mouse(*button) {
                    editor.pointer_down(button, pos);
                }
            }
        }

        if *last_cursor != Some(pos) {
            editor.pointer_move(pos);
        }
        *last_cursor = Some(pos);
    }

    let release_pos = position.or(*last_cursor);
    for button in mouse_button.get_just_released() {
        if let (Some(button), Some(pos)) = (PointerButton::from_mouse(*button), release_pos) {
            editor.pointer_up(button, pos);
        }
    }
}
