//! Common SystemParam bundles and input-gating helpers for editor systems.
//!
//! ## Available Bundles
//!
//! - [`CursorParams`]: Primary window access for cursor positions in screen space
//!
//! ## Helper Functions
//!
//! - [`is_cursor_over_ui`]: Check if cursor is over egui UI (for pointer gating)
//! - [`wants_keyboard`]: Check if egui is consuming keyboard input (for shortcut gating)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

/// Bundled window query for cursor handling
#[derive(SystemParam)]
pub struct CursorParams<'w, 's> {
    pub window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
}

impl CursorParams<'_, '_> {
    /// Cursor position in logical window pixels, top-left origin
    pub fn cursor_screen_pos(&self) -> Option<Vec2> {
        self.window.single().ok()?.cursor_position()
    }

    pub fn window_size(&self) -> Option<Vec2> {
        let window = self.window.single().ok()?;
        Some(Vec2::new(window.width(), window.height()))
    }
}

/// Check if the cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}

/// Check if a text field or other egui widget has keyboard focus
pub fn wants_keyboard(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false)
}
