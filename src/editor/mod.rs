mod grid;
mod history;
mod interaction;
pub mod params;
mod placement;
mod rendering;
mod selection;
mod state;
pub mod tools;
mod viewport;

pub use state::MapEditor;
pub use tools::{InteractionMode, TilePaletteEntry};

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MapEditor>()
            .init_resource::<rendering::ObjectTextures>()
            .add_systems(
                Update,
                (
                    viewport::sync_viewport_size,
                    viewport::camera_zoom,
                    selection::handle_editor_shortcuts,
                    interaction::handle_pointer_input,
                    tools::update_cursor_icon,
                )
                    .chain(),
            )
            .add_systems(Update, rendering::load_object_textures)
            .add_systems(EguiPrimaryContextPass, rendering::draw_canvas);
    }
}
