mod dialogs;
mod maps_panel;
mod sidebar;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<maps_panel::MapsPanelState>()
            // Side panels must render first so the toolbar fits between them
            .add_systems(
                EguiPrimaryContextPass,
                (sidebar::sidebar_ui, maps_panel::maps_panel_ui).chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                toolbar::toolbar_ui.after(maps_panel::maps_panel_ui),
            )
            .add_systems(
                EguiPrimaryContextPass,
                dialogs::config_reset_notification_ui.after(toolbar::toolbar_ui),
            );
    }
}
