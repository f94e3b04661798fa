mod map_data;
pub mod persistence;
mod placed_item;
mod tiles;

pub use map_data::{MapDocumentData, MapSnapshot};
pub use persistence::{
    CurrentMap, DeleteMapRequest, ListMapsRequest, LoadMapRequest, MapPersistence, NewMapRequest,
    PersistenceStatus, SaveMapRequest, SavedMapList, StatusKind,
};
pub use placed_item::{
    class_image_path, CharacterMarker, ObjectRef, PlacedObject, StructureTemplate,
};
pub use tiles::{snap_floor, TileKey, TileStore, TileType};

use bevy::prelude::*;

use crate::config::{AppConfig, ConfigLoaded};
use crate::editor::MapEditor;
use crate::roster::RefreshRosterRequest;

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PersistenceStatus>()
            .init_resource::<SavedMapList>()
            .init_resource::<CurrentMap>()
            .init_resource::<MapPersistence>()
            .add_message::<SaveMapRequest>()
            .add_message::<LoadMapRequest>()
            .add_message::<ListMapsRequest>()
            .add_message::<DeleteMapRequest>()
            .add_message::<NewMapRequest>()
            .add_systems(Startup, restore_session.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    persistence::save_map_system.run_if(on_message::<SaveMapRequest>),
                    persistence::load_map_system.run_if(on_message::<LoadMapRequest>),
                    persistence::new_map_system.run_if(on_message::<NewMapRequest>),
                    persistence::delete_map_system.run_if(on_message::<DeleteMapRequest>),
                    persistence::list_maps_system.run_if(on_message::<ListMapsRequest>),
                    persistence::poll_save_tasks,
                    persistence::poll_load_tasks,
                    persistence::poll_delete_tasks,
                    persistence::poll_list_tasks,
                    persistence::expire_status_message,
                ),
            );
    }
}

/// Apply saved preferences and fetch the signed-in user's maps and characters
fn restore_session(
    config: Res<AppConfig>,
    mut editor: ResMut<MapEditor>,
    mut list_events: MessageWriter<ListMapsRequest>,
    mut roster_events: MessageWriter<RefreshRosterRequest>,
) {
    editor.show_grid = config.data.show_grid;
    list_events.write(ListMapsRequest);
    roster_events.write(RefreshRosterRequest);
}
