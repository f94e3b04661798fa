//! Map load system and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::config::UpdateLastMapNameRequest;
use crate::editor::MapEditor;

use super::messages::{LoadMapRequest, NewMapRequest};
use super::resources::{CurrentMap, LoadMapTask, MapPersistence, PersistenceStatus};
use super::save::report_failure;

/// Starts an async load of a stored map
pub fn load_map_system(
    mut commands: Commands,
    mut events: MessageReader<LoadMapRequest>,
    persistence: Res<MapPersistence>,
    mut status: ResMut<PersistenceStatus>,
) {
    for event in events.read() {
        if !status.begin_load() {
            warn!("Load of {} ignored, another load is in progress", event.id);
            continue;
        }

        let gateway = persistence.0.clone();
        let id = event.id.clone();

        let task = IoTaskPool::get().spawn(async move { gateway.load(&id) });
        commands.spawn(LoadMapTask(task));
    }
}

/// Polls load tasks. A completed load replaces the live map whatever happened meanwhile.
pub fn poll_load_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadMapTask)>,
    mut editor: ResMut<MapEditor>,
    mut status: ResMut<PersistenceStatus>,
    mut current_map: ResMut<CurrentMap>,
    mut config_events: MessageWriter<UpdateLastMapNameRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            status.is_loading = false;

            match result {
                Ok(loaded) => {
                    info!(
                        "Loaded map \"{}\": {} tiles, {} structures, {} characters",
                        loaded.summary.name,
                        loaded.snapshot.tiles.len(),
                        loaded.snapshot.structures.len(),
                        loaded.snapshot.characters.len()
                    );
                    editor.replace_map(loaded.snapshot, loaded.next_id);
                    status.info(format!("Loaded \"{}\"", loaded.summary.name));
                    config_events.write(UpdateLastMapNameRequest {
                        name: loaded.summary.name.clone(),
                    });
                    current_map.id = Some(loaded.summary.id);
                    current_map.name = Some(loaded.summary.name);
                }
                Err(e) => report_failure("load", &e, &mut status),
            }

            commands.entity(entity).despawn();
        }
    }
}

/// Starts a blank map
pub fn new_map_system(
    mut events: MessageReader<NewMapRequest>,
    mut editor: ResMut<MapEditor>,
    mut current_map: ResMut<CurrentMap>,
    mut status: ResMut<PersistenceStatus>,
) {
    if events.read().count() == 0 {
        return;
    }
    editor.new_map();
    *current_map = CurrentMap::default();
    status.info("Started a new map");
    info!("Started a new map");
}
