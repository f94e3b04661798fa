//! Map save system and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::config::UpdateLastMapNameRequest;
use crate::editor::MapEditor;

use super::gateway::PersistenceError;
use super::messages::{ListMapsRequest, SaveMapRequest};
use super::resources::{CurrentMap, MapPersistence, PersistenceStatus, SaveMapTask};

/// Starts an async save of the live map
pub fn save_map_system(
    mut commands: Commands,
    mut events: MessageReader<SaveMapRequest>,
    editor: Res<MapEditor>,
    persistence: Res<MapPersistence>,
    mut status: ResMut<PersistenceStatus>,
) {
    for event in events.read() {
        if !status.begin_save() {
            warn!("Save of \"{}\" ignored, another save is in progress", event.name);
            continue;
        }

        let gateway = persistence.0.clone();
        let snapshot = editor.map().clone();
        let name = event.name.clone();

        let task = IoTaskPool::get().spawn(async move { gateway.save(&name, &snapshot) });
        commands.spawn(SaveMapTask(task));
    }
}

/// Polls save tasks and handles completion
pub fn poll_save_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut SaveMapTask)>,
    mut editor: ResMut<MapEditor>,
    mut status: ResMut<PersistenceStatus>,
    mut current_map: ResMut<CurrentMap>,
    mut config_events: MessageWriter<UpdateLastMapNameRequest>,
    mut list_events: MessageWriter<ListMapsRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            status.is_saving = false;

            match result {
                Ok(summary) => {
                    editor.mark_saved();
                    status.info(format!("Saved \"{}\"", summary.name));
                    config_events.write(UpdateLastMapNameRequest {
                        name: summary.name.clone(),
                    });
                    current_map.id = Some(summary.id);
                    current_map.name = Some(summary.name);
                    list_events.write(ListMapsRequest);
                }
                Err(e) => report_failure("save", &e, &mut status),
            }

            commands.entity(entity).despawn();
        }
    }
}

/// Log a failed operation and show it inline. Missing sign-in is expected, not a fault.
pub(super) fn report_failure(
    operation: &str,
    error: &PersistenceError,
    status: &mut PersistenceStatus,
) {
    match error {
        PersistenceError::NotAuthenticated | PersistenceError::EmptyName => {
            warn!("Map {} rejected: {}", operation, error)
        }
        _ => error!("Map {} failed: {}", operation, error),
    }
    status.error(error.to_string());
}
