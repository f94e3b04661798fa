//! Listing and deleting the user's saved maps.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::identity::{IdentityProvider, SharedIdentity};

use super::messages::{DeleteMapRequest, ListMapsRequest};
use super::resources::{
    CurrentMap, DeleteMapTask, ListMapsTask, MapPersistence, PersistenceStatus, SavedMapList,
};
use super::save::report_failure;

/// Starts an async listing. Signed-out users get an empty list without touching the store.
pub fn list_maps_system(
    mut commands: Commands,
    mut events: MessageReader<ListMapsRequest>,
    persistence: Res<MapPersistence>,
    identity: Res<SharedIdentity>,
    mut status: ResMut<PersistenceStatus>,
    mut list: ResMut<SavedMapList>,
) {
    if events.read().count() == 0 {
        return;
    }
    if identity.current_user().is_none() {
        list.maps.clear();
        list.loaded = false;
        return;
    }
    if status.is_listing {
        debug!("Map listing already in progress");
        return;
    }

    let gateway = persistence.0.clone();
    status.is_listing = true;
    let task = IoTaskPool::get().spawn(async move { gateway.list() });
    commands.spawn(ListMapsTask(task));
}

pub fn poll_list_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ListMapsTask)>,
    mut status: ResMut<PersistenceStatus>,
    mut list: ResMut<SavedMapList>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            status.is_listing = false;

            match result {
                Ok(maps) => {
                    debug!("Listed {} saved map(s)", maps.len());
                    list.maps = maps;
                    list.loaded = true;
                }
                Err(e) => report_failure("listing", &e, &mut status),
            }

            commands.entity(entity).despawn();
        }
    }
}

pub fn delete_map_system(
    mut commands: Commands,
    mut events: MessageReader<DeleteMapRequest>,
    persistence: Res<MapPersistence>,
    mut status: ResMut<PersistenceStatus>,
) {
    for event in events.read() {
        let gateway = persistence.0.clone();
        let id = event.id.clone();
        let task_id = id.clone();

        status.is_deleting = true;
        let task = IoTaskPool::get().spawn(async move { gateway.delete(&task_id) });
        commands.spawn(DeleteMapTask(id, task));
    }
}

pub fn poll_delete_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut DeleteMapTask)>,
    mut status: ResMut<PersistenceStatus>,
    mut current_map: ResMut<CurrentMap>,
    mut list_events: MessageWriter<ListMapsRequest>,
) {
    let pending = tasks.iter().count();
    let mut finished = 0;

    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.1)) {
            finished += 1;

            match result {
                Ok(()) => {
                    // The live map stays; it just no longer has a stored counterpart
                    if current_map.id.as_deref() == Some(task.0.as_str()) {
                        current_map.id = None;
                    }
                    status.info("Map deleted");
                }
                Err(e) => report_failure("delete", &e, &mut status),
            }
            list_events.write(ListMapsRequest);

            commands.entity(entity).despawn();
        }
    }

    if finished == pending {
        status.is_deleting = false;
    }
}

/// Fades out informational messages
pub fn expire_status_message(mut status: ResMut<PersistenceStatus>) {
    if status.message.is_some() {
        status.expire(chrono::Utc::now());
    }
}
