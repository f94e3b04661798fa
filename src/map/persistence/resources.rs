//! Resource types for map persistence state tracking.

use bevy::prelude::*;
use bevy::tasks::Task;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::constants::STATUS_MESSAGE_SECONDS;
use crate::identity::SharedIdentity;

use super::gateway::{LoadedMap, MapGateway, PersistenceError};
use super::store::{FileDocumentStore, MapDocumentSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Inline message shown next to the persistence controls
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub shown_at: DateTime<Utc>,
}

/// Resource tracking async map I/O and the last outcome
#[derive(Resource, Default)]
pub struct PersistenceStatus {
    pub is_saving: bool,
    pub is_loading: bool,
    pub is_listing: bool,
    pub is_deleting: bool,
    pub message: Option<StatusMessage>,
}

impl PersistenceStatus {
    pub fn is_busy(&self) -> bool {
        self.is_saving || self.is_loading || self.is_deleting
    }

    /// Mark a load as started. A click while one is running is refused with a message.
    pub fn begin_load(&mut self) -> bool {
        if self.is_loading {
            self.info("Still loading the previous map, try again in a moment");
            return false;
        }
        self.is_loading = true;
        true
    }

    /// Mark a save as started. A click while one is running is refused with a message.
    pub fn begin_save(&mut self) -> bool {
        if self.is_saving {
            self.info("Still saving, try again in a moment");
            return false;
        }
        self.is_saving = true;
        true
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set_message(StatusKind::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set_message(StatusKind::Error, text.into());
    }

    fn set_message(&mut self, kind: StatusKind, text: String) {
        self.message = Some(StatusMessage {
            kind,
            text,
            shown_at: Utc::now(),
        });
    }

    /// Drop the message once it has been visible long enough. Errors stay until replaced.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        if let Some(message) = &self.message
            && message.kind == StatusKind::Info
            && now - message.shown_at >= Duration::seconds(STATUS_MESSAGE_SECONDS)
        {
            self.message = None;
        }
    }
}

/// The user's saved maps as last listed
#[derive(Resource, Default)]
pub struct SavedMapList {
    pub maps: Vec<MapDocumentSummary>,
    /// Whether a listing has completed since startup or sign-in
    pub loaded: bool,
}

/// The stored document the live map was last saved to or loaded from
#[derive(Resource, Default)]
pub struct CurrentMap {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Gateway used by the persistence systems
#[derive(Resource, Clone)]
pub struct MapPersistence(pub MapGateway);

impl FromWorld for MapPersistence {
    fn from_world(world: &mut World) -> Self {
        let identity = world
            .get_resource_or_insert_with(SharedIdentity::default)
            .clone();
        let store = Arc::new(FileDocumentStore::new(crate::paths::maps_dir()));
        Self(MapGateway::new(store, identity.provider()))
    }
}

/// Component for save task
#[derive(Component)]
pub struct SaveMapTask(pub Task<Result<MapDocumentSummary, PersistenceError>>);

/// Component for load task
#[derive(Component)]
pub struct LoadMapTask(pub Task<Result<LoadedMap, PersistenceError>>);

/// Component for list task
#[derive(Component)]
pub struct ListMapsTask(pub Task<Result<Vec<MapDocumentSummary>, PersistenceError>>);

/// Component for delete task; carries the id being deleted
#[derive(Component)]
pub struct DeleteMapTask(pub String, pub Task<Result<(), PersistenceError>>);
