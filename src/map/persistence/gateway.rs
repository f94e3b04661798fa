//! Save, list, load and delete maps for the current user.

use bevy::prelude::*;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::identity::{Identity, IdentityProvider};
use crate::map::{MapDocumentData, MapSnapshot};

use super::store::{DocumentStore, MapDocument, MapDocumentSummary, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Map name cannot be empty")]
    EmptyName,
    #[error("Sign in to save or load maps")]
    NotAuthenticated,
    #[error("Map {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A map read back from storage, ready to become the live map
#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub summary: MapDocumentSummary,
    pub snapshot: MapSnapshot,
    /// First id free for objects added after the load
    pub next_id: u64,
}

#[derive(Clone)]
pub struct MapGateway {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl MapGateway {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    fn owner(&self) -> Result<Identity, PersistenceError> {
        self.identity
            .current_user()
            .ok_or(PersistenceError::NotAuthenticated)
    }

    /// Save under `name`, overwriting the owner's existing map of that name.
    pub fn save(
        &self,
        name: &str,
        map: &MapSnapshot,
    ) -> Result<MapDocumentSummary, PersistenceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PersistenceError::EmptyName);
        }
        let owner = self.owner()?;
        let data = serde_json::to_value(map.to_document_data()).map_err(StoreError::from)?;
        let now = Utc::now();

        match self.store.find_by_name(&owner.id, name)? {
            Some(existing) => {
                self.store.update_data(&owner.id, &existing.id, data, now)?;
                info!("Overwrote map \"{}\" ({})", name, existing.id);
                Ok(MapDocumentSummary {
                    updated_at: now,
                    ..existing.summary()
                })
            }
            None => {
                let document = MapDocument {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    owner_id: owner.id.clone(),
                    updated_at: now,
                    data,
                };
                let summary = document.summary();
                self.store.insert(document)?;
                info!("Saved new map \"{}\" ({})", name, summary.id);
                Ok(summary)
            }
        }
    }

    /// The current user's maps, most recently updated first.
    pub fn list(&self) -> Result<Vec<MapDocumentSummary>, PersistenceError> {
        let owner = self.owner()?;
        let mut maps = self.store.list_for_owner(&owner.id)?;
        maps.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(maps)
    }

    pub fn load(&self, id: &str) -> Result<LoadedMap, PersistenceError> {
        let owner = self.owner()?;
        let document = self
            .store
            .get(&owner.id, id)?
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;

        // Older documents carry the data as an embedded JSON string
        let data = match &document.data {
            Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!("Map {} has unreadable embedded data: {}", id, e);
                Value::Null
            }),
            other => other.clone(),
        };
        let mut next_id = 1;
        let snapshot =
            MapSnapshot::from_document_data(MapDocumentData::from_value_lenient(&data), &mut next_id);

        Ok(LoadedMap {
            summary: document.summary(),
            snapshot,
            next_id,
        })
    }

    pub fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        let owner = self.owner()?;
        if self.store.delete(&owner.id, id)? {
            info!("Deleted map {}", id);
            Ok(())
        } else {
            Err(PersistenceError::NotFound(id.to_string()))
        }
    }
}
