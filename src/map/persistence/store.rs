//! Document storage for saved maps.
//!
//! A store holds map documents scoped by owner. Lookups for a document owned
//! by someone else behave exactly like lookups for a missing one.

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A stored map document. `data` is kept as raw JSON so that damaged
/// documents can still be listed and loaded leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub data: Value,
}

impl MapDocument {
    pub fn summary(&self) -> MapDocumentSummary {
        MapDocumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            owner_id: self.owner_id.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Listing entry for a stored map (everything but the data)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDocumentSummary {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document {0} not found")]
    NotFound(String),
    #[error("Invalid document id: {0}")]
    InvalidId(String),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub trait DocumentStore: Send + Sync {
    fn find_by_name(&self, owner_id: &str, name: &str) -> Result<Option<MapDocument>, StoreError>;

    fn insert(&self, document: MapDocument) -> Result<(), StoreError>;

    /// Replace the data and timestamp of an existing document.
    fn update_data(
        &self,
        owner_id: &str,
        id: &str,
        data: Value,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<MapDocumentSummary>, StoreError>;

    fn get(&self, owner_id: &str, id: &str) -> Result<Option<MapDocument>, StoreError>;

    /// Remove a document. Returns false when there was nothing to remove.
    fn delete(&self, owner_id: &str, id: &str) -> Result<bool, StoreError>;
}

/// One pretty-printed JSON file per document, named `<id>.json`.
pub struct FileDocumentStore {
    dir: PathBuf,
}

impl FileDocumentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }

    fn read(&self, path: &Path) -> Result<MapDocument, StoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write(&self, document: &MapDocument) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let path = self.path_for(&document.id)?;
        let json = serde_json::to_string_pretty(document)?;
        std::fs::write(&path, json).map_err(|e| StoreError::io(&path, e))
    }

    /// Every readable document in the directory. Unreadable files are skipped.
    fn read_all(&self) -> Result<Vec<MapDocument>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut documents = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read(&path) {
                Ok(document) => documents.push(document),
                Err(e) => warn!("Skipping unreadable map document {:?}: {}", path, e),
            }
        }
        Ok(documents)
    }
}

impl DocumentStore for FileDocumentStore {
    fn find_by_name(&self, owner_id: &str, name: &str) -> Result<Option<MapDocument>, StoreError> {
        Ok(self
            .read_all()?
            .into_iter()
            .find(|d| d.owner_id == owner_id && d.name == name))
    }

    fn insert(&self, document: MapDocument) -> Result<(), StoreError> {
        self.write(&document)
    }

    fn update_data(
        &self,
        owner_id: &str,
        id: &str,
        data: Value,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut document = self
            .get(owner_id, id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        document.data = data;
        document.updated_at = updated_at;
        self.write(&document)
    }

    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<MapDocumentSummary>, StoreError> {
        Ok(self
            .read_all()?
            .iter()
            .filter(|d| d.owner_id == owner_id)
            .map(MapDocument::summary)
            .collect())
    }

    fn get(&self, owner_id: &str, id: &str) -> Result<Option<MapDocument>, StoreError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let document = self.read(&path)?;
        Ok((document.owner_id == owner_id).then_some(document))
    }

    fn delete(&self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        if self.get(owner_id, id)?.is_none() {
            return Ok(false);
        }
        let path = self.path_for(id)?;
        std::fs::remove_file(&path).map_err(|e| StoreError::io(&path, e))?;
        Ok(true)
    }
}

/// In-memory store for tests and offline sessions
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, MapDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_documents<R>(&self, f: impl FnOnce(&mut HashMap<String, MapDocument>) -> R) -> R {
        match self.documents.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn find_by_name(&self, owner_id: &str, name: &str) -> Result<Option<MapDocument>, StoreError> {
        Ok(self.with_documents(|docs| {
            docs.values()
                .find(|d| d.owner_id == owner_id && d.name == name)
                .cloned()
        }))
    }

    fn insert(&self, document: MapDocument) -> Result<(), StoreError> {
        self.with_documents(|docs| {
            docs.insert(document.id.clone(), document);
        });
        Ok(())
    }

    fn update_data(
        &self,
        owner_id: &str,
        id: &str,
        data: Value,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.with_documents(|docs| match docs.get_mut(id) {
            Some(document) if document.owner_id == owner_id => {
                document.data = data;
                document.updated_at = updated_at;
                Ok(())
            }
            _ => Err(StoreError::NotFound(id.to_string())),
        })
    }

    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<MapDocumentSummary>, StoreError> {
        Ok(self.with_documents(|docs| {
            docs.values()
                .filter(|d| d.owner_id == owner_id)
                .map(MapDocument::summary)
                .collect()
        }))
    }

    fn get(&self, owner_id: &str, id: &str) -> Result<Option<MapDocument>, StoreError> {
        Ok(self.with_documents(|docs| {
            docs.get(id).filter(|d| d.owner_id == owner_id).cloned()
        }))
    }

    fn delete(&self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self.with_documents(|docs| {
            let owned = docs.get(id).is_some_and(|d| d.owner_id == owner_id);
            if owned {
                docs.remove(id);
            }
            owned
        }))
    }
}
