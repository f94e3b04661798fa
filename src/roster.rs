//! Characters available for placement on the map.
//!
//! The character manager owns the roster; the editor only lists the current
//! user's characters so they can be dropped onto the map as markers.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use futures_lite::future;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::identity::{Identity, IdentityProvider, SharedIdentity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterCharacter {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default = "default_level")]
    pub level: u32,
}

fn default_level() -> u32 {
    1
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Could not read roster {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Roster file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait CharacterRoster: Send + Sync {
    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<RosterCharacter>, RosterError>;
}

/// Roster backed by a JSON array of characters on disk. A missing file is an empty roster.
pub struct FileRoster {
    path: PathBuf,
}

impl FileRoster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CharacterRoster for FileRoster {
    fn list_for_owner(&self, owner_id: &str) -> Result<Vec<RosterCharacter>, RosterError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&self.path).map_err(|source| RosterError::Io {
            path: self.path.clone(),
            source,
        })?;
        let all: Vec<RosterCharacter> = serde_json::from_str(&json)?;
        let mut owned: Vec<RosterCharacter> =
            all.into_iter().filter(|c| c.owner_id == owner_id).collect();
        owned.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(owned)
    }
}

/// Roster implementation used by the app
#[derive(Resource, Clone)]
pub struct RosterSource(pub Arc<dyn CharacterRoster>);

impl Default for RosterSource {
    fn default() -> Self {
        Self(Arc::new(FileRoster::new(crate::paths::roster_file())))
    }
}

/// The current user's characters as last listed
#[derive(Resource, Default)]
pub struct RosterState {
    pub characters: Vec<RosterCharacter>,
    pub error: Option<String>,
    pub loading: bool,
}

impl RosterState {
    /// Apply a finished listing made for `owner_id`. Listings for anyone but the
    /// current user are dropped. Returns whether the result was applied.
    pub fn apply_listing(
        &mut self,
        owner_id: &str,
        current_user: Option<&Identity>,
        result: Result<Vec<RosterCharacter>, String>,
    ) -> bool {
        if current_user.map(|u| u.id.as_str()) != Some(owner_id) {
            debug!("Discarding roster listed for {}", owner_id);
            return false;
        }
        match result {
            Ok(characters) => {
                debug!("Roster lists {} character(s)", characters.len());
                self.characters = characters;
                self.error = None;
            }
            Err(e) => {
                error!("Failed to read roster: {}", e);
                self.error = Some(e);
            }
        }
        true
    }
}

/// Message to re-read the roster for the current user
#[derive(Message)]
pub struct RefreshRosterRequest;

/// Listing in flight, tagged with the owner it was made for
#[derive(Component)]
pub struct RosterTask {
    owner_id: String,
    task: Task<Result<Vec<RosterCharacter>, String>>,
}

fn refresh_roster_system(
    mut commands: Commands,
    mut events: MessageReader<RefreshRosterRequest>,
    source: Res<RosterSource>,
    identity: Res<SharedIdentity>,
    mut state: ResMut<RosterState>,
    pending: Query<(Entity, &RosterTask)>,
) {
    // Multiple requests in one frame need only one read
    if events.read().count() == 0 {
        return;
    }

    let user = identity.current_user();
    for (entity, task) in pending.iter() {
        if user.as_ref().map(|u| u.id.as_str()) != Some(task.owner_id.as_str()) {
            commands.entity(entity).despawn();
        }
    }

    let Some(user) = user else {
        state.characters.clear();
        state.error = None;
        state.loading = false;
        return;
    };

    let roster = source.0.clone();
    let owner_id = user.id.clone();
    let pool = IoTaskPool::get();
    let task = pool.spawn(async move {
        roster
            .list_for_owner(&user.id)
            .map_err(|e| e.to_string())
    });
    state.loading = true;
    commands.spawn(RosterTask { owner_id, task });
}

fn poll_roster_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut RosterTask)>,
    identity: Res<SharedIdentity>,
    mut state: ResMut<RosterState>,
) {
    let user = identity.current_user();
    for (entity, mut pending) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut pending.task)) {
            commands.entity(entity).despawn();
            state.loading = false;
            state.apply_listing(&pending.owner_id, user.as_ref(), result);
        }
    }
}

pub struct RosterPlugin;

impl Plugin for RosterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RosterSource>()
            .init_resource::<RosterState>()
            .add_message::<RefreshRosterRequest>()
            .add_systems(
                Update,
                (
                    refresh_roster_system.run_if(on_message::<RefreshRosterRequest>),
                    poll_roster_tasks,
                ),
            );
    }
}
