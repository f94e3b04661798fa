//! Message types for map persistence operations.

use bevy::prelude::*;

/// Save the live map under a name (overwrites the user's map of that name)
#[derive(Message)]
pub struct SaveMapRequest {
    pub name: String,
}

#[derive(Message)]
pub struct LoadMapRequest {
    pub id: String,
}

/// Refresh the saved map listing
#[derive(Message)]
pub struct ListMapsRequest;

#[derive(Message)]
pub struct DeleteMapRequest {
    pub id: String,
}

/// Discard the live map and start an empty one
#[derive(Message)]
pub struct NewMapRequest;
