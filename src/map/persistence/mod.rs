//! Saving and loading maps for the signed-in user.
//!
//! - [`store`] - document storage (file-backed and in-memory)
//! - [`gateway`] - owner-scoped save/list/load/delete over a store
//! - [`messages`] / [`resources`] - Bevy-facing requests and state
//! - [`save`], [`load`], [`library`] - systems that run gateway calls on the
//!   `IoTaskPool` and apply their results

mod gateway;
mod library;
mod load;
mod messages;
mod resources;
mod save;
mod store;


pub use gateway::{LoadedMap, MapGateway, PersistenceError};
pub use messages::{
    DeleteMapRequest, ListMapsRequest, LoadMapRequest, NewMapRequest, SaveMapRequest,
};
pub use resources::{
    CurrentMap, MapPersistence, PersistenceStatus, SavedMapList, StatusKind, StatusMessage,
};
pub use store::{
    DocumentStore, FileDocumentStore, MapDocument, MapDocumentSummary, MemoryDocumentStore,
    StoreError,
};

pub use library::{
    delete_map_system, expire_status_message, list_maps_system, poll_delete_tasks,
    poll_list_tasks,
};
pub use load::{load_map_system, new_map_system, poll_load_tasks};
pub use save::{poll_save_tasks, save_map_system};
