//! Who is editing.
//!
//! Authentication lives outside the editor; all it needs is the current
//! user's identity to scope saved maps and the character roster. The app
//! feeds [`SharedIdentity`] from the signed-in profile in the config file.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Local profile identity derived from a display name
    pub fn local(display_name: &str) -> Self {
        let slug: String = display_name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        Self::new(format!("local-{}", slug), display_name.trim())
    }
}

pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<Identity>;
}

/// Identity slot shared between the UI (which signs in and out) and I/O tasks.
#[derive(Resource, Clone, Default)]
pub struct SharedIdentity {
    inner: Arc<RwLock<Option<Identity>>>,
}

impl SharedIdentity {
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(identity)),
        }
    }

    pub fn set(&self, identity: Option<Identity>) {
        match self.inner.write() {
            Ok(mut slot) => *slot = identity,
            Err(poisoned) => *poisoned.into_inner() = identity,
        }
    }

    pub fn provider(&self) -> Arc<dyn IdentityProvider> {
        Arc::new(self.clone())
    }
}

impl IdentityProvider for SharedIdentity {
    fn current_user(&self) -> Option<Identity> {
        match self.inner.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Fixed identity, used by tests and tools
impl IdentityProvider for Option<Identity> {
    fn current_user(&self) -> Option<Identity> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_identity_slug() {
        let identity = Identity::local("  Dungeon Master ");
        assert_eq!(identity.id, "local-dungeon-master");
        assert_eq!(identity.display_name, "Dungeon Master");
    }

    #[test]
    fn test_shared_identity_updates_providers() {
        let shared = SharedIdentity::default();
        let provider = shared.provider();
        assert!(provider.current_user().is_none());

        shared.set(Some(Identity::new("u1", "Ada")));
        assert_eq!(provider.current_user().map(|i| i.id), Some("u1".to_string()));

        shared.set(None);
        assert!(provider.current_user().is_none());
    }
}
