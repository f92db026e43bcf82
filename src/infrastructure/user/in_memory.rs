//! In-memory user directory implementation

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::{DiscordProfile, User, UserDirectory, UserId};
use crate::domain::RegistryError;

/// In-memory implementation of UserDirectory
///
/// Useful for testing and development. A user without a stored profile
/// behaves like a failed external lookup, which is how enrichment failure
/// paths are exercised.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
    profiles: RwLock<HashMap<UserId, DiscordProfile>>,
}

impl InMemoryUserDirectory {
    /// Create a new empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user without a Discord profile
    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id(), user);
    }

    /// Attach a Discord profile to a user
    pub async fn insert_profile(&self, id: UserId, profile: DiscordProfile) {
        self.profiles.write().await.insert(id, profile);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get(&self, id: UserId) -> Result<Option<User>, RegistryError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn discord_profile(&self, id: UserId) -> Result<DiscordProfile, RegistryError> {
        if self.get(id).await?.is_none() {
            return Err(RegistryError::not_found(format!("User '{}' not found", id)));
        }

        let profiles = self.profiles.read().await;
        profiles.get(&id).cloned().ok_or_else(|| {
            RegistryError::storage(format!("Discord profile for '{}' unavailable", id))
        })
    }
}
