//! User directory trait

use async_trait::async_trait;

use super::entity::{DiscordProfile, User, UserId};
use crate::domain::RegistryError;

/// Read-only directory of platform users
///
/// The Discord profile lookup reaches an external provider and may fail
/// independently of the user row itself; callers that enrich listings with
/// it must treat failures as an absent profile, not as a listing failure.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Get a user by ID
    async fn get(&self, id: UserId) -> Result<Option<User>, RegistryError>;

    /// Fetch the user's external Discord profile
    async fn discord_profile(&self, id: UserId) -> Result<DiscordProfile, RegistryError>;
}
