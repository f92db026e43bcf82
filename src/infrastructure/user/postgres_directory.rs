//! PostgreSQL user directory implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::discord::DiscordClient;
use crate::domain::user::{DiscordProfile, User, UserDirectory, UserId};
use crate::domain::RegistryError;

/// PostgreSQL implementation of UserDirectory
///
/// User rows come from the platform database; Discord profiles come from
/// the external API and are only attempted for users that exist.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
    discord: DiscordClient,
}

impl PostgresUserDirectory {
    /// Create a new directory with the given pool and Discord client
    pub fn new(pool: PgPool, discord: DiscordClient) -> Self {
        Self { pool, discord }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn get(&self, id: UserId) -> Result<Option<User>, RegistryError> {
        let row = sqlx::query("SELECT id, username FROM users WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to get user: {}", e)))?;

        Ok(row.map(|row| User::new(UserId::new(row.get("id")), row.get::<String, _>("username"))))
    }

    async fn discord_profile(&self, id: UserId) -> Result<DiscordProfile, RegistryError> {
        if self.get(id).await?.is_none() {
            return Err(RegistryError::not_found(format!("User '{}' not found", id)));
        }

        self.discord.fetch(id).await
    }
}
