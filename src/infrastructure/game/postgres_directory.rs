//! PostgreSQL game directory implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::game::{Game, GameDirectory, GameId};
use crate::domain::RegistryError;

/// PostgreSQL implementation of GameDirectory
#[derive(Debug, Clone)]
pub struct PostgresGameDirectory {
    pool: PgPool,
}

impl PostgresGameDirectory {
    /// Create a new directory with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameDirectory for PostgresGameDirectory {
    async fn get(&self, id: GameId) -> Result<Option<Game>, RegistryError> {
        let row = sqlx::query(
            "SELECT id, title, max_captains, max_players FROM games WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RegistryError::storage(format!("Failed to get game: {}", e)))?;

        Ok(row.map(|row| {
            Game::new(
                GameId::from(row.get::<uuid::Uuid, _>("id")),
                row.get::<String, _>("title"),
                row.get::<i32, _>("max_captains") as u32,
                row.get::<i32, _>("max_players") as u32,
            )
        }))
    }
}
