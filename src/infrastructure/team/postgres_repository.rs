//! PostgreSQL team repository implementation

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::game::GameId;
use crate::domain::registration::NewRegistration;
use crate::domain::team::{Team, TeamId, TeamRepository};
use crate::domain::RegistryError;
use crate::infrastructure::registration::enroll_in_tx;

/// PostgreSQL implementation of TeamRepository
#[derive(Debug, Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn create(
        &self,
        team: Team,
        captain: NewRegistration,
        captain_limit: u32,
    ) -> Result<Team, RegistryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("INSERT INTO teams (id, name, game_id) VALUES ($1, $2, $3)")
            .bind(team.id().as_uuid())
            .bind(team.name())
            .bind(team.game_id().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                let msg = e.to_string();

                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    RegistryError::conflict(format!("Team '{}' already exists", team.name()))
                } else {
                    RegistryError::storage(format!("Failed to create team: {}", e))
                }
            })?;

        // Any enrollment failure drops the transaction and the team row
        // with it; a team never exists without its founding Captain.
        enroll_in_tx(&mut tx, &captain, captain_limit).await?;

        tx.commit()
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to commit team creation: {}", e)))?;

        Ok(team)
    }

    async fn get(&self, id: TeamId) -> Result<Option<Team>, RegistryError> {
        let row = sqlx::query("SELECT id, name, game_id, join_code FROM teams WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to get team: {}", e)))?;

        Ok(row.map(|row| row_to_team(&row)))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Team>, RegistryError> {
        let row = sqlx::query("SELECT id, name, game_id, join_code FROM teams WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to get team by name: {}", e)))?;

        Ok(row.map(|row| row_to_team(&row)))
    }

    async fn set_join_code(&self, id: TeamId, join_code: &str) -> Result<(), RegistryError> {
        let result = sqlx::query("UPDATE teams SET join_code = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(join_code)
            .execute(&self.pool)
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to store join code: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::not_found(format!("Team '{}' not found", id)));
        }

        Ok(())
    }
}

fn row_to_team(row: &PgRow) -> Team {
    Team::from_parts(
        TeamId::from(row.get::<uuid::Uuid, _>("id")),
        row.get::<String, _>("name"),
        GameId::from(row.get::<uuid::Uuid, _>("game_id")),
        row.get::<Option<String>, _>("join_code"),
    )
}
