//! Database migrations infrastructure

use sqlx::postgres::PgPool;

use crate::domain::RegistryError;

/// PostgreSQL migrator with embedded versioned migrations
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the migrations table if it doesn't exist
    async fn ensure_migrations_table(&self) -> Result<(), RegistryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                success BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RegistryError::storage(format!("Failed to create migrations table: {}", e))
        })?;

        Ok(())
    }

    /// Runs a single migration
    pub async fn run_migration(&self, migration: &Migration) -> Result<(), RegistryError> {
        self.ensure_migrations_table().await?;

        // Check if already applied
        let applied: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)",
        )
        .bind(migration.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RegistryError::storage(format!("Failed to check migration status: {}", e)))?;

        if applied {
            return Ok(());
        }

        // Run the migration
        sqlx::query(&migration.up)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RegistryError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        // Record the migration
        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                RegistryError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        Ok(())
    }

    /// Runs all pending registry migrations
    pub async fn run(&self) -> Result<(), RegistryError> {
        for migration in registry_migrations() {
            self.run_migration(&migration).await?;
        }

        Ok(())
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, RegistryError> {
        self.ensure_migrations_table().await?;

        let version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM _migrations WHERE success = TRUE")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    RegistryError::storage(format!("Failed to get migration version: {}", e))
                })?;

        Ok(version)
    }
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version (timestamp-based recommended)
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
}

impl Migration {
    pub fn new(version: i64, description: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
        }
    }
}

/// Collection of migrations for the registry schema
///
/// Games and users are provisioned by the wider platform; their tables are
/// created here so a fresh database is usable, but the registry itself only
/// reads them.
pub fn registry_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create games table",
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL UNIQUE,
                max_captains INTEGER NOT NULL,
                max_players INTEGER NOT NULL
            );
            "#,
        ),
        Migration::new(
            2,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY,
                username TEXT NOT NULL
            );
            "#,
        ),
        Migration::new(
            3,
            "Create teams table",
            r#"
            CREATE TABLE IF NOT EXISTS teams (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                game_id UUID NOT NULL REFERENCES games(id),
                join_code TEXT
            );
            "#,
        ),
        Migration::new(
            4,
            "Create registrations table",
            r#"
            CREATE TABLE IF NOT EXISTS registrations (
                user_id BIGINT NOT NULL,
                team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                nick TEXT NOT NULL,
                role TEXT NOT NULL,
                rank INTEGER NOT NULL,
                max_rank INTEGER NOT NULL,
                joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (user_id, team_id)
            );
            CREATE INDEX IF NOT EXISTS idx_registrations_team_role
                ON registrations(team_id, role);
            "#,
        ),
        Migration::new(
            5,
            "Create eligible_teams view",
            r#"
            CREATE OR REPLACE VIEW eligible_teams AS
            SELECT t.id AS team_id,
                   t.name,
                   t.game_id,
                   r.user_id,
                   r.nick,
                   r.role,
                   r.rank,
                   r.max_rank,
                   full_rosters.can_play_since
            FROM teams t
            JOIN registrations r ON r.team_id = t.id
            JOIN (
                SELECT r2.team_id, MAX(r2.joined_at) AS can_play_since
                FROM registrations r2
                JOIN teams t2 ON t2.id = r2.team_id
                JOIN games g ON g.id = t2.game_id
                GROUP BY r2.team_id, g.max_captains, g.max_players
                HAVING COUNT(*) FILTER (WHERE r2.role = 'Captain') >= g.max_captains
                   AND COUNT(*) FILTER (WHERE r2.role = 'Player') >= g.max_players
            ) full_rosters ON full_rosters.team_id = t.id;
            "#,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_ordered() {
        let migrations = registry_migrations();
        let versions: Vec<i64> = migrations.iter().map(|m| m.version).collect();

        let mut sorted = versions.clone();
        sorted.sort_unstable();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn test_registrations_schema_carries_uniqueness_key() {
        let migrations = registry_migrations();
        let registrations = migrations
            .iter()
            .find(|m| m.description.contains("registrations"))
            .unwrap();

        assert!(registrations.up.contains("PRIMARY KEY (user_id, team_id)"));
    }
}
