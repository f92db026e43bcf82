//! PostgreSQL registration ledger implementation
//!
//! Owns the join transaction: insert, recount the role, and roll back when
//! the count exceeds the game's limit. An advisory transaction lock keyed
//! on (team, role) serializes competing joins for the same slot pool, so
//! the recount always observes every committed and in-flight-committed row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use crate::domain::game::GameId;
use crate::domain::registration::{
    EligibleRegistration, NewRegistration, Registration, RegistrationLedger, Role, TeamMembership,
    TeamPlayer,
};
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::RegistryError;

/// PostgreSQL implementation of RegistrationLedger
#[derive(Debug, Clone)]
pub struct PostgresRegistrationLedger {
    pool: PgPool,
}

impl PostgresRegistrationLedger {
    /// Create a new ledger with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Serialize capacity checks for one (team, role) slot pool.
///
/// The lock is transaction-scoped: released automatically at commit or
/// rollback, so no cleanup path is needed.
pub(crate) async fn lock_role_slots(
    conn: &mut PgConnection,
    team_id: TeamId,
    role: Role,
) -> Result<(), RegistryError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("{}:{}", team_id, role))
        .execute(conn)
        .await
        .map_err(|e| RegistryError::storage(format!("Failed to lock role slots: {}", e)))?;

    Ok(())
}

/// Insert one registration row, returning its joined_at timestamp.
///
/// A primary-key violation on (user_id, team_id) maps to
/// `DuplicateRegistration`.
pub(crate) async fn insert_registration(
    conn: &mut PgConnection,
    registration: &NewRegistration,
) -> Result<DateTime<Utc>, RegistryError> {
    sqlx::query_scalar(
        r#"
        INSERT INTO registrations (user_id, team_id, nick, role, rank, max_rank)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING joined_at
        "#,
    )
    .bind(registration.user_id.as_i64())
    .bind(registration.team_id.as_uuid())
    .bind(&registration.nick)
    .bind(registration.role.as_str())
    .bind(registration.rank)
    .bind(registration.max_rank)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        let msg = e.to_string();

        if msg.contains("duplicate key") || msg.contains("unique constraint") {
            RegistryError::duplicate_registration(format!(
                "User '{}' is already registered on team '{}'",
                registration.user_id, registration.team_id
            ))
        } else {
            RegistryError::storage(format!("Failed to insert registration: {}", e))
        }
    })
}

/// Count registrations holding one role on one team
pub(crate) async fn count_role(
    conn: &mut PgConnection,
    team_id: TeamId,
    role: Role,
) -> Result<i64, RegistryError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE team_id = $1 AND role = $2")
        .bind(team_id.as_uuid())
        .bind(role.as_str())
        .fetch_one(conn)
        .await
        .map_err(|e| RegistryError::storage(format!("Failed to count role slots: {}", e)))
}

/// Enroll within an already-open transaction.
///
/// Shared between the ledger's own `enroll` and team creation, which runs
/// the same steps after its team insert. The caller commits or the whole
/// unit rolls back together.
pub(crate) async fn enroll_in_tx(
    conn: &mut PgConnection,
    registration: &NewRegistration,
    limit: u32,
) -> Result<Registration, RegistryError> {
    lock_role_slots(conn, registration.team_id, registration.role).await?;

    let joined_at = insert_registration(conn, registration).await?;

    let count = count_role(conn, registration.team_id, registration.role).await?;

    if count > i64::from(limit) {
        return Err(RegistryError::capacity_exceeded(format!(
            "Role '{}' on team '{}' is limited to {} member(s)",
            registration.role, registration.team_id, limit
        )));
    }

    Ok(Registration::new(
        registration.user_id,
        registration.team_id,
        registration.nick.clone(),
        registration.role,
        registration.rank,
        registration.max_rank,
        joined_at,
    ))
}

#[async_trait]
impl RegistrationLedger for PostgresRegistrationLedger {
    async fn enroll(
        &self,
        registration: NewRegistration,
        limit: u32,
    ) -> Result<Registration, RegistryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to begin transaction: {}", e)))?;

        // Dropping the transaction on the error path rolls the insert back.
        let enrolled = enroll_in_tx(&mut tx, &registration, limit).await?;

        tx.commit()
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to commit enrollment: {}", e)))?;

        Ok(enrolled)
    }

    async fn remove(&self, team_id: TeamId, user_id: UserId) -> Result<(), RegistryError> {
        let result = sqlx::query("DELETE FROM registrations WHERE user_id = $1 AND team_id = $2")
            .bind(user_id.as_i64())
            .bind(team_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to delete registration: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::not_registered(format!(
                "User '{}' has no registration on team '{}'",
                user_id, team_id
            )));
        }

        Ok(())
    }

    async fn role_of(
        &self,
        team_id: TeamId,
        user_id: UserId,
    ) -> Result<Option<Role>, RegistryError> {
        let role: Option<String> = sqlx::query_scalar(
            "SELECT role FROM registrations WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id.as_uuid())
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RegistryError::storage(format!("Failed to look up role: {}", e)))?;

        role.map(|r| parse_role(&r)).transpose()
    }

    async fn team_players(&self, team_id: TeamId) -> Result<Vec<TeamPlayer>, RegistryError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, nick, role
            FROM registrations
            WHERE team_id = $1
            ORDER BY role ASC, joined_at ASC
            "#,
        )
        .bind(team_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RegistryError::storage(format!("Failed to list players: {}", e)))?;

        rows.iter()
            .map(|row| {
                Ok(TeamPlayer {
                    user_id: UserId::new(row.get("user_id")),
                    nick: row.get("nick"),
                    role: parse_role(row.get("role"))?,
                })
            })
            .collect()
    }

    async fn user_memberships(
        &self,
        user_id: UserId,
        include_join_code: bool,
    ) -> Result<Vec<TeamMembership>, RegistryError> {
        // The secret only crosses the store boundary when asked for.
        let query = if include_join_code {
            r#"
            SELECT r.team_id, r.nick, r.role, t.name AS team_name, t.game_id, t.join_code
            FROM registrations r
            JOIN teams t ON t.id = r.team_id
            WHERE r.user_id = $1
            ORDER BY t.name ASC
            "#
        } else {
            r#"
            SELECT r.team_id, r.nick, r.role, t.name AS team_name, t.game_id
            FROM registrations r
            JOIN teams t ON t.id = r.team_id
            WHERE r.user_id = $1
            ORDER BY t.name ASC
            "#
        };

        let rows = sqlx::query(query)
            .bind(user_id.as_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RegistryError::storage(format!("Failed to list memberships: {}", e)))?;

        rows.iter()
            .map(|row| {
                Ok(TeamMembership {
                    team_id: TeamId::from(row.get::<uuid::Uuid, _>("team_id")),
                    nick: row.get("nick"),
                    role: parse_role(row.get("role"))?,
                    team_name: row.get("team_name"),
                    game_id: GameId::from(row.get::<uuid::Uuid, _>("game_id")),
                    join_code: if include_join_code {
                        row.get("join_code")
                    } else {
                        None
                    },
                })
            })
            .collect()
    }

    async fn eligible_registrations(
        &self,
        game_id: GameId,
    ) -> Result<Vec<EligibleRegistration>, RegistryError> {
        let rows = sqlx::query(
            r#"
            SELECT team_id, name, user_id, nick, role, rank, max_rank, can_play_since
            FROM eligible_teams
            WHERE game_id = $1
            ORDER BY name ASC, role ASC
            "#,
        )
        .bind(game_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RegistryError::storage(format!("Failed to list eligible teams: {}", e)))?;

        rows.iter().map(row_to_eligible).collect()
    }
}

fn row_to_eligible(row: &PgRow) -> Result<EligibleRegistration, RegistryError> {
    Ok(EligibleRegistration {
        team_id: TeamId::from(row.get::<uuid::Uuid, _>("team_id")),
        team_name: row.get("name"),
        user_id: UserId::new(row.get("user_id")),
        nick: row.get("nick"),
        role: parse_role(row.get("role"))?,
        rank: row.get("rank"),
        max_rank: row.get("max_rank"),
        can_play_since: row.get("can_play_since"),
    })
}

fn parse_role(raw: &str) -> Result<Role, RegistryError> {
    raw.parse()
        .map_err(|e| RegistryError::storage(format!("Invalid role in database: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_known_values() {
        assert_eq!(parse_role("Captain").unwrap(), Role::Captain);
        assert_eq!(parse_role("Player").unwrap(), Role::Player);
    }

    #[test]
    fn test_parse_role_rejects_unknown() {
        let err = parse_role("Coach").unwrap_err();
        assert!(matches!(err, RegistryError::Storage { .. }));
    }
}
