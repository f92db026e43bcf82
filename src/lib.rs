//! Scrim Registry
//!
//! Team-registration core for a competitive-game platform:
//! - Team creation that atomically enrolls the creator as Captain
//! - Capacity-limited joins, enforced transactionally per (team, role)
//! - Secret join codes gating invitation-based access
//! - Roster, membership, and eligible-team listings with optional
//!   best-effort Discord enrichment
//!
//! The HTTP surface, authentication, and data seeding belong to the
//! embedding application; this crate exposes the operations as async
//! methods on [`TeamRegistry`].

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::RegistryError;
use infrastructure::game::PostgresGameDirectory;
use infrastructure::registration::PostgresRegistrationLedger;
use infrastructure::storage::PostgresMigrator;
use infrastructure::team::{PostgresTeamRepository, TeamRegistry};
use infrastructure::user::{DiscordClient, PostgresUserDirectory};

/// Registry wired against PostgreSQL for every collaborator
pub type PostgresTeamRegistry = TeamRegistry<
    PostgresTeamRepository,
    PostgresRegistrationLedger,
    PostgresGameDirectory,
    PostgresUserDirectory,
>;

/// Connect to the configured database, run migrations, and wire a registry
pub async fn connect_registry(config: &AppConfig) -> Result<PostgresTeamRegistry, RegistryError> {
    let pool = config.database.postgres().connect().await?;

    PostgresMigrator::new(pool.clone()).run().await?;

    let discord = DiscordClient::new(config.discord.client());

    Ok(TeamRegistry::new(
        Arc::new(PostgresTeamRepository::new(pool.clone())),
        Arc::new(PostgresRegistrationLedger::new(pool.clone())),
        Arc::new(PostgresGameDirectory::new(pool.clone())),
        Arc::new(PostgresUserDirectory::new(pool, discord)),
    ))
}
