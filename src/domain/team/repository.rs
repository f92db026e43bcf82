//! Team repository trait

use async_trait::async_trait;

use super::entity::{Team, TeamId};
use crate::domain::registration::NewRegistration;
use crate::domain::RegistryError;

/// Repository for team rows
///
/// Creation is deliberately coupled to the founding Captain's registration:
/// a team must never exist without its creator on the roster, so both
/// writes happen in one atomic unit or not at all.
#[async_trait]
pub trait TeamRepository: Send + Sync + std::fmt::Debug {
    /// Create a team and enroll its founding Captain atomically.
    ///
    /// A duplicate team name fails with `Conflict`; a failed enrollment
    /// rolls the team row back too. `captain_limit` is the game's Captain
    /// capacity, enforced exactly as a join would enforce it.
    async fn create(
        &self,
        team: Team,
        captain: NewRegistration,
        captain_limit: u32,
    ) -> Result<Team, RegistryError>;

    /// Get a team by ID
    async fn get(&self, id: TeamId) -> Result<Option<Team>, RegistryError>;

    /// Get a team by its unique name
    async fn get_by_name(&self, name: &str) -> Result<Option<Team>, RegistryError>;

    /// Persist a freshly generated join code, invalidating the previous one.
    ///
    /// Fails with `NotFound` when the team does not exist; on failure the
    /// stored code is unchanged.
    async fn set_join_code(&self, id: TeamId, join_code: &str) -> Result<(), RegistryError>;
}
