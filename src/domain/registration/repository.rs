//! Registration ledger trait

use async_trait::async_trait;

use super::entity::{
    EligibleRegistration, NewRegistration, Registration, Role, TeamMembership, TeamPlayer,
};
use crate::domain::game::GameId;
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::RegistryError;

/// Transactional store of (user, team, role) membership rows
///
/// The ledger owns the two registry invariants: at most one registration per
/// (user, team), and never more registrations in a role than the limit the
/// caller passes to [`enroll`](RegistrationLedger::enroll). Implementations
/// must make `enroll` a single atomic unit: insert, recount the role, and
/// undo the insert when the count exceeds the limit, without letting a
/// concurrent enroll interleave between insert and recount.
#[async_trait]
pub trait RegistrationLedger: Send + Sync + std::fmt::Debug {
    /// Enroll a user, holding the role's headcount at `limit`.
    ///
    /// Fails with `DuplicateRegistration` when the (user, team) pair already
    /// has a row, and with `CapacityExceeded` when the insert would push the
    /// role over `limit`; in both cases the ledger is left untouched.
    async fn enroll(
        &self,
        registration: NewRegistration,
        limit: u32,
    ) -> Result<Registration, RegistryError>;

    /// Remove a user's registration from a team.
    ///
    /// Removing a user who has no registration fails with `NotRegistered`;
    /// it is never a silent no-op.
    async fn remove(&self, team_id: TeamId, user_id: UserId) -> Result<(), RegistryError>;

    /// Role the user holds on the team, if any
    async fn role_of(&self, team_id: TeamId, user_id: UserId)
        -> Result<Option<Role>, RegistryError>;

    /// Full roster of a team, Captains first
    async fn team_players(&self, team_id: TeamId) -> Result<Vec<TeamPlayer>, RegistryError>;

    /// Every membership of one user, joined with team name and game.
    ///
    /// The team's join code is fetched only when `include_join_code` is set.
    async fn user_memberships(
        &self,
        user_id: UserId,
        include_join_code: bool,
    ) -> Result<Vec<TeamMembership>, RegistryError>;

    /// Rows of the eligible-teams view for one game
    async fn eligible_registrations(
        &self,
        game_id: GameId,
    ) -> Result<Vec<EligibleRegistration>, RegistryError>;
}
