//! In-memory registry store
//!
//! One store implementing the team repository, the registration ledger,
//! and the game directory over shared state, the same way the Postgres
//! implementations share one database. Useful for testing and development;
//! data is lost when the process terminates.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::game::{Game, GameDirectory, GameId};
use crate::domain::registration::{
    EligibleRegistration, NewRegistration, Registration, RegistrationLedger, Role, TeamMembership,
    TeamPlayer,
};
use crate::domain::team::{Team, TeamId, TeamRepository};
use crate::domain::user::UserId;
use crate::domain::RegistryError;

#[derive(Debug, Default)]
struct RegistryState {
    games: HashMap<GameId, Game>,
    teams: HashMap<TeamId, Team>,
    registrations: HashMap<(UserId, TeamId), Registration>,
}

/// Thread-safe in-memory registry store
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryRegistry {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a game (normally the platform's job, not the registry's)
    pub async fn insert_game(&self, game: Game) {
        self.state.write().await.games.insert(game.id(), game);
    }
}

/// Enroll against locked state, undoing the insert on a capacity violation.
///
/// Mirrors the transactional insert-recount-rollback unit of the Postgres
/// ledger; the caller holds the write lock for the whole unit.
fn enroll_locked(
    state: &mut RegistryState,
    registration: &NewRegistration,
    limit: u32,
) -> Result<Registration, RegistryError> {
    let key = (registration.user_id, registration.team_id);

    if state.registrations.contains_key(&key) {
        return Err(RegistryError::duplicate_registration(format!(
            "User '{}' is already registered on team '{}'",
            registration.user_id, registration.team_id
        )));
    }

    if !state.teams.contains_key(&registration.team_id) {
        return Err(RegistryError::storage(format!(
            "Team '{}' does not exist",
            registration.team_id
        )));
    }

    let enrolled = Registration::new(
        registration.user_id,
        registration.team_id,
        registration.nick.clone(),
        registration.role,
        registration.rank,
        registration.max_rank,
        Utc::now(),
    );
    state.registrations.insert(key, enrolled.clone());

    let count = state
        .registrations
        .values()
        .filter(|r| r.team_id() == registration.team_id && r.role() == registration.role)
        .count();

    if count > limit as usize {
        state.registrations.remove(&key);
        return Err(RegistryError::capacity_exceeded(format!(
            "Role '{}' on team '{}' is limited to {} member(s)",
            registration.role, registration.team_id, limit
        )));
    }

    Ok(enrolled)
}

fn roster_complete(state: &RegistryState, team: &Team, game: &Game) -> bool {
    Role::ALL.iter().all(|&role| {
        let filled = state
            .registrations
            .values()
            .filter(|r| r.team_id() == team.id() && r.role() == role)
            .count();

        filled >= game.capacity_for(role) as usize
    })
}

fn can_play_since(state: &RegistryState, team_id: TeamId) -> Option<DateTime<Utc>> {
    state
        .registrations
        .values()
        .filter(|r| r.team_id() == team_id)
        .map(|r| r.joined_at())
        .max()
}

#[async_trait]
impl TeamRepository for InMemoryRegistry {
    async fn create(
        &self,
        team: Team,
        captain: NewRegistration,
        captain_limit: u32,
    ) -> Result<Team, RegistryError> {
        let mut state = self.state.write().await;

        if state.teams.values().any(|t| t.name() == team.name()) {
            return Err(RegistryError::conflict(format!(
                "Team '{}' already exists",
                team.name()
            )));
        }

        let team_id = team.id();
        state.teams.insert(team_id, team.clone());

        // Undo the team row if enrollment fails; a team never exists
        // without its founding Captain.
        if let Err(e) = enroll_locked(&mut state, &captain, captain_limit) {
            state.teams.remove(&team_id);
            return Err(e);
        }

        Ok(team)
    }

    async fn get(&self, id: TeamId) -> Result<Option<Team>, RegistryError> {
        let state = self.state.read().await;
        Ok(state.teams.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Team>, RegistryError> {
        let state = self.state.read().await;
        Ok(state.teams.values().find(|t| t.name() == name).cloned())
    }

    async fn set_join_code(&self, id: TeamId, join_code: &str) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;

        let team = state
            .teams
            .get(&id)
            .ok_or_else(|| RegistryError::not_found(format!("Team '{}' not found", id)))?;

        let updated = Team::from_parts(
            team.id(),
            team.name(),
            team.game_id(),
            Some(join_code.to_string()),
        );
        state.teams.insert(id, updated);

        Ok(())
    }
}

#[async_trait]
impl GameDirectory for InMemoryRegistry {
    async fn get(&self, id: GameId) -> Result<Option<Game>, RegistryError> {
        let state = self.state.read().await;
        Ok(state.games.get(&id).cloned())
    }
}

#[async_trait]
impl RegistrationLedger for InMemoryRegistry {
    async fn enroll(
        &self,
        registration: NewRegistration,
        limit: u32,
    ) -> Result<Registration, RegistryError> {
        let mut state = self.state.write().await;
        enroll_locked(&mut state, &registration, limit)
    }

    async fn remove(&self, team_id: TeamId, user_id: UserId) -> Result<(), RegistryError> {
        let mut state = self.state.write().await;

        if state.registrations.remove(&(user_id, team_id)).is_none() {
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
        let state = self.state.read().await;
        Ok(state
            .registrations
            .get(&(user_id, team_id))
            .map(|r| r.role()))
    }

    async fn team_players(&self, team_id: TeamId) -> Result<Vec<TeamPlayer>, RegistryError> {
        let state = self.state.read().await;

        let mut members: Vec<&Registration> = state
            .registrations
            .values()
            .filter(|r| r.team_id() == team_id)
            .collect();
        members.sort_by_key(|r| (r.role(), r.joined_at()));

        Ok(members
            .into_iter()
            .map(|r| TeamPlayer {
                user_id: r.user_id(),
                nick: r.nick().to_string(),
                role: r.role(),
            })
            .collect())
    }

    async fn user_memberships(
        &self,
        user_id: UserId,
        include_join_code: bool,
    ) -> Result<Vec<TeamMembership>, RegistryError> {
        let state = self.state.read().await;

        let mut memberships: Vec<TeamMembership> = state
            .registrations
            .values()
            .filter(|r| r.user_id() == user_id)
            .filter_map(|r| {
                state.teams.get(&r.team_id()).map(|team| TeamMembership {
                    team_id: team.id(),
                    nick: r.nick().to_string(),
                    role: r.role(),
                    team_name: team.name().to_string(),
                    game_id: team.game_id(),
                    join_code: if include_join_code {
                        team.join_code().map(String::from)
                    } else {
                        None
                    },
                })
            })
            .collect();
        memberships.sort_by(|a, b| a.team_name.cmp(&b.team_name));

        Ok(memberships)
    }

    async fn eligible_registrations(
        &self,
        game_id: GameId,
    ) -> Result<Vec<EligibleRegistration>, RegistryError> {
        let state = self.state.read().await;

        let Some(game) = state.games.get(&game_id) else {
            // Mirrors the view joining an absent game row: no rows.
            return Ok(Vec::new());
        };

        let mut rows: Vec<EligibleRegistration> = Vec::new();

        for team in state.teams.values().filter(|t| t.game_id() == game_id) {
            if !roster_complete(&state, team, game) {
                continue;
            }

            let since = can_play_since(&state, team.id());

            for r in state
                .registrations
                .values()
                .filter(|r| r.team_id() == team.id())
            {
                rows.push(EligibleRegistration {
                    team_id: team.id(),
                    team_name: team.name().to_string(),
                    user_id: r.user_id(),
                    nick: r.nick().to_string(),
                    role: r.role(),
                    rank: r.rank(),
                    max_rank: r.max_rank(),
                    can_play_since: since,
                });
            }
        }

        rows.sort_by(|a, b| (&a.team_name, a.role).cmp(&(&b.team_name, b.role)));

        Ok(rows)
    }
}
