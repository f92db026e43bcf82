//! Team registry service - orchestrates membership changes

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::game::{Game, GameDirectory, GameId};
use crate::domain::registration::{
    validate_nick, validate_rank_window, EligibleTeam, NewRegistration, Registration,
    RegistrationLedger, Role, TeamMembership, TeamPlayer,
};
use crate::domain::team::{validate_team_name, Team, TeamId, TeamRepository};
use crate::domain::user::{UserDirectory, UserId};
use crate::domain::RegistryError;
use crate::infrastructure::join_code::JoinCodeGenerator;

/// Request for creating a new team
///
/// The creating user becomes the team's first member, in the Captain role.
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
    pub game_id: GameId,
    pub user_id: UserId,
    pub nick: String,
    pub rank: i32,
    pub max_rank: i32,
}

/// Request for joining an existing team
#[derive(Debug, Clone)]
pub struct JoinTeamRequest {
    pub user_id: UserId,
    pub nick: String,
    pub rank: i32,
    pub max_rank: i32,
    pub role: Role,
}

/// Team registry - the orchestration surface of the crate
///
/// Validates input, resolves capacity limits from the game directory, and
/// drives the team repository and registration ledger. Holds no mutable
/// state of its own; cross-request coordination is the backing store's job.
#[derive(Debug)]
pub struct TeamRegistry<T, L, G, U>
where
    T: TeamRepository,
    L: RegistrationLedger,
    G: GameDirectory,
    U: UserDirectory,
{
    teams: Arc<T>,
    ledger: Arc<L>,
    games: Arc<G>,
    users: Arc<U>,
    join_codes: JoinCodeGenerator,
}

impl<T, L, G, U> TeamRegistry<T, L, G, U>
where
    T: TeamRepository,
    L: RegistrationLedger,
    G: GameDirectory,
    U: UserDirectory,
{
    /// Create a new registry service
    pub fn new(teams: Arc<T>, ledger: Arc<L>, games: Arc<G>, users: Arc<U>) -> Self {
        Self {
            teams,
            ledger,
            games,
            users,
            join_codes: JoinCodeGenerator::new(),
        }
    }

    async fn game(&self, id: GameId) -> Result<Game, RegistryError> {
        self.games
            .get(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("Game '{}' not found", id)))
    }

    /// Create a team and enroll the creator as its Captain.
    ///
    /// Both writes happen in one unit of work: a duplicate name or a failed
    /// enrollment leaves no team behind.
    pub async fn create_team(&self, request: CreateTeamRequest) -> Result<Team, RegistryError> {
        info!(name = %request.name, game_id = %request.game_id, "Creating team");

        validate_team_name(&request.name)
            .map_err(|e| RegistryError::validation(e.to_string()))?;
        validate_nick(&request.nick).map_err(|e| RegistryError::validation(e.to_string()))?;
        validate_rank_window(request.rank, request.max_rank)
            .map_err(|e| RegistryError::validation(e.to_string()))?;

        let game = self.game(request.game_id).await?;

        let team =
            Team::new(&request.name, game.id()).map_err(|e| RegistryError::validation(e.to_string()))?;

        let captain = NewRegistration {
            user_id: request.user_id,
            team_id: team.id(),
            nick: request.nick,
            role: Role::Captain,
            rank: request.rank,
            max_rank: request.max_rank,
        };

        self.teams
            .create(team, captain, game.capacity_for(Role::Captain))
            .await
    }

    /// Get a team by ID
    pub async fn team_by_id(&self, id: TeamId) -> Result<Option<Team>, RegistryError> {
        self.teams.get(id).await
    }

    /// Get a team by its unique name
    pub async fn team_by_name(&self, name: &str) -> Result<Option<Team>, RegistryError> {
        self.teams.get_by_name(name).await
    }

    /// Every team the user is registered on.
    ///
    /// Join codes are secrets: they appear only when `include_join_code`
    /// is set.
    pub async fn users_teams(
        &self,
        user_id: UserId,
        include_join_code: bool,
    ) -> Result<Vec<TeamMembership>, RegistryError> {
        self.ledger.user_memberships(user_id, include_join_code).await
    }

    /// Join a team in the requested role.
    ///
    /// The role's headcount is capped by the team's game; the ledger
    /// enforces the cap atomically against concurrent joins.
    pub async fn join(
        &self,
        team_id: TeamId,
        request: JoinTeamRequest,
    ) -> Result<Registration, RegistryError> {
        info!(team_id = %team_id, user_id = %request.user_id, role = %request.role, "Joining team");

        validate_nick(&request.nick).map_err(|e| RegistryError::validation(e.to_string()))?;
        validate_rank_window(request.rank, request.max_rank)
            .map_err(|e| RegistryError::validation(e.to_string()))?;

        let team = self
            .teams
            .get(team_id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("Team '{}' not found", team_id)))?;

        let game = self.game(team.game_id()).await?;

        let registration = NewRegistration {
            user_id: request.user_id,
            team_id,
            nick: request.nick,
            role: request.role,
            rank: request.rank,
            max_rank: request.max_rank,
        };

        self.ledger
            .enroll(registration, game.capacity_for(request.role))
            .await
    }

    /// Leave a team.
    ///
    /// Leaving without an active registration reports `NotRegistered`;
    /// repeated leaves are observable failures, not silent no-ops.
    pub async fn leave(&self, team_id: TeamId, user_id: UserId) -> Result<(), RegistryError> {
        info!(team_id = %team_id, user_id = %user_id, "Leaving team");
        self.ledger.remove(team_id, user_id).await
    }

    /// Current roster of a team, Captains before Players
    pub async fn players(&self, team_id: TeamId) -> Result<Vec<TeamPlayer>, RegistryError> {
        self.ledger.team_players(team_id).await
    }

    /// Teams eligible to play a game, one row per rostered user.
    ///
    /// With `with_details`, rows carry the user identifier (as text) and
    /// rank window; with `with_discord` on top, each row is enriched with
    /// the user's external profile. A failed profile lookup never aborts
    /// the listing - that row's profile is simply absent.
    pub async fn participating_teams(
        &self,
        game_id: GameId,
        with_details: bool,
        with_discord: bool,
    ) -> Result<Vec<EligibleTeam>, RegistryError> {
        let game = self.game(game_id).await?;

        let registrations = self.ledger.eligible_registrations(game.id()).await?;
        let mut rows = Vec::with_capacity(registrations.len());

        for r in registrations {
            let discord = if with_details && with_discord {
                match self.users.discord_profile(r.user_id).await {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        warn!(user_id = %r.user_id, error = %e, "Discord profile unavailable");
                        None
                    }
                }
            } else {
                None
            };

            rows.push(EligibleTeam {
                team_id: r.team_id,
                name: r.team_name,
                nick: r.nick,
                role: r.role,
                can_play_since: r.can_play_since.map(|t| t.to_rfc3339()),
                user_id: with_details.then_some(r.user_id),
                rank: with_details.then_some(r.rank),
                max_rank: with_details.then_some(r.max_rank),
                discord,
            });
        }

        Ok(rows)
    }

    /// Generate and persist a fresh join code, invalidating the old one.
    ///
    /// On persistence failure the stored code is unchanged and the error is
    /// surfaced; the new code is only returned once it is durable.
    pub async fn generate_join_code(&self, team_id: TeamId) -> Result<String, RegistryError> {
        debug!(team_id = %team_id, "Rotating join code");

        let code = self.join_codes.generate();
        self.teams.set_join_code(team_id, &code).await?;

        Ok(code)
    }

    /// Role the user holds on the team
    pub async fn users_role(&self, team_id: TeamId, user_id: UserId) -> Result<Role, RegistryError> {
        self.ledger.role_of(team_id, user_id).await?.ok_or_else(|| {
            RegistryError::not_registered(format!(
                "User '{}' has no registration on team '{}'",
                user_id, team_id
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{DiscordProfile, User};
    use crate::infrastructure::join_code::JOIN_CODE_LENGTH;
    use crate::infrastructure::storage::InMemoryRegistry;
    use crate::infrastructure::user::InMemoryUserDirectory;

    type TestRegistry =
        TeamRegistry<InMemoryRegistry, InMemoryRegistry, InMemoryRegistry, InMemoryUserDirectory>;

    struct Fixture {
        registry: TestRegistry,
        users: Arc<InMemoryUserDirectory>,
        game_id: GameId,
    }

    /// Service over one in-memory store, with a 1-Captain/2-Player game
    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryRegistry::new());
        let users = Arc::new(InMemoryUserDirectory::new());

        let game = Game::new(GameId::generate(), "Rocket Rumble", 1, 2);
        let game_id = game.id();
        store.insert_game(game).await;

        let registry =
            TeamRegistry::new(store.clone(), store.clone(), store, users.clone());

        Fixture {
            registry,
            users,
            game_id,
        }
    }

    fn create_request(game_id: GameId, user: i64, name: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            name: name.to_string(),
            game_id,
            user_id: UserId::new(user),
            nick: format!("nick-{}", user),
            rank: 5,
            max_rank: 9,
        }
    }

    fn join_request(user: i64, role: Role) -> JoinTeamRequest {
        JoinTeamRequest {
            user_id: UserId::new(user),
            nick: format!("nick-{}", user),
            rank: 5,
            max_rank: 9,
            role,
        }
    }

    #[tokio::test]
    async fn test_create_team_enrolls_captain() {
        let f = fixture().await;

        let team = f
            .registry
            .create_team(create_request(f.game_id, 1, "Alpha"))
            .await
            .unwrap();

        assert_eq!(team.name(), "Alpha");
        assert!(team.join_code().is_none());

        let players = f.registry.players(team.id()).await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].role, Role::Captain);

        let role = f.registry.users_role(team.id(), UserId::new(1)).await.unwrap();
        assert_eq!(role, Role::Captain);
    }

    #[tokio::test]
    async fn test_create_team_unknown_game() {
        let f = fixture().await;

        let err = f
            .registry
            .create_team(create_request(GameId::generate(), 1, "Alpha"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_team_duplicate_name_is_atomic() {
        let f = fixture().await;

        f.registry
            .create_team(create_request(f.game_id, 1, "Alpha"))
            .await
            .unwrap();

        let err = f
            .registry
            .create_team(create_request(f.game_id, 2, "Alpha"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { .. }));

        // Exactly one team named Alpha, with exactly its founding Captain.
        let team = f.registry.team_by_name("Alpha").await.unwrap().unwrap();
        let players = f.registry.players(team.id()).await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].user_id, UserId::new(1));

        // The loser's membership listing stayed empty.
        let memberships = f.registry.users_teams(UserId::new(2), false).await.unwrap();
        assert!(memberships.is_empty());
    }

    #[tokio::test]
    async fn test_create_team_invalid_input() {
        let f = fixture().await;

        let mut request = create_request(f.game_id, 1, "");
        let err = f.registry.create_team(request.clone()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation { .. }));

        request.name = "Alpha".to_string();
        request.rank = 9;
        request.max_rank = 5;
        let err = f.registry.create_team(request).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_join_rejects_duplicate() {
        let f = fixture().await;

        let team = f
            .registry
            .create_team(create_request(f.game_id, 1, "Alpha"))
            .await
            .unwrap();

        let err = f
            .registry
            .join(team.id(), join_request(1, Role::Player))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration { .. }));

        // Prior registration untouched.
        let role = f.registry.users_role(team.id(), UserId::new(1)).await.unwrap();
        assert_eq!(role, Role::Captain);
    }

    #[tokio::test]
    async fn test_join_enforces_capacity() {
        let f = fixture().await;

        let team = f
            .registry
            .create_team(create_request(f.game_id, 1, "Alpha"))
            .await
            .unwrap();

        f.registry
            .join(team.id(), join_request(2, Role::Player))
            .await
            .unwrap();
        f.registry
            .join(team.id(), join_request(3, Role::Player))
            .await
            .unwrap();

        // maxPlayers is 2 for this game.
        let err = f
            .registry
            .join(team.id(), join_request(4, Role::Player))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::CapacityExceeded { .. }));

        let players = f.registry.players(team.id()).await.unwrap();
        assert_eq!(players.len(), 3);
    }

    #[tokio::test]
    async fn test_join_unknown_team() {
        let f = fixture().await;

        let err = f
            .registry
            .join(TeamId::generate(), join_request(1, Role::Player))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_leave_then_leave_again() {
        let f = fixture().await;

        let team = f
            .registry
            .create_team(create_request(f.game_id, 1, "Alpha"))
            .await
            .unwrap();
        f.registry
            .join(team.id(), join_request(2, Role::Player))
            .await
            .unwrap();

        f.registry.leave(team.id(), UserId::new(2)).await.unwrap();

        let err = f
            .registry
            .leave(team.id(), UserId::new(2))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotRegistered { .. }));

        let err = f
            .registry
            .users_role(team.id(), UserId::new(2))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotRegistered { .. }));
    }

    #[tokio::test]
    async fn test_players_ordered_captain_first() {
        let f = fixture().await;

        let team = f
            .registry
            .create_team(create_request(f.game_id, 1, "Alpha"))
            .await
            .unwrap();
        f.registry
            .join(team.id(), join_request(2, Role::Player))
            .await
            .unwrap();
        f.registry
            .join(team.id(), join_request(3, Role::Player))
            .await
            .unwrap();

        let players = f.registry.players(team.id()).await.unwrap();
        let roles: Vec<Role> = players.iter().map(|p| p.role).collect();
        assert_eq!(roles, vec![Role::Captain, Role::Player, Role::Player]);
    }

    #[tokio::test]
    async fn test_join_code_rotation() {
        let f = fixture().await;

        let team = f
            .registry
            .create_team(create_request(f.game_id, 1, "Alpha"))
            .await
            .unwrap();

        let first = f.registry.generate_join_code(team.id()).await.unwrap();
        let second = f.registry.generate_join_code(team.id()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), JOIN_CODE_LENGTH);
        assert_eq!(second.len(), JOIN_CODE_LENGTH);

        // Only the latest code is stored.
        let stored = f.registry.team_by_id(team.id()).await.unwrap().unwrap();
        assert_eq!(stored.join_code(), Some(second.as_str()));
    }

    #[tokio::test]
    async fn test_join_code_unknown_team() {
        let f = fixture().await;

        let err = f
            .registry
            .generate_join_code(TeamId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_users_teams_hides_join_code_by_default() {
        let f = fixture().await;

        let team = f
            .registry
            .create_team(create_request(f.game_id, 1, "Alpha"))
            .await
            .unwrap();
        let code = f.registry.generate_join_code(team.id()).await.unwrap();

        let hidden = f.registry.users_teams(UserId::new(1), false).await.unwrap();
        assert_eq!(hidden.len(), 1);
        assert!(hidden[0].join_code.is_none());
        assert_eq!(hidden[0].team_name, "Alpha");
        assert_eq!(hidden[0].game_id, f.game_id);

        let shown = f.registry.users_teams(UserId::new(1), true).await.unwrap();
        assert_eq!(shown[0].join_code.as_deref(), Some(code.as_str()));
    }

    #[tokio::test]
    async fn test_participating_teams_unknown_game() {
        let f = fixture().await;

        let err = f
            .registry
            .participating_teams(GameId::generate(), false, false)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    /// Fill Alpha's roster (1 Captain + 2 Players) so it becomes eligible
    async fn eligible_team(f: &Fixture) -> Team {
        let team = f
            .registry
            .create_team(create_request(f.game_id, 1, "Alpha"))
            .await
            .unwrap();
        f.registry
            .join(team.id(), join_request(2, Role::Player))
            .await
            .unwrap();
        f.registry
            .join(team.id(), join_request(3, Role::Player))
            .await
            .unwrap();
        team
    }

    #[tokio::test]
    async fn test_participating_teams_narrow_rows() {
        let f = fixture().await;
        eligible_team(&f).await;

        let rows = f
            .registry
            .participating_teams(f.game_id, false, false)
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert!(row.user_id.is_none());
            assert!(row.rank.is_none());
            assert!(row.discord.is_none());
            assert!(row.can_play_since.is_some());
        }
    }

    #[tokio::test]
    async fn test_participating_teams_details() {
        let f = fixture().await;
        eligible_team(&f).await;

        let rows = f
            .registry
            .participating_teams(f.game_id, true, false)
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert!(row.user_id.is_some());
            assert_eq!(row.rank, Some(5));
            assert_eq!(row.max_rank, Some(9));
            // Discord was not requested.
            assert!(row.discord.is_none());
        }

        // Detail rows carry the user identifier in textual form.
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert!(json["user_id"].is_string());
    }

    #[tokio::test]
    async fn test_participating_teams_partial_discord_enrichment() {
        let f = fixture().await;
        eligible_team(&f).await;

        // Users 1 and 2 have profiles; user 3's lookup will fail.
        for user in [1i64, 2] {
            let id = UserId::new(user);
            f.users.insert_user(User::new(id, format!("user-{}", user))).await;
            f.users
                .insert_profile(
                    id,
                    DiscordProfile {
                        id: user.to_string(),
                        username: format!("user-{}", user),
                        global_name: None,
                        avatar: None,
                    },
                )
                .await;
        }

        let rows = f
            .registry
            .participating_teams(f.game_id, true, true)
            .await
            .unwrap();

        // The failing lookup cost nothing but its own profile field.
        assert_eq!(rows.len(), 3);
        let with_profile = rows.iter().filter(|r| r.discord.is_some()).count();
        assert_eq!(with_profile, 2);

        let missing = rows
            .iter()
            .find(|r| r.user_id == Some(UserId::new(3)))
            .unwrap();
        assert!(missing.discord.is_none());
    }

    #[tokio::test]
    async fn test_capacity_invariant_survives_churn() {
        let f = fixture().await;
        let team = eligible_team(&f).await;

        // Full: reject.
        let err = f
            .registry
            .join(team.id(), join_request(4, Role::Player))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::CapacityExceeded { .. }));

        // One leaves, the slot opens again.
        f.registry.leave(team.id(), UserId::new(2)).await.unwrap();
        f.registry
            .join(team.id(), join_request(4, Role::Player))
            .await
            .unwrap();

        let players = f.registry.players(team.id()).await.unwrap();
        let player_count = players.iter().filter(|p| p.role == Role::Player).count();
        assert_eq!(player_count, 2);
    }
}
