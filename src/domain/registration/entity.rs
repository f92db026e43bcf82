//! Registration entity, roles, and query row types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::game::GameId;
use crate::domain::team::TeamId;
use crate::domain::user::{DiscordProfile, UserId};

/// Error returned when parsing a role from its stored form
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Unknown role '{0}'")]
pub struct UnknownRole(pub String);

/// Role of a user on a team roster
///
/// The set of roles is closed, but how many of each a team may hold comes
/// from the game's configuration. The derived ordering (Captain before
/// Player) is the roster sort order; it coincides with the alphabetical
/// ordering of the stored text, so `ORDER BY role ASC` agrees with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Team captain - the founding member's role
    Captain,
    /// Regular roster member
    Player,
}

impl Role {
    /// Every role, in roster order
    pub const ALL: [Role; 2] = [Role::Captain, Role::Player];

    /// Stored/displayed form of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Captain => "Captain",
            Self::Player => "Player",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Captain" => Ok(Self::Captain),
            "Player" => Ok(Self::Player),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// One user's active membership on one team
///
/// At most one registration exists per (user, team) pair; the store enforces
/// this with its primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    user_id: UserId,
    team_id: TeamId,
    nick: String,
    role: Role,
    rank: i32,
    max_rank: i32,
    joined_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(
        user_id: UserId,
        team_id: TeamId,
        nick: impl Into<String>,
        role: Role,
        rank: i32,
        max_rank: i32,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            team_id,
            nick: nick.into(),
            role,
            rank,
            max_rank,
            joined_at,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn team_id(&self) -> TeamId {
        self.team_id
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn rank(&self) -> i32 {
        self.rank
    }

    pub fn max_rank(&self) -> i32 {
        self.max_rank
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}

/// Input for enrolling a user on a team
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub nick: String,
    pub role: Role,
    pub rank: i32,
    pub max_rank: i32,
}

/// One roster slot as returned by the players listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamPlayer {
    pub user_id: UserId,
    pub nick: String,
    pub role: Role,
}

/// One of a user's memberships joined with its team
///
/// The join code is a secret; it is only populated when the caller asked
/// for it explicitly, and absent fields stay out of the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMembership {
    pub team_id: TeamId,
    pub nick: String,
    pub role: Role,
    pub team_name: String,
    pub game_id: GameId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_code: Option<String>,
}

/// Raw eligibility row as produced by the ledger's derived view
#[derive(Debug, Clone)]
pub struct EligibleRegistration {
    pub team_id: TeamId,
    pub team_name: String,
    pub user_id: UserId,
    pub nick: String,
    pub role: Role,
    pub rank: i32,
    pub max_rank: i32,
    pub can_play_since: Option<DateTime<Utc>>,
}

/// One row of the participating-teams listing
///
/// Detail fields are present only when details were requested; the Discord
/// profile additionally requires the discord flag and survives lookup
/// failures as `None`. `can_play_since` is RFC 3339 text and stays absent
/// when the view had no timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleTeam {
    pub team_id: TeamId,
    pub name: String,
    pub nick: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_play_since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rank: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = "Coach".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("Coach".to_string()));
    }

    #[test]
    fn test_captain_sorts_before_player() {
        assert!(Role::Captain < Role::Player);

        let mut roles = vec![Role::Player, Role::Captain, Role::Player];
        roles.sort();
        assert_eq!(roles, vec![Role::Captain, Role::Player, Role::Player]);
    }

    #[test]
    fn test_role_order_matches_stored_text_order() {
        // The store sorts the text column; the enum ordering must agree.
        let mut by_text = Role::ALL;
        by_text.sort_by_key(|r| r.as_str());
        assert_eq!(by_text, Role::ALL);
    }

    #[test]
    fn test_membership_join_code_skipped_when_absent() {
        let membership = TeamMembership {
            team_id: TeamId::generate(),
            nick: "ace".to_string(),
            role: Role::Player,
            team_name: "Alpha".to_string(),
            game_id: GameId::generate(),
            join_code: None,
        };

        let json = serde_json::to_value(&membership).unwrap();
        assert!(json.get("join_code").is_none());
    }
}
