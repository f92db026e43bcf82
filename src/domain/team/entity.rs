//! Team entity and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_team_name, TeamValidationError};
use crate::domain::game::GameId;

/// Team identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(Uuid);

impl TeamId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TeamId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team entity
///
/// A named group of users registered to compete in one game. The owning
/// game is fixed at creation; the join code is a regenerable secret gating
/// invitation-based joins, absent until first generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: String,
    game_id: GameId,
    #[serde(skip_serializing_if = "Option::is_none")]
    join_code: Option<String>,
}

impl Team {
    /// Create a new team with a fresh identifier and no join code
    pub fn new(name: impl Into<String>, game_id: GameId) -> Result<Self, TeamValidationError> {
        let name = name.into();
        validate_team_name(&name)?;

        Ok(Self {
            id: TeamId::generate(),
            name,
            game_id,
            join_code: None,
        })
    }

    /// Reassemble a team from its stored parts
    pub fn from_parts(
        id: TeamId,
        name: impl Into<String>,
        game_id: GameId,
        join_code: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            game_id,
            join_code,
        }
    }

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn join_code(&self) -> Option<&str> {
        self.join_code.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_creation() {
        let game_id = GameId::generate();
        let team = Team::new("Alpha Squad", game_id).unwrap();

        assert_eq!(team.name(), "Alpha Squad");
        assert_eq!(team.game_id(), game_id);
        assert!(team.join_code().is_none());
    }

    #[test]
    fn test_team_invalid_name() {
        assert!(Team::new("", GameId::generate()).is_err());
    }

    #[test]
    fn test_fresh_ids_differ() {
        let game_id = GameId::generate();
        let a = Team::new("Alpha", game_id).unwrap();
        let b = Team::new("Bravo", game_id).unwrap();

        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_from_parts_keeps_join_code() {
        let team = Team::from_parts(
            TeamId::generate(),
            "Alpha",
            GameId::generate(),
            Some("secret".to_string()),
        );

        assert_eq!(team.join_code(), Some("secret"));
    }
}
