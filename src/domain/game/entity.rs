//! Game entity and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::registration::Role;

/// Game identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for GameId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game entity
///
/// Read-only from the registry's perspective: games are provisioned by the
/// platform, and the registry only consults their per-role roster limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    title: String,
    max_captains: u32,
    max_players: u32,
}

impl Game {
    pub fn new(id: GameId, title: impl Into<String>, max_captains: u32, max_players: u32) -> Self {
        Self {
            id,
            title: title.into(),
            max_captains,
            max_players,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn max_captains(&self) -> u32 {
        self.max_captains
    }

    pub fn max_players(&self) -> u32 {
        self.max_players
    }

    /// Roster limit for one role on a single team of this game
    pub fn capacity_for(&self, role: Role) -> u32 {
        match role {
            Role::Captain => self.max_captains,
            Role::Player => self.max_players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_per_role() {
        let game = Game::new(GameId::generate(), "Rocket Rumble", 1, 4);

        assert_eq!(game.capacity_for(Role::Captain), 1);
        assert_eq!(game.capacity_for(Role::Player), 4);
    }

    #[test]
    fn test_game_id_display_round_trip() {
        let raw = Uuid::new_v4();
        let id = GameId::from(raw);

        assert_eq!(id.to_string(), raw.to_string());
        assert_eq!(id.as_uuid(), raw);
    }
}
