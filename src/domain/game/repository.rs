//! Game directory trait

use async_trait::async_trait;

use super::entity::{Game, GameId};
use crate::domain::RegistryError;

/// Read-only directory of games and their roster limits
#[async_trait]
pub trait GameDirectory: Send + Sync + std::fmt::Debug {
    /// Get a game by ID
    async fn get(&self, id: GameId) -> Result<Option<Game>, RegistryError>;
}
