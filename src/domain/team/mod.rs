//! Team domain module
//!
//! Teams own their identity (name, game, join code); membership lives in
//! the registration ledger. Creating a team always enrolls the creator as
//! its Captain in the same unit of work.

mod entity;
mod repository;
mod validation;

pub use entity::{Team, TeamId};
pub use repository::TeamRepository;
pub use validation::{validate_team_name, TeamValidationError};
