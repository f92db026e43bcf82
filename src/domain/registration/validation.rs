//! Registration validation

use thiserror::Error;

/// Errors that can occur during registration validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistrationValidationError {
    #[error("Nick cannot be empty")]
    EmptyNick,

    #[error("Nick cannot exceed {0} characters")]
    NickTooLong(usize),

    #[error("Rank cannot be negative")]
    NegativeRank,

    #[error("Rank ceiling cannot be below the current rank")]
    RankAboveCeiling,
}

const MAX_NICK_LENGTH: usize = 32;

/// Validate a display nick
pub fn validate_nick(nick: &str) -> Result<(), RegistrationValidationError> {
    if nick.trim().is_empty() {
        return Err(RegistrationValidationError::EmptyNick);
    }

    if nick.chars().count() > MAX_NICK_LENGTH {
        return Err(RegistrationValidationError::NickTooLong(MAX_NICK_LENGTH));
    }

    Ok(())
}

/// Validate a rank against its ceiling
pub fn validate_rank_window(rank: i32, max_rank: i32) -> Result<(), RegistrationValidationError> {
    if rank < 0 || max_rank < 0 {
        return Err(RegistrationValidationError::NegativeRank);
    }

    if max_rank < rank {
        return Err(RegistrationValidationError::RankAboveCeiling);
    }

    Ok(())
}
