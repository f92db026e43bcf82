use thiserror::Error;

/// Core registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Duplicate registration: {message}")]
    DuplicateRegistration { message: String },

    #[error("Capacity exceeded: {message}")]
    CapacityExceeded { message: String },

    #[error("Not registered: {message}")]
    NotRegistered { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl RegistryError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn duplicate_registration(message: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            message: message.into(),
        }
    }

    pub fn capacity_exceeded(message: impl Into<String>) -> Self {
        Self::CapacityExceeded {
            message: message.into(),
        }
    }

    pub fn not_registered(message: impl Into<String>) -> Self {
        Self::NotRegistered {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether retrying the same call unchanged can succeed.
    ///
    /// Only transport-level store failures qualify; logical rejections
    /// (duplicate registration, full role, unknown team) never do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = RegistryError::not_found("Team 'abc' not found");
        assert_eq!(error.to_string(), "Not found: Team 'abc' not found");
    }

    #[test]
    fn test_capacity_exceeded_error() {
        let error = RegistryError::capacity_exceeded("Role 'Player' is full");
        assert_eq!(
            error.to_string(),
            "Capacity exceeded: Role 'Player' is full"
        );
    }

    #[test]
    fn test_retryable_split() {
        assert!(RegistryError::storage("connection reset").is_retryable());
        assert!(!RegistryError::duplicate_registration("already joined").is_retryable());
        assert!(!RegistryError::capacity_exceeded("full").is_retryable());
        assert!(!RegistryError::not_registered("no row").is_retryable());
        assert!(!RegistryError::not_found("missing").is_retryable());
    }
}
