//! User entity and related types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a user identifier
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Invalid user ID '{0}'")]
pub struct InvalidUserId(pub String);

/// User identifier - a snowflake issued by the platform's user service
///
/// Serialized as a string: snowflakes overflow the integer range JSON
/// consumers can represent safely, so the textual form is the wire form
/// everywhere a user ID leaves this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse::<i64>().map(Self).map_err(|_| InvalidUserId(value))
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0.to_string()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User entity as exposed by the user directory
///
/// Read-only here: user provisioning belongs to the platform's account
/// service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// External Discord profile attached to a user
///
/// Fetched best-effort from the Discord API; listings that enrich with this
/// object tolerate its absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordProfile {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}
