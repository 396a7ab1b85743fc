use thiserror::Error;

use crate::user::errors::UserError;

/// Failures of login, refresh and logout.
///
/// Every variant except `Internal` is reported to clients as the same
/// unauthorized response; the variants exist for logs and tests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired or wrongly signed token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token verifies but is not the user's current session (logged out or rotated away)
    #[error("Session not found for user {0}")]
    SessionNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Persistence, hashing or signing failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Internal(_))
    }
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AuthError::UserNotFound(id),
            other => AuthError::Internal(other.to_string()),
        }
    }
}
