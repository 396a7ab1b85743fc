use std::fmt;

use auth::TokenPair;

use crate::domain::user::models::User;

/// Raw login credentials as received from a client.
#[derive(Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login: the authenticated user and a fresh token pair.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}
