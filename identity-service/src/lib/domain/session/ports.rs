use async_trait::async_trait;
use auth::TokenPair;

use crate::domain::session::errors::AuthError;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::LoginOutcome;
use crate::domain::user::models::UserId;

/// Port for the credential lifecycle: login, refresh-token rotation, logout.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify credentials and open a session.
    ///
    /// The email is normalized before lookup. On success a fresh token pair is
    /// issued and the refresh token's hash replaces any previous session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `Internal` - Persistence, hashing or signing failure
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AuthError>;

    /// Exchange the current refresh token for a new pair, rotating the session.
    ///
    /// The presented token is unusable afterwards.
    ///
    /// # Errors
    /// * `InvalidToken` - Empty, malformed, expired or wrongly signed token
    /// * `UserNotFound` - Token subject no longer exists
    /// * `SessionNotFound` - Token is not the user's current session
    /// * `Internal` - Persistence, hashing or signing failure
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Close the user's session. Idempotent.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `Internal` - Persistence failure
    async fn logout(&self, user_id: &UserId) -> Result<(), AuthError>;
}
