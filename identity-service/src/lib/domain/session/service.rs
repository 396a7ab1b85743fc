use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::TokenPair;

use crate::domain::session::errors::AuthError;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::LoginOutcome;
use crate::domain::session::ports::AuthServicePort;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Login, refresh and logout over the user directory.
///
/// Stateless apart from the injected collaborators; the only shared mutable
/// state is each user's stored refresh-token hash.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// # Arguments
    /// * `repository` - User directory
    /// * `authenticator` - Hasher and token codec shared with the request guard
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    /// Hash a freshly issued refresh token and make it the user's only session.
    async fn rotate_session(&self, user_id: &UserId, refresh_token: &str) -> Result<(), AuthError> {
        let refresh_token_hash = self
            .authenticator
            .hash_secret(refresh_token)
            .map_err(|e| AuthError::Internal(format!("Refresh token hashing failed: {}", e)))?;

        self.repository
            .set_refresh_token_hash(user_id, Some(refresh_token_hash))
            .await?;

        Ok(())
    }

    fn reject_login(&self, password: &str, reason: &'static str) -> AuthError {
        self.authenticator.verify_against_decoy(password);
        tracing::warn!(reason, "Login rejected");
        AuthError::InvalidCredentials
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AuthError> {
        let email = match EmailAddress::new(&command.email) {
            Ok(email) => email,
            Err(_) => return Err(self.reject_login(&command.password, "malformed_email")),
        };

        let user = match self.repository.find_by_email(&email).await? {
            Some(user) => user,
            None => return Err(self.reject_login(&command.password, "unknown_email")),
        };

        let tokens = self
            .authenticator
            .authenticate(&command.password, &user.password_hash, &user.token_subject())
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::warn!(user_id = %user.id, reason = "wrong_password", "Login rejected");
                    AuthError::InvalidCredentials
                }
                AuthenticationError::PasswordError(err) => {
                    AuthError::Internal(format!("Password verification failed: {}", err))
                }
                AuthenticationError::JwtError(err) => {
                    AuthError::Internal(format!("Token generation failed: {}", err))
                }
            })?;

        self.rotate_session(&user.id, &tokens.refresh_token).await?;
        tracing::info!(user_id = %user.id, "Login succeeded");

        Ok(LoginOutcome { user, tokens })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        if refresh_token.trim().is_empty() {
            tracing::warn!(reason = "missing_token", "Refresh rejected");
            return Err(AuthError::InvalidToken("missing refresh token".to_string()));
        }

        let claims = self
            .authenticator
            .verify_refresh_token(refresh_token)
            .map_err(|e| {
                tracing::warn!(reason = %e, "Refresh rejected");
                AuthError::InvalidToken(e.to_string())
            })?;

        let user_id = UserId::from_string(&claims.sub).map_err(|e| {
            tracing::warn!(reason = %e, "Refresh rejected");
            AuthError::InvalidToken(e.to_string())
        })?;

        let user = self.repository.find_by_id(&user_id).await?.ok_or_else(|| {
            tracing::warn!(user_id = %user_id, reason = "unknown_user", "Refresh rejected");
            AuthError::UserNotFound(user_id.to_string())
        })?;

        let stored_hash = user.refresh_token_hash.as_deref().ok_or_else(|| {
            tracing::warn!(user_id = %user.id, reason = "no_session", "Refresh rejected");
            AuthError::SessionNotFound(user.id.to_string())
        })?;

        let is_current = self
            .authenticator
            .verify_secret(refresh_token, stored_hash)
            .map_err(|e| AuthError::Internal(format!("Refresh token verification failed: {}", e)))?;

        if !is_current {
            // Superseded by a later login or refresh.
            tracing::warn!(user_id = %user.id, reason = "superseded", "Refresh rejected");
            return Err(AuthError::SessionNotFound(user.id.to_string()));
        }

        let tokens = self
            .authenticator
            .issue_tokens(&user.token_subject())
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        self.rotate_session(&user.id, &tokens.refresh_token).await?;
        tracing::info!(user_id = %user.id, "Session refreshed");

        Ok(tokens)
    }

    async fn logout(&self, user_id: &UserId) -> Result<(), AuthError> {
        self.repository.set_refresh_token_hash(user_id, None).await?;
        tracing::info!(user_id = %user_id, "Logged out");

        Ok(())
    }
}
