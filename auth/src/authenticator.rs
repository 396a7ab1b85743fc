use std::sync::OnceLock;

use crate::jwt::JwtError;
use crate::jwt::TokenClaims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenKind;
use crate::jwt::TokenPair;
use crate::jwt::TokenSubject;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining secret hashing and token handling.
///
/// Shared between the login/refresh flow and the request guard.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    decoy_hash: OnceLock<Option<String>>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Hasher for passwords and refresh tokens
    /// * `token_codec` - Access/refresh token signer
    pub fn new(password_hasher: PasswordHasher, token_codec: TokenCodec) -> Self {
        Self {
            password_hasher,
            token_codec,
            decoy_hash: OnceLock::new(),
        }
    }

    /// Hash a password or refresh token for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_secret(&self, plaintext: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(plaintext)
    }

    /// Compare a plaintext secret with a stored digest.
    ///
    /// # Errors
    /// * `PasswordError` - Digest is malformed
    pub fn verify_secret(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(plaintext, digest)
    }

    /// Spend the same work as a real password check, against a throwaway digest.
    ///
    /// Called when no account matches a login attempt so that unknown and
    /// known emails take comparable time to reject.
    pub fn verify_against_decoy(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_init(|| self.password_hasher.hash("decoy-credential").ok());

        if let Some(digest) = decoy {
            let _ = self.password_hasher.verify(password, digest);
        }
    }

    /// Verify credentials and issue a token pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Identity to embed in both tokens
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &TokenSubject,
    ) -> Result<TokenPair, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.token_codec.issue_pair(subject)?)
    }

    /// Issue a token pair without password verification.
    ///
    /// Used by the refresh flow once the presented refresh token is accepted.
    pub fn issue_tokens(&self, subject: &TokenSubject) -> Result<TokenPair, JwtError> {
        self.token_codec.issue_pair(subject)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<TokenClaims, JwtError> {
        self.token_codec.verify(TokenKind::Access, token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenClaims, JwtError> {
        self.token_codec.verify(TokenKind::Refresh, token)
    }
}
