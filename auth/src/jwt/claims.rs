use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::errors::JwtError;

/// The two classes of bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, authorizes ordinary requests
    Access,
    /// Long-lived, accepted only when minting a new pair
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Identity carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSubject {
    pub user_id: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl TokenSubject {
    pub fn new(user_id: impl ToString, email: impl ToString, roles: Vec<String>) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            roles,
        }
    }
}

/// Signed token payload.
///
/// Access and refresh tokens share this shape. `kind` records the class the
/// token was minted for, so a token of one class is refused as the other
/// even when both classes are signed with the same secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user identifier)
    pub sub: String,

    pub email: String,

    pub roles: Vec<String>,

    pub kind: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token identifier, keeps two tokens minted in the same second distinct
    pub jti: String,
}

impl TokenClaims {
    /// Build claims for a subject, valid for `ttl` from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - `ttl` pushes the expiry past the representable range
    pub fn issue(subject: &TokenSubject, kind: TokenKind, ttl: Duration) -> Result<Self, JwtError> {
        Self::issued_at(subject, kind, Utc::now(), ttl)
    }

    /// Build claims for a subject with an explicit issue time.
    ///
    /// # Arguments
    /// * `subject` - Identity to embed
    /// * `kind` - Token class the claims are minted for
    /// * `issued_at` - Issue instant
    /// * `ttl` - Lifetime added to `issued_at` to produce `exp`
    ///
    /// # Errors
    /// * `EncodingFailed` - `issued_at + ttl` overflows
    pub fn issued_at(
        subject: &TokenSubject,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = issued_at.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::EncodingFailed(format!("{} token lifetime out of range", kind))
        })?;

        Ok(Self {
            sub: subject.user_id.clone(),
            email: subject.email.clone(),
            roles: subject.roles.clone(),
            kind,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Identity carried by these claims.
    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.sub.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
        }
    }
}
