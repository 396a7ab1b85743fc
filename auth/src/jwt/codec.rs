use std::fmt;

use chrono::Duration;

use super::claims::TokenClaims;
use super::claims::TokenKind;
use super::claims::TokenSubject;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Secret and lifetime for one token class.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Freshly minted access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct Signer {
    handler: JwtHandler,
    ttl: Duration,
}

impl Signer {
    fn new(settings: &TokenSettings) -> Self {
        Self {
            handler: JwtHandler::new(settings.secret.as_bytes()),
            ttl: settings.ttl,
        }
    }
}

/// Signs and verifies access and refresh tokens.
///
/// Each class has its own secret and every token names its class in the
/// `kind` claim, so a token of one class never verifies as the other.
pub struct TokenCodec {
    access: Signer,
    refresh: Signer,
}

impl TokenCodec {
    pub fn new(access: TokenSettings, refresh: TokenSettings) -> Self {
        Self {
            access: Signer::new(&access),
            refresh: Signer::new(&refresh),
        }
    }

    fn signer(&self, kind: TokenKind) -> &Signer {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Sign a token of the given class for a subject.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed or the lifetime is out of range
    pub fn sign(&self, kind: TokenKind, subject: &TokenSubject) -> Result<String, JwtError> {
        let signer = self.signer(kind);
        signer
            .handler
            .encode(&TokenClaims::issue(subject, kind, signer.ttl)?)
    }

    /// Sign a fresh access token and a fresh refresh token for a subject.
    ///
    /// # Errors
    /// * `EncodingFailed` - Either token could not be encoded
    pub fn issue_pair(&self, subject: &TokenSubject) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.sign(TokenKind::Access, subject)?,
            refresh_token: self.sign(TokenKind::Refresh, subject)?,
        })
    }

    /// Verify a token against the secret of the given class.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signed with another secret or tampered with
    /// * `Expired` - Past its expiry
    /// * `Malformed` - Not a parseable token for this payload, or minted for the other class
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, JwtError> {
        let claims: TokenClaims = self.signer(kind).handler.decode(token)?;
        if claims.kind != kind {
            return Err(JwtError::Malformed(format!("expected {} token", kind)));
        }
        Ok(claims)
    }
}
