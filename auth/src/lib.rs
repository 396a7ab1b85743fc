//! Authentication utilities library
//!
//! Provides the credential primitives used by the identity service:
//! - Secret hashing for passwords and refresh tokens (Argon2id)
//! - Access/refresh JWT issuance and verification with independent secrets
//! - An `Authenticator` coordinating both
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{parse_ttl, TokenCodec, TokenKind, TokenSettings, TokenSubject};
//!
//! let codec = TokenCodec::new(
//!     TokenSettings::new("access_secret_at_least_32_bytes_long!", parse_ttl("15m").unwrap()),
//!     TokenSettings::new("refresh_secret_at_least_32_bytes_long", parse_ttl("7d").unwrap()),
//! );
//! let subject = TokenSubject::new("user123", "alice@example.com", vec!["admin".to_string()]);
//! let pair = codec.issue_pair(&subject).unwrap();
//!
//! let claims = codec.verify(TokenKind::Access, &pair.access_token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! assert!(codec.verify(TokenKind::Refresh, &pair.access_token).is_err());
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::parse_ttl;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenClaims;
pub use jwt::TokenCodec;
pub use jwt::TokenKind;
pub use jwt::TokenPair;
pub use jwt::TokenSettings;
pub use jwt::TokenSubject;
pub use jwt::TtlError;
pub use password::PasswordError;
pub use password::PasswordHasher;
