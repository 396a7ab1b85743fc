use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::JwtError;

/// JWT token handler bound to a single signing secret.
///
/// Generic over the claims type. Uses HS256 (HMAC with SHA-256).
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Encode claims into a signed JWT.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT.
    ///
    /// The signature is checked before expiry, so a tampered token reports
    /// `InvalidSignature` even when it is also expired.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature or algorithm does not match this handler
    /// * `Expired` - `exp` is in the past
    /// * `Malformed` - Token is not parseable or lacks required claims
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}
