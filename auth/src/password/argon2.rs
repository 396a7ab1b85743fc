use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::Error as HashError;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Slow, salted one-way hashing for passwords and refresh tokens.
///
/// Internally uses Argon2id. Cost parameters are embedded in every digest, so
/// digests produced under an older cost keep verifying after the cost changes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a new hasher with the library-default Argon2id cost.
    ///
    /// # Returns
    /// PasswordHasher instance configured with secure defaults
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Create a hasher with an explicit Argon2id cost.
    ///
    /// # Arguments
    /// * `memory_kib` - Memory cost in KiB
    /// * `iterations` - Number of passes
    /// * `parallelism` - Degree of parallelism
    ///
    /// # Errors
    /// * `InvalidParameters` - The combination is rejected by Argon2
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext secret.
    ///
    /// Uses a freshly generated random salt, so hashing the same input twice
    /// yields two different digests.
    ///
    /// # Arguments
    /// * `plaintext` - Password or token to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a plaintext secret against a stored digest.
    ///
    /// The digest's own parameters are used and the final comparison is
    /// constant-time.
    ///
    /// # Arguments
    /// * `plaintext` - Secret to verify
    /// * `digest` - Stored hash in PHC string format
    ///
    /// # Returns
    /// True if the secret matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Digest is malformed or could not be recomputed
    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(digest).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid password hash: {}", e))
        })?;

        match self
            .argon2
            .verify_password(plaintext.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(HashError::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_cost(64, 1, 1).expect("Failed to build hasher")
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher
            .verify(password, &hash)
            .expect("Failed to verify password"));

        assert!(!hasher
            .verify("wrong_password", &hash)
            .expect("Failed to verify password"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = fast_hasher();

        let first = hasher.hash("Sunflower77").unwrap();
        let second = hasher.hash("Sunflower77").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("Sunflower77", &first).unwrap());
        assert!(hasher.verify("Sunflower77", &second).unwrap());
    }

    #[test]
    fn test_verify_uses_digest_parameters() {
        let cheap = fast_hasher();
        let other = PasswordHasher::with_cost(128, 2, 1).unwrap();

        let hash = cheap.hash("password123").unwrap();
        assert!(other.verify("password123", &hash).unwrap());
    }

    #[test]
    fn test_long_inputs_with_shared_prefix_do_not_collide() {
        let hasher = fast_hasher();
        let prefix = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.".repeat(3);
        let first = format!("{}first", prefix);
        let second = format!("{}second", prefix);

        let hash = hasher.hash(&first).unwrap();
        assert!(!hasher.verify(&second, &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = fast_hasher();
        let result = hasher.verify("password", "invalid_hash");
        assert!(matches!(result, Err(PasswordError::VerificationFailed(_))));
    }

    #[test]
    fn test_with_cost_rejects_invalid_parameters() {
        let result = PasswordHasher::with_cost(1, 0, 0);
        assert!(matches!(result, Err(PasswordError::InvalidParameters(_))));
    }
}
