use thiserror::Error;

/// Error type for password and secret hashing operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),
}
