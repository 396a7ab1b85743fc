use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures stay distinguishable here for logging; the HTTP
/// boundary collapses them into a single unauthorized response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}

/// Error for token lifetime strings such as `15m` or `7d`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TtlError {
    #[error("Token lifetime is empty")]
    Empty,

    #[error("Invalid token lifetime: {0}")]
    InvalidFormat(String),

    #[error("Token lifetime must be positive: {0}")]
    NotPositive(String),

    #[error("Token lifetime exceeds {max_days} days: {input}")]
    TooLong { input: String, max_days: i64 },
}
