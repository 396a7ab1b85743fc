use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for Role and Roles validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0} (expected admin, employee or customer)")]
    Unknown(String),

    #[error("At least one role is required")]
    Empty,
}

/// Error for staff type parsing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StaffTypeError {
    #[error(
        "Unknown staff type: {0} (expected full_time, part_time, contractor, intern, other or freelancer)"
    )]
    Unknown(String),
}

/// Error for profile field validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("birthdate must be a YYYY-MM-DD date: {0}")]
    InvalidBirthdate(String),

    #[error("avatarUrl must be an http(s) URL: {0}")]
    InvalidAvatarUrl(String),

    #[error("metadata must be a JSON object")]
    MetadataNotObject,
}

/// Error for password policy and hashing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must be at least {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Invalid staff type: {0}")]
    InvalidStaffType(#[from] StaffTypeError),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Email already registered: {0}")]
    EmailAlreadyExists(String),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),
}
