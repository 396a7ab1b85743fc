use std::fmt;
use std::str::FromStr;

use auth::TokenSubject;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::user::profile::ProfileFields;
use crate::domain::user::profile::UserProfile;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordError;
use crate::user::errors::RoleError;
use crate::user::errors::StaffTypeError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// `password_hash` and `refresh_token_hash` never leave the service: HTTP
/// responses are built from a separate view.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    /// Digest of the single outstanding refresh token, if a session is active
    pub refresh_token_hash: Option<String>,
    pub roles: Roles,
    pub is_active: bool,
    pub type_of_staff: Option<StaffType>,
    pub profile: Option<UserProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Identity embedded in tokens issued for this user.
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject::new(self.id, self.email.as_str(), self.roles.to_strings())
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Normalized email address type
///
/// Trimmed and lowercased before validation, so lookups are case- and
/// whitespace-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new normalized and validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let normalized = email.as_ref().trim().to_lowercase();

        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            "customer" => Ok(Role::Customer),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employment category of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffType {
    FullTime,
    PartTime,
    Contractor,
    Intern,
    Other,
    Freelancer,
}

impl StaffType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffType::FullTime => "full_time",
            StaffType::PartTime => "part_time",
            StaffType::Contractor => "contractor",
            StaffType::Intern => "intern",
            StaffType::Other => "other",
            StaffType::Freelancer => "freelancer",
        }
    }
}

impl FromStr for StaffType {
    type Err = StaffTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full_time" => Ok(StaffType::FullTime),
            "part_time" => Ok(StaffType::PartTime),
            "contractor" => Ok(StaffType::Contractor),
            "intern" => Ok(StaffType::Intern),
            "other" => Ok(StaffType::Other),
            "freelancer" => Ok(StaffType::Freelancer),
            other => Err(StaffTypeError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for StaffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-empty, duplicate-free set of roles, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roles(Vec<Role>);

impl Roles {
    /// # Errors
    /// * `Empty` - No role given
    pub fn new(roles: Vec<Role>) -> Result<Self, RoleError> {
        let mut unique: Vec<Role> = Vec::with_capacity(roles.len());
        for role in roles {
            if !unique.contains(&role) {
                unique.push(role);
            }
        }

        if unique.is_empty() {
            return Err(RoleError::Empty);
        }

        Ok(Self(unique))
    }

    /// Parse role names as stored in the database or sent by clients.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, RoleError> {
        let roles = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<Vec<Role>, RoleError>>()?;
        Self::new(roles)
    }

    pub fn single(role: Role) -> Self {
        Self(vec![role])
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|role| role.as_str().to_string()).collect()
    }
}

impl Default for Roles {
    fn default() -> Self {
        Self::single(Role::Customer)
    }
}

/// Plaintext password that satisfies the password policy.
///
/// Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    pub fn new(password: String) -> Result<Self, PasswordError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub roles: Roles,
    pub is_active: bool,
    pub type_of_staff: Option<StaffType>,
    pub profile: Option<ProfileFields>,
}

impl CreateUserCommand {
    /// Construct a new create user command.
    ///
    /// # Arguments
    /// * `email` - Normalized email address
    /// * `password` - Plain text password (will be hashed by service)
    /// * `roles` - Initial roles, `[customer]` when absent
    /// * `is_active` - Initial activation flag, true when absent
    pub fn new(
        email: EmailAddress,
        password: Password,
        roles: Option<Roles>,
        is_active: Option<bool>,
    ) -> Self {
        Self {
            email,
            password,
            roles: roles.unwrap_or_default(),
            is_active: is_active.unwrap_or(true),
            type_of_staff: None,
            profile: None,
        }
    }

    pub fn with_type_of_staff(mut self, type_of_staff: Option<StaffType>) -> Self {
        self.type_of_staff = type_of_staff;
        self
    }

    /// Attach profile fields; the stored profile gets a generated employee number.
    pub fn with_profile(mut self, profile: Option<ProfileFields>) -> Self {
        self.profile = profile;
        self
    }
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub email: Option<EmailAddress>,
    pub password: Option<Password>,
    pub roles: Option<Roles>,
    pub is_active: Option<bool>,
    /// `Some(None)` clears the staff type
    pub type_of_staff: Option<Option<StaffType>>,
    /// Created on first use, otherwise merged field by field
    pub profile: Option<ProfileFields>,
}

impl UpdateUserCommand {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.roles.is_none()
            && self.is_active.is_none()
            && self.type_of_staff.is_none()
            && self.profile.as_ref().map_or(true, ProfileFields::is_empty)
    }
}

/// Optional criteria for listing users; absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub is_active: Option<bool>,
    pub role: Option<Role>,
    pub type_of_staff: Option<StaffType>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.is_active.map_or(true, |active| user.is_active == active)
            && self.role.map_or(true, |role| user.roles.contains(role))
            && self
                .type_of_staff
                .map_or(true, |staff| user.type_of_staff == Some(staff))
    }
}
