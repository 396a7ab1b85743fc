use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde_json::Value;

use crate::user::errors::ProfileError;

const EMPLOYEE_NUMBER_PREFIX: &str = "VOUT";
const DEFAULT_NAME_STEM: &str = "USR";

/// Personal details attached one-to-one to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    /// Free-form JSON object
    pub metadata: Option<Value>,
    pub employee_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Empty profile created at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            first_name: None,
            last_name: None,
            birthdate: None,
            phone: None,
            gender: None,
            avatar_url: None,
            metadata: None,
            employee_number: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Raw profile fields as received from a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    pub metadata: Option<Value>,
    pub employee_number: Option<String>,
}

/// Validated set of profile fields; absent fields are left untouched when
/// applied to an existing profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    first_name: Option<String>,
    last_name: Option<String>,
    birthdate: Option<NaiveDate>,
    phone: Option<String>,
    gender: Option<String>,
    avatar_url: Option<String>,
    metadata: Option<Value>,
    employee_number: Option<String>,
}

impl ProfileFields {
    /// Validate raw profile fields.
    ///
    /// # Errors
    /// * `TooLong` - A text field exceeds its column width
    /// * `InvalidBirthdate` - Birthdate is not a `YYYY-MM-DD` calendar date
    /// * `InvalidAvatarUrl` - Avatar is not an absolute http(s) URL
    /// * `MetadataNotObject` - Metadata is not a JSON object
    pub fn parse(input: ProfileInput) -> Result<Self, ProfileError> {
        let birthdate = input
            .birthdate
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| ProfileError::InvalidBirthdate(raw))
            })
            .transpose()?;

        if let Some(url) = &input.avatar_url {
            if !is_http_url(url) {
                return Err(ProfileError::InvalidAvatarUrl(url.clone()));
            }
        }

        if matches!(&input.metadata, Some(value) if !value.is_object()) {
            return Err(ProfileError::MetadataNotObject);
        }

        Ok(Self {
            first_name: bounded("firstName", input.first_name, 120)?,
            last_name: bounded("lastName", input.last_name, 120)?,
            birthdate,
            phone: bounded("phone", input.phone, 40)?,
            gender: bounded("gender", input.gender, 16)?,
            avatar_url: bounded("avatarUrl", input.avatar_url, 512)?,
            metadata: input.metadata,
            employee_number: bounded("employee_number", input.employee_number, 16)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Copy every provided field onto `profile`.
    pub fn apply_to(self, profile: &mut UserProfile, now: DateTime<Utc>) {
        if self.first_name.is_some() {
            profile.first_name = self.first_name;
        }
        if self.last_name.is_some() {
            profile.last_name = self.last_name;
        }
        if self.birthdate.is_some() {
            profile.birthdate = self.birthdate;
        }
        if self.phone.is_some() {
            profile.phone = self.phone;
        }
        if self.gender.is_some() {
            profile.gender = self.gender;
        }
        if self.avatar_url.is_some() {
            profile.avatar_url = self.avatar_url;
        }
        if self.metadata.is_some() {
            profile.metadata = self.metadata;
        }
        if self.employee_number.is_some() {
            profile.employee_number = self.employee_number;
        }
        profile.updated_at = now;
    }

    /// Build a new profile whose employee number is `employee_number`,
    /// whatever the client sent.
    pub fn into_profile(self, employee_number: Option<String>, now: DateTime<Utc>) -> UserProfile {
        let mut profile = UserProfile::new(now);
        self.apply_to(&mut profile, now);
        profile.employee_number = employee_number;
        profile
    }
}

/// Employee number of the form `VOUT{NAME3}{HHmmss}`.
///
/// `NAME3` is the first three ASCII letters of `first_name`, uppercased and
/// padded with `X`; `USR` when no first name is given. The clock part is the
/// UTC time of `at`.
pub fn generate_employee_number(first_name: Option<&str>, at: DateTime<Utc>) -> String {
    let mut stem: String = first_name
        .unwrap_or(DEFAULT_NAME_STEM)
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .take(3)
        .collect();
    while stem.len() < 3 {
        stem.push('X');
    }

    format!("{}{}{}", EMPLOYEE_NUMBER_PREFIX, stem, at.format("%H%M%S"))
}

fn bounded(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ProfileError> {
    match value {
        Some(text) if text.chars().count() > max => Err(ProfileError::TooLong { field, max }),
        other => Ok(other),
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));

    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !url.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
