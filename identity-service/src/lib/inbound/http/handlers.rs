use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::domain::user::models::StaffType;
use crate::domain::user::models::User;
use crate::domain::user::profile::ProfileInput;
use crate::domain::user::profile::UserProfile;
use crate::session::errors::AuthError;
use crate::user::errors::PasswordError;
use crate::user::errors::UserError;

pub mod create_user;
pub mod delete_user;
pub mod get_current_user;
pub mod get_user;
pub mod health;
pub mod list_users;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod update_user;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
}

impl ApiError {
    /// Collapse an auth failure into one client-facing message.
    ///
    /// Everything except an internal failure becomes the same 401, so the
    /// response never tells which step rejected the request.
    pub fn from_auth(err: AuthError, message: &str) -> Self {
        if err.is_internal() {
            tracing::error!(error = %err, "Auth operation failed");
            return ApiError::InternalServerError("Internal server error".to_string());
        }
        ApiError::Unauthorized(message.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) => ApiError::UnprocessableEntity(rejection.body_text()),
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            UserError::NoFieldsToUpdate => ApiError::BadRequest(err.to_string()),
            UserError::InvalidEmail(_)
            | UserError::InvalidUserId(_)
            | UserError::InvalidRole(_)
            | UserError::InvalidStaffType(_)
            | UserError::InvalidProfile(_)
            | UserError::Password(PasswordError::TooShort { .. }) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            UserError::Password(PasswordError::HashingFailed(_)) | UserError::DatabaseError(_) => {
                tracing::error!(error = %err, "User operation failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Public view of a user. Credential hashes are never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub type_of_staff: Option<StaffType>,
    pub profile: Option<ProfileData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            roles: user.roles.to_strings(),
            is_active: user.is_active,
            type_of_staff: user.type_of_staff,
            profile: user.profile.as_ref().map(ProfileData::from),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Public view of a user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub avatar_url: Option<String>,
    pub metadata: Option<Value>,
    #[serde(rename = "employee_number")]
    pub employee_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserProfile> for ProfileData {
    fn from(profile: &UserProfile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            birthdate: profile.birthdate,
            phone: profile.phone.clone(),
            gender: profile.gender.clone(),
            avatar_url: profile.avatar_url.clone(),
            metadata: profile.metadata.clone(),
            employee_number: profile.employee_number.clone(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Profile fields in a create or update request body (raw JSON)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    birthdate: Option<String>,
    phone: Option<String>,
    gender: Option<String>,
    avatar_url: Option<String>,
    metadata: Option<Value>,
    #[serde(rename = "employee_number")]
    employee_number: Option<String>,
}

impl From<ProfileRequest> for ProfileInput {
    fn from(request: ProfileRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            birthdate: request.birthdate,
            phone: request.phone,
            gender: request.gender,
            avatar_url: request.avatar_url,
            metadata: request.metadata,
            employee_number: request.employee_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::errors::EmailError;
    use crate::user::errors::ProfileError;
    use crate::user::errors::StaffTypeError;

    #[test]
    fn test_auth_errors_collapse_to_one_message() {
        let rejections = [
            AuthError::InvalidToken("expired".to_string()),
            AuthError::SessionNotFound("42".to_string()),
            AuthError::UserNotFound("42".to_string()),
        ];

        for err in rejections {
            assert_eq!(
                ApiError::from_auth(err, "Invalid refresh token"),
                ApiError::Unauthorized("Invalid refresh token".to_string())
            );
        }
    }

    #[test]
    fn test_internal_auth_error_is_server_error() {
        let err = ApiError::from_auth(
            AuthError::Internal("pool timed out".to_string()),
            "Invalid credentials",
        );
        assert_eq!(
            err,
            ApiError::InternalServerError("Internal server error".to_string())
        );
    }

    #[test]
    fn test_user_error_mapping() {
        assert!(matches!(
            ApiError::from(UserError::NotFound("1".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::EmailAlreadyExists("a@b.co".to_string())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::InvalidEmail(EmailError::InvalidFormat(
                "x".to_string()
            ))),
            ApiError::UnprocessableEntity(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::DatabaseError("boom".to_string())),
            ApiError::InternalServerError(_)
        ));
    }

    #[test]
    fn test_user_data_hides_hashes() {
        let now = Utc::now();
        let user = User {
            id: crate::user::models::UserId::new(),
            email: crate::user::models::EmailAddress::new("dora@example.com").unwrap(),
            password_hash: "$argon2id$secret".to_string(),
            refresh_token_hash: Some("$argon2id$refresh".to_string()),
            roles: Default::default(),
            is_active: true,
            type_of_staff: None,
            profile: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&UserData::from(&user)).unwrap();
        assert!(json.contains("\"isActive\":true"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("Hash"));
    }

    #[test]
    fn test_user_data_nests_profile() {
        let now = Utc::now();
        let mut profile = UserProfile::new(now);
        profile.first_name = Some("Dora".to_string());
        profile.avatar_url = Some("https://cdn.example.com/d.png".to_string());
        profile.employee_number = Some("VOUTDOR120000".to_string());

        let user = User {
            id: crate::user::models::UserId::new(),
            email: crate::user::models::EmailAddress::new("dora@example.com").unwrap(),
            password_hash: "$argon2id$secret".to_string(),
            refresh_token_hash: None,
            roles: Default::default(),
            is_active: true,
            type_of_staff: Some(StaffType::FullTime),
            profile: Some(profile),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserData::from(&user)).unwrap();
        assert_eq!(json["typeOfStaff"], "full_time");
        assert_eq!(json["profile"]["firstName"], "Dora");
        assert_eq!(json["profile"]["avatarUrl"], "https://cdn.example.com/d.png");
        assert_eq!(json["profile"]["employee_number"], "VOUTDOR120000");
    }

    #[test]
    fn test_profile_errors_are_unprocessable() {
        assert!(matches!(
            ApiError::from(UserError::InvalidProfile(ProfileError::MetadataNotObject)),
            ApiError::UnprocessableEntity(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::InvalidStaffType(StaffTypeError::Unknown(
                "boss".to_string()
            ))),
            ApiError::UnprocessableEntity(_)
        ));
    }
}
