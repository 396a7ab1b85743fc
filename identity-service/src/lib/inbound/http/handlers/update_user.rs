use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Deserializer;

use super::ProfileRequest;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Roles;
use crate::domain::user::models::StaffType;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::profile::ProfileFields;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

/// HTTP request body for updating a user (raw JSON)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<String>>,
    pub is_active: Option<bool>,
    /// Absent leaves the staff type alone, `null` clears it
    #[serde(default, deserialize_with = "present")]
    pub type_of_staff: Option<Option<String>>,
    pub profile: Option<ProfileRequest>,
}

// Marks a field that was present in the body, even when it is `null`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, UserError> {
        // Validation errors convert via #[from]
        let email = self.email.map(EmailAddress::new).transpose()?;
        let password = self.password.map(Password::new).transpose()?;
        let roles = self.roles.as_deref().map(Roles::parse).transpose()?;
        let type_of_staff = self
            .type_of_staff
            .map(|staff| staff.as_deref().map(str::parse::<StaffType>).transpose())
            .transpose()?;
        let profile = self
            .profile
            .map(|profile| ProfileFields::parse(profile.into()))
            .transpose()?;

        Ok(UpdateUserCommand {
            email,
            password,
            roles,
            is_active: self.is_active,
            type_of_staff,
            profile,
        })
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let Json(req) = body?;
    let command = req.try_into_command()?;

    state
        .user_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
