use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::ProfileRequest;
use super::UserData;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Roles;
use crate::domain::user::models::StaffType;
use crate::domain::user::ports::UserServicePort;
use crate::domain::user::profile::ProfileFields;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(body) = body?;

    state
        .user_service
        .create_user(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for creating a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    email: String,
    password: String,
    roles: Option<Vec<String>>,
    is_active: Option<bool>,
    type_of_staff: Option<String>,
    profile: Option<ProfileRequest>,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, UserError> {
        let email = EmailAddress::new(self.email)?;
        let password = Password::new(self.password)?;
        let roles = self.roles.as_deref().map(Roles::parse).transpose()?;
        let type_of_staff = self
            .type_of_staff
            .as_deref()
            .map(str::parse::<StaffType>)
            .transpose()?;
        let profile = self
            .profile
            .map(|profile| ProfileFields::parse(profile.into()))
            .transpose()?;

        Ok(
            CreateUserCommand::new(email, password, roles, self.is_active)
                .with_type_of_staff(type_of_staff)
                .with_profile(profile),
        )
    }
}
