use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::Role;
use crate::domain::user::models::StaffType;
use crate::domain::user::models::UserFilter;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<ApiSuccess<Vec<UserData>>, ApiError> {
    let Query(query) = query?;
    let filter = query.try_into_filter()?;

    state
        .user_service
        .list_users(&filter)
        .await
        .map_err(ApiError::from)
        .map(|users| ApiSuccess::new(StatusCode::OK, users.iter().map(UserData::from).collect()))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    is_active: Option<bool>,
    role: Option<String>,
    type_of_staff: Option<String>,
}

impl ListUsersQuery {
    fn try_into_filter(self) -> Result<UserFilter, UserError> {
        let role = self
            .role
            .map(|name| name.parse::<Role>())
            .transpose()?;
        let type_of_staff = self
            .type_of_staff
            .map(|name| name.parse::<StaffType>())
            .transpose()?;

        Ok(UserFilter {
            is_active: self.is_active,
            role,
            type_of_staff,
        })
    }
}
