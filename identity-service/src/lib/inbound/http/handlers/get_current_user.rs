use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    tracing::debug!(
        user_id = %auth_user.user_id,
        email = %auth_user.email,
        roles = ?auth_user.roles,
        "Resolving current user"
    );

    state
        .user_service
        .get_user(&auth_user.user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
