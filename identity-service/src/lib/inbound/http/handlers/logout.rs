use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use crate::domain::session::ports::AuthServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!(user_id = %auth_user.user_id, email = %auth_user.email, "Logout requested");

    state
        .auth_service
        .logout(&auth_user.user_id)
        .await
        .map_err(|e| ApiError::from_auth(e, "Invalid or expired token"))
        .map(|_| StatusCode::NO_CONTENT)
}
