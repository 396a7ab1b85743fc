use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::login::TokenPairData;
use super::ApiError;
use crate::domain::session::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Answers with the bare `{ accessToken, refreshToken }` document.
///
/// A body that is missing, unreadable or carries no usable `refreshToken`
/// gets the same 401 as a token that fails verification.
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequestBody>, JsonRejection>,
) -> Result<Json<TokenPairData>, ApiError> {
    let refresh_token = match body {
        Ok(Json(body)) => body.refresh_token.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unreadable refresh body");
            String::new()
        }
    };

    state
        .auth_service
        .refresh(&refresh_token)
        .await
        .map_err(|e| ApiError::from_auth(e, "Invalid refresh token"))
        .map(|pair| Json(pair.into()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequestBody {
    #[serde(default)]
    refresh_token: Option<String>,
}
