use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use http::header::AUTHORIZATION;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const UNAUTHORIZED_MESSAGE: &str = "Invalid or expired token";

/// Identity attached to request extensions once the access token verifies.
///
/// `email` and `roles` are the values signed into the token at login or
/// refresh time; they can lag behind the stored user until the next refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub roles: Vec<String>,
}

/// Guard for every non-public route.
///
/// Requires `Authorization: Bearer <access token>`. Any failure is answered
/// with the same 401 before the handler runs.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&req).ok_or_else(|| {
        tracing::warn!(reason = "missing_bearer", "Request rejected");
        ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
    })?;

    let claims = state.authenticator.verify_access_token(token).map_err(|e| {
        tracing::warn!(reason = %e, "Request rejected");
        ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(reason = %e, "Request rejected");
        ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
        roles: claims.roles,
    });

    Ok(next.run(req).await)
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
