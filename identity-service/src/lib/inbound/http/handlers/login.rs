use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::ApiError;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::ports::AuthServicePort;
use crate::domain::user::models::User;
use crate::domain::user::profile::UserProfile;
use crate::inbound::http::router::AppState;

/// Login answers with the bare `{ user, tokens }` document rather than the
/// `{ status_code, data }` envelope.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<Json<LoginResponseData>, ApiError> {
    let Json(body) = body?;

    let outcome = state
        .auth_service
        .login(LoginCommand::new(body.email, body.password))
        .await
        .map_err(|e| ApiError::from_auth(e, "Invalid credentials"))?;

    Ok(Json(LoginResponseData {
        user: (&outcome.user).into(),
        tokens: outcome.tokens.into(),
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub user: LoginUserData,
    pub tokens: TokenPairData,
}

/// User view returned on login, with the profile flattened onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserData {
    pub id: String,
    pub email: String,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(rename = "employee_number", skip_serializing_if = "Option::is_none")]
    pub employee_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl From<&User> for LoginUserData {
    fn from(user: &User) -> Self {
        let profile = user
            .profile
            .clone()
            .unwrap_or_else(|| UserProfile::new(user.created_at));

        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            roles: user.roles.to_strings(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
            first_name: profile.first_name,
            last_name: profile.last_name,
            avatar_url: profile.avatar_url,
            employee_number: profile.employee_number,
            birthdate: profile.birthdate,
            phone: profile.phone,
            gender: profile.gender,
            metadata: profile.metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<auth::TokenPair> for TokenPairData {
    fn from(pair: auth::TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::UserId;

    fn user(profile: Option<UserProfile>) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: EmailAddress::new("erin@example.com").unwrap(),
            password_hash: "$argon2id$secret".to_string(),
            refresh_token_hash: Some("$argon2id$refresh".to_string()),
            roles: Default::default(),
            is_active: true,
            type_of_staff: None,
            profile,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_login_view_flattens_profile() {
        let mut profile = UserProfile::new(Utc::now());
        profile.first_name = Some("Erin".to_string());
        profile.birthdate = NaiveDate::from_ymd_opt(1991, 2, 3);
        profile.employee_number = Some("VOUTERI080910".to_string());
        profile.metadata = Some(serde_json::json!({ "desk": 12 }));

        let json = serde_json::to_value(LoginUserData::from(&user(Some(profile)))).unwrap();

        assert_eq!(json["email"], "erin@example.com");
        assert_eq!(json["firstName"], "Erin");
        assert_eq!(json["birthdate"], "1991-02-03");
        assert_eq!(json["employee_number"], "VOUTERI080910");
        assert_eq!(json["metadata"]["desk"], 12);
        assert!(json.get("profile").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("refreshTokenHash").is_none());
    }

    #[test]
    fn test_login_view_without_profile_omits_profile_keys() {
        let json = serde_json::to_value(LoginUserData::from(&user(None))).unwrap();

        assert_eq!(json["isActive"], true);
        assert!(json.get("firstName").is_none());
        assert!(json.get("employee_number").is_none());
    }
}
