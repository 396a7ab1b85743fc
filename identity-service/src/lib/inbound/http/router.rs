use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::MethodRouter;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::get_current_user::get_current_user;
use super::handlers::get_user::get_user;
use super::handlers::health::health;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh::refresh;
use super::handlers::update_user::update_user;
use super::middleware::authenticate;
use crate::domain::session::ports::AuthServicePort;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub auth_service: Arc<dyn AuthServicePort>,
    pub authenticator: Arc<Authenticator>,
}

/// Route registration where authentication is the default.
///
/// `route` puts a handler behind the access-token guard; `public` is the
/// only way to opt out. A path must not be registered both ways.
pub struct ApiRoutes {
    public: Router<AppState>,
    protected: Router<AppState>,
    protected_count: usize,
}

impl ApiRoutes {
    pub fn new() -> Self {
        Self {
            public: Router::new(),
            protected: Router::new(),
            protected_count: 0,
        }
    }

    /// Register a route that requires a valid access token.
    pub fn route(mut self, path: &str, method_router: MethodRouter<AppState>) -> Self {
        self.protected = self.protected.route(path, method_router);
        self.protected_count += 1;
        self
    }

    /// Register a route reachable without authentication.
    pub fn public(mut self, path: &str, method_router: MethodRouter<AppState>) -> Self {
        self.public = self.public.route(path, method_router);
        self
    }

    /// Merge both sets, layering the guard over every protected route.
    pub fn into_router(self, state: &AppState) -> Router<AppState> {
        // route_layer panics on a router without routes
        if self.protected_count == 0 {
            return self.public;
        }

        let protected = self
            .protected
            .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

        self.public.merge(protected)
    }
}

impl Default for ApiRoutes {
    fn default() -> Self {
        Self::new()
    }
}

pub fn api_routes() -> ApiRoutes {
    ApiRoutes::new()
        .public("/health", get(health))
        .public("/auth/login", post(login))
        .public("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(get_current_user))
        .route(
            "/users/:user_id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    api_routes()
        .into_router(&state)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::PasswordHasher;
    use auth::TokenCodec;
    use auth::TokenPair;
    use auth::TokenSettings;
    use auth::TokenSubject;
    use axum::http::header::AUTHORIZATION;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::StatusCode;
    use axum::Extension;
    use chrono::Duration as TokenTtl;
    use mockall::mock;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::session::errors::AuthError;
    use crate::domain::session::models::LoginCommand;
    use crate::domain::session::models::LoginOutcome;
    use crate::domain::user::models::CreateUserCommand;
    use crate::domain::user::models::UpdateUserCommand;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserFilter;
    use crate::domain::user::models::UserId;
    use crate::inbound::http::middleware::AuthenticatedUser;
    use crate::user::errors::UserError;

    mock! {
        pub TestUserService {}

        #[async_trait]
        impl UserServicePort for TestUserService {
            async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;
            async fn get_user(&self, id: &UserId) -> Result<User, UserError>;
            async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, UserError>;
            async fn update_user(&self, id: &UserId, command: UpdateUserCommand) -> Result<User, UserError>;
            async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    mock! {
        pub TestAuthService {}

        #[async_trait]
        impl AuthServicePort for TestAuthService {
            async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AuthError>;
            async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
            async fn logout(&self, user_id: &UserId) -> Result<(), AuthError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(
            PasswordHasher::with_cost(64, 1, 1).unwrap(),
            TokenCodec::new(
                TokenSettings::new("router_access_secret", TokenTtl::minutes(15)),
                TokenSettings::new("router_refresh_secret", TokenTtl::days(7)),
            ),
        ))
    }

    fn state(user_service: MockTestUserService, auth_service: MockTestAuthService) -> AppState {
        AppState {
            user_service: Arc::new(user_service),
            auth_service: Arc::new(auth_service),
            authenticator: authenticator(),
        }
    }

    fn request(method: &str, uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let router = create_router(state(
            MockTestUserService::new(),
            MockTestAuthService::new(),
        ));

        let protected = [
            ("GET", "/users"),
            ("POST", "/users"),
            ("GET", "/users/me"),
            ("GET", "/users/7d0b1c1e-4a57-4c1c-9d0e-1f7d0e6b8c11"),
            ("PATCH", "/users/7d0b1c1e-4a57-4c1c-9d0e-1f7d0e6b8c11"),
            ("DELETE", "/users/7d0b1c1e-4a57-4c1c-9d0e-1f7d0e6b8c11"),
            ("POST", "/auth/logout"),
        ];

        for (method, uri) in protected {
            let response = router
                .clone()
                .oneshot(request(method, uri, None))
                .await
                .unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{} {} should be guarded",
                method,
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_guard_rejects_refresh_token_as_bearer() {
        let state = state(MockTestUserService::new(), MockTestAuthService::new());
        let pair = state
            .authenticator
            .issue_tokens(&TokenSubject::new(
                UserId::new(),
                "erin@example.com",
                vec!["customer".to_string()],
            ))
            .unwrap();
        let router = create_router(state);

        let response = router
            .oneshot(request("POST", "/auth/logout", Some(&pair.refresh_token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_guard_passes_identity_to_handler() {
        let user_id = UserId::new();
        let mut auth_service = MockTestAuthService::new();
        auth_service
            .expect_logout()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(|_| Ok(()));

        let state = state(MockTestUserService::new(), auth_service);
        let pair = state
            .authenticator
            .issue_tokens(&TokenSubject::new(
                user_id,
                "erin@example.com",
                vec!["customer".to_string()],
            ))
            .unwrap();
        let router = create_router(state);

        let response = router
            .oneshot(request("POST", "/auth/logout", Some(&pair.access_token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_guard_exposes_token_identity() {
        let state = state(MockTestUserService::new(), MockTestAuthService::new());
        let pair = state
            .authenticator
            .issue_tokens(&TokenSubject::new(
                UserId::new(),
                "erin@example.com",
                vec!["employee".to_string(), "customer".to_string()],
            ))
            .unwrap();
        let router = ApiRoutes::new()
            .route(
                "/whoami",
                get(|Extension(user): Extension<AuthenticatedUser>| async move {
                    format!("{} {}", user.email, user.roles.join(","))
                }),
            )
            .into_router(&state)
            .with_state(state);

        let response = router
            .oneshot(request("GET", "/whoami", Some(&pair.access_token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "erin@example.com employee,customer");
    }

    #[tokio::test]
    async fn test_malformed_login_body_is_enveloped() {
        let mut auth_service = MockTestAuthService::new();
        auth_service.expect_login().times(0);
        let router = create_router(state(MockTestUserService::new(), auth_service));

        let syntax = router
            .clone()
            .oneshot(json_request("/auth/login", "{\"email\": "))
            .await
            .unwrap();
        assert_eq!(syntax.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body_text(syntax).await).unwrap();
        assert_eq!(body["status_code"], 400);
        assert!(body["data"]["message"].is_string());

        let missing_field = router
            .oneshot(json_request("/auth/login", r#"{"email": "a@example.com"}"#))
            .await
            .unwrap();
        assert_eq!(missing_field.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value =
            serde_json::from_str(&body_text(missing_field).await).unwrap();
        assert_eq!(body["status_code"], 422);
    }

    #[tokio::test]
    async fn test_refresh_without_usable_token_is_unauthorized() {
        let mut auth_service = MockTestAuthService::new();
        auth_service
            .expect_refresh()
            .withf(|token| token.is_empty())
            .times(3)
            .returning(|_| Err(AuthError::InvalidToken("missing refresh token".to_string())));
        let router = create_router(state(MockTestUserService::new(), auth_service));

        for body in [r#"{"refreshToken": null}"#, "{}", "not json"] {
            let response = router
                .clone()
                .oneshot(json_request("/auth/refresh", body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "body {}", body);
            let json: serde_json::Value =
                serde_json::from_str(&body_text(response).await).unwrap();
            assert_eq!(json["data"]["message"], "Invalid refresh token");
        }
    }

    #[tokio::test]
    async fn test_public_routes_skip_guard() {
        let router = create_router(state(
            MockTestUserService::new(),
            MockTestAuthService::new(),
        ));

        let response = router
            .oneshot(request("GET", "/health", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_new_routes_are_protected_by_default() {
        let state = state(MockTestUserService::new(), MockTestAuthService::new());
        let router = ApiRoutes::new()
            .public("/open", get(|| async { "open" }))
            .route("/reports", get(|| async { "secret" }))
            .into_router(&state)
            .with_state(state);

        let open = router
            .clone()
            .oneshot(request("GET", "/open", None))
            .await
            .unwrap();
        let reports = router
            .oneshot(request("GET", "/reports", None))
            .await
            .unwrap();

        assert_eq!(open.status(), StatusCode::OK);
        assert_eq!(reports.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_only_routes_build() {
        let state = state(MockTestUserService::new(), MockTestAuthService::new());
        let router = ApiRoutes::new()
            .public("/open", get(|| async { "open" }))
            .into_router(&state)
            .with_state(state);

        let response = router
            .oneshot(request("GET", "/open", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
