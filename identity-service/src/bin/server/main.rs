use std::sync::Arc;

use auth::Authenticator;
use auth::TokenCodec;
use identity_service::config::BootstrapConfig;
use identity_service::config::Config;
use identity_service::domain::session::service::AuthService;
use identity_service::domain::user::models::CreateUserCommand;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::Password;
use identity_service::domain::user::models::Role;
use identity_service::domain::user::models::Roles;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_ttl = %config.jwt.access_ttl,
        refresh_ttl = %config.jwt.refresh_ttl,
        bootstrap = config.bootstrap.enabled,
        "Configuration loaded"
    );
    if config.jwt.shares_secret() {
        tracing::warn!("Access and refresh tokens share one secret; set jwt.access_secret and jwt.refresh_secret separately");
    }

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = config.hashing.build_hasher()?;
    let token_codec = TokenCodec::new(config.jwt.access_settings()?, config.jwt.refresh_settings()?);
    let authenticator = Arc::new(Authenticator::new(password_hasher.clone(), token_codec));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repository),
        password_hasher,
    ));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repository),
        Arc::clone(&authenticator),
    ));

    if config.bootstrap.enabled {
        bootstrap_admin(&user_service, &config.bootstrap).await;
    }

    let state = AppState {
        user_service,
        auth_service,
        authenticator,
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    if let Err(e) = axum::serve(http_listener, create_router(state)).await {
        tracing::error!(error = %e, "Server error");
    }

    Ok(())
}

/// Create the configured administrator if the directory is empty. Never fatal.
async fn bootstrap_admin(
    user_service: &UserService<PostgresUserRepository>,
    bootstrap: &BootstrapConfig,
) {
    let (Some(email), Some(password)) = (&bootstrap.email, &bootstrap.password) else {
        tracing::error!("Bootstrap enabled but bootstrap.email or bootstrap.password is missing");
        return;
    };

    let role = bootstrap.role.parse::<Role>().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Invalid bootstrap role, using admin");
        Role::Admin
    });

    let command = match (EmailAddress::new(email), Password::new(password.clone())) {
        (Ok(email), Ok(password)) => {
            CreateUserCommand::new(email, password, Some(Roles::single(role)), Some(true))
        }
        (Err(e), _) => {
            tracing::error!(error = %e, "Invalid bootstrap email");
            return;
        }
        (_, Err(e)) => {
            tracing::error!(error = %e, "Invalid bootstrap password");
            return;
        }
    };

    if let Err(e) = user_service.bootstrap_admin(command).await {
        tracing::error!(error = %e, "Admin bootstrap failed");
    }
}
