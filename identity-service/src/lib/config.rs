use std::env;

use auth::parse_ttl;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::TokenSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub hashing: HashingConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Token secrets and lifetimes.
///
/// `access_secret` and `refresh_secret` each fall back to the shared `secret`.
/// There is no built-in default: a missing secret is a startup error.
#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub access_secret: Option<String>,
    pub refresh_secret: Option<String>,
    #[serde(default = "default_access_ttl")]
    pub access_ttl: String,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl: String,
}

/// Argon2id cost used for new password and refresh-token digests.
#[derive(Debug, Deserialize, Clone)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// One-shot creation of an administrator when the user table is empty.
#[derive(Deserialize, Clone)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub enabled: bool,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_bootstrap_role")]
    pub role: String,
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_ttl() -> String {
    "15m".to_string()
}

fn default_refresh_ttl() -> String {
    "7d".to_string()
}

fn default_bootstrap_role() -> String {
    "admin".to_string()
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS_SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__REFRESH_TTL=30d overrides jwt.refresh_ttl
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        // Fail fast on unusable token settings
        config.jwt.access_settings()?;
        config.jwt.refresh_settings()?;

        Ok(config)
    }
}

impl JwtConfig {
    /// Secret and lifetime for access tokens.
    ///
    /// # Errors
    /// * `Message` - No secret configured, or the lifetime does not parse
    pub fn access_settings(&self) -> Result<TokenSettings, ConfigError> {
        Self::settings(
            "jwt.access_secret",
            self.access_secret.as_deref(),
            self.secret.as_deref(),
            "jwt.access_ttl",
            &self.access_ttl,
        )
    }

    /// Secret and lifetime for refresh tokens.
    ///
    /// # Errors
    /// * `Message` - No secret configured, or the lifetime does not parse
    pub fn refresh_settings(&self) -> Result<TokenSettings, ConfigError> {
        Self::settings(
            "jwt.refresh_secret",
            self.refresh_secret.as_deref(),
            self.secret.as_deref(),
            "jwt.refresh_ttl",
            &self.refresh_ttl,
        )
    }

    /// True when both token classes end up signed with the same secret.
    pub fn shares_secret(&self) -> bool {
        match (self.access_settings(), self.refresh_settings()) {
            (Ok(access), Ok(refresh)) => access.secret == refresh.secret,
            _ => false,
        }
    }

    fn settings(
        secret_key: &str,
        specific: Option<&str>,
        shared: Option<&str>,
        ttl_key: &str,
        ttl: &str,
    ) -> Result<TokenSettings, ConfigError> {
        let secret = specific
            .filter(|s| !s.trim().is_empty())
            .or(shared.filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| {
                ConfigError::Message(format!("{} (or jwt.secret) must be set", secret_key))
            })?;

        let ttl = parse_ttl(ttl)
            .map_err(|e| ConfigError::Message(format!("{}: {}", ttl_key, e)))?;

        Ok(TokenSettings::new(secret, ttl))
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("access_secret", &self.access_secret.as_ref().map(|_| "<redacted>"))
            .field("refresh_secret", &self.refresh_secret.as_ref().map(|_| "<redacted>"))
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl HashingConfig {
    pub fn build_hasher(&self) -> Result<PasswordHasher, PasswordError> {
        PasswordHasher::with_cost(self.memory_kib, self.iterations, self.parallelism)
    }
}

impl Default for HashingConfig {
    // Argon2 library defaults
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            email: None,
            password: None,
            role: default_bootstrap_role(),
        }
    }
}

impl std::fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("enabled", &self.enabled)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .finish()
    }
}
