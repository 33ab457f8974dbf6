use chrono::Duration;

use crate::auth::{PasswordHasher, SigningKey};
use crate::error::ConfigError;

/// Process-wide settings, loaded once at startup.
#[derive(serde::Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub jwt: JwtSettings,
    #[serde(default)]
    pub hashing: HashingSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    /// Keep credentials and tasks in process memory instead of Postgres.
    #[serde(default)]
    pub in_memory: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "127.0.0.1".to_string(),
            database_name: "task_auth".to_string(),
            in_memory: false,
        }
    }
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    /// HMAC algorithm identifier: HS256, HS384 or HS512
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    /// Clock-skew allowance applied to the expiry check, in seconds
    #[serde(default)]
    pub leeway_seconds: u64,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

/// One year, in seconds
pub const MAX_ACCESS_TOKEN_EXPIRY: i64 = 365 * 24 * 60 * 60;

fn default_access_token_expiry() -> i64 {
    30 * 60
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: default_algorithm(),
            access_token_expiry: default_access_token_expiry(),
            leeway_seconds: 0,
        }
    }
}

impl JwtSettings {
    pub fn signing_key(&self) -> Result<SigningKey, ConfigError> {
        SigningKey::new(&self.secret, &self.algorithm)
    }

    /// Access token lifetime, between one second and `MAX_ACCESS_TOKEN_EXPIRY`
    pub fn token_ttl(&self) -> Result<Duration, ConfigError> {
        if !(1..=MAX_ACCESS_TOKEN_EXPIRY).contains(&self.access_token_expiry) {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.access_token_expiry must be within 1..={} seconds, got {}",
                MAX_ACCESS_TOKEN_EXPIRY, self.access_token_expiry
            )));
        }
        Duration::try_seconds(self.access_token_expiry).ok_or_else(|| {
            ConfigError::InvalidValue(format!(
                "jwt.access_token_expiry out of range: {}",
                self.access_token_expiry
            ))
        })
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct HashingSettings {
    /// bcrypt cost factor (log2 of the round count)
    pub cost: u32,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl HashingSettings {
    pub fn hasher(&self) -> Result<PasswordHasher, ConfigError> {
        PasswordHasher::new(self.cost)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct TelemetrySettings {
    /// Filter used when RUST_LOG is not set
    pub level: String,
    pub json: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

/// Reads `configuration.{yaml,toml,json}` if present, then `APP_*` environment
/// variables (`APP_JWT__SECRET` sets `jwt.secret`).
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
