//! Configuration module for the leettrack backend.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Upstream fetch sizes above this would trip LeetCode rate limiting.
pub const MAX_FETCH_LIMIT: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// JWT secret for token verification
    pub jwt_secret: SecretString,
    /// Address to bind the server to
    pub bind_address: SocketAddr,
    /// Bind port extracted from bind_address.
    pub port: u16,
    /// Whether the background LeetCode sync loop runs at all.
    pub sync_enabled: bool,
    /// Seconds between background sync ticks.
    pub sync_interval_secs: u64,
    /// Timeout applied to every LeetCode API request, in seconds.
    pub request_timeout_secs: u64,
    /// How many recent submissions a background tick fetches per user.
    pub sync_fetch_limit: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env_var("DATABASE_URL")?;
        if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://") {
            return Err(ConfigError::InvalidValue(
                "DATABASE_URL".to_string(),
                "must start with postgres:// or postgresql://".to_string(),
            ));
        }

        let bind_address_raw = env_var_or("BIND_ADDRESS", "0.0.0.0:8080");
        let bind_address = bind_address_raw.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue(
                "BIND_ADDRESS".to_string(),
                format!("failed to parse socket address: {e}"),
            )
        })?;

        let sync_interval_secs = parse_var("LEETCODE_SYNC_INTERVAL", 10)?;
        if sync_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "LEETCODE_SYNC_INTERVAL".to_string(),
                "must be a positive number of seconds".to_string(),
            ));
        }

        let request_timeout_secs = parse_var("LEETCODE_REQUEST_TIMEOUT", 30)?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "LEETCODE_REQUEST_TIMEOUT".to_string(),
                "must be a positive number of seconds".to_string(),
            ));
        }

        let sync_fetch_limit: u32 = parse_var("LEETCODE_SYNC_FETCH_LIMIT", 20)?;
        if sync_fetch_limit == 0 || sync_fetch_limit > MAX_FETCH_LIMIT {
            return Err(ConfigError::InvalidValue(
                "LEETCODE_SYNC_FETCH_LIMIT".to_string(),
                format!("must be between 1 and {MAX_FETCH_LIMIT}"),
            ));
        }

        Ok(Self {
            database_url,
            jwt_secret: SecretString::new(env_var("JWT_SECRET")?.into()),
            port: bind_address.port(),
            bind_address,
            sync_enabled: parse_bool_var("LEETCODE_SYNC_ENABLED", true)?,
            sync_interval_secs,
            request_timeout_secs,
            sync_fetch_limit,
        })
    }

    /// Sleep time between background sync ticks.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Timeout for a single LeetCode API request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(name.to_string(), format!("cannot parse `{raw}`"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_bool_var(name: &str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidValue(
                name.to_string(),
                format!("cannot parse `{other}` as a boolean"),
            )),
        },
        Err(_) => Ok(default),
    }
}
