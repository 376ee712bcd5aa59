//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key has a default so the service
//! starts unconfigured inside the compose network it was written for.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

use crate::connector::RetryPolicy;

/// Redis port. Not configurable.
pub const CACHE_PORT: u16 = 6379;

/// Top-level service configuration.
///
/// Loaded once at startup via [`ServiceConfig::from_env`].
#[derive(Clone)]
pub struct ServiceConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:5000`).
    pub listen_addr: SocketAddr,

    /// PostgreSQL host name.
    pub postgres_host: String,

    /// PostgreSQL port.
    pub postgres_port: u16,

    /// PostgreSQL database name.
    pub postgres_db: String,

    /// PostgreSQL user.
    pub postgres_user: String,

    /// PostgreSQL password.
    pub postgres_password: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Redis host name. The port is always [`CACHE_PORT`].
    pub redis_host: String,

    /// Whether the cache is acquired at startup at all.
    pub cache_enabled: bool,

    /// Attempts per dependency before startup is aborted.
    pub connect_max_attempts: u32,

    /// Seconds to pause between two connection attempts.
    pub connect_retry_delay_secs: u64,

    /// Seconds a single connection attempt may take.
    pub connect_attempt_timeout_secs: u64,

    /// Overall bound on acquiring every startup dependency, in seconds
    /// (0 = none).
    pub connect_deadline_secs: u64,

    /// Per-request timeout applied by the HTTP middleware stack.
    pub request_timeout_secs: u64,

    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A value was present but could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Environment key.
        key: &'static str,
        /// Raw value as found.
        value: String,
    },
}

impl ServiceConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file, then
    /// defers to [`ServiceConfig::from_lookup`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `LISTEN_ADDR` is set but
    /// cannot be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Missing or unparsable numeric and boolean values fall back to their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `LISTEN_ADDR` is set but
    /// cannot be parsed as a [`SocketAddr`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let listen_addr: SocketAddr =
            raw_addr.parse().map_err(|_| ConfigError::InvalidValue {
                key: "LISTEN_ADDR",
                value: raw_addr.clone(),
            })?;

        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            listen_addr,
            postgres_host: string("POSTGRES_HOST", "db"),
            postgres_port: parse_env(&lookup, "POSTGRES_PORT", 5432),
            postgres_db: string("POSTGRES_DB", "usersdb"),
            postgres_user: string("POSTGRES_USER", "user"),
            postgres_password: string("POSTGRES_PASSWORD", "password"),
            database_max_connections: parse_env(&lookup, "DATABASE_MAX_CONNECTIONS", 10),
            redis_host: string("REDIS_HOST", "redis_cache"),
            cache_enabled: parse_env_bool(&lookup, "CACHE_ENABLED", true),
            connect_max_attempts: parse_env(&lookup, "CONNECT_MAX_ATTEMPTS", 5),
            connect_retry_delay_secs: parse_env(&lookup, "CONNECT_RETRY_DELAY_SECS", 5),
            connect_attempt_timeout_secs: parse_env(&lookup, "CONNECT_ATTEMPT_TIMEOUT_SECS", 5),
            connect_deadline_secs: parse_env(&lookup, "CONNECT_DEADLINE_SECS", 0),
            request_timeout_secs: parse_env(&lookup, "REQUEST_TIMEOUT_SECS", 30),
            log_json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }

    /// Connection options for the PostgreSQL store.
    #[must_use]
    pub fn postgres_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.postgres_host)
            .port(self.postgres_port)
            .database(&self.postgres_db)
            .username(&self.postgres_user)
            .password(&self.postgres_password)
    }

    /// Redis connection URL built from [`Self::redis_host`] and [`CACHE_PORT`].
    #[must_use]
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{CACHE_PORT}/", self.redis_host)
    }

    /// Retry policy shared by all startup dependencies.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(
            self.connect_max_attempts,
            Duration::from_secs(self.connect_retry_delay_secs),
        )
        .with_attempt_timeout(Duration::from_secs(self.connect_attempt_timeout_secs));

        if self.connect_deadline_secs == 0 {
            policy
        } else {
            policy.with_deadline(Duration::from_secs(self.connect_deadline_secs))
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("postgres_host", &self.postgres_host)
            .field("postgres_port", &self.postgres_port)
            .field("postgres_db", &self.postgres_db)
            .field("postgres_user", &self.postgres_user)
            .field("postgres_password", &"<redacted>")
            .field("database_max_connections", &self.database_max_connections)
            .field("redis_host", &self.redis_host)
            .field("cache_enabled", &self.cache_enabled)
            .field("connect_max_attempts", &self.connect_max_attempts)
            .field("connect_retry_delay_secs", &self.connect_retry_delay_secs)
            .field(
                "connect_attempt_timeout_secs",
                &self.connect_attempt_timeout_secs,
            )
            .field("connect_deadline_secs", &self.connect_deadline_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_json", &self.log_json)
            .finish()
    }
}

/// Parses a looked-up value as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses a looked-up value as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}
