//! PostgreSQL store connector.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use super::{Connector, Dependency};
use crate::config::ServiceConfig;

/// Dials PostgreSQL and yields a connection pool.
///
/// The pool is built eagerly: an attempt succeeds only once a first
/// connection has been established, so an unreachable server fails the
/// attempt instead of surfacing later on the first request.
#[derive(Debug, Clone)]
pub struct StoreConnector {
    options: PgConnectOptions,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl StoreConnector {
    /// Creates a connector from explicit options.
    #[must_use]
    pub fn new(options: PgConnectOptions, max_connections: u32, acquire_timeout: Duration) -> Self {
        Self {
            options,
            max_connections: max_connections.max(1),
            acquire_timeout,
        }
    }

    /// Creates a connector from the service configuration.
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.postgres_options(),
            config.database_max_connections,
            Duration::from_secs(config.connect_attempt_timeout_secs),
        )
    }
}

impl Connector for StoreConnector {
    type Handle = PgPool;
    type Error = sqlx::Error;

    fn dependency(&self) -> Dependency {
        Dependency::Store
    }

    async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_with(self.options.clone())
            .await
    }
}
