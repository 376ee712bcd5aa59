//! Redis cache connector.
//!
//! An attempt counts as successful only after a `PING` round-trip answers
//! `PONG`; socket establishment alone is not enough.

use std::fmt;

use redis::aio::MultiplexedConnection;

use super::{Connector, Dependency};
use crate::config::ServiceConfig;

/// Established, liveness-checked Redis connection.
///
/// Held in the application state for the process lifetime. No handler reads
/// or writes through it.
#[derive(Clone)]
pub struct CacheHandle {
    url: String,
    #[allow(dead_code)]
    connection: MultiplexedConnection,
}

impl fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Dials Redis and verifies it answers `PING`.
#[derive(Debug, Clone)]
pub struct CacheConnector {
    url: String,
}

impl CacheConnector {
    /// Creates a connector for the given `redis://` URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Creates a connector from the service configuration.
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.redis_url())
    }
}

impl Connector for CacheConnector {
    type Handle = CacheHandle;
    type Error = redis::RedisError;

    fn dependency(&self) -> Dependency {
        Dependency::Cache
    }

    async fn connect(&self) -> Result<CacheHandle, redis::RedisError> {
        let client = redis::Client::open(self.url.as_str())?;
        let mut connection = client.get_multiplexed_async_connection().await?;

        let reply: String = redis::cmd("PING").query_async(&mut connection).await?;
        if reply != "PONG" {
            return Err(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "unexpected PING reply",
                reply,
            )));
        }

        Ok(CacheHandle {
            url: self.url.clone(),
            connection,
        })
    }
}
