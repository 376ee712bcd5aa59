//! Startup sequence: acquire dependencies, prepare the schema, build state.
//!
//! Order is fixed: store, then cache, then schema. Any failure aborts
//! startup before the listener is bound, so no traffic is ever served in a
//! partially connected state.

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::app_state::AppState;
use crate::config::ServiceConfig;
use crate::connector::{self, CacheConnector, StoreConnector};
use crate::error::StartupError;
use crate::persistence::{PostgresUserStore, QueryExecutor, ensure_schema};

/// Runs the startup sequence and returns the state handlers are served with.
///
/// Blocks for up to `max_attempts * delay` per dependency, or until `cancel`
/// fires. A configured deadline bounds both acquisitions together.
///
/// # Errors
///
/// Returns [`StartupError::Connect`] when a dependency stays unreachable
/// (or acquisition is cancelled) and [`StartupError::Schema`] when the
/// users table cannot be created.
pub async fn bootstrap(
    config: &ServiceConfig,
    cancel: &CancellationToken,
) -> Result<AppState, StartupError> {
    let policy = config.retry_policy().anchored_at(Instant::now());

    let pool = connector::acquire(&StoreConnector::from_config(config), &policy, cancel).await?;

    let cache = if config.cache_enabled {
        Some(connector::acquire(&CacheConnector::from_config(config), &policy, cancel).await?)
    } else {
        tracing::info!("cache disabled; skipping redis");
        None
    };

    let executor = QueryExecutor::new(pool);
    ensure_schema(&executor)
        .await
        .map_err(StartupError::Schema)?;

    Ok(AppState::new(
        Arc::new(PostgresUserStore::new(executor)),
        cache,
    ))
}
