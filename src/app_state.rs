//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::connector::CacheHandle;
use crate::persistence::UserStore;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// User store for all CRUD operations.
    pub users: Arc<dyn UserStore>,
    /// Cache handle acquired at startup. Held for the process lifetime;
    /// `None` when the cache is disabled.
    pub cache: Option<CacheHandle>,
}

impl AppState {
    /// Creates state over a store, with an optional cache handle.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, cache: Option<CacheHandle>) -> Self {
        Self { users, cache }
    }
}
