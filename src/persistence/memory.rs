//! In-memory user store for handler tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::UserStore;
use super::models::{User, UserFields};
use crate::error::ServiceError;

#[derive(Debug, Default)]
struct Table {
    next_id: i32,
    rows: BTreeMap<i32, User>,
}

/// `users` table kept in a map, with `SERIAL`-like id assignment.
///
/// A store built with [`MemoryUserStore::failing`] answers every call with
/// the given store error.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    table: Mutex<Table>,
    failure: Option<String>,
}

impl MemoryUserStore {
    /// Empty, healthy store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose every call fails with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            table: Mutex::default(),
            failure: Some(message.to_string()),
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        match &self.failure {
            Some(message) => Err(ServiceError::Store(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, fields: &UserFields) -> Result<(), ServiceError> {
        self.check()?;
        let mut table = self.table.lock().await;
        table.next_id += 1;
        let id = table.next_id;
        table.rows.insert(
            id,
            User {
                id,
                name: fields.name.clone(),
                email: fields.email.clone(),
            },
        );
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        self.check()?;
        Ok(self.table.lock().await.rows.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Option<User>, ServiceError> {
        self.check()?;
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn update(&self, id: i32, fields: &UserFields) -> Result<(), ServiceError> {
        self.check()?;
        if let Some(user) = self.table.lock().await.rows.get_mut(&id) {
            user.name = fields.name.clone();
            user.email = fields.email.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        self.check()?;
        self.table.lock().await.rows.remove(&id);
        Ok(())
    }
}
