//! Persistence layer: PostgreSQL user store.
//!
//! Handlers depend on the [`UserStore`] trait. The concrete
//! [`PostgresUserStore`] issues exactly one statement per call through the
//! [`QueryExecutor`], which wraps it in its own transaction.

pub mod executor;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod postgres;
pub mod schema;

use std::fmt;

use async_trait::async_trait;

pub use executor::{Param, QueryExecutor, Statement};
pub use models::{User, UserFields};
pub use postgres::PostgresUserStore;
pub use schema::ensure_schema;

use crate::error::ServiceError;

/// CRUD operations on the `users` table.
///
/// Writes on a missing id are not errors: update and delete succeed without
/// touching any row.
#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug {
    /// Inserts a new user.
    async fn create(&self, fields: &UserFields) -> Result<(), ServiceError>;

    /// Returns every user, ordered by id.
    async fn list(&self) -> Result<Vec<User>, ServiceError>;

    /// Returns the user with `id`, if any.
    async fn get(&self, id: i32) -> Result<Option<User>, ServiceError>;

    /// Replaces name and email of the user with `id`.
    async fn update(&self, id: i32, fields: &UserFields) -> Result<(), ServiceError>;

    /// Deletes the user with `id`.
    async fn delete(&self, id: i32) -> Result<(), ServiceError>;
}
