//! PostgreSQL implementation of the user store.

use async_trait::async_trait;
use sqlx::FromRow;
use sqlx::postgres::PgRow;

use super::UserStore;
use super::executor::{QueryExecutor, Statement};
use super::models::{User, UserFields};
use crate::error::ServiceError;

/// PostgreSQL-backed user store built on [`QueryExecutor`].
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    executor: QueryExecutor,
}

impl PostgresUserStore {
    /// Creates a store over the given executor.
    #[must_use]
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    async fn write(&self, statement: Statement) -> Result<(), ServiceError> {
        self.executor.execute(statement, false).await?;
        Ok(())
    }

    async fn read(&self, statement: Statement) -> Result<Vec<User>, ServiceError> {
        let rows = self
            .executor
            .execute(statement, true)
            .await?
            .unwrap_or_default();
        rows.iter().map(to_user).collect()
    }
}

fn to_user(row: &PgRow) -> Result<User, ServiceError> {
    User::from_row(row).map_err(ServiceError::from)
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create(&self, fields: &UserFields) -> Result<(), ServiceError> {
        self.write(
            Statement::new("INSERT INTO users (name, email) VALUES ($1, $2)")
                .bind(fields.name.as_deref())
                .bind(fields.email.as_deref()),
        )
        .await?;
        tracing::info!("user created");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        self.read(Statement::new(
            "SELECT id, name, email FROM users ORDER BY id",
        ))
        .await
    }

    async fn get(&self, id: i32) -> Result<Option<User>, ServiceError> {
        let users = self
            .read(Statement::new("SELECT id, name, email FROM users WHERE id = $1").bind(id))
            .await?;
        Ok(users.into_iter().next())
    }

    async fn update(&self, id: i32, fields: &UserFields) -> Result<(), ServiceError> {
        self.write(
            Statement::new("UPDATE users SET name = $1, email = $2 WHERE id = $3")
                .bind(fields.name.as_deref())
                .bind(fields.email.as_deref())
                .bind(id),
        )
        .await?;
        tracing::info!(id, "user updated");
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        self.write(Statement::new("DELETE FROM users WHERE id = $1").bind(id))
            .await?;
        tracing::info!(id, "user deleted");
        Ok(())
    }
}
