//! Idempotent creation of the `users` table.

use super::executor::{QueryExecutor, Statement};

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255),
    email VARCHAR(255)
)";

/// Ensures the `users` table exists.
///
/// Safe on every process start: an existing table and its rows are left
/// untouched.
///
/// # Errors
///
/// Returns the [`sqlx::Error`] raised by the `CREATE TABLE` statement. The
/// caller treats it as fatal.
pub async fn ensure_schema(executor: &QueryExecutor) -> Result<(), sqlx::Error> {
    executor
        .execute(Statement::new(CREATE_USERS_TABLE), false)
        .await?;
    tracing::info!("users table ready");
    Ok(())
}
