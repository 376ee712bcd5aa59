//! Database model for the `users` table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A stored row from the `users` table.
///
/// Serializes with fields in column order: `id`, `name`, `email`. Name and
/// email are nullable at the store level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    /// Store-generated `SERIAL` primary key.
    pub id: i32,
    /// Display name.
    pub name: Option<String>,
    /// Contact address. Not unique.
    pub email: Option<String>,
}

/// Full replacement of a user's mutable fields. `None` stores `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    /// Display name.
    pub name: Option<String>,
    /// Contact address.
    pub email: Option<String>,
}
