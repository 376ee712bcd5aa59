//! Single-statement query execution inside a commit/rollback envelope.

use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool};

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// 32-bit integer (`INT4` / `SERIAL`).
    Int(i32),
    /// Text (`VARCHAR` / `TEXT`).
    Text(String),
    /// `NULL`, typed as text.
    Null,
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Option<&str>> for Param {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::Null, Self::from)
    }
}

/// One parameterized SQL statement with `$1..$n` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: &'static str,
    params: Vec<Param>,
}

impl Statement {
    /// Creates a statement with no parameters.
    #[must_use]
    pub fn new(sql: &'static str) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    /// Appends the next positional parameter.
    #[must_use]
    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    /// SQL text.
    #[must_use]
    pub fn sql(&self) -> &'static str {
        self.sql
    }

    /// Bound parameters, in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

/// Runs statements against the store, one transaction per call.
///
/// Each call checks a connection out of the pool, so concurrent requests
/// never interleave statements on the same connection. The connection is
/// returned to the pool on every exit path.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    pool: PgPool,
}

impl QueryExecutor {
    /// Wraps an established pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Executes `statement` and commits.
    ///
    /// With `fetch` set, every result row is returned; otherwise the result
    /// is `None`. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns the original [`sqlx::Error`] after rolling the transaction
    /// back, or the commit failure itself.
    pub async fn execute(
        &self,
        statement: Statement,
        fetch: bool,
    ) -> Result<Option<Vec<PgRow>>, sqlx::Error> {
        let sql = statement.sql;
        let mut tx = self.pool.begin().await?;

        match run(&mut tx, statement, fetch).await {
            Ok(rows) => {
                tx.commit().await?;
                Ok(rows)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                tracing::debug!(sql, error = %err, "statement rolled back");
                Err(err)
            }
        }
    }
}

async fn run(
    conn: &mut PgConnection,
    statement: Statement,
    fetch: bool,
) -> Result<Option<Vec<PgRow>>, sqlx::Error> {
    let mut query = sqlx::query(statement.sql);
    for param in statement.params {
        query = match param {
            Param::Int(value) => query.bind(value),
            Param::Text(value) => query.bind(value),
            Param::Null => query.bind(None::<String>),
        };
    }

    if fetch {
        query.fetch_all(&mut *conn).await.map(Some)
    } else {
        query.execute(&mut *conn).await.map(|_| None)
    }
}
