//! Service error types with HTTP status code mapping.
//!
//! [`ServiceError`] is the request-level error type. Each variant maps to an
//! HTTP status code and one of two JSON shapes:
//!
//! ```json
//! { "error": "raw underlying message" }
//! { "message": "User not found" }
//! ```
//!
//! [`StartupError`] covers everything that prevents the service from ever
//! accepting traffic, and maps to a process exit code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::MessageResponse;
use crate::config::ConfigError;
use crate::connector::{ConnectError, Dependency};

/// Error body: `{"error": <message>}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Raw underlying error message.
    pub error: String,
}

/// Request-level error enum with HTTP status code mapping.
///
/// Client-caused and store-caused failures both answer 400 with the raw
/// message; only a missing user is a 404.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or incomplete request input.
    #[error("{0}")]
    InvalidRequest(String),

    /// No user with the requested id.
    #[error("User not found")]
    UserNotFound,

    /// Statement execution failed in the store.
    #[error("{0}")]
    Store(String),
}

impl ServiceError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Store(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = match self {
            Self::UserNotFound => axum::Json(MessageResponse::new(self.to_string())).into_response(),
            Self::InvalidRequest(_) | Self::Store(_) => axum::Json(ErrorResponse {
                error: self.to_string(),
            })
            .into_response(),
        };
        *response.status_mut() = status;
        response
    }
}

/// Fatal startup failure. The process exits without serving traffic.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration could not be read.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A dependency could not be acquired.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// The users table could not be created.
    #[error("schema initialization failed: {0}")]
    Schema(#[source] sqlx::Error),

    /// Binding or serving the HTTP listener failed.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

impl StartupError {
    /// Process exit code for this failure.
    ///
    /// | Code | Cause                                 |
    /// |------|---------------------------------------|
    /// | 1    | HTTP listener I/O                     |
    /// | 2    | configuration                         |
    /// | 3    | store unreachable                     |
    /// | 4    | cache unreachable                     |
    /// | 5    | schema creation                       |
    /// | 6    | startup cancelled / deadline exceeded |
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Io(_) => 1,
            Self::Config(_) => 2,
            Self::Connect(ConnectError::Exhausted {
                dependency: Dependency::Store,
                ..
            }) => 3,
            Self::Connect(ConnectError::Exhausted {
                dependency: Dependency::Cache,
                ..
            }) => 4,
            Self::Connect(ConnectError::DeadlineExceeded { .. } | ConnectError::Cancelled { .. }) => 6,
            Self::Schema(_) => 5,
        }
    }
}
