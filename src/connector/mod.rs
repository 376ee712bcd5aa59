//! Dependency connector: startup acquisition of store and cache handles.
//!
//! Every external stateful dependency implements [`Connector`]. The
//! [`acquire`] loop dials it under a [`RetryPolicy`] (fixed delay, attempt
//! cap, optional deadline) and can be interrupted through a
//! [`tokio_util::sync::CancellationToken`]. This is the only retry logic in
//! the service; request-time failures are never retried.

pub mod cache;
pub mod retry;
pub mod store;

use std::fmt;
use std::future::Future;

pub use cache::{CacheConnector, CacheHandle};
pub use retry::{RetryPolicy, acquire};
pub use store::StoreConnector;

/// External dependency kinds dialed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    /// The PostgreSQL user store.
    Store,
    /// The Redis cache.
    Cache,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => f.write_str("postgres"),
            Self::Cache => f.write_str("redis"),
        }
    }
}

/// A single connection attempt against one dependency.
///
/// Implementations perform exactly one attempt per call and never retry
/// internally; retrying is [`acquire`]'s job.
pub trait Connector {
    /// Established handle returned on success.
    type Handle;
    /// Failure reason for one attempt.
    type Error: fmt::Display;

    /// Which dependency this connector dials.
    fn dependency(&self) -> Dependency;

    /// Makes one connection attempt.
    fn connect(&self) -> impl Future<Output = Result<Self::Handle, Self::Error>> + Send;
}

/// Why a dependency could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// Every allowed attempt failed.
    #[error("could not connect to {dependency} after {attempts} attempts: {last_error}")]
    Exhausted {
        /// Dependency that stayed unreachable.
        dependency: Dependency,
        /// Attempts made.
        attempts: u32,
        /// Failure reason of the final attempt.
        last_error: String,
    },

    /// The overall acquisition deadline passed.
    #[error("gave up connecting to {dependency}: deadline exceeded during attempt {attempts}")]
    DeadlineExceeded {
        /// Dependency being acquired.
        dependency: Dependency,
        /// Attempts started before the deadline hit.
        attempts: u32,
    },

    /// Acquisition was cancelled from outside.
    #[error("connecting to {dependency} was cancelled")]
    Cancelled {
        /// Dependency being acquired.
        dependency: Dependency,
    },
}

impl ConnectError {
    /// Dependency the error refers to.
    #[must_use]
    pub const fn dependency(&self) -> Dependency {
        match self {
            Self::Exhausted { dependency, .. }
            | Self::DeadlineExceeded { dependency, .. }
            | Self::Cancelled { dependency } => *dependency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_names_dependency_and_cause() {
        let err = ConnectError::Exhausted {
            dependency: Dependency::Cache,
            attempts: 5,
            last_error: "Connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not connect to redis after 5 attempts: Connection refused"
        );
        assert_eq!(err.dependency(), Dependency::Cache);
    }
}
