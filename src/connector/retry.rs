//! Bounded, fixed-delay retry loop for acquiring dependency handles.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{ConnectError, Connector};

/// How many times, and how patiently, a dependency is dialed.
///
/// The pause between attempts is constant; there is no exponential
/// backoff. `max_attempts` is never below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    attempt_timeout: Option<Duration>,
    deadline: Option<Duration>,
    deadline_at: Option<Instant>,
}

impl RetryPolicy {
    /// Default attempt cap.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

    /// Default pause between attempts.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

    /// Creates a policy with the given attempt cap and pause.
    ///
    /// A cap of zero is raised to one.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            attempt_timeout: None,
            deadline: None,
            deadline_at: None,
        }
    }

    /// Bounds each individual attempt. An attempt that runs longer counts
    /// as a failure.
    #[must_use]
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Bounds the whole acquisition, attempts and pauses included.
    ///
    /// Until [`Self::anchored_at`] is called, the clock starts anew with
    /// every [`acquire`] call.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Pins the deadline to `start + deadline`, so every [`acquire`] run
    /// under this policy shares one budget.
    ///
    /// A policy without a deadline is returned unchanged.
    #[must_use]
    pub fn anchored_at(mut self, start: Instant) -> Self {
        self.deadline_at = self.deadline.map(|d| start + d);
        self
    }

    /// Attempt cap.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Per-attempt bound, if any.
    #[must_use]
    pub const fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout
    }

    /// Overall bound, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Absolute deadline set by [`Self::anchored_at`].
    #[must_use]
    pub const fn deadline_at(&self) -> Option<Instant> {
        self.deadline_at
    }

    /// Pause to take after failed attempt number `attempt`, or `None`
    /// when no attempt is left.
    #[must_use]
    pub const fn pause_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            None
        } else {
            Some(self.delay)
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_DELAY)
    }
}

/// Dials `connector` until it yields a handle or the policy gives up.
///
/// A successful attempt returns at once without consuming further
/// attempts. Each failure is logged, followed by a full `delay` pause,
/// except after the last attempt.
///
/// # Errors
///
/// - [`ConnectError::Exhausted`] after `max_attempts` consecutive failures.
/// - [`ConnectError::DeadlineExceeded`] when the policy deadline passes.
/// - [`ConnectError::Cancelled`] when `cancel` fires.
pub async fn acquire<C: Connector>(
    connector: &C,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<C::Handle, ConnectError> {
    let dependency = connector.dependency();
    let started = Instant::now();
    let deadline = policy
        .deadline_at
        .or_else(|| policy.deadline.map(|d| started + d));
    let mut last_error = String::new();

    for attempt in 1..=policy.max_attempts {
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ConnectError::Cancelled { dependency }),
            () = wait_until(deadline) => {
                return Err(ConnectError::DeadlineExceeded { dependency, attempts: attempt });
            }
            outcome = bounded(connector.connect(), policy.attempt_timeout) => outcome,
        };

        match outcome {
            Ok(handle) => {
                tracing::info!(%dependency, attempt, "connected");
                return Ok(handle);
            }
            Err(reason) => last_error = reason,
        }

        let Some(pause) = policy.pause_after(attempt) else {
            tracing::warn!(
                %dependency,
                attempt,
                max_attempts = policy.max_attempts,
                error = %last_error,
                "connection failed, no attempts left"
            );
            break;
        };
        tracing::warn!(
            %dependency,
            attempt,
            max_attempts = policy.max_attempts,
            error = %last_error,
            retry_in_secs = pause.as_secs_f64(),
            "connection failed"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ConnectError::Cancelled { dependency }),
            () = wait_until(deadline) => {
                return Err(ConnectError::DeadlineExceeded { dependency, attempts: attempt });
            }
            () = tokio::time::sleep(pause) => {}
        }
    }

    Err(ConnectError::Exhausted {
        dependency,
        attempts: policy.max_attempts,
        last_error,
    })
}

/// Runs one attempt, turning its error (or a timeout) into a message.
async fn bounded<F, H, E>(attempt: F, timeout: Option<Duration>) -> Result<H, String>
where
    F: Future<Output = Result<H, E>>,
    E: std::fmt::Display,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, attempt).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!("timed out after {}s", limit.as_secs_f64())),
        },
        None => attempt.await.map_err(|e| e.to_string()),
    }
}

/// Resolves at `deadline`, or never when there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
