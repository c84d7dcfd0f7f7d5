//! Retry observation and logging
//!
//! This module provides the `AttemptObserver` trait for monitoring a retry
//! run and a `TracingObserver` implementation that logs using the `tracing`
//! crate. Observers only watch: nothing they do changes how the engine
//! proceeds.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Observer trait for retry run events
///
/// All callbacks run on the retry task, one at a time. Attempt indices are
/// zero-based and `max_attempts` is 0 for unbounded runs.
///
/// # Example
///
/// ```rust
/// use backoff_core::retry::AttemptObserver;
/// use std::fmt::Display;
/// use std::time::Duration;
///
/// struct MetricsObserver;
///
/// impl AttemptObserver for MetricsObserver {
///     fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {}
///
///     fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, next_delay: Duration) {}
///
///     fn on_success(&self, attempt: u32, total_duration: Duration) {}
///
///     fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {}
/// }
/// ```
pub trait AttemptObserver: Send + Sync {
    /// Called right before the operation is invoked
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32);

    /// Called when an attempt fails and another one will follow
    ///
    /// `next_delay` is the wait before the next attempt.
    fn on_attempt_failed(&self, attempt: u32, error: &dyn fmt::Display, next_delay: Duration);

    /// Called when the operation succeeds
    fn on_success(&self, attempt: u32, total_duration: Duration);

    /// Called when a bounded run fails its last attempt
    fn on_exhausted(&self, attempts: u32, final_error: &dyn fmt::Display);
}

/// A no-op observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl AttemptObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn fmt::Display, _next_delay: Duration) {}

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn fmt::Display) {}
}

/// An observer that logs retry events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: WARN
/// - `on_success`: INFO (after a retry) or DEBUG (first attempt)
/// - `on_exhausted`: ERROR
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Name of the operation being retried (for log context)
    operation: String,
}

impl TracingObserver {
    /// Create a new tracing observer for a named operation
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    /// Get the operation name
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("backoff")
    }
}

impl AttemptObserver for TracingObserver {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        tracing::debug!(
            operation = %self.operation,
            attempt = attempt,
            max_attempts = max_attempts,
            "starting attempt"
        );
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn fmt::Display, next_delay: Duration) {
        tracing::warn!(
            operation = %self.operation,
            attempt = attempt,
            error = %error,
            delay_ms = next_delay.as_millis() as u64,
            "attempt failed, will retry"
        );
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        if attempt > 0 {
            tracing::info!(
                operation = %self.operation,
                attempt = attempt,
                total_duration_ms = total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn fmt::Display) {
        tracing::error!(
            operation = %self.operation,
            attempts = attempts,
            error = %final_error,
            "all retry attempts exhausted"
        );
    }
}

/// An observer that counts retry events
///
/// Useful for testing and metrics collection.
#[derive(Debug, Default)]
pub struct StatsObserver {
    attempt_starts: AtomicU32,
    failures: AtomicU32,
    successes: AtomicU32,
    exhaustions: AtomicU32,
}

impl StatsObserver {
    /// Create a new stats observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of attempt starts
    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts.load(Ordering::SeqCst)
    }

    /// Get the number of failures followed by another attempt
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Get the number of successes
    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    /// Get the number of exhaustions
    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(Ordering::SeqCst)
    }
}

impl AttemptObserver for StatsObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {
        self.attempt_starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn fmt::Display, _next_delay: Duration) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn fmt::Display) {
        self.exhaustions.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: AttemptObserver + ?Sized> AttemptObserver for Arc<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn fmt::Display, next_delay: Duration) {
        (**self).on_attempt_failed(attempt, error, next_delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn fmt::Display) {
        (**self).on_exhausted(attempts, final_error)
    }
}

impl<T: AttemptObserver + ?Sized> AttemptObserver for Box<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn fmt::Display, next_delay: Duration) {
        (**self).on_attempt_failed(attempt, error, next_delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn fmt::Display) {
        (**self).on_exhausted(attempts, final_error)
    }
}

/// An `on_failure` hook that logs every operation error at WARN
///
/// # Example
///
/// ```rust
/// use backoff_core::curves::Curve;
/// use backoff_core::retry::{failure_logger, BackoffConfig};
///
/// let config = BackoffConfig::<u32, std::io::Error>::builder()
///     .with_curve(Curve::linear(0.0))
///     .with_operation(|| Ok(7))
///     .with_on_failure(failure_logger::<std::io::Error>("fetch-manifest"))
///     .build();
/// # drop(config);
/// ```
pub fn failure_logger<E>(operation: impl Into<String>) -> impl FnMut(&E) + Send + 'static
where
    E: fmt::Display + 'static,
{
    let operation = operation.into();
    move |error: &E| {
        tracing::warn!(operation = %operation, error = %error, "operation failed");
    }
}
