//! Retry execution engine
//!
//! Every run gets its own task that owns the attempt loop. The caller waits
//! on a single-value handoff until that task reports success, exhaustion or
//! death. Attempts within a run are strictly sequential: wait for the curve's
//! delay, invoke the operation once, classify the result.

use std::fmt;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use tokio::sync::oneshot;

use crate::curves::Curve;
use crate::policy::BackoffPolicy;

use super::config::{BackoffConfig, FailureHook, Operation};
use super::error::BackoffError;
use super::observer::AttemptObserver;

/// Run an operation with backoff until it succeeds or the budget runs out
///
/// Spawns the attempt loop onto the current tokio runtime and awaits its
/// outcome. Unbounded runs (`max_attempts == 0`) only return on success.
///
/// # Example
///
/// ```rust
/// use backoff_core::curves::Curve;
/// use backoff_core::retry::{execute, BackoffConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut calls = 0;
/// let config = BackoffConfig::builder()
///     .with_curve(Curve::linear(0.0))
///     .with_max_attempts(3)
///     .with_operation(move || {
///         calls += 1;
///         if calls < 2 {
///             Err(format!("not ready ({calls})"))
///         } else {
///             Ok(calls)
///         }
///     })
///     .build();
///
/// assert_eq!(execute(config).await.unwrap(), 2);
/// # }
/// ```
pub async fn execute<T, E>(config: BackoffConfig<T, E>) -> Result<T, BackoffError<E>>
where
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let attempts = AttemptLoop::from_config(config)?;
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let outcome = attempts.run().await;
        // Caller stopped waiting; nothing left to deliver to.
        let _ = tx.send(outcome);
    });

    rx.await
        .unwrap_or_else(|_| Err(BackoffError::aborted("retry task ended without an outcome")))
}

/// Blocking counterpart of [`execute`]
///
/// Runs the attempt loop on a dedicated thread with its own current-thread
/// runtime and blocks the calling thread until the outcome arrives. Usable
/// from code with no async runtime.
pub fn execute_blocking<T, E>(config: BackoffConfig<T, E>) -> Result<T, BackoffError<E>>
where
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let attempts = AttemptLoop::from_config(config)?;
    let (tx, rx) = mpsc::sync_channel(1);

    thread::Builder::new()
        .name("backoff-retry".to_string())
        .spawn(move || {
            let outcome = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime.block_on(attempts.run()),
                Err(err) => Err(BackoffError::aborted(format!(
                    "failed to start retry runtime: {}",
                    err
                ))),
            };
            let _ = tx.send(outcome);
        })
        .map_err(|err| BackoffError::aborted(format!("failed to spawn retry thread: {}", err)))?;

    rx.recv()
        .unwrap_or_else(|_| Err(BackoffError::aborted("retry thread ended without an outcome")))
}

/// Retry an operation using the curve and budget of a policy
///
/// # Example
///
/// ```rust,no_run
/// use backoff_core::policy::BackoffPolicy;
/// use backoff_core::retry::retry_with_policy;
///
/// async fn example() {
///     let policy = BackoffPolicy::default();
///
///     let result = retry_with_policy(&policy, || Ok::<_, std::io::Error>("connected")).await;
/// }
/// ```
pub async fn retry_with_policy<T, E, F>(
    policy: &BackoffPolicy,
    operation: F,
) -> Result<T, BackoffError<E>>
where
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
    F: FnMut() -> Result<T, E> + Send + 'static,
{
    let config = BackoffConfig::builder()
        .with_policy(policy)
        .with_operation(operation)
        .try_build()
        .map_err(BackoffError::InvalidPolicy)?;

    execute(config).await
}

/// Upper bound on the error log reserved before the first attempt
const ERROR_LOG_RESERVE: u32 = 64;

/// A validated configuration, owned by the retry task
struct AttemptLoop<T, E> {
    curve: Curve,
    operation: Operation<T, E>,
    max_attempts: u32,
    on_failure: Option<FailureHook<E>>,
    observer: Box<dyn AttemptObserver>,
}

impl<T, E: fmt::Display> AttemptLoop<T, E> {
    fn from_config(config: BackoffConfig<T, E>) -> Result<Self, BackoffError<E>> {
        let BackoffConfig {
            curve,
            operation,
            max_attempts,
            on_failure,
            observer,
        } = config;

        let Some(curve) = curve else {
            tracing::warn!("backoff configuration has no curve");
            return Err(BackoffError::invalid_config("curve"));
        };
        let Some(operation) = operation else {
            tracing::warn!("backoff configuration has no operation");
            return Err(BackoffError::invalid_config("operation"));
        };

        Ok(Self {
            curve,
            operation,
            max_attempts,
            on_failure,
            observer,
        })
    }

    async fn run(mut self) -> Result<T, BackoffError<E>> {
        let start = Instant::now();
        let bounded = self.max_attempts != 0;
        // Budgets can be huge; grow the log as failures arrive.
        let mut errors = Vec::with_capacity(self.max_attempts.min(ERROR_LOG_RESERVE) as usize);
        let mut attempt: u32 = 0;
        let mut delay = self.curve.delay(attempt);

        loop {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.observer.on_attempt_start(attempt, self.max_attempts);

            let err = match (self.operation)() {
                Ok(value) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(value);
                }
                Err(err) => err,
            };

            if let Some(on_failure) = self.on_failure.as_mut() {
                on_failure(&err);
            }

            let failed = attempt;
            attempt = attempt.saturating_add(1);

            if bounded && attempt >= self.max_attempts {
                self.observer.on_exhausted(attempt, &err);
                errors.push(err);
                return Err(BackoffError::exhausted(attempt, errors, start.elapsed()));
            }

            delay = self.curve.delay(attempt);
            self.observer.on_attempt_failed(failed, &err, delay);

            if bounded {
                errors.push(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::observer::StatsObserver;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_operation(
        calls: Arc<AtomicU32>,
        succeed_on: u32,
    ) -> impl FnMut() -> Result<&'static str, io::Error> + Send + 'static {
        move || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            if attempt < succeed_on {
                Err(io::Error::new(io::ErrorKind::TimedOut, "timeout"))
            } else {
                Ok("success")
            }
        }
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let observer = Arc::new(StatsObserver::new());
        let calls = Arc::new(AtomicU32::new(0));

        let config = BackoffConfig::builder()
            .with_curve(Curve::linear(0.0))
            .with_max_attempts(3)
            .with_operation(counting_operation(calls.clone(), 0))
            .with_observer(observer.clone())
            .build();

        assert_eq!(execute(config).await.unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(observer.attempt_starts(), 1);
        assert_eq!(observer.successes(), 1);
        assert_eq!(observer.failures(), 0);
    }

    #[tokio::test]
    async fn test_success_after_retry() {
        let observer = Arc::new(StatsObserver::new());
        let calls = Arc::new(AtomicU32::new(0));

        let config = BackoffConfig::builder()
            .with_curve(Curve::constant(0.001))
            .with_max_attempts(5)
            .with_operation(counting_operation(calls.clone(), 2))
            .with_observer(observer.clone())
            .build();

        assert_eq!(execute(config).await.unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(observer.failures(), 2);
        assert_eq!(observer.successes(), 1);
    }

    #[tokio::test]
    async fn test_all_attempts_exhausted() {
        let observer = Arc::new(StatsObserver::new());
        let calls = Arc::new(AtomicU32::new(0));

        let config = BackoffConfig::builder()
            .with_curve(Curve::linear(0.0))
            .with_max_attempts(3)
            .with_operation(counting_operation(calls.clone(), u32::MAX))
            .with_observer(observer.clone())
            .build();

        let err = execute(config).await.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.errors().len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(observer.attempt_starts(), 3);
        assert_eq!(observer.failures(), 2); // Last failure reports exhaustion instead
        assert_eq!(observer.exhaustions(), 1);
    }

    #[tokio::test]
    async fn test_single_attempt() {
        let observer = Arc::new(StatsObserver::new());

        let config = BackoffConfig::<(), io::Error>::builder()
            .with_curve(Curve::linear(0.0))
            .with_max_attempts(1)
            .with_operation(|| Err(io::Error::other("error")))
            .with_observer(observer.clone())
            .build();

        let err = execute(config).await.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), 1);
        assert_eq!(observer.failures(), 0);
        assert_eq!(observer.exhaustions(), 1);
    }

    #[tokio::test]
    async fn test_missing_curve_rejected() {
        let calls = Arc::new(AtomicU32::new(0));

        let config = BackoffConfig::builder()
            .with_max_attempts(3)
            .with_operation(counting_operation(calls.clone(), 0))
            .build();

        let err = execute(config).await.unwrap_err();
        assert!(matches!(err, BackoffError::InvalidConfig { missing: "curve" }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_operation_rejected() {
        let config = BackoffConfig::<u32, io::Error>::builder()
            .with_curve(Curve::linear(1.0))
            .build();

        let err = execute(config).await.unwrap_err();
        assert!(matches!(
            err,
            BackoffError::InvalidConfig {
                missing: "operation"
            }
        ));
    }

    #[tokio::test]
    async fn test_retry_with_policy_invalid() {
        let policy = BackoffPolicy {
            max_attempts: 0,
            ..BackoffPolicy::default()
        };

        let err = retry_with_policy(&policy, || Ok::<_, io::Error>(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BackoffError::InvalidPolicy(_)));
    }

    #[test]
    fn test_blocking_success_after_retry() {
        let calls = Arc::new(AtomicU32::new(0));

        let config = BackoffConfig::builder()
            .with_curve(Curve::linear(0.0))
            .with_max_attempts(4)
            .with_operation(counting_operation(calls.clone(), 1))
            .build();

        assert_eq!(execute_blocking(config).unwrap(), "success");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_blocking_missing_curve() {
        let config = BackoffConfig::<u32, io::Error>::builder()
            .with_operation(|| Ok(1))
            .build();

        let err = execute_blocking(config).unwrap_err();
        assert!(err.is_invalid_config());
    }
}
