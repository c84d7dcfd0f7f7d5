//! Retry-with-backoff engine
//!
//! Repeatedly invokes a caller-supplied operation, waiting a curve-computed
//! delay before each attempt, until the operation succeeds or the attempt
//! budget is used up.
//!
//! # Features
//!
//! - Pluggable delay curves (see [`crate::curves`])
//! - Bounded runs that return every error in attempt order
//! - Unbounded runs (`max_attempts == 0`) that only end on success
//! - Optional per-error hook and attempt observers (`TracingObserver` for logging)
//! - One isolated task per run; async and blocking entry points
//!
//! # Example
//!
//! ```rust,no_run
//! use backoff_core::curves::default_curve;
//! use backoff_core::retry::{execute, failure_logger, BackoffConfig, BackoffError};
//!
//! async fn example() -> Result<String, BackoffError<std::io::Error>> {
//!     let config = BackoffConfig::builder()
//!         .with_curve(default_curve(5, 30.0).expect("non-zero attempts"))
//!         .with_max_attempts(5)
//!         .with_operation(|| {
//!             // Your fallible operation here
//!             Ok("success".to_string())
//!         })
//!         .with_on_failure(failure_logger::<std::io::Error>("example"))
//!         .build();
//!
//!     execute(config).await
//! }
//! ```

mod config;
mod error;
mod executor;
mod observer;

pub use config::{BackoffConfig, BackoffConfigBuilder, FailureHook, Operation};
pub use error::BackoffError;
pub use executor::{execute, execute_blocking, retry_with_policy};
pub use observer::{failure_logger, AttemptObserver, NoOpObserver, StatsObserver, TracingObserver};
