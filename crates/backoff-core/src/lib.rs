//! # backoff-core
//!
//! Generic retry-with-backoff primitive providing:
//! - Delay curves mapping an attempt index to a wait (logistic, linear, default)
//! - A retry engine running each call on its own task
//! - Declarative policies describing a curve and an attempt budget

pub mod curves;
pub mod error;
pub mod policy;
pub mod retry;

pub use curves::{default_curve, linear, logistic, Curve};
pub use error::{Error, Result};
pub use policy::{BackoffPolicy, CurveSpec};
pub use retry::{execute, execute_blocking, BackoffConfig, BackoffError};
