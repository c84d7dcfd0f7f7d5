//! Delay curves
//!
//! A curve maps a zero-based attempt index to the number of seconds the
//! retry engine waits before making that attempt. Every curve here is pure:
//! the same input always yields the same output and evaluation has no side
//! effects, so one curve can be shared by any number of concurrent retry
//! runs.

use std::f64::consts::E;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

/// Logistic (S-shaped) curve
///
/// Computes `limit / (1 + e * e^(-k * (x - midpoint)))`. The extra factor of
/// Euler's number shifts the curve right of the textbook logistic, so at
/// `x == midpoint` the value is `limit / (1 + e)` rather than `limit / 2`.
///
/// * `x` - the input value (attempt index)
/// * `k` - steepness of the curve
/// * `limit` - the curve's supremum
/// * `midpoint` - the x-value of the sigmoid's inflection
///
/// # Example
///
/// ```rust
/// use backoff_core::curves::logistic;
///
/// let at_midpoint = logistic(4.0, 1.5, 10.0, 4.0);
/// assert!((at_midpoint - 10.0 / (1.0 + std::f64::consts::E)).abs() < 1e-12);
/// ```
pub fn logistic(x: f64, k: f64, limit: f64, midpoint: f64) -> f64 {
    limit / (1.0 + E * (-k * (x - midpoint)).exp())
}

/// Straight-line curve: `x * mul`
///
/// `mul` may be zero or negative; negative delays are treated as "no wait"
/// by [`Curve::delay`].
pub fn linear(x: f64, mul: f64) -> f64 {
    x * mul
}

/// The recommended curve
///
/// A [`logistic`] curve whose steepness (the incline) is `max_attempts / 5`,
/// whose inflection sits at `max_attempts` and whose ceiling is `limit`
/// seconds. Delays stay short for early attempts and climb toward `limit`
/// as the attempt index approaches `max_attempts`.
///
/// Returns [`Error::InvalidConfig`] when `max_attempts` is zero: the incline
/// is undefined for unbounded runs, so pick an explicit curve for those.
pub fn default_curve(max_attempts: u32, limit: f64) -> Result<Curve> {
    if max_attempts == 0 {
        return Err(Error::invalid_config(
            "default curve requires max_attempts greater than zero",
        ));
    }

    let midpoint = f64::from(max_attempts);
    let incline = midpoint / 5.0;
    Ok(Curve::logistic(incline, limit, midpoint))
}

/// Shared handle to a delay curve
///
/// Cloning is cheap; all clones evaluate the same function.
#[derive(Clone)]
pub struct Curve {
    f: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl Curve {
    /// Wrap an arbitrary pure function of the attempt index
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// A [`logistic`] curve with fixed parameters
    pub fn logistic(k: f64, limit: f64, midpoint: f64) -> Self {
        Self::new(move |x| logistic(x, k, limit, midpoint))
    }

    /// A [`linear`] curve with a fixed multiplier
    pub fn linear(mul: f64) -> Self {
        Self::new(move |x| linear(x, mul))
    }

    /// The same delay before every attempt
    pub fn constant(secs: f64) -> Self {
        Self::new(move |_| secs)
    }

    /// Raw curve value, in seconds, for an attempt index
    pub fn seconds(&self, x: f64) -> f64 {
        (self.f)(x)
    }

    /// Wait before the given zero-based attempt
    ///
    /// Negative and NaN values yield no wait; values too large for a
    /// `Duration` saturate to `Duration::MAX`.
    pub fn delay(&self, attempt: u32) -> Duration {
        seconds_to_duration(self.seconds(f64::from(attempt)))
    }
}

impl fmt::Debug for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Curve").finish_non_exhaustive()
    }
}

fn seconds_to_duration(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
