//! Error types for the retry engine
//!
//! Individual operation errors never escape a run on their own. A run ends in
//! one of three ways: success, an exhausted attempt budget (carrying every
//! error in attempt order), or a configuration/task failure.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::error::Error as ConfigError;

/// Terminal failure of a retry run
///
/// Generic over `E`, the error type of the operation being retried.
#[derive(Debug)]
pub enum BackoffError<E> {
    /// The configuration lacked a curve or an operation
    ///
    /// Raised before any attempt is made.
    InvalidConfig {
        /// Name of the missing field
        missing: &'static str,
    },

    /// A policy could not be turned into a curve
    InvalidPolicy(ConfigError),

    /// A bounded run used its whole attempt budget without success
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Every error the operation produced, in attempt order
        errors: Vec<E>,
        /// Time spent from the start of the run to the final failure
        total_duration: Duration,
    },

    /// The retry task ended without delivering an outcome
    ///
    /// Happens when the operation or a hook panics, or when the blocking
    /// entry point cannot start its runtime.
    Aborted {
        /// Human-readable cause
        reason: String,
    },
}

impl<E: fmt::Display> fmt::Display for BackoffError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackoffError::InvalidConfig { missing } => {
                write!(f, "invalid backoff configuration: missing {}", missing)
            }
            BackoffError::InvalidPolicy(source) => {
                write!(f, "invalid backoff policy: {}", source)
            }
            BackoffError::Exhausted {
                attempts,
                errors,
                total_duration,
            } => {
                write!(
                    f,
                    "retry exhausted after {} attempts over {:.2}s",
                    attempts,
                    total_duration.as_secs_f64()
                )?;
                if let Some(last) = errors.last() {
                    write!(f, ": {}", last)?;
                }
                Ok(())
            }
            BackoffError::Aborted { reason } => {
                write!(f, "retry task aborted: {}", reason)
            }
        }
    }
}

impl<E: Error + 'static> Error for BackoffError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BackoffError::InvalidPolicy(source) => Some(source),
            _ => self.last_error().map(|err| err as &(dyn Error + 'static)),
        }
    }
}

impl<E> BackoffError<E> {
    /// Create an invalid config error
    pub fn invalid_config(missing: &'static str) -> Self {
        BackoffError::InvalidConfig { missing }
    }

    /// Create an exhausted error
    pub fn exhausted(attempts: u32, errors: Vec<E>, total_duration: Duration) -> Self {
        BackoffError::Exhausted {
            attempts,
            errors,
            total_duration,
        }
    }

    /// Create an aborted error
    pub fn aborted(reason: impl Into<String>) -> Self {
        BackoffError::Aborted {
            reason: reason.into(),
        }
    }

    /// Number of operation invocations made before the run ended
    ///
    /// Only exhausted runs report attempts; configuration failures make none,
    /// and an aborted run's count is unknown.
    pub fn attempts(&self) -> u32 {
        match self {
            BackoffError::Exhausted { attempts, .. } => *attempts,
            _ => 0,
        }
    }

    /// Collected operation errors, in attempt order
    ///
    /// Only an exhausted run collects operation errors. For the other
    /// variants the slice is empty because the variant itself is the whole
    /// error sequence: an `InvalidConfig` run failed with exactly that one
    /// error and made no attempts.
    pub fn errors(&self) -> &[E] {
        match self {
            BackoffError::Exhausted { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Consume this error, returning the collected operation errors
    ///
    /// Empty for every variant except `Exhausted`; see [`BackoffError::errors`].
    pub fn into_errors(self) -> Vec<E> {
        match self {
            BackoffError::Exhausted { errors, .. } => errors,
            _ => Vec::new(),
        }
    }

    /// The error from the final attempt, if any
    pub fn last_error(&self) -> Option<&E> {
        self.errors().last()
    }

    /// Check if the attempt budget was used up
    pub fn is_exhausted(&self) -> bool {
        matches!(self, BackoffError::Exhausted { .. })
    }

    /// Check if the configuration or its policy was rejected
    pub fn is_invalid_config(&self) -> bool {
        matches!(
            self,
            BackoffError::InvalidConfig { .. } | BackoffError::InvalidPolicy(_)
        )
    }

    /// Check if the retry task died
    pub fn is_aborted(&self) -> bool {
        matches!(self, BackoffError::Aborted { .. })
    }

    /// Map the operation error type using a closure
    pub fn map_err<F, E2>(self, f: F) -> BackoffError<E2>
    where
        F: FnMut(E) -> E2,
    {
        match self {
            BackoffError::InvalidConfig { missing } => BackoffError::InvalidConfig { missing },
            BackoffError::InvalidPolicy(source) => BackoffError::InvalidPolicy(source),
            BackoffError::Exhausted {
                attempts,
                errors,
                total_duration,
            } => BackoffError::Exhausted {
                attempts,
                errors: errors.into_iter().map(f).collect(),
                total_duration,
            },
            BackoffError::Aborted { reason } => BackoffError::Aborted { reason },
        }
    }
}
