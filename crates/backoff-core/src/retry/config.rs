//! Retry configuration
//!
//! A `BackoffConfig` bundles everything one retry run needs: the delay
//! curve, the operation, the attempt budget and the optional observation
//! hooks. It is built once per run and consumed by the engine.

use std::fmt;

use crate::curves::Curve;
use crate::policy::BackoffPolicy;

use super::observer::{AttemptObserver, NoOpObserver};

/// The retried operation
pub type Operation<T, E> = Box<dyn FnMut() -> Result<T, E> + Send>;

/// Callback receiving each error the operation produces
pub type FailureHook<E> = Box<dyn FnMut(&E) + Send>;

/// Configuration for a single retry run
///
/// `curve` and `operation` are required; the engine rejects a configuration
/// missing either before making any attempt. A `max_attempts` of 0 retries
/// until the operation succeeds.
pub struct BackoffConfig<T, E> {
    /// Delay before each attempt
    pub curve: Option<Curve>,

    /// Operation to retry
    pub operation: Option<Operation<T, E>>,

    /// Attempt budget, 0 for unlimited
    pub max_attempts: u32,

    /// Called with every operation error
    pub on_failure: Option<FailureHook<E>>,

    /// Receives attempt lifecycle events
    pub observer: Box<dyn AttemptObserver>,
}

impl<T, E> BackoffConfig<T, E> {
    /// Start building a configuration
    pub fn builder() -> BackoffConfigBuilder<T, E> {
        BackoffConfigBuilder::new()
    }

    /// Whether the run stops after `max_attempts` failures
    pub fn is_bounded(&self) -> bool {
        self.max_attempts != 0
    }
}

impl<T, E> Default for BackoffConfig<T, E> {
    fn default() -> Self {
        Self {
            curve: None,
            operation: None,
            max_attempts: 0,
            on_failure: None,
            observer: Box::new(NoOpObserver),
        }
    }
}

impl<T, E> fmt::Debug for BackoffConfig<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffConfig")
            .field("curve", &self.curve)
            .field("operation", &self.operation.is_some())
            .field("max_attempts", &self.max_attempts)
            .field("on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for `BackoffConfig`
///
/// # Example
///
/// ```rust
/// use backoff_core::curves::default_curve;
/// use backoff_core::retry::{BackoffConfig, TracingObserver};
///
/// let config = BackoffConfig::<String, std::io::Error>::builder()
///     .with_curve(default_curve(5, 10.0).unwrap())
///     .with_max_attempts(5)
///     .with_operation(|| Ok("ready".to_string()))
///     .with_observer(TracingObserver::new("handshake"))
///     .build();
///
/// assert!(config.is_bounded());
/// ```
pub struct BackoffConfigBuilder<T, E> {
    config: BackoffConfig<T, E>,
    policy_error: Option<crate::error::Error>,
}

impl<T, E> Default for BackoffConfigBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> BackoffConfigBuilder<T, E> {
    /// Create a builder with no curve, no operation and an unlimited budget
    pub fn new() -> Self {
        Self {
            config: BackoffConfig::default(),
            policy_error: None,
        }
    }

    /// Set the delay curve
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.config.curve = Some(curve);
        self
    }

    /// Set the operation to retry
    pub fn with_operation<F>(mut self, operation: F) -> Self
    where
        F: FnMut() -> Result<T, E> + Send + 'static,
    {
        self.config.operation = Some(Box::new(operation));
        self
    }

    /// Set the attempt budget (0 = unlimited)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Set the failure hook
    pub fn with_on_failure<F>(mut self, on_failure: F) -> Self
    where
        F: FnMut(&E) + Send + 'static,
    {
        self.config.on_failure = Some(Box::new(on_failure));
        self
    }

    /// Set the observer
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: AttemptObserver + 'static,
    {
        self.config.observer = Box::new(observer);
        self
    }

    /// Take the curve and attempt budget from a policy
    ///
    /// A policy that cannot produce a curve leaves the curve unset and is
    /// reported by [`BackoffConfigBuilder::try_build`].
    pub fn with_policy(mut self, policy: &BackoffPolicy) -> Self {
        self.config.max_attempts = policy.max_attempts;
        match policy.curve() {
            Ok(curve) => {
                self.config.curve = Some(curve);
                self.policy_error = None;
            }
            Err(err) => {
                self.config.curve = None;
                self.policy_error = Some(err);
            }
        }
        self
    }

    /// Build the configuration
    ///
    /// Missing fields are not checked here; the engine reports them.
    pub fn build(self) -> BackoffConfig<T, E> {
        if let Some(err) = &self.policy_error {
            tracing::warn!(error = %err, "backoff policy rejected, curve left unset");
        }
        self.config
    }

    /// Build the configuration, failing if an applied policy was invalid
    pub fn try_build(self) -> crate::error::Result<BackoffConfig<T, E>> {
        match self.policy_error {
            Some(err) => Err(err),
            None => Ok(self.config),
        }
    }
}
