//! Error types for backoff-core's curve and policy layer
//!
//! Failures of an individual retry run are reported through
//! [`crate::retry::BackoffError`]; this module covers what can go wrong
//! before a run starts.

use thiserror::Error;

/// Result type alias using backoff-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Curve and policy errors
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid curve or policy parameters
    #[error("Invalid backoff configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
