//! Backoff policies
//!
//! A policy describes a curve and an attempt budget as plain data, so callers
//! can keep retry tuning alongside the rest of their own settings (the types
//! derive serde traits for that purpose). A policy is turned into a
//! [`Curve`] and fed to [`crate::retry::BackoffConfigBuilder::with_policy`].
//!
//! # Example
//!
//! ```rust
//! use backoff_core::policy::{BackoffPolicy, CurveSpec};
//!
//! let policy = BackoffPolicy {
//!     max_attempts: 4,
//!     curve: CurveSpec::Linear { multiplier: 0.5 },
//! };
//!
//! assert_eq!(policy.curve().unwrap().seconds(2.0), 1.0);
//! ```

use crate::curves::{default_curve, Curve};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Attempt budget plus the curve that spaces attempts out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackoffPolicy {
    /// Maximum number of attempts, 0 for unlimited
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay curve
    #[serde(default)]
    pub curve: CurveSpec,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            curve: CurveSpec::default(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}
fn default_limit_secs() -> f64 {
    30.0
}

/// Declarative description of a [`Curve`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CurveSpec {
    /// Logistic curve derived from the attempt budget (default)
    #[serde(rename_all = "kebab-case")]
    Default {
        #[serde(default = "default_limit_secs")]
        limit_secs: f64,
    },

    /// Logistic curve with explicit parameters
    #[serde(rename_all = "kebab-case")]
    Logistic {
        steepness: f64,
        limit_secs: f64,
        midpoint: f64,
    },

    /// Linear growth
    Linear { multiplier: f64 },

    /// Fixed delay
    Constant { secs: f64 },
}

impl Default for CurveSpec {
    fn default() -> Self {
        CurveSpec::Default {
            limit_secs: default_limit_secs(),
        }
    }
}

impl BackoffPolicy {
    /// Check that the policy describes a usable curve
    pub fn validate(&self) -> Result<()> {
        let params: Vec<(&str, f64)> = match &self.curve {
            CurveSpec::Default { limit_secs } => {
                if self.max_attempts == 0 {
                    return Err(Error::invalid_config(
                        "default curve requires max-attempts greater than zero",
                    ));
                }
                vec![("limit-secs", *limit_secs)]
            }
            CurveSpec::Logistic {
                steepness,
                limit_secs,
                midpoint,
            } => vec![
                ("steepness", *steepness),
                ("limit-secs", *limit_secs),
                ("midpoint", *midpoint),
            ],
            CurveSpec::Linear { multiplier } => vec![("multiplier", *multiplier)],
            CurveSpec::Constant { secs } => vec![("secs", *secs)],
        };

        for (name, value) in params {
            if !value.is_finite() {
                return Err(Error::invalid_config(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Build the curve this policy describes
    pub fn curve(&self) -> Result<Curve> {
        self.validate()?;

        let curve = match self.curve {
            CurveSpec::Default { limit_secs } => default_curve(self.max_attempts, limit_secs)?,
            CurveSpec::Logistic {
                steepness,
                limit_secs,
                midpoint,
            } => Curve::logistic(steepness, limit_secs, midpoint),
            CurveSpec::Linear { multiplier } => Curve::linear(multiplier),
            CurveSpec::Constant { secs } => Curve::constant(secs),
        };

        tracing::debug!(max_attempts = self.max_attempts, curve = ?self.curve, "built backoff curve");
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::logistic;

    #[test]
    fn test_default_policy() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.curve, CurveSpec::Default { limit_secs: 30.0 });
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_default_policy_curve_is_default_curve() {
        let curve = BackoffPolicy::default().curve().unwrap();
        let expected = default_curve(5, 30.0).unwrap();
        for x in 0..=5 {
            assert_eq!(curve.seconds(f64::from(x)), expected.seconds(f64::from(x)));
        }
    }

    #[test]
    fn test_logistic_policy() {
        let policy = BackoffPolicy {
            max_attempts: 8,
            curve: CurveSpec::Logistic {
                steepness: 1.5,
                limit_secs: 12.0,
                midpoint: 4.0,
            },
        };
        let curve = policy.curve().unwrap();
        assert_eq!(curve.seconds(2.0), logistic(2.0, 1.5, 12.0, 4.0));
    }

    #[test]
    fn test_constant_policy_unbounded() {
        let policy = BackoffPolicy {
            max_attempts: 0,
            curve: CurveSpec::Constant { secs: 0.5 },
        };
        assert_eq!(policy.curve().unwrap().seconds(9.0), 0.5);
    }

    #[test]
    fn test_default_curve_rejects_unbounded() {
        let policy = BackoffPolicy {
            max_attempts: 0,
            curve: CurveSpec::default(),
        };
        let err = policy.curve().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_non_finite_parameter_rejected() {
        let policy = BackoffPolicy {
            max_attempts: 3,
            curve: CurveSpec::Linear {
                multiplier: f64::INFINITY,
            },
        };
        let err = policy.validate().unwrap_err();
        assert!(err.to_string().contains("multiplier"));
        assert!(policy.curve().is_err());

        let policy = BackoffPolicy {
            max_attempts: 3,
            curve: CurveSpec::Logistic {
                steepness: 1.0,
                limit_secs: f64::NAN,
                midpoint: 3.0,
            },
        };
        assert!(policy.validate().unwrap_err().to_string().contains("limit-secs"));
    }

    #[test]
    fn test_policy_field_names() {
        let policy: BackoffPolicy = serde_json::from_value(serde_json::json!({
            "max-attempts": 7,
            "curve": { "kind": "logistic", "steepness": 0.5, "limit-secs": 9.0, "midpoint": 7.0 }
        }))
        .unwrap();

        assert_eq!(policy.max_attempts, 7);
        assert_eq!(
            policy.curve,
            CurveSpec::Logistic {
                steepness: 0.5,
                limit_secs: 9.0,
                midpoint: 7.0
            }
        );
    }

    #[test]
    fn test_policy_defaults_when_fields_absent() {
        let policy: BackoffPolicy = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(policy, BackoffPolicy::default());
    }
}
