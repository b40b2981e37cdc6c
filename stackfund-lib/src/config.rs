//! Configuration for the payment link service.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Rejected configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    #[error("malformed service config: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Tunables for [`PaymentLinkService`](crate::PaymentLinkService).
///
/// Every field has a default, so `{}` is a valid JSON config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Upper bound on candidate ids tried per creation.
    #[serde(default = "default_max_id_attempts")]
    pub max_id_attempts: u32,

    /// Deadline for each individual store call, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// Lifetime in days when a request gives no usable duration.
    #[serde(default = "default_duration_days")]
    pub default_duration_days: u32,
}

fn default_max_id_attempts() -> u32 {
    10
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_duration_days() -> u32 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_id_attempts: default_max_id_attempts(),
            store_timeout_ms: default_store_timeout_ms(),
            default_duration_days: default_duration_days(),
        }
    }
}

impl ServiceConfig {
    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_id_attempts(mut self, attempts: u32) -> Self {
        self.max_id_attempts = attempts;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn with_default_duration_days(mut self, days: u32) -> Self {
        self.default_duration_days = days;
        self
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Reject values that would make the service unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_id_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "max_id_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.store_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "store_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.default_duration_days == 0 {
            return Err(ConfigError::Invalid {
                field: "default_duration_days",
                reason: "must be at least 1 day".to_string(),
            });
        }
        Ok(())
    }
}
